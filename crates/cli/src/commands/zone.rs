use anyhow::Result;
use cf_purge_client::{CloudflareClient, Transport};

use super::Context;

/// Print the zone id, looking it up by site name only when not configured.
///
/// Credentials are needed only for the lookup.
pub async fn run<T: Transport>(ctx: &Context, client: &CloudflareClient<T>) -> Result<()> {
    let (resolver, config) = ctx.load()?;
    let config = resolver.ensure_zone(config, client).await?;

    println!("{}", config.require_zone()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{core_error, fake_client, site_dir};
    use cf_purge_core::{Error, Field};

    #[tokio::test]
    async fn test_configured_zone_needs_no_credentials() {
        let (_dir, ctx) = site_dir(Some("CLOUDFLARE_ZONE=z1\n"), None);
        let client = fake_client(&[]);

        run(&ctx, &client).await.unwrap();
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_requires_credentials() {
        let (_dir, ctx) = site_dir(None, Some("example.com\n"));
        let client = fake_client(&[]);

        let err = run(&ctx, &client).await.unwrap_err();
        assert!(matches!(core_error(&err), Error::MissingField(Field::Email)));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let (_dir, ctx) = site_dir(
            Some("CLOUDFLARE_API_KEY=k\nCLOUDFLARE_EMAIL=e\n"),
            Some("nowhere.example\n"),
        );
        let client = fake_client(&[r#"{"success":true,"errors":[],"result":[]}"#]);

        let err = run(&ctx, &client).await.unwrap_err();
        assert!(matches!(
            core_error(&err),
            Error::ZoneNotFound { site, .. } if site == "nowhere.example"
        ));
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_success() {
        let (_dir, ctx) = site_dir(
            Some("CLOUDFLARE_API_KEY=k\nCLOUDFLARE_EMAIL=e\nCLOUDFLARE_SITE=example.com\n"),
            None,
        );
        let client = fake_client(&[r#"{"success":true,"result":[{"id":"abc123"}]}"#]);

        run(&ctx, &client).await.unwrap();
        assert_eq!(client.transport().requests().len(), 1);
    }
}
