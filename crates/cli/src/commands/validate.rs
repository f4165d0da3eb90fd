use anyhow::Result;
use cf_purge_client::{CloudflareClient, Transport};

use super::{Context, resolve_for_purge};

pub async fn run<T: Transport>(ctx: &Context, client: &CloudflareClient<T>) -> Result<()> {
    println!("Validating Cloudflare configuration");

    let (resolver, config) = ctx.load()?;
    let config = resolve_for_purge(&resolver, config, client).await?;

    println!("✓ Configuration valid");
    if let Some(site) = config.site() {
        println!("  Site: {}", site);
    }
    println!("  Zone: {}", config.require_zone()?);

    Ok(())
}
