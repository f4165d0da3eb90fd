use anyhow::Result;
use cf_purge_client::{CloudflareClient, Transport};
use cf_purge_core::Configuration;

use super::{Context, resolve_for_purge};

/// Show the resolved configuration, after the same checks `purge` runs
pub async fn run<T: Transport>(ctx: &Context, client: &CloudflareClient<T>) -> Result<()> {
    let (resolver, config) = ctx.load()?;
    let config = resolve_for_purge(&resolver, config, client).await?;

    print!("{}", render(&config));
    Ok(())
}

fn render(config: &Configuration) -> String {
    let mut out = String::new();
    let mut line = |label: &str, value: Option<&str>| {
        if let Some(value) = value {
            out.push_str(&format!("{:<8} {}\n", label, value));
        }
    };

    line("API key:", config.api_key());
    line("Email:", config.email());
    line("Zone:", config.zone());
    line("Site:", config.site());
    out
}
