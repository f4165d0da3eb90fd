use anyhow::Result;
use cf_purge_client::{CloudflareClient, Transport};

use super::{Context, resolve_for_purge};

/// Purge everything cached for the resolved zone
pub async fn run<T: Transport>(ctx: &Context, client: &CloudflareClient<T>) -> Result<()> {
    let (resolver, config) = ctx.load()?;
    let config = resolve_for_purge(&resolver, config, client).await?;

    let zone = config.require_zone()?;
    let credentials = config.credentials()?;

    match config.site() {
        Some(site) => println!("🧹 Purging Cloudflare cache for {} (zone {})...", site, zone),
        None => println!("🧹 Purging Cloudflare cache for zone {}...", zone),
    }

    client.purge_cache(zone, credentials).await?;

    println!("✅ Cache purged");
    Ok(())
}
