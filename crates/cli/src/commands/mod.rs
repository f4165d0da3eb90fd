pub mod config;
pub mod purge;
pub mod validate;
pub mod zone;

use anyhow::{Context as _, Result};
use cf_purge_client::{CloudflareClient, Transport};
use cf_purge_core::{ConfigLayer, ConfigPaths, Configuration, Resolver};

/// Everything a command needs besides the API client
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub paths: ConfigPaths,
    /// Credentials exported in the process environment; lowest precedence
    pub env: ConfigLayer,
    /// Values given on the command line; highest precedence
    pub flags: ConfigLayer,
}

impl Context {
    /// Load every configuration source and merge them with the flags
    pub fn load(&self) -> Result<(Resolver, Configuration)> {
        let resolver = Resolver::load(self.paths.clone(), self.env.clone())
            .context("Failed to load configuration")?;
        let config = resolver.resolve(&self.flags);
        Ok((resolver, config))
    }
}

/// Resolve and check everything a purge needs: credentials plus a zone,
/// looked up from the site when not configured.
pub async fn resolve_for_purge<T: Transport>(
    resolver: &Resolver,
    config: Configuration,
    client: &CloudflareClient<T>,
) -> Result<Configuration> {
    let config = resolver.ensure_zone(config, client).await?;
    config.credentials()?;
    config.require_zone()?;
    Ok(config)
}
