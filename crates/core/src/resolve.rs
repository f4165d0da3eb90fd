use crate::config::{ConfigPaths, load_config_file, read_marker};
use crate::error::{Error, Result};
use crate::types::{ConfigLayer, Configuration, Credentials, Field};
use async_trait::async_trait;
use tracing::{debug, info};

/// Something that can map a site name to its zone identifier
#[async_trait]
pub trait ZoneLookup {
    async fn lookup_zone(&self, site: &str, credentials: Credentials<'_>) -> Result<String>;
}

/// Configuration sources loaded for one invocation
#[derive(Debug, Clone)]
pub struct Resolver {
    paths: ConfigPaths,
    env: ConfigLayer,
    file: ConfigLayer,
    marker_site: Option<String>,
}

impl Resolver {
    /// Read the config file and marker file; `env` is the environment layer
    pub fn load(paths: ConfigPaths, env: ConfigLayer) -> Result<Self> {
        let file = load_config_file(&paths.config_file, paths.config_file_required)?;
        let marker_site = read_marker(&paths.marker_file)?;
        Ok(Self::from_layers(paths, env, file, marker_site))
    }

    pub fn from_layers(
        paths: ConfigPaths,
        env: ConfigLayer,
        file: ConfigLayer,
        marker_site: Option<String>,
    ) -> Self {
        Self {
            paths,
            env,
            file,
            marker_site,
        }
    }

    /// Merge all sources, lowest precedence first: environment, config
    /// file, marker file (site only), then command-line flags.
    pub fn resolve(&self, flags: &ConfigLayer) -> Configuration {
        let mut marker = ConfigLayer::default();
        if let Some(site) = &self.marker_site {
            marker.set(Field::Site, site.as_str());
        }

        let config = self
            .env
            .clone()
            .overlay(self.file.clone())
            .overlay(marker)
            .overlay(flags.clone())
            .into_configuration();

        debug!(?config, "resolved configuration");
        config
    }

    /// Ensure a site is set, reading the marker file once more if needed
    pub fn require_site(&self, config: Configuration) -> Result<Configuration> {
        if config.site().is_some() {
            return Ok(config);
        }

        match read_marker(&self.paths.marker_file)? {
            Some(site) => Ok(config.with_site(site)),
            None => Err(Error::MissingField(Field::Site)),
        }
    }

    /// Fill in the zone from the site name when none was configured.
    ///
    /// Returns the configuration untouched, without any lookup, when a
    /// zone is already present.
    pub async fn ensure_zone<L>(&self, config: Configuration, lookup: &L) -> Result<Configuration>
    where
        L: ZoneLookup + Sync + ?Sized,
    {
        if config.zone().is_some() {
            return Ok(config);
        }

        let config = self.require_site(config)?;
        let zone = {
            let site = config.site().ok_or(Error::MissingField(Field::Site))?;
            let credentials = config.credentials()?;
            info!(site, "looking up zone");
            lookup.lookup_zone(site, credentials).await?
        };

        Ok(config.with_zone(zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn layer(pairs: &[(Field, &str)]) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        for (field, value) in pairs {
            layer.set(*field, *value);
        }
        layer
    }

    struct FakeLookup {
        zone: &'static str,
        calls: Mutex<Vec<String>>,
    }

    impl FakeLookup {
        fn new(zone: &'static str) -> Self {
            Self {
                zone,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ZoneLookup for FakeLookup {
        async fn lookup_zone(&self, site: &str, credentials: Credentials<'_>) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}:{}:{}", site, credentials.email, credentials.api_key));
            Ok(self.zone.to_string())
        }
    }

    #[test]
    fn test_flags_beat_every_other_source() {
        let all = |v: &str| {
            layer(&[
                (Field::ApiKey, v),
                (Field::Email, v),
                (Field::Site, v),
                (Field::Zone, v),
            ])
        };
        let resolver = Resolver::from_layers(
            ConfigPaths::default(),
            all("env"),
            all("file"),
            Some("marker".to_string()),
        );

        let config = resolver.resolve(&all("flag"));
        assert_eq!(config.api_key(), Some("flag"));
        assert_eq!(config.email(), Some("flag"));
        assert_eq!(config.site(), Some("flag"));
        assert_eq!(config.zone(), Some("flag"));
    }

    #[test]
    fn test_resolver_debug_hides_api_keys() {
        let resolver = Resolver::from_layers(
            ConfigPaths::default(),
            layer(&[(Field::ApiKey, "env-secret-key")]),
            layer(&[(Field::ApiKey, "file-secret-key")]),
            None,
        );

        let debug = format!("{:?}", resolver);
        assert!(!debug.contains("env-secret-key"));
        assert!(!debug.contains("file-secret-key"));
    }

    #[test]
    fn test_marker_site_beats_config_file() {
        let resolver = Resolver::from_layers(
            ConfigPaths::default(),
            ConfigLayer::default(),
            layer(&[(Field::Site, "file.example.com")]),
            Some("marker.example.com".to_string()),
        );

        let config = resolver.resolve(&ConfigLayer::default());
        assert_eq!(config.site(), Some("marker.example.com"));
    }

    #[test]
    fn test_config_file_beats_environment() {
        let resolver = Resolver::from_layers(
            ConfigPaths::default(),
            layer(&[(Field::Email, "env@example.com"), (Field::ApiKey, "envkey")]),
            layer(&[(Field::Email, "file@example.com")]),
            None,
        );

        let config = resolver.resolve(&ConfigLayer::default());
        assert_eq!(config.email(), Some("file@example.com"));
        assert_eq!(config.api_key(), Some("envkey"));
    }

    #[test]
    fn test_load_reads_files_from_disk() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".cloudflare"),
            "CLOUDFLARE_API_KEY=k\nCLOUDFLARE_SITE=file.example.com\n",
        )
        .unwrap();
        fs::write(dir.path().join("CNAME"), "marker.example.com\n").unwrap();

        let resolver =
            Resolver::load(ConfigPaths::in_dir(dir.path()), ConfigLayer::default()).unwrap();
        let config = resolver.resolve(&layer(&[(Field::Email, "flag@example.com")]));

        assert_eq!(config.api_key(), Some("k"));
        assert_eq!(config.email(), Some("flag@example.com"));
        assert_eq!(config.site(), Some("marker.example.com"));
        assert_eq!(config.zone(), None);
    }

    #[test]
    fn test_require_site_rereads_marker() {
        let dir = TempDir::new().unwrap();
        let resolver =
            Resolver::load(ConfigPaths::in_dir(dir.path()), ConfigLayer::default()).unwrap();
        let config = resolver.resolve(&ConfigLayer::default());
        assert_eq!(config.site(), None);

        fs::write(dir.path().join("CNAME"), "late.example.com\n").unwrap();
        let config = resolver.require_site(config).unwrap();
        assert_eq!(config.site(), Some("late.example.com"));
    }

    #[test]
    fn test_require_site_fails_when_absent_everywhere() {
        let dir = TempDir::new().unwrap();
        let resolver =
            Resolver::load(ConfigPaths::in_dir(dir.path()), ConfigLayer::default()).unwrap();
        let config = resolver.resolve(&ConfigLayer::default());

        assert!(matches!(
            resolver.require_site(config),
            Err(Error::MissingField(Field::Site))
        ));
    }

    #[tokio::test]
    async fn test_ensure_zone_skips_lookup_when_zone_set() {
        let resolver = Resolver::from_layers(
            ConfigPaths::default(),
            ConfigLayer::default(),
            layer(&[(Field::Zone, "z1")]),
            None,
        );
        let lookup = FakeLookup::new("unused");

        let config = resolver
            .ensure_zone(resolver.resolve(&ConfigLayer::default()), &lookup)
            .await
            .unwrap();

        assert_eq!(config.zone(), Some("z1"));
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_zone_looks_up_by_site() {
        let resolver = Resolver::from_layers(
            ConfigPaths::default(),
            ConfigLayer::default(),
            layer(&[
                (Field::ApiKey, "k"),
                (Field::Email, "e"),
                (Field::Site, "example.com"),
            ]),
            None,
        );
        let lookup = FakeLookup::new("abc123");

        let config = resolver
            .ensure_zone(resolver.resolve(&ConfigLayer::default()), &lookup)
            .await
            .unwrap();

        assert_eq!(config.zone(), Some("abc123"));
        assert_eq!(config.site(), Some("example.com"));
        assert_eq!(lookup.calls(), vec!["example.com:e:k".to_string()]);
    }

    #[tokio::test]
    async fn test_ensure_zone_missing_credentials_never_calls_lookup() {
        let dir = TempDir::new().unwrap();
        let resolver = Resolver::from_layers(
            ConfigPaths::in_dir(dir.path()),
            ConfigLayer::default(),
            layer(&[(Field::Site, "example.com"), (Field::Email, "e")]),
            None,
        );
        let lookup = FakeLookup::new("abc123");

        let err = resolver
            .ensure_zone(resolver.resolve(&ConfigLayer::default()), &lookup)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingField(Field::ApiKey)));
        assert!(lookup.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_zone_missing_site_checked_first() {
        let dir = TempDir::new().unwrap();
        let resolver = Resolver::from_layers(
            ConfigPaths::in_dir(dir.path()),
            ConfigLayer::default(),
            ConfigLayer::default(),
            None,
        );
        let lookup = FakeLookup::new("abc123");

        let err = resolver
            .ensure_zone(resolver.resolve(&ConfigLayer::default()), &lookup)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MissingField(Field::Site)));
        assert!(lookup.calls().is_empty());
    }
}
