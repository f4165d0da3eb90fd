use crate::error::{Error, Result};
use crate::types::{ConfigLayer, Field};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = ".cloudflare";

/// Default marker file holding the site's domain name
pub const DEFAULT_MARKER_FILE: &str = "CNAME";

/// Location of the on-disk configuration sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_file: PathBuf,
    /// Set when the user named the config file; it must then exist
    pub config_file_required: bool,
    pub marker_file: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            config_file_required: false,
            marker_file: PathBuf::from(DEFAULT_MARKER_FILE),
        }
    }
}

impl ConfigPaths {
    /// Resolve the default file names against `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            config_file: dir.join(DEFAULT_CONFIG_FILE),
            config_file_required: false,
            marker_file: dir.join(DEFAULT_MARKER_FILE),
        }
    }

    pub fn with_config_file(mut self, path: PathBuf) -> Self {
        self.config_file = path;
        self.config_file_required = true;
        self
    }

    pub fn with_marker_file(mut self, path: PathBuf) -> Self {
        self.marker_file = path;
        self
    }
}

/// Parse `KEY=VALUE` config file contents (useful for testing)
pub fn parse_config_str(content: &str) -> Result<ConfigLayer> {
    let mut layer = ConfigLayer::default();

    for item in dotenvy::from_read_iter(content.as_bytes()) {
        let (key, value) = item?;
        match Field::from_key(&key) {
            Some(field) => layer.set(field, value),
            None => debug!(key = %key, "ignoring unknown config key"),
        }
    }

    Ok(layer)
}

/// Load the config file at `path`.
///
/// A missing file yields an empty layer unless `required` is set.
pub fn load_config_file(path: &Path, required: bool) -> Result<ConfigLayer> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            if required {
                return Err(Error::ConfigFileNotFound(path.to_path_buf()));
            }
            debug!(path = %path.display(), "no config file");
            return Ok(ConfigLayer::default());
        }
        Err(err) => return Err(err.into()),
    };

    debug!(path = %path.display(), "loaded config file");
    parse_config_str(&content)
}

/// Read the site name from a marker file: its first non-blank line
pub fn read_marker(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let site = content
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(str::to_string);
            debug!(path = %path.display(), site = ?site, "read marker file");
            Ok(site)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Lowest-precedence layer: credentials already exported in the environment
pub fn env_layer<F>(lookup: F) -> ConfigLayer
where
    F: Fn(&str) -> Option<String>,
{
    let mut layer = ConfigLayer::default();
    for field in [Field::Email, Field::ApiKey] {
        if let Some(value) = lookup(field.key()) {
            layer.set(field, value);
        }
    }
    layer
}
