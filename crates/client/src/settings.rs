use reqwest::Method;
use serde_json::{Value, json};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shape of the "purge everything" request.
///
/// Kept as data so the verb or path can change without touching callers.
#[derive(Debug, Clone, PartialEq)]
pub struct PurgeTemplate {
    pub method: Method,
    /// Path relative to the API base; `{zone}` is replaced by the zone id
    pub path: String,
    pub body: Value,
}

impl PurgeTemplate {
    pub fn path_for(&self, zone: &str) -> String {
        self.path.replace("{zone}", zone)
    }

    pub fn with_method(self, method: Method) -> Self {
        Self { method, ..self }
    }
}

impl Default for PurgeTemplate {
    fn default() -> Self {
        Self {
            method: Method::POST,
            path: "zones/{zone}/purge_cache".to_string(),
            body: json!({ "purge_everything": true }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub purge: PurgeTemplate,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            purge: PurgeTemplate::default(),
        }
    }
}
