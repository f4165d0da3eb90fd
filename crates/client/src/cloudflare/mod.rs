// Cloudflare API client: zone lookup and cache purge

use crate::settings::ApiSettings;
use crate::transport::{ApiRequest, HttpTransport, Transport};
use async_trait::async_trait;
use cf_purge_core::{Credentials, Error, Field, Result, ZoneLookup};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

const X_AUTH_EMAIL: &str = "x-auth-email";
const X_AUTH_KEY: &str = "x-auth-key";

/// Cloudflare API client
pub struct CloudflareClient<T = HttpTransport> {
    transport: T,
    settings: ApiSettings,
}

/// Cloudflare API response wrapper
#[derive(Debug, Deserialize)]
struct CloudflareResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<CloudflareError>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CloudflareError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Zone entry from the zone listing
#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

impl<T> CloudflareResponse<T> {
    fn error_summary(&self) -> String {
        match self.errors.first() {
            Some(error) => format!("{} (code {})", error.message, error.code),
            None => "request was not successful".to_string(),
        }
    }
}

impl CloudflareClient<HttpTransport> {
    /// Create a client that talks to the real API over HTTPS
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let transport = HttpTransport::new(settings.timeout)?;
        Ok(Self::with_transport(transport, settings))
    }
}

impl<T: Transport> CloudflareClient<T> {
    pub fn with_transport(transport: T, settings: ApiSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build an authenticated request against the API base URL
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        credentials: Credentials<'_>,
    ) -> Result<ApiRequest> {
        let raw = format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let url = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        }
        .map_err(|e| Error::InvalidValue(format!("API URL {}: {}", raw, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(X_AUTH_EMAIL, header_value(Field::Email, credentials.email, false)?);
        headers.insert(X_AUTH_KEY, header_value(Field::ApiKey, credentials.api_key, true)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(ApiRequest {
            method,
            url,
            headers,
            body: body.map(Value::to_string),
        })
    }

    /// Send a request and return the raw body text
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
        credentials: Credentials<'_>,
    ) -> Result<String> {
        let request = self.build_request(method, path, query, body, credentials)?;
        let response = self.transport.send(request).await?;
        debug!(status = %response.status, "cloudflare response");
        Ok(response.body)
    }

    /// Look up the id of the active zone registered under `site`
    pub async fn resolve_zone(&self, site: &str, credentials: Credentials<'_>) -> Result<String> {
        let query = [
            ("name", site),
            ("status", "active"),
            ("page", "1"),
            ("per_page", "20"),
            ("order", "status"),
            ("direction", "desc"),
            ("match", "all"),
        ];
        let body = self
            .execute(Method::GET, "zones", &query, None, credentials)
            .await?;

        let response: CloudflareResponse<Vec<Zone>> = parse(&body)?;
        if !response.success {
            return Err(Error::ApiError {
                message: response.error_summary(),
                body,
            });
        }

        let zone = response
            .result
            .and_then(|zones| zones.into_iter().find(|z| !z.id.trim().is_empty()));
        match zone {
            Some(zone) => {
                info!(site, zone = %zone.id, name = ?zone.name, "resolved zone");
                Ok(zone.id)
            }
            None => Err(Error::ZoneNotFound {
                site: site.to_string(),
                body,
            }),
        }
    }

    /// Purge all cached content for `zone`
    pub async fn purge_cache(&self, zone: &str, credentials: Credentials<'_>) -> Result<()> {
        let template = &self.settings.purge;
        let path = template.path_for(zone);
        let body = self
            .execute(
                template.method.clone(),
                &path,
                &[],
                Some(&template.body),
                credentials,
            )
            .await?;

        match serde_json::from_str::<CloudflareResponse<Value>>(&body) {
            Ok(response) if response.success => {
                info!(zone, "cache purged");
                Ok(())
            }
            _ => Err(Error::PurgeFailed {
                zone: zone.to_string(),
                body,
            }),
        }
    }
}

#[async_trait]
impl<T: Transport> ZoneLookup for CloudflareClient<T> {
    async fn lookup_zone(&self, site: &str, credentials: Credentials<'_>) -> Result<String> {
        self.resolve_zone(site, credentials).await
    }
}

fn parse<R: DeserializeOwned>(body: &str) -> Result<R> {
    serde_json::from_str(body).map_err(|e| Error::ApiError {
        message: format!("Unexpected response: {}", e),
        body: body.to_string(),
    })
}

fn header_value(field: Field, value: &str, sensitive: bool) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        Error::InvalidValue(format!(
            "{} contains characters not allowed in an HTTP header",
            field.describe()
        ))
    })?;
    header.set_sensitive(sensitive);
    Ok(header)
}
