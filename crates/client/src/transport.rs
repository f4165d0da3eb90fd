use async_trait::async_trait;
use cf_purge_core::{Error, Result};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use std::time::Duration;
use tracing::debug;

/// A fully built API request, ready to go on the wire
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Raw response: status plus the untouched body text
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport with a per-request timeout
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cf-purge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout(self.timeout)
        } else {
            Error::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        debug!(%status, bytes = body.len(), "received response");
        Ok(ApiResponse { status, body })
    }
}
