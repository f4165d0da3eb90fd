// Cloudflare API access for cache purging

pub mod cloudflare;
pub mod settings;
pub mod transport;

pub use cloudflare::CloudflareClient;
pub use settings::{ApiSettings, PurgeTemplate};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};

// Re-exported so callers don't need a direct reqwest dependency
pub use reqwest::{Method, StatusCode};
