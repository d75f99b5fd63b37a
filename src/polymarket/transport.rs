use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

pub const DATA_API_BASE: &str = "https://data-api.polymarket.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TransportError {
    /// The platform has none of the requested resource (HTTP 404).
    #[error("not found: {path}")]
    NotFound { path: String },

    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound { .. })
    }
}

/// Read-only JSON fetch capability the API client is built on.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` (relative to the transport's base) with query pairs.
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, TransportError>;
}

/// reqwest-backed transport with an optional bearer credential.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url, api_key))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, TransportError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter().copied());
        }
        Ok(url)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::with_client(Client::new(), DATA_API_BASE, None)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, TransportError> {
        let url = self.build_url(path, query)?;

        let mut req = self.http.get(url);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound { path: path.into() });
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                path: path.into(),
            });
        }

        let body: Value = resp.json().await?;
        Ok(body)
    }
}
