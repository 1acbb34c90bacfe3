//! Remote configuration fetching.
//!
//! Only the URL named by the `config` query parameter is ever fetched. There is no
//! same-origin fallback fetch and no request timeout: a hung request keeps the session in
//! `resolving` until it fails or a user-supplied configuration replaces it.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::TransportError;

/// Fetches the raw text of a remote configuration.
#[async_trait]
pub trait ConfigFetcher: Send + Sync {
    /// Fetch `url`, returning the body text on a success status.
    async fn fetch(&self, url: &str) -> Result<String, TransportError>;
}

/// [`ConfigFetcher`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    /// Shared HTTP client.
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with a default client.
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                message: format!("failed to construct HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ConfigFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, TransportError> {
        debug!(url, "config_fetch_start");
        let response =
            self.client
                .get(url)
                .send()
                .await
                .map_err(|e| TransportError::Request {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(|e| TransportError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!(url, bytes = body.len(), "config_fetch_done");
        Ok(body)
    }
}
