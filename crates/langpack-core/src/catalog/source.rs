//! Catalog transport.

use crate::config::NetworkConfig;
use crate::error::{LangpackError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Fetches the raw catalog document.
///
/// Implement this to serve the catalog from somewhere other than HTTP, or to
/// stub the network in tests.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the body found at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Plain HTTP GET via `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: Client,
}

impl HttpCatalogSource {
    /// Create a source with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(NetworkConfig::REQUEST_TIMEOUT)
    }

    /// Create a source with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(NetworkConfig::USER_AGENT)
            .build()
            .map_err(|e| LangpackError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(|e| {
            LangpackError::Network {
                message: format!("Request to {} failed: {}", url, e),
                source: Some(e),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LangpackError::Network {
                message: format!("{} returned HTTP {}", url, status),
                source: None,
            });
        }

        let body = response.bytes().await.map_err(|e| LangpackError::Network {
            message: format!("Failed to read response from {}: {}", url, e),
            source: Some(e),
        })?;
        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}
