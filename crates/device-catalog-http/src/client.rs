use std::time::Duration;

use device_catalog::{CatalogProvider, RawResponse, TransportError};

/// Public catalog endpoint used when no other is configured.
pub const DEFAULT_ENDPOINT: &str = "https://api.restful-api.dev/objects";

/// Upper bound on the whole catalog request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Configuration for the REST catalog client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestCatalogConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for RestCatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP client that fetches the device catalog with a single GET.
///
/// This is a pure transport: it reports whatever status and body the server
/// returned and leaves interpretation to the sync pipeline.
pub struct RestCatalogClient {
    config: RestCatalogConfig,
    client: reqwest::Client,
}

impl RestCatalogClient {
    pub fn new(config: RestCatalogConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("device-sync")
            .build()
            .map_err(|e| TransportError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }
}

#[async_trait::async_trait]
impl CatalogProvider for RestCatalogClient {
    fn label(&self) -> &str {
        &self.config.endpoint
    }

    async fn fetch(&self) -> Result<RawResponse, TransportError> {
        tracing::debug!(endpoint = %self.config.endpoint, "fetching device catalog");

        let response = self
            .client
            .get(&self.config.endpoint)
            .send()
            .await
            .map_err(|e| TransportError(format!("GET {} failed: {e}", self.config.endpoint)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(format!("failed to read catalog body: {e}")))?;

        tracing::debug!(status, bytes = body.len(), "catalog response received");

        Ok(RawResponse { status, body })
    }
}
