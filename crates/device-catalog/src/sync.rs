/// Status and body of a catalog response, before any interpretation.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// The request never produced a response (connection refused, timeout, ...).
#[derive(Debug, thiserror::Error)]
#[error("request failed: {0}")]
pub struct TransportError(pub String);

/// Errors that abort a sync run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("catalog API returned HTTP {status}")]
    Api { status: u16 },

    #[error("failed to parse catalog response: {0}")]
    Parse(String),

    #[error("sync failed: {0}")]
    Sync(String),
}

/// Fetches the raw device catalog from a remote endpoint.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Human-readable label identifying the endpoint.
    fn label(&self) -> &str;

    /// Issue a single request for the whole catalog.
    async fn fetch(&self) -> Result<RawResponse, TransportError>;
}
