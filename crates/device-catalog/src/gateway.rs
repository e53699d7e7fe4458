use std::collections::HashSet;
use std::sync::Arc;

use crate::device::{DeviceEntity, DeviceId};

/// Errors that fail a whole gateway call (as opposed to a single row).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("gateway returned {actual} results for {expected} records")]
    ResultCountMismatch { expected: usize, actual: usize },
}

/// Which persisted devices a `find` should return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFilter {
    All,
    CapacityEquals(String),
}

impl DeviceFilter {
    pub fn matches(&self, device: &DeviceEntity) -> bool {
        match self {
            Self::All => true,
            Self::CapacityEquals(capacity) => device.capacity.as_deref() == Some(capacity),
        }
    }
}

/// Result of writing one row in a bulk create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Success(DeviceId),
    Failure(String),
}

impl WriteOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Access to the persistent device store.
///
/// Bulk writes never abort on a single bad row: they return one
/// `WriteOutcome` per input, in input order.
#[async_trait::async_trait]
pub trait DeviceGateway: Send + Sync {
    /// Distinct names of all persisted devices.
    async fn existing_names(&self) -> Result<HashSet<String>, GatewayError>;

    /// Persisted devices matching `filter`.
    async fn find(&self, filter: &DeviceFilter) -> Result<Vec<DeviceEntity>, GatewayError>;

    /// Insert new devices. `id` on the inputs is ignored.
    async fn create_many(&self, devices: &[DeviceEntity]) -> Result<Vec<WriteOutcome>, GatewayError>;

    /// Update persisted devices by `id`. Rows without an id fail individually.
    async fn update_many(&self, devices: &[DeviceEntity]) -> Result<Vec<WriteOutcome>, GatewayError>;
}

#[async_trait::async_trait]
impl<T: DeviceGateway + ?Sized> DeviceGateway for Arc<T> {
    async fn existing_names(&self) -> Result<HashSet<String>, GatewayError> {
        (**self).existing_names().await
    }

    async fn find(&self, filter: &DeviceFilter) -> Result<Vec<DeviceEntity>, GatewayError> {
        (**self).find(filter).await
    }

    async fn create_many(&self, devices: &[DeviceEntity]) -> Result<Vec<WriteOutcome>, GatewayError> {
        (**self).create_many(devices).await
    }

    async fn update_many(&self, devices: &[DeviceEntity]) -> Result<Vec<WriteOutcome>, GatewayError> {
        (**self).update_many(devices).await
    }
}
