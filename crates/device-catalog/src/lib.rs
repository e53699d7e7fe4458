pub mod builder;
pub mod dedup;
pub mod device;
pub mod feedback;
pub mod gateway;
pub mod normalize;
pub mod parse;
pub mod persist;
pub mod pipeline;
pub mod sync;

pub use dedup::{Deduplicated, deduplicate};
pub use device::{DeviceEntity, DeviceId, ParsedDevice};
pub use feedback::Feedback;
pub use gateway::{DeviceFilter, DeviceGateway, GatewayError, WriteOutcome};
pub use parse::{RawApiRecord, parse_devices};
pub use persist::{CapacityRewrite, create_devices, rewrite_capacity};
pub use pipeline::{DEFAULT_PRICE, PipelineConfig, SyncPipeline, SyncReport, SyncStage};
pub use sync::{CatalogProvider, RawResponse, SyncError, TransportError};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
