mod schema;
pub mod store;

pub use store::{DeviceStore, StoreError};
