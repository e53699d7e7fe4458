pub mod client;

pub use client::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, RestCatalogClient, RestCatalogConfig};
