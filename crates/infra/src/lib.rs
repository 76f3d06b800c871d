//! Infrastructure layer: configuration, collaborator adapters, change delivery.

pub mod config;
pub mod document_store;
pub mod external;
pub mod identity;
pub mod wiring;
pub mod workers;

#[cfg(test)]
mod integration_tests;

pub use config::{ConfigError, SyncConfig};
pub use wiring::{InMemoryPipeline, http_synchronizer};
