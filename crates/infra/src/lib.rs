//! Infrastructure layer: storage adapters and configuration.

pub mod config;
pub mod issuance_log;
pub mod model_registry;

pub use config::{ConfigError, ServiceConfig};
pub use issuance_log::{InMemoryIssuanceLog, IssuanceLog};
pub use model_registry::{CachedModelRegistry, InMemoryModelRegistry};
