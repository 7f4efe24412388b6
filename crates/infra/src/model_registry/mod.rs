//! Model artifact storage.
//!
//! Every adapter is append-only: a registered version is never updated or
//! removed. Selection of the latest version follows
//! [`stockcast_ai::registry::select_latest`].

pub mod cached;
pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use cached::CachedModelRegistry;
pub use in_memory::InMemoryModelRegistry;
#[cfg(feature = "postgres")]
pub use postgres::PostgresModelRegistry;
