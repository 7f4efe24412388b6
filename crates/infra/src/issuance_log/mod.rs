//! Historical issuance storage boundary.
//!
//! Forecasting only reads through [`IssuanceSource`]; appends come from the
//! inventory side and are never coordinated with readers.

use stockcast_ai::{IssuanceSource, SourceError};
use stockcast_inventory::IssuanceRecord;

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryIssuanceLog;
#[cfg(feature = "postgres")]
pub use postgres::PostgresIssuanceLog;

/// Append + range-read access to issuance records.
#[async_trait::async_trait]
pub trait IssuanceLog: IssuanceSource {
    async fn append(&self, record: IssuanceRecord) -> Result<(), SourceError>;
}

#[async_trait::async_trait]
impl<L> IssuanceLog for std::sync::Arc<L>
where
    L: IssuanceLog + ?Sized,
{
    async fn append(&self, record: IssuanceRecord) -> Result<(), SourceError> {
        (**self).append(record).await
    }
}
