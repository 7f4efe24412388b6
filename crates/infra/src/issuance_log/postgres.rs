//! Postgres-backed issuance log.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::{instrument, Span};

use stockcast_ai::{IssuanceSource, SourceError};
use stockcast_core::IssuanceId;
use stockcast_inventory::IssuanceRecord;

use super::IssuanceLog;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS issuances (
    issuance_id   UUID PRIMARY KEY,
    item_category TEXT NOT NULL,
    item_type     TEXT NOT NULL,
    size          TEXT NULL,
    quantity      INTEGER NOT NULL CHECK (quantity >= 0),
    occurred_at   TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS issuances_occurred_at_idx ON issuances (occurred_at);
"#;

/// Issuance log stored in the `issuances` table.
///
/// Range reads hit the `occurred_at` index; item-key filtering is left to the
/// aggregator.
#[derive(Debug, Clone)]
pub struct PostgresIssuanceLog {
    pool: Arc<PgPool>,
}

impl PostgresIssuanceLog {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the table and index if missing.
    pub async fn migrate(&self) -> Result<(), SourceError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl IssuanceSource for PostgresIssuanceLog {
    #[instrument(skip(self), fields(rows = tracing::field::Empty), err)]
    async fn issuances_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<IssuanceRecord>, SourceError> {
        let rows = sqlx::query(
            r#"
            SELECT
                issuance_id,
                item_category,
                item_type,
                size,
                quantity,
                occurred_at
            FROM issuances
            WHERE occurred_at BETWEEN $1 AND $2
            ORDER BY occurred_at ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("issuances_between", e))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let quantity: i32 = row.try_get("quantity").map_err(malformed)?;
            records.push(IssuanceRecord {
                id: IssuanceId::from_uuid(row.try_get("issuance_id").map_err(malformed)?),
                item_category: row.try_get("item_category").map_err(malformed)?,
                item_type: row.try_get("item_type").map_err(malformed)?,
                size: row.try_get("size").map_err(malformed)?,
                quantity: u32::try_from(quantity)
                    .map_err(|_| SourceError::Malformed(format!("negative quantity {quantity}")))?,
                occurred_at: row.try_get("occurred_at").map_err(malformed)?,
            });
        }

        Span::current().record("rows", records.len());
        Ok(records)
    }
}

#[async_trait::async_trait]
impl IssuanceLog for PostgresIssuanceLog {
    #[instrument(skip(self, record), fields(issuance_id = %record.id), err)]
    async fn append(&self, record: IssuanceRecord) -> Result<(), SourceError> {
        let quantity = i32::try_from(record.quantity).map_err(|_| {
            SourceError::Malformed(format!("quantity {} too large", record.quantity))
        })?;

        sqlx::query(
            r#"
            INSERT INTO issuances (
                issuance_id,
                item_category,
                item_type,
                size,
                quantity,
                occurred_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(&record.item_category)
        .bind(&record.item_type)
        .bind(&record.size)
        .bind(quantity)
        .bind(record.occurred_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("append", e))?;

        Ok(())
    }
}

fn malformed(err: sqlx::Error) -> SourceError {
    SourceError::Malformed(err.to_string())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> SourceError {
    match err {
        sqlx::Error::Database(db_err) => SourceError::Unavailable(format!(
            "database error in {operation}: {}",
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            SourceError::Unavailable(format!("connection pool closed in {operation}"))
        }
        other => SourceError::Unavailable(format!("sqlx error in {operation}: {other}")),
    }
}
