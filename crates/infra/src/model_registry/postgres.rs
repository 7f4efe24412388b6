//! Postgres-backed model registry.
//!
//! Artifacts are stored whole as JSONB next to the columns needed to select
//! them. Rows are only ever inserted.

use std::sync::Arc;

use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::{info, instrument};

use stockcast_ai::registry::validate_submission;
use stockcast_ai::{ModelArtifact, ModelRegistry, RegistryError};
use stockcast_core::ArtifactId;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS model_artifacts (
    artifact_id   UUID PRIMARY KEY,
    model_name    TEXT NOT NULL,
    version       TEXT NOT NULL,
    model_type    TEXT NOT NULL,
    training_date TIMESTAMPTZ NOT NULL,
    registered_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    artifact      JSONB NOT NULL
);
CREATE INDEX IF NOT EXISTS model_artifacts_latest_idx
    ON model_artifacts (model_name, training_date DESC, artifact_id DESC);
"#;

#[derive(Debug, Clone)]
pub struct PostgresModelRegistry {
    pool: Arc<PgPool>,
}

impl PostgresModelRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the table and index if missing.
    pub async fn migrate(&self) -> Result<(), RegistryError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ModelRegistry for PostgresModelRegistry {
    #[instrument(
        skip(self, artifact),
        fields(model = %artifact.model_name, version = %artifact.version),
        err
    )]
    async fn register(&self, artifact: ModelArtifact) -> Result<ArtifactId, RegistryError> {
        validate_submission(&artifact)?;

        // UUIDv7 ids break training-date ties in registration order.
        let id = ArtifactId::new();
        sqlx::query(
            r#"
            INSERT INTO model_artifacts (
                artifact_id,
                model_name,
                version,
                model_type,
                training_date,
                artifact
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id.as_uuid())
        .bind(&artifact.model_name)
        .bind(&artifact.version)
        .bind(artifact.model_type().as_str())
        .bind(artifact.training_date)
        .bind(Json(&artifact))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("register", e))?;

        info!(artifact_id = %id, "model artifact registered");
        Ok(id)
    }

    #[instrument(skip(self), err)]
    async fn latest(&self, model_name: &str) -> Result<Option<ModelArtifact>, RegistryError> {
        let row = sqlx::query(
            r#"
            SELECT artifact
            FROM model_artifacts
            WHERE model_name = $1
            ORDER BY training_date DESC, artifact_id DESC
            LIMIT 1
            "#,
        )
        .bind(model_name)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("latest", e))?;

        row.map(|r| decode_artifact(&r)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn versions(&self, model_name: &str) -> Result<Vec<ModelArtifact>, RegistryError> {
        let rows = sqlx::query(
            r#"
            SELECT artifact
            FROM model_artifacts
            WHERE model_name = $1
            ORDER BY training_date DESC, artifact_id DESC
            "#,
        )
        .bind(model_name)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("versions", e))?;

        rows.iter().map(decode_artifact).collect()
    }
}

fn decode_artifact(row: &sqlx::postgres::PgRow) -> Result<ModelArtifact, RegistryError> {
    let Json(artifact) = row
        .try_get::<Json<ModelArtifact>, _>("artifact")
        .map_err(|e| RegistryError::Storage(format!("failed to decode artifact row: {e}")))?;
    Ok(artifact)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RegistryError {
    match err {
        sqlx::Error::Database(db_err) => RegistryError::Storage(format!(
            "database error in {operation}: {}",
            db_err.message()
        )),
        sqlx::Error::PoolClosed => {
            RegistryError::Storage(format!("connection pool closed in {operation}"))
        }
        other => RegistryError::Storage(format!("sqlx error in {operation}: {other}")),
    }
}
