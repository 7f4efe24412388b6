use thiserror::Error;

use crate::model::ModelType;

/// Failure reading historical issuances.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("issuance store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed issuance row: {0}")]
    Malformed(String),
}

/// Failure storing or loading model artifacts.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The submission itself is unusable (empty name/version).
    #[error("invalid artifact submission: {0}")]
    InvalidSubmission(String),

    #[error("registry storage error: {0}")]
    Storage(String),
}

/// Errors surfaced by the forecasting pipeline.
///
/// Only model-shape and lookup problems are errors here. Unencodable
/// categorical values and missing features are not: encoders fall back to
/// sentinels and absent features read as zero.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("no model registered under '{0}'")]
    ModelNotFound(String),

    #[error("invalid model artifact: {0}")]
    InvalidModelArtifact(String),

    #[error("unsupported model type: {0}")]
    UnsupportedModelType(ModelType),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ForecastError {
    pub fn invalid_artifact(msg: impl Into<String>) -> Self {
        Self::InvalidModelArtifact(msg.into())
    }
}
