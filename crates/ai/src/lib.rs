//! `stockcast-ai`
//!
//! **Responsibility:** demand forecasting for issued inventory.
//!
//! This crate stays storage-agnostic:
//! - Historical issuances and model artifacts arrive through the
//!   [`IssuanceSource`] and [`ModelRegistry`] ports; infra provides adapters.
//! - It never trains models, it only evaluates externally trained artifacts.
//! - It never mutates inventory state.
//!
//! Pipeline: [`FeatureVectorBuilder`] (encoders + calendar + demand history)
//! → [`ModelRegistry::latest`] → [`predictor::predict`] → [`PredictionResult`].

pub mod encoding;
pub mod error;
pub mod features;
pub mod forecast;
pub mod history;
pub mod model;
pub mod predictor;
pub mod registry;
pub mod temporal;

pub use error::{ForecastError, RegistryError, SourceError};
pub use features::{BuiltFeatures, FeatureVector, FeatureVectorBuilder, FEATURE_ORDER};
pub use forecast::{
    ForecastOrchestrator, ForecastRequest, PredictionResult, Recommendation, DEFAULT_MODEL_NAME,
};
pub use history::{
    DailyDemand, DemandHistory, DemandStats, HistoricalDemandAggregator, IssuanceSource,
    LookbackWindow, DEFAULT_LOOKBACK_DAYS,
};
pub use model::{Accuracy, LinearParams, ModelArtifact, ModelInfo, ModelSpec, ModelType, Scaler};
pub use predictor::{LinearPredictor, Predictor};
pub use registry::ModelRegistry;
pub use temporal::{extract_time_features, TimeFeatures};
