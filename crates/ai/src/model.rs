//! Versioned model artifacts produced by the offline training workflow.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Model family declared by an artifact.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    LinearRegression,
    RandomForest,
    Xgboost,
    Lstm,
    Prophet,
    Arima,
    Other,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::LinearRegression => "linear_regression",
            ModelType::RandomForest => "random_forest",
            ModelType::Xgboost => "xgboost",
            ModelType::Lstm => "lstm",
            ModelType::Prophet => "prophet",
            ModelType::Arima => "arima",
            ModelType::Other => "other",
        }
    }
}

impl core::fmt::Display for ModelType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-feature transform captured at training time, aligned by index with
/// the artifact's `features`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Scaler {
    Standard { mean: Vec<f64>, std: Vec<f64> },
    MinMax { min: Vec<f64>, max: Vec<f64> },
}

impl Scaler {
    /// Scale the value of the feature at `index`.
    ///
    /// Zero spread (`std == 0`, `max == min`) scales to 0.
    pub fn scale(&self, index: usize, x: f64) -> Result<f64, ForecastError> {
        match self {
            Scaler::Standard { mean, std } => {
                let (m, s) = aligned(mean, std, index, "mean", "std")?;
                Ok(if s == 0.0 { 0.0 } else { (x - m) / s })
            }
            Scaler::MinMax { min, max } => {
                let (lo, hi) = aligned(min, max, index, "min", "max")?;
                let range = hi - lo;
                Ok(if range == 0.0 { 0.0 } else { (x - lo) / range })
            }
        }
    }
}

fn aligned(
    a: &[f64],
    b: &[f64],
    index: usize,
    a_name: &str,
    b_name: &str,
) -> Result<(f64, f64), ForecastError> {
    match (a.get(index), b.get(index)) {
        (Some(x), Some(y)) => Ok((*x, *y)),
        _ => Err(ForecastError::invalid_artifact(format!(
            "scaler {a_name}/{b_name} arrays ({}/{}) do not cover feature index {index}",
            a.len(),
            b.len()
        ))),
    }
}

/// Parameters of a linear model.
///
/// `coefficients` defaults to empty so a submission that omits them is still
/// accepted and stored; evaluation rejects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    #[serde(default)]
    pub coefficients: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<Scaler>,
}

/// Family-specific part of an artifact, tagged by `modelType`.
///
/// Only linear models carry evaluation parameters; the other families are
/// accepted and stored but have no evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modelType", rename_all = "snake_case")]
pub enum ModelSpec {
    LinearRegression(LinearParams),
    RandomForest,
    Xgboost,
    Lstm,
    Prophet,
    Arima,
    Other,
}

impl ModelSpec {
    pub fn model_type(&self) -> ModelType {
        match self {
            ModelSpec::LinearRegression(_) => ModelType::LinearRegression,
            ModelSpec::RandomForest => ModelType::RandomForest,
            ModelSpec::Xgboost => ModelType::Xgboost,
            ModelSpec::Lstm => ModelType::Lstm,
            ModelSpec::Prophet => ModelType::Prophet,
            ModelSpec::Arima => ModelType::Arima,
            ModelSpec::Other => ModelType::Other,
        }
    }
}

/// Metric name → value (`mae`, `rmse`, `r2`, `mape`, ...).
pub type Accuracy = BTreeMap<String, f64>;

/// An immutable, externally trained model version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelArtifact {
    pub model_name: String,
    pub version: String,
    /// Order defines coefficient alignment.
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(flatten)]
    pub spec: ModelSpec,
    #[serde(default)]
    pub accuracy: Accuracy,
    pub training_date: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn model_type(&self) -> ModelType {
        self.spec.model_type()
    }

    /// `clamp(round(r2 * 100), 0, 100)` when the artifact reports `r2`.
    pub fn confidence(&self) -> Option<u8> {
        let r2 = self.accuracy.get("r2")?;
        Some((r2 * 100.0).round().clamp(0.0, 100.0) as u8)
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_type: self.model_type(),
            version: self.version.clone(),
            accuracy: self.accuracy.clone(),
        }
    }
}

/// Model summary attached to every prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub model_type: ModelType,
    pub version: String,
    pub accuracy: Accuracy,
}
