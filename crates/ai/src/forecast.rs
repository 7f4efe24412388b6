//! Request/response unit tying features, registry and predictor together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use stockcast_inventory::ItemKey;

use crate::error::ForecastError;
use crate::features::{BuiltFeatures, FeatureVectorBuilder};
use crate::history::IssuanceSource;
use crate::model::{ModelArtifact, ModelInfo};
use crate::predictor;
use crate::registry::ModelRegistry;

/// Model consulted when a request does not name one.
pub const DEFAULT_MODEL_NAME: &str = "uniform_forecast";

/// Safety buffer applied on top of predicted demand.
pub const STOCK_BUFFER: f64 = 1.15;

/// Floor for the recommended stock level.
pub const MIN_RECOMMENDED_STOCK: u64 = 2;

/// `max(round(predicted * 1.15), 2)`, with halves rounded to even.
pub fn recommended_stock(predicted_demand: u64) -> u64 {
    let buffered = (predicted_demand as f64 * STOCK_BUFFER).round_ties_even() as u64;
    buffered.max(MIN_RECOMMENDED_STOCK)
}

/// One item to forecast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    pub item: ItemKey,
    /// Defaults to the request's `now`.
    pub forecast_date: Option<DateTime<Utc>>,
    pub batch: Option<String>,
}

impl ForecastRequest {
    pub fn new(item: ItemKey) -> Self {
        Self {
            item,
            forecast_date: None,
            batch: None,
        }
    }

    pub fn with_forecast_date(mut self, at: DateTime<Utc>) -> Self {
        self.forecast_date = Some(at);
        self
    }

    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = Some(batch.into());
        self
    }
}

/// Forecast response payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub predicted_demand: u64,
    /// 0..=100, present only when the model reports `r2`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    pub recommended_stock: u64,
    pub model_info: ModelInfo,
}

/// Per-item line of a batch forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub size: Option<String>,
    pub forecasted_demand: u64,
    pub recommended_stock: u64,
}

/// Forecast pipeline: features → latest model → prediction + confidence.
///
/// Holds no per-request state; concurrent calls share nothing mutable.
#[derive(Debug, Clone)]
pub struct ForecastOrchestrator<S, R> {
    builder: FeatureVectorBuilder<S>,
    registry: R,
    default_model: String,
}

impl<S, R> ForecastOrchestrator<S, R>
where
    S: IssuanceSource,
    R: ModelRegistry,
{
    pub fn new(builder: FeatureVectorBuilder<S>, registry: R) -> Self {
        Self {
            builder,
            registry,
            default_model: DEFAULT_MODEL_NAME.to_string(),
        }
    }

    pub fn with_default_model(mut self, model_name: impl Into<String>) -> Self {
        self.default_model = model_name.into();
        self
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Feature map for a request, without evaluating any model.
    pub async fn features(
        &self,
        request: &ForecastRequest,
        now: DateTime<Utc>,
    ) -> Result<BuiltFeatures, ForecastError> {
        let forecast_date = request.forecast_date.unwrap_or(now);
        let built = self
            .builder
            .build(&request.item, forecast_date, request.batch.as_deref(), now)
            .await?;
        Ok(built)
    }

    /// Latest artifact for `model_name`, or `ModelNotFound`.
    pub async fn resolve_model(&self, model_name: &str) -> Result<ModelArtifact, ForecastError> {
        match self.registry.latest(model_name).await? {
            Some(model) => {
                debug!(model = model_name, version = %model.version, "resolved model");
                Ok(model)
            }
            None => {
                warn!(model = model_name, "no model registered");
                Err(ForecastError::ModelNotFound(model_name.to_string()))
            }
        }
    }

    pub async fn forecast(
        &self,
        request: &ForecastRequest,
        model_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PredictionResult, ForecastError> {
        let model_name = model_name.unwrap_or(self.default_model.as_str());

        let built = self.features(request, now).await?;
        let model = self.resolve_model(model_name).await?;
        let result = evaluate(&built, &model)?;

        info!(
            item = %request.item,
            model = model_name,
            version = %model.version,
            predicted = result.predicted_demand,
            confidence = ?result.confidence,
            "forecast computed"
        );

        Ok(result)
    }

    /// Forecast several items against one resolved model version.
    ///
    /// The first failure aborts the whole batch.
    pub async fn forecast_many(
        &self,
        items: &[ItemKey],
        forecast_date: Option<DateTime<Utc>>,
        batch: Option<&str>,
        model_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Recommendation>, ForecastError> {
        let model_name = model_name.unwrap_or(self.default_model.as_str());
        let model = self.resolve_model(model_name).await?;
        let forecast_date = forecast_date.unwrap_or(now);

        let mut recommendations = Vec::with_capacity(items.len());
        for item in items {
            let built = self.builder.build(item, forecast_date, batch, now).await?;
            let predicted = predictor::predict(&built.features, &model)?;
            recommendations.push(Recommendation {
                category: item.category.clone(),
                item_type: item.item_type.clone(),
                size: item.size.clone(),
                forecasted_demand: predicted,
                recommended_stock: recommended_stock(predicted),
            });
        }

        info!(
            model = model_name,
            version = %model.version,
            items = recommendations.len(),
            "batch forecast computed"
        );

        Ok(recommendations)
    }
}

/// Evaluate a model against built features and attach model metadata.
pub fn evaluate(
    built: &BuiltFeatures,
    model: &ModelArtifact,
) -> Result<PredictionResult, ForecastError> {
    let predicted_demand = predictor::predict(&built.features, model)?;
    Ok(PredictionResult {
        predicted_demand,
        confidence: model.confidence(),
        recommended_stock: recommended_stock(predicted_demand),
        model_info: model.info(),
    })
}
