use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockcast_ai::{ForecastRequest, ModelArtifact, ModelType, Recommendation};
use stockcast_inventory::ItemKey;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRequestBody {
    pub item_category: String,
    pub item_type: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub forecast_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

impl ForecastRequestBody {
    pub fn to_request(&self) -> ForecastRequest {
        ForecastRequest {
            item: ItemKey::new(&self.item_category, &self.item_type, self.size.as_deref()),
            forecast_date: self.forecast_date,
            batch: self.batch.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemBody {
    pub item_category: String,
    pub item_type: String,
    #[serde(default)]
    pub size: Option<String>,
}

impl BatchItemBody {
    pub fn to_item_key(&self) -> ItemKey {
        ItemKey::new(&self.item_category, &self.item_type, self.size.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchForecastBody {
    pub items: Vec<BatchItemBody>,
    #[serde(default)]
    pub forecast_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub batch: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIssuanceBody {
    pub item_category: String,
    pub item_type: String,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: u32,
    /// Defaults to request time.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredModel {
    pub artifact_id: String,
    pub model_name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelVersionSummary {
    pub version: String,
    pub model_type: ModelType,
    pub training_date: DateTime<Utc>,
}

impl From<&ModelArtifact> for ModelVersionSummary {
    fn from(artifact: &ModelArtifact) -> Self {
        Self {
            version: artifact.version.clone(),
            model_type: artifact.model_type(),
            training_date: artifact.training_date,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchForecastResponse {
    pub recommendations: Vec<Recommendation>,
    pub count: usize,
}

impl From<Vec<Recommendation>> for BatchForecastResponse {
    fn from(recommendations: Vec<Recommendation>) -> Self {
        Self {
            count: recommendations.len(),
            recommendations,
        }
    }
}
