//! Named feature maps and the builder that assembles them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockcast_inventory::ItemKey;

use crate::encoding::{encode_batch, encode_category, encode_size, encode_type};
use crate::error::SourceError;
use crate::history::{DemandStats, HistoricalDemandAggregator, IssuanceSource};
use crate::temporal::extract_time_features;

/// Feature names in the order the builder declares them.
///
/// This is only the builder's ordering; a model's own `features` list decides
/// coefficient alignment.
pub const FEATURE_ORDER: [&str; 19] = [
    "month",
    "dayOfWeek",
    "dayOfMonth",
    "weekOfYear",
    "quarter",
    "year",
    "dayOfYear",
    "isWeekend",
    "category_encoded",
    "type_encoded",
    "size_encoded",
    "batch_encoded",
    "movingAverage7d",
    "movingAverage30d",
    "demand_lag1",
    "demand_lag7",
    "demand_lag30",
    "totalDemand",
    "isAccessory",
];

/// Feature name → value. Lookups of absent names read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(BTreeMap<String, f64>);

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of `name`, defaulting to 0 when absent.
    pub fn value(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for FeatureVector {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Builder output: the map plus the declared key order (debug payload shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltFeatures {
    pub features: FeatureVector,
    pub feature_order: Vec<String>,
}

/// Compose encodings, calendar features and demand aggregates into one map.
///
/// Pure; the batch label falls back to the forecast date's year.
pub fn assemble_features(
    key: &ItemKey,
    forecast_date: DateTime<Utc>,
    batch: Option<&str>,
    stats: &DemandStats,
) -> BuiltFeatures {
    let time = extract_time_features(forecast_date);
    let size = key.size.as_deref();

    let values: [f64; 19] = [
        f64::from(time.month),
        f64::from(time.day_of_week),
        f64::from(time.day_of_month),
        f64::from(time.week_of_year),
        f64::from(time.quarter),
        f64::from(time.year),
        f64::from(time.day_of_year),
        f64::from(time.is_weekend),
        f64::from(encode_category(&key.category)),
        f64::from(encode_type(&key.item_type)),
        f64::from(encode_size(size)),
        f64::from(encode_batch(batch, time.year)),
        stats.moving_average_7d,
        stats.moving_average_30d,
        stats.demand_lag1 as f64,
        stats.demand_lag7 as f64,
        stats.demand_lag30 as f64,
        stats.total_demand as f64,
        if key.is_accessory() { 1.0 } else { 0.0 },
    ];

    BuiltFeatures {
        features: FEATURE_ORDER.iter().copied().zip(values).collect(),
        feature_order: FEATURE_ORDER.iter().map(|s| s.to_string()).collect(),
    }
}

/// Builds the feature vector for an (item-key, forecast date, batch) request.
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder<S> {
    aggregator: HistoricalDemandAggregator<S>,
}

impl<S: IssuanceSource> FeatureVectorBuilder<S> {
    pub fn new(aggregator: HistoricalDemandAggregator<S>) -> Self {
        Self { aggregator }
    }

    pub fn aggregator(&self) -> &HistoricalDemandAggregator<S> {
        &self.aggregator
    }

    /// `now` closes the history window; `forecast_date` drives the calendar
    /// features.
    pub async fn build(
        &self,
        key: &ItemKey,
        forecast_date: DateTime<Utc>,
        batch: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<BuiltFeatures, SourceError> {
        let history = self.aggregator.history(key, now).await?;
        Ok(assemble_features(key, forecast_date, batch, &history.stats()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 4, 8, 0, 0).unwrap()
    }

    #[test]
    fn every_declared_key_is_present() {
        let key = ItemKey::new("Uniform No 4", "BAJU_NO_4", Some("L"));
        let built = assemble_features(&key, date(), None, &DemandStats::default());
        assert_eq!(built.feature_order.len(), FEATURE_ORDER.len());
        for name in FEATURE_ORDER {
            assert!(built.features.contains(name), "missing {name}");
        }
        assert_eq!(built.features.len(), FEATURE_ORDER.len());
    }

    #[test]
    fn encodes_item_and_calendar() {
        let key = ItemKey::new("Uniform No 4", "BAJU_NO_4", Some("L"));
        let stats = DemandStats {
            total_demand: 12,
            moving_average_7d: 3.0,
            moving_average_30d: 2.0,
            demand_lag1: 4,
            demand_lag7: 1,
            demand_lag30: 0,
        };
        let f = assemble_features(&key, date(), Some("Batch 2022"), &stats).features;

        assert_eq!(f.value("category_encoded"), 1.0);
        assert_eq!(f.value("type_encoded"), 2.0);
        assert_eq!(f.value("size_encoded"), 3.0);
        assert_eq!(f.value("batch_encoded"), 2022.0);
        assert_eq!(f.value("isAccessory"), 0.0);
        assert_eq!(f.value("isWeekend"), 1.0);
        assert_eq!(f.value("year"), 2025.0);
        assert_eq!(f.value("totalDemand"), 12.0);
        assert_eq!(f.value("demand_lag1"), 4.0);
        assert_eq!(f.value("movingAverage7d"), 3.0);
    }

    #[test]
    fn accessory_and_batch_fallback() {
        let key = ItemKey::new("Others", "Belt", None::<String>);
        let f = assemble_features(&key, date(), None, &DemandStats::default()).features;
        assert_eq!(f.value("isAccessory"), 1.0);
        assert_eq!(f.value("size_encoded"), -1.0);
        assert_eq!(f.value("category_encoded"), -1.0);
        assert_eq!(f.value("batch_encoded"), 2025.0);
    }

    #[test]
    fn absent_features_read_as_zero() {
        let v = FeatureVector::new().with("a", 3.0);
        assert_eq!(v.value("a"), 3.0);
        assert_eq!(v.value("missing"), 0.0);
    }

    #[test]
    fn debug_payload_shape() {
        let key = ItemKey::new("Others", "Belt", None::<String>);
        let built = assemble_features(&key, date(), None, &DemandStats::default());
        let json = serde_json::to_value(&built).unwrap();
        assert!(json["features"]["month"].is_number());
        assert_eq!(json["featureOrder"][0], "month");
    }
}
