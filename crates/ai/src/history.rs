//! Daily demand history for one item-key and the aggregates derived from it.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use stockcast_inventory::{IssuanceRecord, ItemKey};

use crate::error::SourceError;

/// Default lookback for prediction requests.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 60;

/// Read access to historical issuances.
///
/// Implementations may return records outside the requested range or for
/// other item-keys; the aggregator filters again.
#[async_trait::async_trait]
pub trait IssuanceSource: Send + Sync {
    async fn issuances_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<IssuanceRecord>, SourceError>;
}

#[async_trait::async_trait]
impl<S> IssuanceSource for Arc<S>
where
    S: IssuanceSource + ?Sized,
{
    async fn issuances_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<IssuanceRecord>, SourceError> {
        (**self).issuances_between(start, end).await
    }
}

/// Closed time range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl LookbackWindow {
    /// Window of `days` ending at `end`; saturates at the earliest
    /// representable instant.
    pub fn ending_at(end: DateTime<Utc>, days: u32) -> Self {
        Self {
            start: end
                .checked_sub_signed(Duration::days(i64::from(days)))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
            end,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Total quantity issued on one UTC calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDemand {
    pub day: NaiveDate,
    pub quantity: u64,
}

/// Chronologically sorted daily totals. Days without issuances are absent,
/// not zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemandHistory {
    days: Vec<DailyDemand>,
}

impl DemandHistory {
    /// Bucket matching records inside `window` by UTC day, summing same-day
    /// quantities.
    pub fn from_records<'a, I>(key: &ItemKey, records: I, window: LookbackWindow) -> Self
    where
        I: IntoIterator<Item = &'a IssuanceRecord>,
    {
        let mut buckets: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for record in records {
            if !window.contains(record.occurred_at) || !key.matches(record) {
                continue;
            }
            *buckets.entry(record.occurred_at.date_naive()).or_default() +=
                u64::from(record.quantity);
        }

        Self {
            days: buckets
                .into_iter()
                .map(|(day, quantity)| DailyDemand { day, quantity })
                .collect(),
        }
    }

    pub fn days(&self) -> &[DailyDemand] {
        &self.days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn stats(&self) -> DemandStats {
        DemandStats {
            total_demand: self.days.iter().map(|d| d.quantity).sum(),
            moving_average_7d: mean(self.tail(7)),
            // Average over every day in the window, not a trailing 30 entries.
            moving_average_30d: mean(&self.days),
            demand_lag1: self.lag(1),
            demand_lag7: self.lag(7),
            demand_lag30: self.lag(30),
        }
    }

    fn tail(&self, n: usize) -> &[DailyDemand] {
        &self.days[self.days.len().saturating_sub(n)..]
    }

    /// Quantity at position `len - n`, or 0 when the history is shorter than `n`.
    fn lag(&self, n: usize) -> u64 {
        if n == 0 || self.days.len() < n {
            return 0;
        }
        self.days[self.days.len() - n].quantity
    }
}

/// Aggregates fed to the model as features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemandStats {
    pub total_demand: u64,
    pub moving_average_7d: f64,
    pub moving_average_30d: f64,
    pub demand_lag1: u64,
    pub demand_lag7: u64,
    pub demand_lag30: u64,
}

fn mean(days: &[DailyDemand]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    days.iter().map(|d| d.quantity as f64).sum::<f64>() / (days.len() as f64)
}

/// Reads issuances for a lookback window and reduces them to a
/// [`DemandHistory`]. Recomputed on every request.
#[derive(Debug, Clone)]
pub struct HistoricalDemandAggregator<S> {
    source: S,
    lookback_days: u32,
}

impl<S: IssuanceSource> HistoricalDemandAggregator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    pub async fn history(
        &self,
        key: &ItemKey,
        now: DateTime<Utc>,
    ) -> Result<DemandHistory, SourceError> {
        let window = LookbackWindow::ending_at(now, self.lookback_days);
        let records = self.source.issuances_between(window.start, window.end).await?;
        let history = DemandHistory::from_records(key, &records, window);

        debug!(
            item = %key,
            scanned = records.len(),
            days = history.len(),
            lookback_days = self.lookback_days,
            "aggregated demand history"
        );

        Ok(history)
    }
}
