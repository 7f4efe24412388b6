use std::sync::RwLock;

use chrono::{DateTime, Utc};

use stockcast_ai::{IssuanceSource, SourceError};
use stockcast_inventory::IssuanceRecord;

use super::IssuanceLog;

/// In-memory issuance log.
///
/// Intended for tests/dev. Range reads are a linear scan.
#[derive(Debug, Default)]
pub struct InMemoryIssuanceLog {
    records: RwLock<Vec<IssuanceRecord>>,
}

impl InMemoryIssuanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = IssuanceRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl IssuanceSource for InMemoryIssuanceLog {
    async fn issuances_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<IssuanceRecord>, SourceError> {
        let records = self
            .records
            .read()
            .map_err(|_| SourceError::Unavailable("lock poisoned".to_string()))?;

        Ok(records
            .iter()
            .filter(|r| start <= r.occurred_at && r.occurred_at <= end)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl IssuanceLog for InMemoryIssuanceLog {
    async fn append(&self, record: IssuanceRecord) -> Result<(), SourceError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| SourceError::Unavailable("lock poisoned".to_string()))?;
        records.push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, day, 12, 0, 0).unwrap()
    }

    fn record(day: u32) -> IssuanceRecord {
        IssuanceRecord::new("Others", "Belt", None, 1, at(day)).unwrap()
    }

    #[tokio::test]
    async fn range_is_inclusive() {
        let log = InMemoryIssuanceLog::with_records([record(1), record(5), record(10)]);
        let found = log.issuances_between(at(5), at(10)).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn append_is_visible_to_reads() {
        let log = InMemoryIssuanceLog::new();
        assert!(log.is_empty());
        let r = record(3);
        log.append(r.clone()).await.unwrap();
        let found = log.issuances_between(at(1), at(30)).await.unwrap();
        assert_eq!(found, vec![r]);
        assert_eq!(log.len(), 1);
    }
}
