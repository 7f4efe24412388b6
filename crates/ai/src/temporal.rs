//! Calendar features derived from a target instant.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Calendar features of one instant, evaluated on its UTC date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeFeatures {
    /// 1..=12
    pub month: u32,
    /// 0 = Sunday ..= 6 = Saturday
    pub day_of_week: u32,
    pub day_of_month: u32,
    /// ISO-8601 week number.
    pub week_of_year: u32,
    pub quarter: u32,
    pub year: i32,
    /// 1 on Saturday or Sunday, else 0.
    pub is_weekend: u32,
    /// 1-based ordinal day.
    pub day_of_year: u32,
}

pub fn extract_time_features(at: DateTime<Utc>) -> TimeFeatures {
    let date = at.date_naive();
    let weekday = date.weekday();

    TimeFeatures {
        month: date.month(),
        day_of_week: weekday.num_days_from_sunday(),
        day_of_month: date.day(),
        week_of_year: iso_week_number(date),
        quarter: (date.month() - 1) / 3 + 1,
        year: date.year(),
        is_weekend: u32::from(matches!(weekday, Weekday::Sat | Weekday::Sun)),
        day_of_year: date.ordinal(),
    }
}

/// ISO week via the Thursday rule: the week belongs to the year its
/// Thursday falls in, and counts from that year's first Thursday.
fn iso_week_number(date: NaiveDate) -> u32 {
    let offset = 3 - i64::from(date.weekday().num_days_from_monday());
    let thursday = date + Duration::days(offset);
    thursday.ordinal0() / 7 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn weekday_and_quarter() {
        // 2024-06-15 is a Saturday.
        let f = extract_time_features(utc(2024, 6, 15));
        assert_eq!(f.day_of_week, 6);
        assert_eq!(f.is_weekend, 1);
        assert_eq!(f.quarter, 2);
        assert_eq!(f.month, 6);
        assert_eq!(f.day_of_month, 15);
    }

    #[test]
    fn leap_day_ordinal() {
        let f = extract_time_features(utc(2024, 12, 31));
        assert_eq!(f.day_of_year, 366);
        let f = extract_time_features(utc(2023, 12, 31));
        assert_eq!(f.day_of_year, 365);
    }

    #[test]
    fn iso_week_crosses_year_boundaries() {
        // 2021-01-03 (Sunday) belongs to week 53 of 2020.
        assert_eq!(extract_time_features(utc(2021, 1, 3)).week_of_year, 53);
        // 2024-12-30 (Monday) belongs to week 1 of 2025.
        assert_eq!(extract_time_features(utc(2024, 12, 30)).week_of_year, 1);
        assert_eq!(extract_time_features(utc(2024, 1, 1)).week_of_year, 1);
    }

    #[test]
    fn uses_the_utc_date() {
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap();
        let f = extract_time_features(late);
        assert_eq!((f.month, f.day_of_month, f.day_of_week), (3, 1, 5));
    }

    proptest! {
        #[test]
        fn deterministic_and_weekend_flag_consistent(secs in 0i64..4_102_444_800) {
            let at = Utc.timestamp_opt(secs, 0).unwrap();
            let a = extract_time_features(at);
            let b = extract_time_features(at);
            prop_assert_eq!(a, b);
            prop_assert_eq!(a.is_weekend == 1, a.day_of_week == 0 || a.day_of_week == 6);
        }

        #[test]
        fn thursday_rule_agrees_with_iso_calendar(secs in 0i64..4_102_444_800) {
            let at = Utc.timestamp_opt(secs, 0).unwrap();
            prop_assert_eq!(
                extract_time_features(at).week_of_year,
                at.date_naive().iso_week().week()
            );
        }
    }
}
