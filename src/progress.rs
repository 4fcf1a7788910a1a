//! Progress aggregation
//!
//! Reduces stored trial history into the summary cards and the per-day
//! precision chart of the progress view.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::rounded_mean;
use crate::sim::TrialRecord;

/// Maximum number of days plotted
pub const MAX_CHART_DAYS: usize = 10;

/// Mean precision for one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyPrecision {
    pub date: NaiveDate,
    pub precision: u32,
    pub trials: u32,
}

/// Summary of a user's history
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressReport {
    pub total_trials: usize,
    /// Fastest response (0 when there is no history)
    pub best_response_ms: u32,
    /// Mean precision over all trials
    pub overall_precision: u32,
    /// Most recent days, oldest first
    pub daily: Vec<DailyPrecision>,
}

impl ProgressReport {
    /// Build the report; days are cut at local midnight for `offset`
    pub fn from_history(records: &[TrialRecord], offset: FixedOffset) -> Self {
        let mut days: BTreeMap<NaiveDate, (u64, u32)> = BTreeMap::new();
        for record in records {
            let Some(date) = local_date(record.id, offset) else {
                log::warn!("Skipping record with invalid timestamp {}", record.id);
                continue;
            };
            let entry = days.entry(date).or_default();
            entry.0 += record.precision as u64;
            entry.1 += 1;
        }

        let skip = days.len().saturating_sub(MAX_CHART_DAYS);
        let daily = days
            .into_iter()
            .skip(skip)
            .map(|(date, (sum, count))| DailyPrecision {
                date,
                precision: (sum as f64 / count as f64).round() as u32,
                trials: count,
            })
            .collect();

        Self {
            total_trials: records.len(),
            best_response_ms: records
                .iter()
                .map(|r| r.response_time_ms)
                .min()
                .unwrap_or(0),
            overall_precision: rounded_mean(records.iter().map(|r| r.precision as u32)),
            daily,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_trials == 0
    }
}

fn local_date(epoch_ms: i64, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(epoch_ms).map(|utc| utc.with_timezone(&offset).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;
    /// 2024-03-01T12:00:00Z
    const NOON: i64 = 1_709_294_400_000;

    fn record(id: i64, response_time_ms: u32, precision: u8) -> TrialRecord {
        TrialRecord {
            id,
            exercise_type: "test".into(),
            response_time_ms,
            precision,
        }
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let report = ProgressReport::from_history(&[], utc());
        assert!(report.is_empty());
        assert_eq!(report, ProgressReport::default());
    }

    #[test]
    fn test_summary_cards() {
        let records = vec![
            record(NOON + 2, 420, 90),
            record(NOON + 1, 380, 61),
            record(NOON, 510, 40),
        ];
        let report = ProgressReport::from_history(&records, utc());
        assert_eq!(report.total_trials, 3);
        assert_eq!(report.best_response_ms, 380);
        assert_eq!(report.overall_precision, 64);
        assert_eq!(report.daily.len(), 1);
        assert_eq!(report.daily[0].trials, 3);
    }

    #[test]
    fn test_days_are_chronological() {
        // Newest first, as the history source returns them
        let records = vec![
            record(NOON + DAY_MS, 300, 80),
            record(NOON, 300, 50),
            record(NOON + 60_000, 300, 70),
        ];
        let report = ProgressReport::from_history(&records, utc());
        let dates: Vec<String> = report.daily.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-03-02"]);
        assert_eq!(report.daily[0].precision, 60);
        assert_eq!(report.daily[1].precision, 80);
    }

    #[test]
    fn test_keeps_most_recent_days() {
        let records: Vec<TrialRecord> = (0..15)
            .map(|d| record(NOON + d * DAY_MS, 300, d as u8))
            .collect();
        let report = ProgressReport::from_history(&records, utc());
        assert_eq!(report.daily.len(), MAX_CHART_DAYS);
        assert_eq!(report.daily[0].precision, 5);
        assert_eq!(report.daily.last().unwrap().precision, 14);
    }

    #[test]
    fn test_offset_moves_day_boundary() {
        // 23:30 UTC is already the next day at UTC+2
        let late = NOON + 11 * 3_600_000 + 30 * 60_000;
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let report = ProgressReport::from_history(&[record(late, 300, 50)], plus_two);
        assert_eq!(report.daily[0].date.to_string(), "2024-03-02");
    }
}
