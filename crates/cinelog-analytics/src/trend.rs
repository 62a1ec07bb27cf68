//! Fixed-length time series from sparse aggregation output.
//!
//! Grouping by `$dateToString` returns only the periods that have data; the
//! dashboards want every period of the window, oldest first, with zeros where
//! nothing happened. Absent data is always zero, never an error.

use std::collections::HashMap;

use chrono::{Datelike, Days, Months, NaiveDate};

/// Label format for daily buckets, matching `$dateToString` "%Y-%m-%d".
pub const DAY_FORMAT: &str = "%Y-%m-%d";
/// Label format for monthly buckets, matching `$dateToString` "%Y-%m".
pub const MONTH_FORMAT: &str = "%Y-%m";

/// Parallel label/count sequences of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub counts: Vec<i64>,
}

/// One label per day, `periods` days starting at `start`.
pub fn fill_days(start: NaiveDate, periods: usize, sparse: &HashMap<String, i64>) -> TrendSeries {
    let mut labels = Vec::with_capacity(periods);
    let mut counts = Vec::with_capacity(periods);
    let mut day = start;
    for _ in 0..periods {
        let label = day.format(DAY_FORMAT).to_string();
        counts.push(sparse.get(&label).copied().unwrap_or(0));
        labels.push(label);
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    TrendSeries { labels, counts }
}

/// One label per month, `periods` months starting at `start`'s month.
pub fn fill_months(start: NaiveDate, periods: usize, sparse: &HashMap<String, i64>) -> TrendSeries {
    let mut labels = Vec::with_capacity(periods);
    let mut counts = Vec::with_capacity(periods);
    let mut month = month_floor(start);
    for _ in 0..periods {
        let label = month.format(MONTH_FORMAT).to_string();
        counts.push(sparse.get(&label).copied().unwrap_or(0));
        labels.push(label);
        month = match month.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }
    TrendSeries { labels, counts }
}

/// First day of `date`'s month.
pub fn month_floor(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Start of a `periods`-day window ending at `today` inclusive.
pub fn daily_window_start(today: NaiveDate, periods: usize) -> NaiveDate {
    today
        .checked_sub_days(Days::new(periods.saturating_sub(1) as u64))
        .unwrap_or(today)
}

/// Start of a `periods`-month window ending in `today`'s month inclusive.
pub fn monthly_window_start(today: NaiveDate, periods: usize) -> NaiveDate {
    month_floor(today)
        .checked_sub_months(Months::new(periods.saturating_sub(1) as u32))
        .unwrap_or_else(|| month_floor(today))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fill_days_exact_length_all_zero() {
        let series = fill_days(date(2026, 8, 1), 30, &HashMap::new());
        assert_eq!(series.labels.len(), 30);
        assert_eq!(series.counts.len(), 30);
        assert!(series.counts.iter().all(|&c| c == 0));
        assert_eq!(series.labels[0], "2026-08-01");
        assert_eq!(series.labels[29], "2026-08-30");
    }

    #[test]
    fn test_fill_days_places_sparse_counts() {
        let mut sparse = HashMap::new();
        sparse.insert("2026-08-02".to_string(), 5);
        sparse.insert("2026-08-04".to_string(), 2);
        // A key outside the window must not leak in.
        sparse.insert("2026-09-01".to_string(), 99);

        let series = fill_days(date(2026, 8, 1), 4, &sparse);
        assert_eq!(series.labels, vec!["2026-08-01", "2026-08-02", "2026-08-03", "2026-08-04"]);
        assert_eq!(series.counts, vec![0, 5, 0, 2]);
    }

    #[test]
    fn test_fill_days_crosses_month_boundary() {
        let series = fill_days(date(2026, 1, 30), 4, &HashMap::new());
        assert_eq!(series.labels, vec!["2026-01-30", "2026-01-31", "2026-02-01", "2026-02-02"]);
    }

    #[test]
    fn test_fill_months_crosses_year_boundary() {
        let mut sparse = HashMap::new();
        sparse.insert("2025-12".to_string(), 7);
        sparse.insert("2026-02".to_string(), 3);

        let series = fill_months(date(2025, 11, 15), 4, &sparse);
        assert_eq!(series.labels, vec!["2025-11", "2025-12", "2026-01", "2026-02"]);
        assert_eq!(series.counts, vec![0, 7, 0, 3]);
    }

    #[test]
    fn test_fill_months_floors_start_to_first_of_month() {
        let series = fill_months(date(2026, 3, 28), 2, &HashMap::new());
        assert_eq!(series.labels, vec!["2026-03", "2026-04"]);
    }

    #[test]
    fn test_daily_window_start_includes_today() {
        // 30-day window ending today: start is 29 days back.
        assert_eq!(daily_window_start(date(2026, 8, 23), 30), date(2026, 7, 25));
        assert_eq!(daily_window_start(date(2026, 8, 23), 1), date(2026, 8, 23));
    }

    #[test]
    fn test_monthly_window_start_includes_current_month() {
        assert_eq!(monthly_window_start(date(2026, 8, 23), 12), date(2025, 9, 1));
        assert_eq!(monthly_window_start(date(2026, 1, 5), 2), date(2025, 12, 1));
    }

    #[test]
    fn test_window_lengths_line_up() {
        // daily_window_start + fill_days yields exactly the requested window.
        let today = date(2026, 2, 14);
        for periods in [1usize, 7, 30, 90] {
            let start = daily_window_start(today, periods);
            let series = fill_days(start, periods, &HashMap::new());
            assert_eq!(series.labels.len(), periods);
            assert_eq!(series.labels.last().unwrap(), &today.format(DAY_FORMAT).to_string());
        }
    }
}
