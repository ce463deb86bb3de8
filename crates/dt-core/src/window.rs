//! Rolling-window reduction over dated records.
//!
//! Every aggregation in this crate is the same shape: filter records to a
//! trailing window of days, then fold over them in date order. The fold is
//! factored out once here and specialized by the currency and fitness
//! modules.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use thiserror::Error;

/// Errors from window reductions.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// The window length was zero or negative.
    #[error("window must be a positive number of days, got {days}")]
    InvalidWindow { days: i64 },
}

/// A record carrying a calendar date.
///
/// This trait allows the window fold to work with different record
/// representations (drive records, workout records, or test fixtures).
pub trait Dated {
    /// Returns the record's date.
    fn date(&self) -> NaiveDate;
}

impl<T: Dated + ?Sized> Dated for &T {
    fn date(&self) -> NaiveDate {
        (**self).date()
    }
}

/// Folds over the records whose date falls within the trailing window.
///
/// A record is in the window when `date >= now - window_days`. Future-dated
/// records are not filtered here; rejecting them is the capture boundary's
/// job. Records are visited in ascending date order so float accumulation is
/// reproducible regardless of input order.
///
/// Fails fast on a non-positive `window_days` rather than coercing it.
pub fn window_fold<T, B>(
    records: &[T],
    now: NaiveDate,
    window_days: i64,
    init: B,
    mut f: impl FnMut(B, &T) -> B,
) -> Result<B, WindowError>
where
    T: Dated,
{
    if window_days <= 0 {
        return Err(WindowError::InvalidWindow { days: window_days });
    }
    let cutoff = now - Duration::days(window_days);
    let mut in_window: Vec<&T> = records.iter().filter(|r| r.date() >= cutoff).collect();
    in_window.sort_by_key(|r| r.date());
    Ok(in_window.into_iter().fold(init, |acc, r| f(acc, r)))
}

/// Sums a per-record value over the trailing window.
pub fn window_sum<T: Dated>(
    records: &[T],
    now: NaiveDate,
    window_days: i64,
    value: impl Fn(&T) -> f64,
) -> Result<f64, WindowError> {
    window_fold(records, now, window_days, 0.0, |acc, r| acc + value(r))
}

/// Counts distinct dates with at least one record in the trailing window.
pub fn window_distinct_dates<T: Dated>(
    records: &[T],
    now: NaiveDate,
    window_days: i64,
) -> Result<usize, WindowError> {
    window_fold(records, now, window_days, BTreeSet::new(), |mut seen, r| {
        seen.insert(r.date());
        seen
    })
    .map(|seen| seen.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        date: NaiveDate,
        value: f64,
    }

    impl Dated for Fixture {
        fn date(&self) -> NaiveDate {
            self.date
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn fixture(s: &str, value: f64) -> Fixture {
        Fixture {
            date: date(s),
            value,
        }
    }

    const NOW: &str = "2025-06-30";

    #[test]
    fn rejects_non_positive_window() {
        let records = [fixture("2025-06-01", 1.0)];
        assert_eq!(
            window_sum(&records, date(NOW), 0, |r| r.value),
            Err(WindowError::InvalidWindow { days: 0 })
        );
        assert_eq!(
            window_sum(&records, date(NOW), -7, |r| r.value),
            Err(WindowError::InvalidWindow { days: -7 })
        );
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "sums of exactly representable values"
    )]
    fn cutoff_date_is_inclusive() {
        // now - 90 days = 2025-04-01
        let records = [
            fixture("2025-04-01", 1.0),
            fixture("2025-03-31", 10.0),
        ];
        let sum = window_sum(&records, date(NOW), 90, |r| r.value).unwrap();
        assert_eq!(sum, 1.0);
    }

    #[test]
    #[expect(
        clippy::float_cmp,
        reason = "sums of exactly representable values"
    )]
    fn empty_window_sums_to_zero() {
        let records: [Fixture; 0] = [];
        assert_eq!(window_sum(&records, date(NOW), 90, |r| r.value).unwrap(), 0.0);

        let old = [fixture("2024-01-01", 5.0)];
        assert_eq!(window_sum(&old, date(NOW), 90, |r| r.value).unwrap(), 0.0);
    }

    #[test]
    fn fold_visits_records_in_date_order() {
        let records = [
            fixture("2025-06-20", 3.0),
            fixture("2025-06-01", 1.0),
            fixture("2025-06-10", 2.0),
        ];
        let visited = window_fold(&records, date(NOW), 90, Vec::new(), |mut acc, r| {
            acc.push(r.value);
            acc
        })
        .unwrap();
        assert_eq!(visited, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn distinct_dates_collapses_same_day_records() {
        let records = [
            fixture("2025-06-20", 1.0),
            fixture("2025-06-20", 1.0),
            fixture("2025-06-10", 1.0),
        ];
        assert_eq!(
            window_distinct_dates(&records, date(NOW), 30).unwrap(),
            2
        );
    }

    #[test]
    fn future_dates_are_not_filtered() {
        // Rejecting future dates is the capture boundary's concern.
        let records = [fixture("2025-07-15", 4.0)];
        let count = window_distinct_dates(&records, date(NOW), 30).unwrap();
        assert_eq!(count, 1);
    }
}
