//! Currency engine.
//!
//! Computes rolling-window qualification currency per vehicle type from an
//! append-only drive log.
//!
//! # Algorithm Summary
//!
//! 1. Sum trip distances for the platform over the trailing window
//! 2. Compare the total against the currency threshold (non-strict)
//! 3. Walk the log most-recent-first, accumulating distance until the
//!    threshold is met; that date anchors the expiry
//!
//! Everything here is pure: deterministic given the records and `now`, never
//! mutating input. Currency decays purely with the passage of time, so
//! results must not be cached beyond the evaluation instant.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::drive::DriveRecord;
use crate::vehicle::VehicleType;
use crate::window::{WindowError, window_sum};

/// Configuration for currency evaluation.
#[derive(Debug, Clone)]
pub struct CurrencyConfig {
    /// Minimum distance within the window to count as current.
    /// Default: 2.0 km.
    pub threshold_km: f64,

    /// Length of the trailing window considered for currency.
    /// Default: 90 days.
    pub window_days: i64,

    /// How long a qualifying block of driving keeps a driver current,
    /// measured from the anchor date. Default: 90 days.
    pub validity_days: i64,

    /// Currency expiring within this many days is flagged for attention.
    /// Default: 14 days.
    pub expiring_soon_days: i64,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            threshold_km: 2.0,
            window_days: 90,
            validity_days: 90,
            expiring_soon_days: 14,
        }
    }
}

/// Evaluated currency for one driver on one platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrencyStatus {
    /// The platform evaluated.
    pub vehicle_type: VehicleType,

    /// Total distance driven on the platform within the trailing window.
    pub window_distance_km: f64,

    /// Whether the window distance meets the threshold.
    pub is_current: bool,

    /// When currency runs out, if the threshold was ever met.
    pub expiry_date: Option<NaiveDate>,

    /// Whole days until expiry. Negative means already expired; the sign is
    /// never suppressed.
    pub days_to_expiry: Option<i64>,

    /// The most recent drive on the platform, across all history.
    pub last_drive_date: Option<NaiveDate>,
}

/// Sums trip distances for the platform over the trailing window.
///
/// An empty filtered set sums to zero; absence of data is not an error.
pub fn window_distance(
    records: &[DriveRecord],
    vehicle_type: VehicleType,
    now: NaiveDate,
    config: &CurrencyConfig,
) -> Result<f64, WindowError> {
    let matching: Vec<&DriveRecord> = records
        .iter()
        .filter(|r| r.vehicle_type == vehicle_type)
        .collect();
    window_sum(&matching, now, config.window_days, |r| {
        r.distance_km.value()
    })
}

/// Whether the window distance meets the currency threshold.
///
/// The comparison is non-strict: landing exactly on the threshold counts.
#[must_use]
pub fn is_current(window_distance_km: f64, config: &CurrencyConfig) -> bool {
    window_distance_km >= config.threshold_km
}

/// Finds the date currency runs out, if the threshold was ever met.
///
/// Walks the log most-recent-first, accumulating distance until the
/// cumulative total reaches the threshold; the date where that happens
/// anchors the expiry at `anchor + validity_days`. Same-date records
/// collapse into a single accumulation step, so ordering within a date can
/// never change the anchor.
///
/// The walk deliberately covers all history, not just the currency window:
/// an old qualifying block can anchor an expiry even when the windowed
/// distance alone no longer meets the threshold.
#[must_use]
pub fn expiry_date(
    records: &[DriveRecord],
    vehicle_type: VehicleType,
    config: &CurrencyConfig,
) -> Option<NaiveDate> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records.iter().filter(|r| r.vehicle_type == vehicle_type) {
        *by_date.entry(record.date).or_insert(0.0) += record.distance_km.value();
    }

    let mut cumulative = 0.0;
    for (date, distance) in by_date.iter().rev() {
        cumulative += distance;
        if cumulative >= config.threshold_km {
            return Some(*date + Duration::days(config.validity_days));
        }
    }
    None
}

/// Whole days from `now` until `expiry`. Negative when already expired.
#[must_use]
pub fn days_to_expiry(expiry: NaiveDate, now: NaiveDate) -> i64 {
    (expiry - now).num_days()
}

/// Evaluates the full currency status for one platform at `now`.
///
/// The record slice is expected to already be scoped to a single driver;
/// only the vehicle type is filtered here.
pub fn compute_currency(
    records: &[DriveRecord],
    vehicle_type: VehicleType,
    now: NaiveDate,
    config: &CurrencyConfig,
) -> Result<CurrencyStatus, WindowError> {
    let window_distance_km = window_distance(records, vehicle_type, now, config)?;
    let expiry = expiry_date(records, vehicle_type, config);
    let last_drive_date = records
        .iter()
        .filter(|r| r.vehicle_type == vehicle_type)
        .map(|r| r.date)
        .max();

    debug!(
        vehicle_type = %vehicle_type,
        window_distance_km,
        ?expiry,
        "evaluated currency"
    );

    Ok(CurrencyStatus {
        vehicle_type,
        window_distance_km,
        is_current: is_current(window_distance_km, config),
        expiry_date: expiry,
        days_to_expiry: expiry.map(|e| days_to_expiry(e, now)),
        last_drive_date,
    })
}
