//! Team-wide compliance summaries.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::currency::{CurrencyConfig, CurrencyStatus};
use crate::roster::RosterEntry;
use crate::types::UserId;
use crate::vehicle::VehicleType;

/// Unit label for statuses whose user is missing from the roster.
///
/// Such statuses still count toward the overall totals so the per-unit
/// partition always sums back to the overall counts.
pub const UNASSIGNED_UNIT: &str = "(unassigned)";

/// Compliance counts over a set of evaluated statuses.
///
/// `current + not_current == total` always; `expiring_soon` is a subset of
/// `current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TeamCounts {
    /// Number of evaluated (driver, platform) combinations.
    pub total: usize,

    /// Combinations meeting the currency threshold.
    pub current: usize,

    /// Combinations not meeting it.
    pub not_current: usize,

    /// Current combinations whose expiry falls within the attention window.
    pub expiring_soon: usize,
}

/// Per-unit slice of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitBreakdown {
    /// Unit (platoon) name.
    pub unit: String,

    /// Counts for the unit's statuses.
    pub counts: TeamCounts,

    /// Percentage of the unit's statuses that are current.
    pub current_rate: f64,
}

/// Per-platform slice of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VehicleBreakdown {
    /// The platform.
    pub vehicle_type: VehicleType,

    /// Counts for statuses on the platform.
    pub counts: TeamCounts,
}

/// One row in a priority list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityEntry {
    /// Who needs attention.
    pub user: UserId,

    /// Roster display name, or the raw user ID when unrostered.
    pub display_name: String,

    /// Unit the person belongs to.
    pub unit: String,

    /// The platform the flag is about.
    pub vehicle_type: VehicleType,

    /// Distance driven inside the currency window.
    pub window_distance_km: f64,

    /// Days until expiry, if an expiry exists.
    pub days_to_expiry: Option<i64>,
}

/// The full team dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    /// Counts over every evaluated status.
    pub overall: TeamCounts,

    /// Per-unit counts, sorted by unit name.
    pub by_unit: Vec<UnitBreakdown>,

    /// Per-platform counts, in platform display order.
    pub by_vehicle: Vec<VehicleBreakdown>,

    /// Personnel with a platform out of currency.
    pub not_current: Vec<PriorityEntry>,

    /// Personnel whose currency expires within the attention window,
    /// soonest first.
    pub expiring_soon: Vec<PriorityEntry>,
}

fn is_expiring_soon(status: &CurrencyStatus, config: &CurrencyConfig) -> bool {
    status.is_current
        && status
            .days_to_expiry
            .is_some_and(|days| (0..=config.expiring_soon_days).contains(&days))
}

/// Counts compliance over a set of statuses.
///
/// Order-independent: the same multiset of statuses always produces the
/// same counts.
#[must_use]
pub fn summarize(statuses: &[CurrencyStatus], config: &CurrencyConfig) -> TeamCounts {
    let mut counts = TeamCounts {
        total: statuses.len(),
        ..TeamCounts::default()
    };
    for status in statuses {
        if status.is_current {
            counts.current += 1;
        } else {
            counts.not_current += 1;
        }
        if is_expiring_soon(status, config) {
            counts.expiring_soon += 1;
        }
    }
    counts
}

fn current_rate(counts: TeamCounts) -> f64 {
    if counts.total == 0 {
        0.0
    } else {
        #[expect(
            clippy::cast_precision_loss,
            reason = "roster sizes are far below f64 precision limits"
        )]
        {
            counts.current as f64 / counts.total as f64 * 100.0
        }
    }
}

/// Joins per-user statuses back to roster metadata and builds the dashboard.
///
/// Statuses whose user is absent from the roster are grouped under
/// [`UNASSIGNED_UNIT`] and still count toward the overall totals.
#[must_use]
pub fn summarize_team(
    statuses_by_user: &[(UserId, Vec<CurrencyStatus>)],
    roster: &[RosterEntry],
    config: &CurrencyConfig,
) -> TeamSummary {
    let roster_index: BTreeMap<&UserId, &RosterEntry> =
        roster.iter().map(|entry| (&entry.user, entry)).collect();

    let all_statuses: Vec<CurrencyStatus> = statuses_by_user
        .iter()
        .flat_map(|(_, statuses)| statuses.iter().cloned())
        .collect();
    let overall = summarize(&all_statuses, config);

    let mut unit_statuses: BTreeMap<String, Vec<CurrencyStatus>> = BTreeMap::new();
    let mut not_current = Vec::new();
    let mut expiring_soon = Vec::new();

    for (user, statuses) in statuses_by_user {
        let entry = roster_index.get(user);
        let unit = entry.map_or(UNASSIGNED_UNIT, |e| e.unit.as_str());
        let display_name =
            entry.map_or_else(|| user.as_str().to_string(), |e| e.display_name.clone());

        unit_statuses
            .entry(unit.to_string())
            .or_default()
            .extend(statuses.iter().cloned());

        for status in statuses {
            let priority = PriorityEntry {
                user: user.clone(),
                display_name: display_name.clone(),
                unit: unit.to_string(),
                vehicle_type: status.vehicle_type,
                window_distance_km: status.window_distance_km,
                days_to_expiry: status.days_to_expiry,
            };
            if !status.is_current {
                not_current.push(priority);
            } else if is_expiring_soon(status, config) {
                expiring_soon.push(priority);
            }
        }
    }

    not_current.sort_by(|a, b| {
        (&a.unit, &a.user, a.vehicle_type).cmp(&(&b.unit, &b.user, b.vehicle_type))
    });
    expiring_soon.sort_by(|a, b| {
        (a.days_to_expiry, &a.user, a.vehicle_type).cmp(&(b.days_to_expiry, &b.user, b.vehicle_type))
    });

    let by_unit = unit_statuses
        .into_iter()
        .map(|(unit, statuses)| {
            let counts = summarize(&statuses, config);
            UnitBreakdown {
                unit,
                counts,
                current_rate: current_rate(counts),
            }
        })
        .collect();

    let by_vehicle = VehicleType::ALL
        .iter()
        .map(|&vehicle_type| {
            let statuses: Vec<CurrencyStatus> = all_statuses
                .iter()
                .filter(|s| s.vehicle_type == vehicle_type)
                .cloned()
                .collect();
            VehicleBreakdown {
                vehicle_type,
                counts: summarize(&statuses, config),
            }
        })
        .collect();

    TeamSummary {
        overall,
        by_unit,
        by_vehicle,
        not_current,
        expiring_soon,
    }
}
