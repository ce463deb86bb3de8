//! Strength workout records and the fitness aggregator.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Kilograms, UserId, ValidationError};
use crate::window::{Dated, WindowError, window_distinct_dates};

/// One strength session entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWorkoutRecord")]
pub struct WorkoutRecord {
    /// Who trained.
    pub user: UserId,

    /// The date of the session.
    pub date: NaiveDate,

    /// Exercise name, non-empty.
    pub exercise: String,

    /// Working weight for the entry.
    pub weight_kg: Kilograms,
}

impl WorkoutRecord {
    /// Creates a validated workout record.
    pub fn new(
        user: UserId,
        date: NaiveDate,
        exercise: impl Into<String>,
        weight_kg: Kilograms,
    ) -> Result<Self, ValidationError> {
        let exercise = exercise.into();
        if exercise.is_empty() {
            return Err(ValidationError::Empty { field: "exercise" });
        }
        Ok(Self {
            user,
            date,
            exercise,
            weight_kg,
        })
    }
}

impl Dated for WorkoutRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Deserialize)]
struct RawWorkoutRecord {
    user: UserId,
    date: NaiveDate,
    exercise: String,
    weight_kg: Kilograms,
}

impl TryFrom<RawWorkoutRecord> for WorkoutRecord {
    type Error = ValidationError;

    fn try_from(raw: RawWorkoutRecord) -> Result<Self, Self::Error> {
        Self::new(raw.user, raw.date, raw.exercise, raw.weight_kg)
    }
}

/// Configuration for fitness aggregation.
#[derive(Debug, Clone)]
pub struct FitnessConfig {
    /// Length of the trailing window for session counting.
    /// Default: 30 days.
    pub window_days: i64,

    /// An entry within this fraction of the running max counts as a
    /// personal record. Default: 0.05.
    pub pr_tolerance: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            window_days: 30,
            pr_tolerance: 0.05,
        }
    }
}

/// A flagged personal-record entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalRecord {
    /// When the entry was logged.
    pub date: NaiveDate,

    /// Which exercise.
    pub exercise: String,

    /// The weight that earned the flag.
    pub weight_kg: f64,
}

/// Aggregated fitness view for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitnessSummary {
    /// Distinct dates with at least one entry inside the trailing window.
    /// Multiple entries on one date are one session.
    pub recent_session_count: usize,

    /// All-time maximum weight per exercise, not windowed.
    pub max_weight_kg: BTreeMap<String, f64>,

    /// Entries flagged as personal records, in chronological order.
    pub personal_records: Vec<PersonalRecord>,
}

/// Aggregates a user's workout log at `now`.
///
/// The PR walk visits records chronologically, keeping a per-exercise
/// running max. An entry flags when its weight is within the tolerance of
/// the running max so far; the first entry for an exercise always flags.
/// The tolerance makes this generous on plateaus, which is intentional.
pub fn compute_fitness_summary(
    records: &[WorkoutRecord],
    now: NaiveDate,
    config: &FitnessConfig,
) -> Result<FitnessSummary, WindowError> {
    let recent_session_count = window_distinct_dates(records, now, config.window_days)?;

    let mut max_weight_kg: BTreeMap<String, f64> = BTreeMap::new();
    for record in records {
        let weight = record.weight_kg.value();
        max_weight_kg
            .entry(record.exercise.clone())
            .and_modify(|max| *max = max.max(weight))
            .or_insert(weight);
    }

    let mut ordered: Vec<&WorkoutRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.date);

    let mut running_max: BTreeMap<&str, f64> = BTreeMap::new();
    let mut personal_records = Vec::new();
    for record in ordered {
        let weight = record.weight_kg.value();
        match running_max.get_mut(record.exercise.as_str()) {
            None => {
                running_max.insert(record.exercise.as_str(), weight);
                personal_records.push(PersonalRecord {
                    date: record.date,
                    exercise: record.exercise.clone(),
                    weight_kg: weight,
                });
            }
            Some(max) => {
                if weight >= (1.0 - config.pr_tolerance) * *max {
                    personal_records.push(PersonalRecord {
                        date: record.date,
                        exercise: record.exercise.clone(),
                        weight_kg: weight,
                    });
                }
                *max = max.max(weight);
            }
        }
    }

    debug!(
        recent_session_count,
        exercises = max_weight_kg.len(),
        flagged = personal_records.len(),
        "aggregated fitness log"
    );

    Ok(FitnessSummary {
        recent_session_count,
        max_weight_kg,
        personal_records,
    })
}
