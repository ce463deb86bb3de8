//! Core domain logic for the drive currency tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Currency: rolling-window qualification currency per vehicle type
//! - Fitness: strength session counts and personal records
//! - Team: order-independent compliance summaries over a roster

mod currency;
mod fitness;
mod team;
pub mod drive;
pub mod roster;
pub mod types;
pub mod vehicle;
pub mod window;

pub use currency::{
    CurrencyConfig, CurrencyStatus, compute_currency, days_to_expiry, expiry_date, is_current,
    window_distance,
};
pub use drive::DriveRecord;
pub use fitness::{FitnessConfig, FitnessSummary, PersonalRecord, WorkoutRecord,
    compute_fitness_summary};
pub use roster::{Role, RosterEntry};
pub use team::{
    PriorityEntry, TeamCounts, TeamSummary, UnitBreakdown, VehicleBreakdown, summarize,
    summarize_team,
};
pub use types::{Kilograms, Kilometers, UserId, ValidationError, VehicleId};
pub use vehicle::VehicleType;
pub use window::{Dated, WindowError, window_distinct_dates, window_fold, window_sum};
