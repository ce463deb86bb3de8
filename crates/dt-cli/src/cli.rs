//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use dt_core::{Role, VehicleType};

/// Vehicle currency and strength training tracker.
///
/// Keeps an append-only log of drives and workouts, evaluates rolling
/// currency windows per vehicle platform, and renders compliance views
/// over the whole roster.
#[derive(Debug, Parser)]
#[command(name = "dt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a drive or workout entry.
    Log {
        #[command(subcommand)]
        entry: LogEntry,
    },

    /// Show currency status for one person.
    Status {
        /// User to evaluate.
        #[arg(long)]
        user: String,

        /// Output JSON instead of the human-readable report.
        #[arg(long)]
        json: bool,
    },

    /// Show the fitness summary for one person.
    Fitness {
        /// User to evaluate.
        #[arg(long)]
        user: String,

        /// Output JSON instead of the human-readable report.
        #[arg(long)]
        json: bool,
    },

    /// Show the team compliance dashboard.
    Team {
        /// Restrict the dashboard to one unit.
        #[arg(long)]
        unit: Option<String>,

        /// Output JSON instead of the human-readable report.
        #[arg(long)]
        json: bool,
    },

    /// Manage the roster.
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },

    /// Dump drive and workout logs as JSON lines on stdout.
    Export,
}

/// Entry types that can be logged.
#[derive(Debug, Subcommand)]
pub enum LogEntry {
    /// Record one drive.
    Drive {
        /// Who drove.
        #[arg(long)]
        user: String,

        /// Date of the drive (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Platform driven (terrex or belrex).
        #[arg(long)]
        vehicle_type: VehicleType,

        /// Vehicle MID number.
        #[arg(long)]
        vehicle_id: String,

        /// Odometer reading before the trip, in km.
        #[arg(long)]
        initial_km: f64,

        /// Odometer reading after the trip, in km.
        #[arg(long)]
        final_km: f64,
    },

    /// Record one strength workout entry.
    Workout {
        /// Who trained.
        #[arg(long)]
        user: String,

        /// Date of the session (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Exercise name.
        #[arg(long)]
        exercise: String,

        /// Working weight in kg.
        #[arg(long)]
        weight_kg: f64,
    },
}

/// Roster management actions.
#[derive(Debug, Subcommand)]
pub enum RosterAction {
    /// Add or replace one roster entry.
    Add {
        /// Stable user ID.
        #[arg(long)]
        user: String,

        /// Name shown in reports.
        #[arg(long)]
        name: String,

        /// Rank string.
        #[arg(long)]
        rank: String,

        /// Platoon or section.
        #[arg(long)]
        unit: String,

        /// Role in the unit (trooper, commander, or admin).
        #[arg(long, default_value = "trooper")]
        role: Role,

        /// Qualified platform, repeatable.
        #[arg(long = "qualification")]
        qualifications: Vec<VehicleType>,
    },

    /// List all roster entries.
    List {
        /// Output JSON instead of the table.
        #[arg(long)]
        json: bool,
    },
}
