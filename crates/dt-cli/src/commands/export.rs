//! Implementation of the `dt export` command.
//!
//! Dumps the drive and workout logs as JSON lines, oldest first. Export is
//! the interchange boundary for anything downstream of the tracker.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use dt_core::{DriveRecord, WorkoutRecord};
use dt_db::Database;
use serde::Serialize;

/// One exported line, tagged by record kind.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ExportLine {
    Drive(DriveRecord),
    Workout(WorkoutRecord),
}

/// Writes every stored record as JSONL, sorted by date.
pub fn run<W: Write>(writer: &mut W, db: &Database) -> Result<()> {
    let drives = db.fetch_all_drive_records()?;
    let workouts = db.fetch_all_workout_records()?;

    let mut lines: Vec<(NaiveDate, ExportLine)> = Vec::with_capacity(drives.len() + workouts.len());
    lines.extend(drives.into_iter().map(|r| (r.date, ExportLine::Drive(r))));
    lines.extend(
        workouts
            .into_iter()
            .map(|r| (r.date, ExportLine::Workout(r))),
    );
    lines.sort_by_key(|(date, _)| *date);

    for (_, line) in lines {
        serde_json::to_writer(&mut *writer, &line).context("failed to serialize record")?;
        // Handle broken pipe gracefully (e.g. when piped to `head`)
        if writeln!(writer).is_err() {
            break;
        }
    }

    Ok(())
}
