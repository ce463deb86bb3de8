//! Implementation of the `dt log` subcommands.
//!
//! Logging is the capture boundary: dates are checked against today and
//! records are fully validated before anything reaches the database.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use dt_core::{DriveRecord, Kilograms, Kilometers, UserId, VehicleId, VehicleType, WorkoutRecord};
use dt_db::Database;

/// Records one drive.
#[expect(
    clippy::too_many_arguments,
    reason = "mirrors the flags of the log subcommand"
)]
pub fn drive<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &str,
    date: Option<NaiveDate>,
    vehicle_type: VehicleType,
    vehicle_id: &str,
    initial_km: f64,
    final_km: f64,
    today: NaiveDate,
) -> Result<()> {
    let date = resolve_date(date, today)?;
    let record = DriveRecord::new(
        UserId::new(user)?,
        date,
        vehicle_type,
        VehicleId::new(vehicle_id)?,
        Kilometers::new(initial_km).context("invalid initial odometer reading")?,
        Kilometers::new(final_km).context("invalid final odometer reading")?,
    )?;

    let id = db.append_drive(&record)?;
    tracing::debug!(%id, "drive appended");
    writeln!(
        writer,
        "Logged {} km on {} ({}) for {}",
        record.distance_km, record.vehicle_type, record.vehicle_id, record.user,
    )?;
    Ok(())
}

/// Records one strength workout entry.
pub fn workout<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &str,
    date: Option<NaiveDate>,
    exercise: &str,
    weight_kg: f64,
    today: NaiveDate,
) -> Result<()> {
    let date = resolve_date(date, today)?;
    let record = WorkoutRecord::new(
        UserId::new(user)?,
        date,
        exercise,
        Kilograms::new(weight_kg).context("invalid weight")?,
    )?;

    let id = db.append_workout(&record)?;
    tracing::debug!(%id, "workout appended");
    writeln!(
        writer,
        "Logged {} at {} kg on {} for {}",
        record.exercise, record.weight_kg, record.date, record.user,
    )?;
    Ok(())
}

/// Defaults the entry date to today and rejects future dates.
fn resolve_date(date: Option<NaiveDate>, today: NaiveDate) -> Result<NaiveDate> {
    let date = date.unwrap_or(today);
    if date > today {
        bail!("cannot log an entry dated in the future: {date}");
    }
    Ok(date)
}
