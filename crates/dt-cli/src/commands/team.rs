//! Implementation of the `dt team` command.
//!
//! Currency evaluation fans out over the roster with rayon. Each engine
//! call is pure and reads a snapshot already fetched from the database,
//! so the parallel map needs no coordination.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use dt_core::{
    CurrencyConfig, CurrencyStatus, DriveRecord, TeamSummary, UserId, VehicleType,
    compute_currency, summarize_team,
};
use dt_db::Database;
use rayon::prelude::*;

/// Renders the team compliance dashboard at `now`.
///
/// With `unit` the dashboard is scoped to that unit's roster entries.
/// Without it, users who appear in the drive log but not on the roster are
/// evaluated on the platforms they drove and grouped under "(unassigned)".
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    unit: Option<&str>,
    now: NaiveDate,
    json: bool,
    config: &CurrencyConfig,
) -> Result<()> {
    let mut roster = db.list_roster()?;
    if let Some(unit) = unit {
        roster.retain(|entry| entry.unit == unit);
    }

    let mut records_by_user: BTreeMap<UserId, Vec<DriveRecord>> = BTreeMap::new();
    for record in db.fetch_all_drive_records()? {
        records_by_user
            .entry(record.user.clone())
            .or_default()
            .push(record);
    }

    let mut work: Vec<(UserId, Vec<VehicleType>)> = roster
        .iter()
        .map(|entry| (entry.user.clone(), entry.qualifications.clone()))
        .collect();
    if unit.is_none() {
        let rostered: BTreeSet<&UserId> = roster.iter().map(|entry| &entry.user).collect();
        for (user, records) in &records_by_user {
            if rostered.contains(user) {
                continue;
            }
            let mut platforms: Vec<VehicleType> =
                records.iter().map(|record| record.vehicle_type).collect();
            platforms.sort_unstable_by_key(VehicleType::as_str);
            platforms.dedup();
            work.push((user.clone(), platforms));
        }
    }

    let empty: Vec<DriveRecord> = Vec::new();
    let statuses_by_user: Vec<(UserId, Vec<CurrencyStatus>)> = work
        .par_iter()
        .map(|(user, platforms)| {
            let records = records_by_user.get(user).map_or(&empty[..], Vec::as_slice);
            let statuses = platforms
                .iter()
                .map(|&vehicle_type| compute_currency(records, vehicle_type, now, config))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((user.clone(), statuses))
        })
        .collect::<Result<Vec<_>, dt_core::WindowError>>()?;

    let summary = summarize_team(&statuses_by_user, &roster, config);

    if json {
        serde_json::to_writer_pretty(&mut *writer, &summary)?;
        writeln!(writer)?;
        return Ok(());
    }

    render(writer, &summary, now)?;
    Ok(())
}

fn render<W: Write>(writer: &mut W, summary: &TeamSummary, now: NaiveDate) -> Result<()> {
    writeln!(writer, "Team currency as of {now}")?;
    writeln!(
        writer,
        "Overall: {}/{} current, {} expiring soon",
        summary.overall.current, summary.overall.total, summary.overall.expiring_soon
    )?;

    if summary.overall.total == 0 {
        return Ok(());
    }

    writeln!(writer, "By platform:")?;
    for breakdown in &summary.by_vehicle {
        writeln!(
            writer,
            "- {}: {}/{} current",
            breakdown.vehicle_type, breakdown.counts.current, breakdown.counts.total
        )?;
    }

    writeln!(writer, "By unit:")?;
    for breakdown in &summary.by_unit {
        writeln!(
            writer,
            "- {}: {}/{} current ({:.1}%)",
            breakdown.unit, breakdown.counts.current, breakdown.counts.total, breakdown.current_rate
        )?;
    }

    if !summary.not_current.is_empty() {
        writeln!(writer, "Not current:")?;
        for entry in &summary.not_current {
            writeln!(
                writer,
                "- {} ({}): {}, {:.1} km in window",
                entry.display_name, entry.unit, entry.vehicle_type, entry.window_distance_km
            )?;
        }
    }

    if !summary.expiring_soon.is_empty() {
        writeln!(writer, "Expiring soon:")?;
        for entry in &summary.expiring_soon {
            let days = entry.days_to_expiry.unwrap_or_default();
            writeln!(
                writer,
                "- {} ({}): {}, expires in {} days",
                entry.display_name, entry.unit, entry.vehicle_type, days
            )?;
        }
    }

    Ok(())
}
