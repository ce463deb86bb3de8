//! Implementation of the `dt roster` subcommands.

use std::io::Write;

use anyhow::Result;
use dt_core::{Role, RosterEntry, UserId, VehicleType};
use dt_db::Database;

/// Adds or replaces one roster entry.
pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    user: &str,
    name: &str,
    rank: &str,
    unit: &str,
    role: Role,
    qualifications: &[VehicleType],
) -> Result<()> {
    let mut qualifications = qualifications.to_vec();
    qualifications.sort_unstable_by_key(VehicleType::as_str);
    qualifications.dedup();

    let entry = RosterEntry {
        user: UserId::new(user)?,
        display_name: name.to_string(),
        rank: rank.to_string(),
        unit: unit.to_string(),
        role,
        qualifications,
    };
    db.upsert_roster_entry(&entry)?;
    tracing::debug!(user = %entry.user, "roster entry saved");
    writeln!(
        writer,
        "Saved roster entry for {} ({})",
        entry.display_name, entry.user
    )?;
    Ok(())
}

/// Lists all roster entries.
pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let entries = db.list_roster()?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &entries)?;
        writeln!(writer)?;
        return Ok(());
    }

    if entries.is_empty() {
        writeln!(writer, "Roster is empty.")?;
        return Ok(());
    }
    for entry in &entries {
        let qualifications: Vec<&str> = entry
            .qualifications
            .iter()
            .map(VehicleType::as_str)
            .collect();
        writeln!(
            writer,
            "- {} {} ({}, {}) [{}]",
            entry.user,
            entry.display_name,
            entry.unit,
            entry.role,
            qualifications.join(", ")
        )?;
    }
    Ok(())
}
