//! Implementation of the `dt status` command.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use dt_core::{CurrencyConfig, CurrencyStatus, UserId, VehicleType, compute_currency};
use dt_db::Database;

/// Evaluates currency for one user across the platforms they hold.
///
/// With a roster entry the evaluation covers the qualified platforms only;
/// without one it covers every platform, so unrostered personnel still get
/// a report.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &str,
    now: NaiveDate,
    json: bool,
    config: &CurrencyConfig,
) -> Result<()> {
    let user = UserId::new(user)?;
    let records = db.fetch_drive_records(&user)?;
    let entry = db.fetch_roster_entry(&user)?;

    let platforms: Vec<VehicleType> = entry
        .as_ref()
        .map_or_else(|| VehicleType::ALL.to_vec(), |e| e.qualifications.clone());

    let statuses = platforms
        .iter()
        .map(|&vehicle_type| compute_currency(&records, vehicle_type, now, config))
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &statuses)?;
        writeln!(writer)?;
        return Ok(());
    }

    let display_name = entry
        .as_ref()
        .map_or_else(|| user.as_str().to_string(), |e| e.display_name.clone());
    writeln!(writer, "Currency for {display_name} as of {now}")?;

    if statuses.is_empty() {
        writeln!(writer, "No qualified platforms on record.")?;
        return Ok(());
    }
    for status in &statuses {
        writeln!(writer, "{}", render_status_line(status))?;
    }
    Ok(())
}

fn render_status_line(status: &CurrencyStatus) -> String {
    let state = if status.is_current {
        "CURRENT"
    } else {
        "NOT CURRENT"
    };
    let mut line = format!(
        "- {:<7} {:<12} {:>6.1} km in window",
        status.vehicle_type, state, status.window_distance_km
    );
    if let (Some(expiry), Some(days)) = (status.expiry_date, status.days_to_expiry) {
        if days < 0 {
            line.push_str(&format!(", expired {expiry} ({} days ago)", -days));
        } else {
            line.push_str(&format!(", expires {expiry} (in {days} days)"));
        }
    }
    if let Some(last) = status.last_drive_date {
        line.push_str(&format!(", last drive {last}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    use dt_core::{DriveRecord, Kilometers, Role, RosterEntry, VehicleId};
    use insta::assert_snapshot;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    const NOW: &str = "2025-06-30";

    fn seed_drive(db: &mut Database, day: &str, vehicle_type: VehicleType, km: f64) {
        let record = DriveRecord::new(
            UserId::new("alice").unwrap(),
            date(day),
            vehicle_type,
            VehicleId::new("MID-1234").unwrap(),
            Kilometers::new(1000.0).unwrap(),
            Kilometers::new(1000.0 + km).unwrap(),
        )
        .unwrap();
        db.append_drive(&record).unwrap();
    }

    fn seed_roster(db: &mut Database, qualifications: Vec<VehicleType>) {
        db.upsert_roster_entry(&RosterEntry {
            user: UserId::new("alice").unwrap(),
            display_name: "CPL Alice Tan".to_string(),
            rank: "CPL".to_string(),
            unit: "Platoon 1".to_string(),
            role: Role::Trooper,
            qualifications,
        })
        .unwrap();
    }

    #[test]
    fn report_covers_qualified_platforms_only() {
        let mut db = Database::open_in_memory().unwrap();
        seed_roster(&mut db, vec![VehicleType::Terrex]);
        seed_drive(&mut db, "2025-06-10", VehicleType::Terrex, 5.0);

        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            "alice",
            date(NOW),
            false,
            &CurrencyConfig::default(),
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Currency for CPL Alice Tan as of 2025-06-30
        - terrex  CURRENT         5.0 km in window, expires 2025-09-08 (in 70 days), last drive 2025-06-10
        ");
        assert!(!output.contains("belrex"));
    }

    #[test]
    fn unrostered_user_is_evaluated_on_every_platform() {
        let mut db = Database::open_in_memory().unwrap();
        seed_drive(&mut db, "2025-06-10", VehicleType::Belrex, 3.0);

        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            "alice",
            date(NOW),
            false,
            &CurrencyConfig::default(),
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Currency for alice"));
        assert!(output.contains("terrex"));
        assert!(output.contains("belrex"));
    }

    #[test]
    fn expired_currency_shows_days_ago() {
        let mut db = Database::open_in_memory().unwrap();
        seed_roster(&mut db, vec![VehicleType::Terrex]);
        // Threshold reached long ago, expiry is in the past.
        seed_drive(&mut db, "2024-12-12", VehicleType::Terrex, 5.0);

        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            "alice",
            date(NOW),
            false,
            &CurrencyConfig::default(),
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("NOT CURRENT"), "{output}");
        assert!(output.contains("expired 2025-03-12 (110 days ago)"), "{output}");
    }

    #[test]
    fn json_output_round_trips() {
        let mut db = Database::open_in_memory().unwrap();
        seed_roster(&mut db, vec![VehicleType::Terrex]);
        seed_drive(&mut db, "2025-06-10", VehicleType::Terrex, 5.0);

        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            "alice",
            date(NOW),
            true,
            &CurrencyConfig::default(),
        )
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let statuses = parsed.as_array().unwrap();
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0]["vehicle_type"], "terrex");
        assert_eq!(statuses[0]["is_current"], true);
    }

    #[test]
    fn empty_qualification_list_reports_nothing_to_evaluate() {
        let mut db = Database::open_in_memory().unwrap();
        seed_roster(&mut db, vec![]);

        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            "alice",
            date(NOW),
            false,
            &CurrencyConfig::default(),
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("No qualified platforms on record."));
    }
}
