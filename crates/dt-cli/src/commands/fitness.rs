//! Implementation of the `dt fitness` command.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use dt_core::{FitnessConfig, UserId, compute_fitness_summary};
use dt_db::Database;

/// Renders the fitness summary for one user at `now`.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &str,
    now: NaiveDate,
    json: bool,
    config: &FitnessConfig,
) -> Result<()> {
    let user = UserId::new(user)?;
    let records = db.fetch_workout_records(&user)?;
    let summary = compute_fitness_summary(&records, now, config)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &summary)?;
        writeln!(writer)?;
        return Ok(());
    }

    writeln!(writer, "Fitness for {user} as of {now}")?;
    if records.is_empty() {
        writeln!(writer, "No workouts recorded.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "Sessions in the last {} days: {}",
        config.window_days, summary.recent_session_count
    )?;

    writeln!(writer, "Best lifts:")?;
    for (exercise, weight) in &summary.max_weight_kg {
        writeln!(writer, "- {exercise}: {weight:.1} kg")?;
    }

    writeln!(writer, "Personal records:")?;
    for pr in &summary.personal_records {
        writeln!(
            writer,
            "- {} {} {:.1} kg",
            pr.date, pr.exercise, pr.weight_kg
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use dt_core::{Kilograms, WorkoutRecord};
    use insta::assert_snapshot;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    const NOW: &str = "2025-06-30";

    fn seed_workout(db: &mut Database, day: &str, exercise: &str, weight: f64) {
        let record = WorkoutRecord::new(
            UserId::new("alice").unwrap(),
            date(day),
            exercise,
            Kilograms::new(weight).unwrap(),
        )
        .unwrap();
        db.append_workout(&record).unwrap();
    }

    #[test]
    fn empty_log_reports_no_workouts() {
        let db = Database::open_in_memory().unwrap();

        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            "alice",
            date(NOW),
            false,
            &FitnessConfig::default(),
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Fitness for alice as of 2025-06-30
        No workouts recorded.
        ");
    }

    #[test]
    fn summary_renders_sessions_maxes_and_prs() {
        let mut db = Database::open_in_memory().unwrap();
        seed_workout(&mut db, "2025-06-10", "squat", 100.0);
        seed_workout(&mut db, "2025-06-11", "bench", 80.0);
        seed_workout(&mut db, "2025-06-20", "squat", 110.0);

        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            "alice",
            date(NOW),
            false,
            &FitnessConfig::default(),
        )
        .unwrap();

        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        Fitness for alice as of 2025-06-30
        Sessions in the last 30 days: 3
        Best lifts:
        - bench: 80.0 kg
        - squat: 110.0 kg
        Personal records:
        - 2025-06-10 squat 100.0 kg
        - 2025-06-11 bench 80.0 kg
        - 2025-06-20 squat 110.0 kg
        ");
    }

    #[test]
    fn json_output_carries_the_summary() {
        let mut db = Database::open_in_memory().unwrap();
        seed_workout(&mut db, "2025-06-10", "squat", 100.0);

        let mut output = Vec::new();
        run(
            &mut output,
            &db,
            "alice",
            date(NOW),
            true,
            &FitnessConfig::default(),
        )
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["recent_session_count"], 1);
        assert_eq!(parsed["max_weight_kg"]["squat"], 100.0);
        assert_eq!(parsed["personal_records"].as_array().unwrap().len(), 1);
    }
}
