//! Storage layer for the drive currency tracker.
//!
//! Provides persistence for drive logs, workout logs, and the roster using
//! `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! For multi-threaded access, either:
//! - Use a `Mutex<Database>` to serialize access
//! - Create a connection pool (e.g., with `r2d2`)
//! - Use separate `Database` instances per thread
//!
//! # Schema
//!
//! ## Date Format
//!
//! Drive and workout dates are stored as TEXT in ISO 8601 date format
//! (e.g., `2025-06-30`), so lexicographic ordering matches chronological
//! ordering. Append timestamps (`logged_at`) are full RFC 3339 instants.
//!
//! ## Append-Only Logs
//!
//! The drive and workout tables are append-only: there is no update or
//! delete path. All temporal filtering happens in the engine, not in SQL;
//! fetches return full per-user history.

use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use dt_core::{
    DriveRecord, Kilograms, Kilometers, RosterEntry, UserId, ValidationError, VehicleId,
    VehicleType, WorkoutRecord,
};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored date.
    #[error("invalid date for record {record_id}: {date}")]
    DateParse {
        record_id: String,
        date: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row no longer satisfies the domain invariants.
    #[error("invalid data for record {record_id}: {source}")]
    InvalidRecord {
        record_id: String,
        #[source]
        source: ValidationError,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Drive log: one row per logged trip, append-only
            -- date: ISO 8601 date (e.g., '2025-06-30')
            CREATE TABLE IF NOT EXISTS drive_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                vehicle_type TEXT NOT NULL,
                vehicle_id TEXT NOT NULL,
                initial_odometer_km REAL NOT NULL,
                final_odometer_km REAL NOT NULL,
                distance_km REAL NOT NULL,
                logged_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_drive_logs_user_vehicle
                ON drive_logs(user_id, vehicle_type);
            CREATE INDEX IF NOT EXISTS idx_drive_logs_date ON drive_logs(date);

            -- Workout log: one row per strength entry, append-only
            CREATE TABLE IF NOT EXISTS workout_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                exercise TEXT NOT NULL,
                weight_kg REAL NOT NULL,
                logged_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_workout_logs_user ON workout_logs(user_id);
            CREATE INDEX IF NOT EXISTS idx_workout_logs_date ON workout_logs(date);

            -- Roster: one row per person
            -- qualifications: comma-joined lowercase platform names
            CREATE TABLE IF NOT EXISTS roster (
                user_id TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                rank TEXT NOT NULL,
                unit TEXT NOT NULL,
                role TEXT NOT NULL,
                qualifications TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_roster_unit ON roster(unit);
            ",
        )?;
        Ok(())
    }

    /// Appends a drive record, returning its row ID.
    ///
    /// The ID is derived deterministically from the record content, so
    /// submitting the same trip twice leaves a single row. A genuine second
    /// trip always differs in its odometer readings.
    pub fn append_drive(&mut self, record: &DriveRecord) -> Result<String, DbError> {
        let id = deterministic_record_id(&[
            "drive",
            record.user.as_str(),
            &record.date.to_string(),
            record.vehicle_type.as_str(),
            record.vehicle_id.as_str(),
            &record.initial_odometer_km.value().to_string(),
            &record.final_odometer_km.value().to_string(),
        ]);
        let inserted = self.conn.execute(
            "
            INSERT OR IGNORE INTO drive_logs
            (id, user_id, date, vehicle_type, vehicle_id,
             initial_odometer_km, final_odometer_km, distance_km, logged_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                id,
                record.user.as_str(),
                record.date.to_string(),
                record.vehicle_type.as_str(),
                record.vehicle_id.as_str(),
                record.initial_odometer_km.value(),
                record.final_odometer_km.value(),
                record.distance_km.value(),
                format_timestamp(Utc::now()),
            ],
        )?;
        debug!(id, user = %record.user, inserted, "appended drive record");
        Ok(id)
    }

    /// Fetches one user's full drive history, ordered by date then ID.
    ///
    /// No temporal filtering happens here; the engine owns the windows.
    pub fn fetch_drive_records(&self, user: &UserId) -> Result<Vec<DriveRecord>, DbError> {
        self.query_drive_records(
            "
            SELECT id, user_id, date, vehicle_type, vehicle_id,
                   initial_odometer_km, final_odometer_km
            FROM drive_logs
            WHERE user_id = ?
            ORDER BY date ASC, id ASC
            ",
            params![user.as_str()],
        )
    }

    /// Fetches every drive record in the log, ordered by date then ID.
    pub fn fetch_all_drive_records(&self) -> Result<Vec<DriveRecord>, DbError> {
        self.query_drive_records(
            "
            SELECT id, user_id, date, vehicle_type, vehicle_id,
                   initial_odometer_km, final_odometer_km
            FROM drive_logs
            ORDER BY date ASC, id ASC
            ",
            params![],
        )
    }

    fn query_drive_records(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<DriveRecord>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok(DriveRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                date: row.get(2)?,
                vehicle_type: row.get(3)?,
                vehicle_id: row.get(4)?,
                initial_odometer_km: row.get(5)?,
                final_odometer_km: row.get(6)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(drive_from_row(row?)?);
        }
        Ok(records)
    }

    /// Appends a workout record, returning its row ID.
    ///
    /// Workout rows get random IDs: identical entries on the same date are
    /// legitimate (repeated sets), so no content dedup applies.
    pub fn append_workout(&mut self, record: &WorkoutRecord) -> Result<String, DbError> {
        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            "
            INSERT INTO workout_logs (id, user_id, date, exercise, weight_kg, logged_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                id,
                record.user.as_str(),
                record.date.to_string(),
                record.exercise,
                record.weight_kg.value(),
                format_timestamp(Utc::now()),
            ],
        )?;
        debug!(id, user = %record.user, "appended workout record");
        Ok(id)
    }

    /// Fetches one user's full workout history, ordered by date then ID.
    pub fn fetch_workout_records(&self, user: &UserId) -> Result<Vec<WorkoutRecord>, DbError> {
        self.query_workout_records(
            "
            SELECT id, user_id, date, exercise, weight_kg
            FROM workout_logs
            WHERE user_id = ?
            ORDER BY date ASC, id ASC
            ",
            params![user.as_str()],
        )
    }

    /// Fetches every workout record in the log, ordered by date then ID.
    pub fn fetch_all_workout_records(&self) -> Result<Vec<WorkoutRecord>, DbError> {
        self.query_workout_records(
            "
            SELECT id, user_id, date, exercise, weight_kg
            FROM workout_logs
            ORDER BY date ASC, id ASC
            ",
            params![],
        )
    }

    fn query_workout_records(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<WorkoutRecord>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok(WorkoutRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                date: row.get(2)?,
                exercise: row.get(3)?,
                weight_kg: row.get(4)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(workout_from_row(row?)?);
        }
        Ok(records)
    }

    /// Inserts or updates a roster entry keyed by user ID.
    pub fn upsert_roster_entry(&mut self, entry: &RosterEntry) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO roster (user_id, display_name, rank, unit, role, qualifications)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                display_name = excluded.display_name,
                rank = excluded.rank,
                unit = excluded.unit,
                role = excluded.role,
                qualifications = excluded.qualifications
            ",
            params![
                entry.user.as_str(),
                entry.display_name,
                entry.rank,
                entry.unit,
                entry.role.as_str(),
                join_qualifications(&entry.qualifications),
            ],
        )?;
        debug!(user = %entry.user, "upserted roster entry");
        Ok(())
    }

    /// Fetches one roster entry, if present.
    pub fn fetch_roster_entry(&self, user: &UserId) -> Result<Option<RosterEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT user_id, display_name, rank, unit, role, qualifications
            FROM roster
            WHERE user_id = ?
            ",
        )?;
        let mut rows = stmt.query_map(params![user.as_str()], roster_row)?;
        match rows.next() {
            Some(row) => Ok(Some(roster_from_row(row?)?)),
            None => Ok(None),
        }
    }

    /// Lists the whole roster, ordered by unit then user ID.
    pub fn list_roster(&self) -> Result<Vec<RosterEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT user_id, display_name, rank, unit, role, qualifications
            FROM roster
            ORDER BY unit ASC, user_id ASC
            ",
        )?;
        let rows = stmt.query_map([], roster_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(roster_from_row(row?)?);
        }
        Ok(entries)
    }
}

#[derive(Debug)]
struct DriveRow {
    id: String,
    user_id: String,
    date: String,
    vehicle_type: String,
    vehicle_id: String,
    initial_odometer_km: f64,
    final_odometer_km: f64,
}

#[derive(Debug)]
struct WorkoutRow {
    id: String,
    user_id: String,
    date: String,
    exercise: String,
    weight_kg: f64,
}

#[derive(Debug)]
struct RosterRow {
    user_id: String,
    display_name: String,
    rank: String,
    unit: String,
    role: String,
    qualifications: String,
}

fn roster_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RosterRow> {
    Ok(RosterRow {
        user_id: row.get(0)?,
        display_name: row.get(1)?,
        rank: row.get(2)?,
        unit: row.get(3)?,
        role: row.get(4)?,
        qualifications: row.get(5)?,
    })
}

fn drive_from_row(row: DriveRow) -> Result<DriveRecord, DbError> {
    let date = parse_date(&row.date, &row.id)?;
    let invalid = |source| DbError::InvalidRecord {
        record_id: row.id.clone(),
        source,
    };
    // Distance is recomputed by the constructor, so a stored distance can
    // never drift from the odometer readings.
    DriveRecord::new(
        UserId::new(row.user_id).map_err(invalid)?,
        date,
        row.vehicle_type.parse::<VehicleType>().map_err(invalid)?,
        VehicleId::new(row.vehicle_id).map_err(invalid)?,
        Kilometers::new(row.initial_odometer_km).map_err(invalid)?,
        Kilometers::new(row.final_odometer_km).map_err(invalid)?,
    )
    .map_err(invalid)
}

fn workout_from_row(row: WorkoutRow) -> Result<WorkoutRecord, DbError> {
    let date = parse_date(&row.date, &row.id)?;
    let invalid = |source| DbError::InvalidRecord {
        record_id: row.id.clone(),
        source,
    };
    WorkoutRecord::new(
        UserId::new(row.user_id).map_err(invalid)?,
        date,
        row.exercise,
        Kilograms::new(row.weight_kg).map_err(invalid)?,
    )
    .map_err(invalid)
}

fn roster_from_row(row: RosterRow) -> Result<RosterEntry, DbError> {
    let invalid = |source| DbError::InvalidRecord {
        record_id: row.user_id.clone(),
        source,
    };
    Ok(RosterEntry {
        user: UserId::new(row.user_id.clone()).map_err(invalid)?,
        display_name: row.display_name,
        rank: row.rank,
        unit: row.unit,
        role: row.role.parse().map_err(invalid)?,
        qualifications: split_qualifications(&row.qualifications, &row.user_id)?,
    })
}

fn join_qualifications(qualifications: &[VehicleType]) -> String {
    qualifications
        .iter()
        .map(VehicleType::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn split_qualifications(joined: &str, record_id: &str) -> Result<Vec<VehicleType>, DbError> {
    if joined.is_empty() {
        return Ok(Vec::new());
    }
    joined
        .split(',')
        .map(|part| {
            part.parse::<VehicleType>().map_err(|source| DbError::InvalidRecord {
                record_id: record_id.to_string(),
                source,
            })
        })
        .collect()
}

fn deterministic_record_id(parts: &[&str]) -> String {
    let content = parts.join("|");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, content.as_bytes()).to_string()
}

fn parse_date(date: &str, record_id: &str) -> Result<NaiveDate, DbError> {
    date.parse().map_err(|source| DbError::DateParse {
        record_id: record_id.to_string(),
        date: date.to_string(),
        source,
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    use dt_core::Role;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn drive(user: &str, day: &str, initial: f64, r#final: f64) -> DriveRecord {
        DriveRecord::new(
            UserId::new(user).unwrap(),
            date(day),
            VehicleType::Terrex,
            VehicleId::new("MID-1").unwrap(),
            Kilometers::new(initial).unwrap(),
            Kilometers::new(r#final).unwrap(),
        )
        .unwrap()
    }

    fn workout(user: &str, day: &str, exercise: &str, weight: f64) -> WorkoutRecord {
        WorkoutRecord::new(
            UserId::new(user).unwrap(),
            date(day),
            exercise,
            Kilograms::new(weight).unwrap(),
        )
        .unwrap()
    }

    fn roster_entry(user: &str, unit: &str) -> RosterEntry {
        RosterEntry {
            user: UserId::new(user).unwrap(),
            display_name: format!("CPL {user}"),
            rank: "CPL".to_string(),
            unit: unit.to_string(),
            role: Role::Trooper,
            qualifications: vec![VehicleType::Terrex, VehicleType::Belrex],
        }
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        let drive_columns = table_columns(&db.conn, "drive_logs");
        assert_eq!(
            drive_columns,
            vec![
                "id",
                "user_id",
                "date",
                "vehicle_type",
                "vehicle_id",
                "initial_odometer_km",
                "final_odometer_km",
                "distance_km",
                "logged_at",
            ]
        );

        let workout_columns = table_columns(&db.conn, "workout_logs");
        assert_eq!(
            workout_columns,
            vec!["id", "user_id", "date", "exercise", "weight_kg", "logged_at"]
        );

        let roster_columns = table_columns(&db.conn, "roster");
        assert_eq!(
            roster_columns,
            vec!["user_id", "display_name", "rank", "unit", "role", "qualifications"]
        );
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    #[test]
    fn init_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("dt.db");
        drop(Database::open(&path).unwrap());
        // Re-opening runs init again on the populated file.
        let db = Database::open(&path);
        assert!(db.is_ok());
    }

    #[test]
    fn drive_records_roundtrip_in_date_order() {
        let mut db = Database::open_in_memory().unwrap();
        db.append_drive(&drive("alice", "2025-06-20", 1010.0, 1015.0))
            .unwrap();
        db.append_drive(&drive("alice", "2025-06-01", 1000.0, 1010.0))
            .unwrap();

        let records = db
            .fetch_drive_records(&UserId::new("alice").unwrap())
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date("2025-06-01"));
        assert_eq!(records[1].date, date("2025-06-20"));
        assert!((records[0].distance_km.value() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn appending_the_same_trip_twice_is_idempotent() {
        let mut db = Database::open_in_memory().unwrap();
        let record = drive("alice", "2025-06-20", 1010.0, 1015.0);
        let first = db.append_drive(&record).unwrap();
        let second = db.append_drive(&record).unwrap();
        assert_eq!(first, second);

        let records = db
            .fetch_drive_records(&UserId::new("alice").unwrap())
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn drive_fetch_scopes_to_user() {
        let mut db = Database::open_in_memory().unwrap();
        db.append_drive(&drive("alice", "2025-06-20", 1010.0, 1015.0))
            .unwrap();
        db.append_drive(&drive("bob", "2025-06-21", 2000.0, 2003.0))
            .unwrap();

        let alice = db
            .fetch_drive_records(&UserId::new("alice").unwrap())
            .unwrap();
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].user.as_str(), "alice");

        let all = db.fetch_all_drive_records().unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn identical_workout_entries_are_kept_separately() {
        let mut db = Database::open_in_memory().unwrap();
        let record = workout("alice", "2025-06-20", "squat", 100.0);
        db.append_workout(&record).unwrap();
        db.append_workout(&record).unwrap();

        let records = db
            .fetch_workout_records(&UserId::new("alice").unwrap())
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn roster_upsert_replaces_existing_entry() {
        let mut db = Database::open_in_memory().unwrap();
        db.upsert_roster_entry(&roster_entry("alice", "Platoon 1"))
            .unwrap();

        let mut moved = roster_entry("alice", "Platoon 2");
        moved.qualifications = vec![VehicleType::Belrex];
        db.upsert_roster_entry(&moved).unwrap();

        let fetched = db
            .fetch_roster_entry(&UserId::new("alice").unwrap())
            .unwrap()
            .expect("entry should exist");
        assert_eq!(fetched.unit, "Platoon 2");
        assert_eq!(fetched.qualifications, vec![VehicleType::Belrex]);

        assert!(
            db.fetch_roster_entry(&UserId::new("nobody").unwrap())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn roster_lists_in_unit_then_user_order() {
        let mut db = Database::open_in_memory().unwrap();
        db.upsert_roster_entry(&roster_entry("carol", "Platoon 2"))
            .unwrap();
        db.upsert_roster_entry(&roster_entry("bob", "Platoon 1"))
            .unwrap();
        db.upsert_roster_entry(&roster_entry("alice", "Platoon 1"))
            .unwrap();

        let roster = db.list_roster().unwrap();
        let ids: Vec<&str> = roster.iter().map(|e| e.user.as_str()).collect();
        assert_eq!(ids, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn empty_qualification_list_roundtrips() {
        let mut db = Database::open_in_memory().unwrap();
        let mut entry = roster_entry("dave", "Platoon 3");
        entry.qualifications = Vec::new();
        db.upsert_roster_entry(&entry).unwrap();

        let fetched = db
            .fetch_roster_entry(&UserId::new("dave").unwrap())
            .unwrap()
            .expect("entry should exist");
        assert!(fetched.qualifications.is_empty());
    }
}
