use std::io::{BufWriter, Write, stdout};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dt_cli::commands::{export, fitness, log, roster, status, team};
use dt_cli::{Cli, Commands, Config, LogEntry, RosterAction};
use dt_core::{CurrencyConfig, FitnessConfig};

/// Load config and open the database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(dt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = dt_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let today = Local::now().date_naive();
    let stdout = stdout();
    let mut out = BufWriter::new(stdout.lock());

    match &cli.command {
        Some(Commands::Log { entry }) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            match entry {
                LogEntry::Drive {
                    user,
                    date,
                    vehicle_type,
                    vehicle_id,
                    initial_km,
                    final_km,
                } => {
                    log::drive(
                        &mut out,
                        &mut db,
                        user,
                        *date,
                        *vehicle_type,
                        vehicle_id,
                        *initial_km,
                        *final_km,
                        today,
                    )?;
                }
                LogEntry::Workout {
                    user,
                    date,
                    exercise,
                    weight_kg,
                } => {
                    log::workout(&mut out, &mut db, user, *date, exercise, *weight_kg, today)?;
                }
            }
        }
        Some(Commands::Status { user, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            status::run(&mut out, &db, user, today, *json, &CurrencyConfig::default())?;
        }
        Some(Commands::Fitness { user, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            fitness::run(&mut out, &db, user, today, *json, &FitnessConfig::default())?;
        }
        Some(Commands::Team { unit, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            team::run(
                &mut out,
                &db,
                unit.as_deref(),
                today,
                *json,
                &CurrencyConfig::default(),
            )?;
        }
        Some(Commands::Roster { action }) => match action {
            RosterAction::Add {
                user,
                name,
                rank,
                unit,
                role,
                qualifications,
            } => {
                let (mut db, _config) = open_database(cli.config.as_deref())?;
                roster::add(
                    &mut out,
                    &mut db,
                    user,
                    name,
                    rank,
                    unit,
                    *role,
                    qualifications,
                )?;
            }
            RosterAction::List { json } => {
                let (db, _config) = open_database(cli.config.as_deref())?;
                roster::list(&mut out, &db, *json)?;
            }
        },
        Some(Commands::Export) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            export::run(&mut out, &db)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    out.flush()?;
    Ok(())
}
