//! Drive currency tracker CLI library.
//!
//! This crate provides the CLI interface for the drive currency tracker.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, LogEntry, RosterAction};
pub use config::Config;
