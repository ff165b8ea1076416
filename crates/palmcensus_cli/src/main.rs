//! `palmcensus` command-line entry point.
//!
//! # Responsibility
//! - Load configuration, open the census database and run one use-case.
//! - Print the resulting structure as pretty JSON on stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use palmcensus_core::db::open_db;
use palmcensus_core::{
    init_logging, parse_role, CensusService, Config, Role, RoleError, SqliteRecordStore,
};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "palmcensus", version, about = "Palm plantation census dashboard data")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "PALMCENSUS_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database path; overrides `database.path`.
    #[arg(long, env = "PALMCENSUS_DB")]
    db: Option<PathBuf>,

    /// Role of the authenticated caller (admin|manager|viewer).
    #[arg(long, env = "PALMCENSUS_ROLE", default_value = "viewer", value_parser = role_arg)]
    role: Role,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the schema and seed demonstration data when empty.
    Init,
    /// Company profile, tree totals and latest measurement.
    Dashboard,
    /// Summed counts over the most recent census operations.
    CensusSummary {
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Yield projection, tree health tiers and recommendations.
    Monitoring,
    /// Tree locations for the map layer.
    Trees,
}

fn role_arg(value: &str) -> Result<Role, RoleError> {
    parse_role(value)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(log_dir) = &config.logging.dir {
        init_logging(&config.logging.level, log_dir).context("initializing logging")?;
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.database.path.clone());
    let conn = open_db(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;
    let store = SqliteRecordStore::try_new(&conn)?;
    let service = CensusService::with_settings(store, config.service_settings());

    info!(
        "event=cli_command module=cli status=start role={} command={:?}",
        cli.role, cli.command
    );
    match cli.command {
        Command::Init => print_json(&service.seed_sample_data(cli.role)?),
        Command::Dashboard => print_json(&service.dashboard(cli.role)?),
        Command::CensusSummary { limit } => print_json(&service.census_summary(cli.role, limit)?),
        Command::Monitoring => print_json(&service.monitoring(cli.role)?),
        Command::Trees => print_json(&service.tree_locations(cli.role)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
