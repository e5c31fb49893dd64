//! Operator tool for a votebox database.
//!
//! # Responsibility
//! - Seed the catalog, print tallies, run the repair pass and reset, without
//!   going through the HTTP server.

use clap::{Parser, Subcommand};
use log::error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use votebox_core::db::open_db;
use votebox_core::{
    core_version, init_logging, AdminSecret, CatalogRepository, CatalogSeed, RepairService,
    ResetController, SqliteCatalogRepository, SqliteRepairRepository, SqliteTallyStore,
    SqliteVoteLedger,
};

/// votebox operator tool
#[derive(Parser, Debug)]
#[command(name = "votebox_cli")]
#[command(version = core_version(), about, long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    db_path: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "VOTEBOX_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Upsert catalog entries from a `{"projects": [...]}` JSON file
    Seed {
        /// Seed file path
        file: PathBuf,
    },

    /// Print entries with their tallies as JSON
    #[command(alias = "ls")]
    List,

    /// Rewrite drifted tallies to the ledger counts
    Repair,

    /// Zero every tally and clear the ledger
    Reset {
        /// Admin secret, checked against `ADMIN_SECRET`
        secret: String,
    },
}

fn run(db_path: &Path, command: Command) -> Result<String, String> {
    let mut conn = open_db(db_path).map_err(|err| format!("open failed: {err}"))?;

    match command {
        Command::Seed { file } => {
            let raw = std::fs::read_to_string(&file)
                .map_err(|err| format!("cannot read `{}`: {err}", file.display()))?;
            let seed = CatalogSeed::from_json(&raw).map_err(|err| err.to_string())?;
            let inserted = SqliteCatalogRepository::new(&mut conn)
                .seed_entries(&seed.projects)
                .map_err(|err| err.to_string())?;
            Ok(format!(
                "seeded {} entries ({inserted} new)",
                seed.projects.len()
            ))
        }
        Command::List => {
            let entries = SqliteCatalogRepository::new(&mut conn)
                .list_entries()
                .map_err(|err| err.to_string())?;
            serde_json::to_string_pretty(&entries).map_err(|err| err.to_string())
        }
        Command::Repair => {
            let report = RepairService::new(SqliteRepairRepository::new(&mut conn))
                .reconcile()
                .map_err(|err| err.to_string())?;
            let mut lines = vec![format!(
                "checked {} entries, adjusted {}, orphaned records {}",
                report.entries_checked,
                report.entries_adjusted(),
                report.orphaned_records
            )];
            lines.extend(report.adjustments.iter().map(|adjustment| {
                format!(
                    "  entry {}: {} -> {}",
                    adjustment.entry_id, adjustment.previous_votes, adjustment.ledger_votes
                )
            }));
            Ok(lines.join("\n"))
        }
        Command::Reset { secret } => {
            // Same secret source as the server.
            let configured = std::env::var("ADMIN_SECRET").unwrap_or_default();
            let report = ResetController::new(
                SqliteVoteLedger::new(&conn),
                SqliteTallyStore::new(&conn),
                AdminSecret::new(configured),
            )
            .reset(&secret)
            .map_err(|err| err.to_string())?;
            Ok(format!(
                "reset {} entries, cleared {} ledger records",
                report.entries_zeroed, report.records_cleared
            ))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli.log_level, None) {
        eprintln!("votebox_cli: {err}");
        return ExitCode::FAILURE;
    }

    match run(&cli.db_path, cli.command) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("votebox_cli: {err}");
            ExitCode::FAILURE
        }
    }
}
