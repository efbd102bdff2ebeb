//! notes-init - create or verify the notes database.

use anyhow::{Context, Result};
use clap::Parser;
use notes_store::{connection_info, Config, Database, InitReport, StoreError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "notes-init", version, about = "Create or verify the notes database")]
struct Cli {
    /// Database file (overrides the config file)
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Config file (defaults to the XDG config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write db_connection.txt and db_visualizer/sqlite.env to the current directory
    #[arg(long)]
    write_connection_info: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("notes=info".parse()?))
        .init();
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::SchemaConflict { .. }) => 2,
        Some(StoreError::StorageUnavailable(_) | StoreError::Io(_)) => 3,
        _ => 1,
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("Starting notes-init v{}", VERSION);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let db_path = absolute(cli.db.unwrap_or_else(|| config.database.resolved_path()))?;
    ensure_parent_dir(&db_path)?;

    if db_path.exists() {
        info!("Database already exists at {}", db_path.display());
    } else {
        info!("Creating new database at {}", db_path.display());
    }

    let db = Database::open_at(&db_path, config.database.busy_timeout())?;
    let report = db.initialize(&config.app_info)?;
    info!("Database initialized");

    if cli.write_connection_info {
        let out_dir = std::env::current_dir()?;
        match connection_info::write(&out_dir, &db_path) {
            Ok(written) => {
                for path in written {
                    info!("Wrote {}", path.display());
                }
            }
            Err(e) => warn!("Could not save connection info: {}", e),
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", status_line(&db_path, &report));
    }

    Ok(())
}

/// Create the directory that will hold the database file.
fn ensure_parent_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(StoreError::Io)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn status_line(db_path: &Path, report: &InitReport) -> String {
    [
        "SQLite setup complete".to_string(),
        format!("DB={}", db_path.display()),
        format!("tables={}", report.table_count),
        format!("app_info_records={}", report.app_info_records),
        format!("notes_table={}", report.notes_table.as_str()),
    ]
    .join(" | ")
}
