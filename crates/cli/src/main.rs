//! Promptdoc CLI
//!
//! Main entry point for the promptdoc command-line tool: prompt catalog
//! management, document processing, and audit history queries.

mod commands;

use clap::{Parser, Subcommand};
use commands::{HistoryCommand, LogsCommand, ProcessCommand, PromptCommand};
use promptdoc_core::config::{AppConfig, StorageBackend, ANON_USER};
use promptdoc_core::{logging, AppError, AppResult};
use promptdoc_processor::{AuditLogLayer, DocumentProcessor, SqliteAuditLog};
use promptdoc_store::{MemoryStore, PromptStore, SnapshotStore, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Promptdoc CLI - versioned prompt templates and document processing
#[derive(Parser, Debug)]
#[command(name = "promptdoc")]
#[command(about = "Versioned prompt templates with pluggable generation backends", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding durable state (snapshot file, database)
    #[arg(long, global = true, env = "PROMPTDOC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "PROMPTDOC_CONFIG")]
    config: Option<PathBuf>,

    /// Storage backend (memory, snapshot, sqlite)
    #[arg(short, long, global = true, env = "PROMPTDOC_STORAGE")]
    storage: Option<String>,

    /// Generation provider (mock, openai, gemini)
    #[arg(short, long, global = true, env = "PROMPTDOC_PROVIDER")]
    provider: Option<String>,

    /// Caller identity
    #[arg(short, long, global = true, env = "PROMPTDOC_USER", default_value = ANON_USER)]
    user: String,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the prompt catalog and activations
    Prompt(PromptCommand),

    /// Run a document through the active prompt for a purpose
    Process(ProcessCommand),

    /// Show processed-request history
    History(HistoryCommand),

    /// Show mirrored application logs
    Logs(LogsCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let storage = match cli.storage.as_deref() {
        Some(name) => Some(StorageBackend::parse(name).ok_or_else(|| {
            AppError::Configuration(format!("Unknown storage backend: {}", name))
        })?),
        None => None,
    };

    let config = AppConfig::load_from(cli.config.clone())?.with_overrides(
        cli.data_dir.clone(),
        storage,
        cli.provider.clone(),
        cli.log_level.clone(),
        cli.verbose,
        cli.no_color,
    );

    config.ensure_data_dir()?;

    // The audit log doubles as the sink for mirrored application logs.
    let audit = Arc::new(SqliteAuditLog::open(&config.database_path())?);

    logging::init_logging(
        config.log_level.as_deref(),
        config.no_color,
        Some(Box::new(AuditLogLayer::new(Arc::clone(&audit)))),
    )?;

    tracing::info!("Promptdoc CLI starting");
    tracing::debug!("Storage backend: {}", config.storage.as_str());
    tracing::debug!("Default provider: {}", config.providers.default_provider);

    let store = build_store(&config)?;

    let command_name = match &cli.command {
        Commands::Prompt(_) => "prompt",
        Commands::Process(_) => "process",
        Commands::History(_) => "history",
        Commands::Logs(_) => "logs",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Prompt(cmd) => cmd.execute(store.as_ref(), &cli.user),
        Commands::Process(cmd) => {
            let processor = DocumentProcessor::new(
                Arc::clone(&store),
                audit.clone(),
                config.providers.clone(),
            );
            cmd.execute(&processor, &config, &cli.user).await
        }
        Commands::History(cmd) => cmd.execute(audit.as_ref()),
        Commands::Logs(cmd) => cmd.execute(audit.as_ref()),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}

/// Construct the configured store strategy.
fn build_store(config: &AppConfig) -> AppResult<Arc<dyn PromptStore>> {
    Ok(match config.storage {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Snapshot => Arc::new(SnapshotStore::open(config.snapshot_path())?),
        StorageBackend::Sqlite => Arc::new(SqliteStore::open(&config.database_path())?),
    })
}
