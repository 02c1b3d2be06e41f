//! # Barbería Console Library
//!
//! Back-office console for the barbershop: files returns against sales,
//! keeps the store-credit ledger and shows sales after their returns.
//!
//! ## Module Organization
//! ```text
//! barberia_console/
//! ├── lib.rs          ◄─── You are here (tracing & database setup)
//! ├── cli.rs          ◄─── clap subcommands and dispatch
//! ├── state/
//! │   ├── config.rs   ◄─── Console configuration (env + flags)
//! │   └── snapshot.rs ◄─── Loaded sales, returns, clients, products
//! ├── service/
//! │   ├── backend.rs  ◄─── ReturnBackend / StockService seams
//! │   └── returns.rs  ◄─── Return workflow and credit queries
//! ├── commands/       ◄─── One module per subcommand group
//! └── error.rs        ◄─── ApiError returned by every operation
//! ```
//!
//! ## Data Flow
//! ```text
//! barberia returns create ...
//!        │
//!        ▼
//! ReturnService::propose_return ──► barberia_core::returns (gates, amount)
//!        │
//!        ▼  operator confirms
//! ReturnService::confirm_return ──► ReturnBackend::insert_return
//!        │                          StockService::adjust_stock
//!        ▼
//! Snapshot reloaded from the database
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod service;
pub mod state;

use barberia_db::{Database, DbConfig, DbError, DbResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

use state::ConsoleConfig;

/// Initializes the tracing subscriber for structured logging.
///
/// Logs go to stderr so tables and `--json` output stay clean on stdout.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=barberia=trace` - Show trace for barberia crates only
/// - Default: INFO level
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,barberia=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens (and migrates) the database named by `config`, creating its
/// folder when missing.
pub async fn open_database(config: &ConsoleConfig) -> DbResult<Database> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DbError::ConnectionFailed(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }
    }

    info!(path = %config.database_path.display(), "Opening database");
    Database::new(DbConfig::new(&config.database_path)).await
}
