//! CLI command implementations

pub mod fields;
pub mod import;
pub mod inspect;
pub mod logs;

use std::path::PathBuf;

use anyhow::{Context, Result};
use sheetledger_core::config::default_data_dir;
use sheetledger_core::{EntryPoint, LedgerContext, LogEvent, LoggingService};

/// Data directory from `SHEETLEDGER_DIR` or `~/.sheetledger`
pub fn get_data_dir() -> Result<PathBuf> {
    default_data_dir()
}

pub fn get_context() -> Result<LedgerContext> {
    let data_dir = get_data_dir()?;
    LedgerContext::new(&data_dir).context("Failed to initialize sheetledger")
}

/// Get the event log for CLI operations
///
/// Returns None if the log cannot be opened; imports still run without it.
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    match LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")) {
        Ok(service) => Some(service),
        Err(e) => {
            tracing::debug!(error = %e, "event log unavailable");
            None
        }
    }
}

/// Log an event, ignoring failures
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}
