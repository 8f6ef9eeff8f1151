//! Sheetledger Core - spreadsheet import for payment and income ledgers
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: cells, rows, schemas, canonical records and outcomes
//! - **ports**: traits for grid decoding and record storage
//! - **services**: the import pipeline, batched delivery and the event log
//! - **adapters**: calamine/csv readers and record sinks

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use config::Config;
use services::ImportService;

pub use domain::result::{Error, OperationResult};
pub use domain::{
    CanonicalRecord, CellValue, Field, Grid, ImportSchema, Income, LedgerRecord, Payment,
    RawRow, RecordKind, RejectReason, Rejection,
};
pub use services::{EntryPoint, ImportReport, LogEvent, LoggingService};

/// Entry point for library users
///
/// Holds the data directory, the loaded configuration and the import
/// service built from it.
pub struct LedgerContext {
    pub data_dir: PathBuf,
    pub config: Config,
    pub import_service: ImportService,
}

impl LedgerContext {
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
        let config = Config::load(data_dir).context("Failed to load settings")?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            import_service: ImportService::new(config.clone()),
            config,
        })
    }

    /// Open the event log in the data directory
    pub fn logger(&self, entry_point: EntryPoint) -> Result<LoggingService> {
        LoggingService::new(&self.data_dir, entry_point, env!("CARGO_PKG_VERSION"))
    }
}
