//! Sheetledger CLI - import payment and income spreadsheets

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sheetledger_core::RecordKind;

mod commands;
mod output;

use commands::{fields, import, inspect, logs};

/// Sheetledger - turn loosely formatted ledger sheets into clean records
#[derive(Parser)]
#[command(name = "sheetledger", version, about, long_about = None)]
struct Cli {
    /// Show debug diagnostics (field resolution, header detection)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a spreadsheet of payments or incomes
    Import {
        /// Record kind: payments or incomes
        kind: RecordKind,
        /// Workbook (xlsx, xls, ods) or CSV/TSV file
        file: PathBuf,
        /// Show the result without writing any records
        #[arg(long)]
        preview: bool,
        /// Append accepted records to this JSON Lines file
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Records per delivery batch
        #[arg(long)]
        batch_size: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a sheet's header and fields are detected
    Inspect {
        /// Record kind: payments or incomes
        kind: RecordKind,
        /// Workbook or CSV/TSV file
        file: PathBuf,
        /// Number of data rows to inspect
        #[arg(long, default_value = "5")]
        rows: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective import schema
    Fields {
        /// Record kind: payments or incomes
        kind: RecordKind,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("SHEETLEDGER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Import {
            kind,
            file,
            preview,
            output,
            batch_size,
            json,
        } => import::run(kind, &file, preview, output, batch_size, json),
        Commands::Inspect { kind, file, rows, json } => inspect::run(kind, &file, rows, json),
        Commands::Fields { kind, json } => fields::run(kind, json),
        Commands::Logs { command } => logs::run(command),
    }
}
