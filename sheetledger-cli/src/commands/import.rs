//! Import command - import payments or incomes from a spreadsheet

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use sheetledger_core::adapters::JsonLinesSink;
use sheetledger_core::services::{deliver_in_batches, DeliverySummary};
use sheetledger_core::{
    ImportReport, Income, LedgerContext, LedgerRecord, LogEvent, LoggingService, OperationResult,
    Payment, RecordKind,
};

use super::{get_context, get_logger, log_event};
use crate::output::{self, TableRow};

const PREVIEW_ROWS: usize = 10;
const REJECTION_ROWS: usize = 20;

pub fn run(
    kind: RecordKind,
    file: &Path,
    preview: bool,
    output: Option<PathBuf>,
    batch_size: Option<usize>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();
    let options = ImportOptions {
        preview,
        output,
        batch_size: batch_size.unwrap_or(ctx.config.batch_size),
        json,
    };

    match kind {
        RecordKind::Payment => import_kind::<Payment>(&ctx, &logger, file, &options),
        RecordKind::Income => import_kind::<Income>(&ctx, &logger, file, &options),
    }
}

struct ImportOptions {
    preview: bool,
    output: Option<PathBuf>,
    batch_size: usize,
    json: bool,
}

fn import_kind<R>(
    ctx: &LedgerContext,
    logger: &Option<LoggingService>,
    file: &Path,
    options: &ImportOptions,
) -> Result<()>
where
    R: LedgerRecord + TableRow + Clone,
{
    let report = match ctx.import_service.import_file::<R>(file) {
        Ok(report) => report,
        Err(e) => {
            log_event(
                logger,
                LogEvent::new("import_failed")
                    .with_kind(R::KIND)
                    .with_command("import")
                    .with_error(format!("{:#}", e)),
            );
            return Err(e);
        }
    };

    let delivery = match (&options.output, options.preview) {
        (Some(path), false) if !report.is_empty() => {
            Some(deliver(&report, path, options.batch_size, options.json)?)
        }
        _ => None,
    };

    let mut event = LogEvent::new("import_completed")
        .with_kind(R::KIND)
        .with_command(if options.preview { "import --preview" } else { "import" })
        .with_counts(report.accepted_count(), report.rejection_count());
    if let Some(summary) = delivery.as_ref().filter(|s| s.failed_batches > 0) {
        event = event
            .with_error(summary.summary())
            .with_error_details(summary.errors.join("\n"));
    }
    log_event(logger, event);

    if options.json {
        let result = match &delivery {
            Some(summary) => {
                let mut context = HashMap::new();
                context.insert("delivery".to_string(), serde_json::to_value(summary)?);
                OperationResult::ok_with_context(&report, context)
            }
            None => OperationResult::ok(&report),
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_report(&report, options.preview);

    match (delivery, &options.output) {
        (Some(summary), Some(path)) => {
            println!();
            if summary.is_complete() {
                output::success(&format!("Wrote {} to {}", summary.summary(), path.display()));
            } else {
                output::warning(&format!("Wrote {} to {}", summary.summary(), path.display()));
                for error in &summary.errors {
                    println!("  {}", error.red());
                }
            }
        }
        (None, None) if !options.preview && !report.is_empty() => {
            println!();
            output::info("Nothing written. Use --output FILE to save accepted records.");
        }
        _ => {}
    }

    Ok(())
}

fn deliver<R: LedgerRecord + Clone>(
    report: &ImportReport<R>,
    path: &Path,
    batch_size: usize,
    quiet: bool,
) -> Result<DeliverySummary> {
    let records: Vec<_> = report
        .records
        .iter()
        .cloned()
        .map(LedgerRecord::into_canonical)
        .collect();
    let sink = JsonLinesSink::new(path);

    let bar = if quiet || !atty::is(atty::Stream::Stderr) {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(records.len() as u64)
    };
    bar.set_style(ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} records {msg}")?);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let summary = runtime.block_on(deliver_in_batches(&sink, &records, batch_size, |progress| {
        bar.set_position(progress.processed as u64);
        if !progress.succeeded {
            bar.set_message(format!("(batch {} failed)", progress.batch));
        }
    }))?;
    bar.finish_and_clear();

    Ok(summary)
}

fn print_report<R: TableRow>(report: &ImportReport<R>, preview: bool) {
    if preview {
        println!("{}", "PREVIEW MODE - No records written".yellow());
        println!();
    }

    match report.header_row {
        Some(idx) => println!("Header found on row {}", idx + 1),
        None => println!("No header row found; using column positions"),
    }

    if report.is_empty() {
        output::warning(&format!(
            "No valid records found ({} rows checked)",
            report.total_rows
        ));
    } else {
        output::success(&report.summary());
    }

    if report.rejection_count() > 0 {
        println!();
        println!("{}", "Rejected rows:".red().bold());
        let mut table = output::create_table();
        table.set_header(vec!["Row", "Reason"]);
        for rejection in report.rejections.iter().take(REJECTION_ROWS) {
            table.add_row(vec![rejection.row_number.to_string(), rejection.reason.to_string()]);
        }
        println!("{}", table);
        if report.rejection_count() > REJECTION_ROWS {
            println!("... and {} more", report.rejection_count() - REJECTION_ROWS);
        }
    }

    if !report.is_empty() {
        println!();
        println!("{}", output::record_table(&report.records, PREVIEW_ROWS));
        if report.records.len() > PREVIEW_ROWS {
            println!("... and {} more", report.records.len() - PREVIEW_ROWS);
        }
    }
}
