//! Inspect command - show header detection and field resolution

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use sheetledger_core::{CellValue, Field, Income, LedgerContext, LedgerRecord, Payment, RecordKind};

use super::{get_context, get_logger};
use crate::output;

#[derive(Serialize)]
struct InspectedField {
    field: Field,
    value: Option<CellValue>,
    strategy: Option<&'static str>,
}

#[derive(Serialize)]
struct InspectedRow {
    row_number: usize,
    fields: Vec<InspectedField>,
}

#[derive(Serialize)]
struct Inspection {
    kind: RecordKind,
    header_row: Option<usize>,
    labels: Option<Vec<String>>,
    rows: Vec<InspectedRow>,
}

pub fn run(kind: RecordKind, file: &Path, rows: usize, json: bool) -> Result<()> {
    let ctx = get_context()?;
    if let Some(logger) = get_logger() {
        let _ = logger.log_command("inspect");
    }
    let inspection = match kind {
        RecordKind::Payment => inspect::<Payment>(&ctx, file, rows)?,
        RecordKind::Income => inspect::<Income>(&ctx, file, rows)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&inspection)?);
        return Ok(());
    }

    print_inspection(&inspection);
    Ok(())
}

fn inspect<R: LedgerRecord>(ctx: &LedgerContext, file: &Path, rows: usize) -> Result<Inspection> {
    let grid = ctx.import_service.read_grid(file)?;
    let pipeline = ctx.import_service.pipeline::<R>();
    let layout = pipeline.layout(&grid);
    let resolve_ctx = layout.context();

    let inspected = grid
        .iter()
        .enumerate()
        .skip(layout.first_data_row)
        .take(rows)
        .map(|(idx, cells)| {
            let row = layout.raw_row(cells);
            InspectedRow {
                row_number: idx + 1,
                fields: pipeline
                    .resolve_row(&row, &resolve_ctx)
                    .into_iter()
                    .map(|(field, resolution)| InspectedField {
                        field,
                        strategy: resolution.as_ref().map(|r| r.strategy),
                        value: resolution.map(|r| r.value),
                    })
                    .collect(),
            }
        })
        .collect();

    Ok(Inspection {
        kind: R::KIND,
        header_row: layout.header_row,
        labels: layout.labels,
        rows: inspected,
    })
}

fn print_inspection(inspection: &Inspection) {
    match (&inspection.header_row, &inspection.labels) {
        (Some(idx), Some(labels)) => {
            output::info(&format!("Header row: {}", idx + 1));
            println!("  Labels: {}", labels.join(" | "));
        }
        _ => output::warning("No header row found; fields resolve by column position"),
    }

    if inspection.rows.is_empty() {
        println!();
        println!("No data rows.");
        return;
    }

    for row in &inspection.rows {
        println!();
        println!("{}", format!("Row {}", row.row_number).bold());

        let mut table = output::create_table();
        table.set_header(vec!["Field", "Value", "Resolved by"]);
        for field in &row.fields {
            let value = field
                .value
                .as_ref()
                .map(CellValue::as_text)
                .unwrap_or_default();
            let strategy = match field.strategy {
                Some(name) => name.to_string(),
                None => "unresolved".dimmed().to_string(),
            };
            table.add_row(vec![field.field.to_string(), value, strategy]);
        }
        println!("{}", table);
    }
}
