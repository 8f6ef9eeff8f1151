//! Import service - spreadsheet ledger import
//!
//! `ImportPipeline` runs the whole normalizer over a decoded grid: locate
//! the header row once, then for each data row build a `RawRow`, resolve
//! every field, normalize and validate. Rows that fail are recorded as
//! rejections; the batch always runs to the end.

use std::marker::PhantomData;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::adapters::reader_for_path;
use crate::config::Config;
use crate::domain::cell::header_labels;
use crate::domain::result::Error;
use crate::domain::schema::DEFAULT_HEADER_SCAN_ROWS;
use crate::domain::{
    CellValue, Field, Grid, ImportSchema, Income, LedgerRecord, Payment, RawRow, RecordKind,
    Rejection, RowOutcome,
};

use super::header::locate_header;
use super::normalize::DateNormalizer;
use super::resolver::{FieldResolver, Resolution, ResolveContext};
use super::validate::{assemble, ResolvedFields};

/// Result of importing one sheet
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport<R> {
    pub kind: RecordKind,
    /// Accepted records, in sheet order
    pub records: Vec<R>,
    pub rejections: Vec<Rejection>,
    /// Data rows processed (header and rows above it excluded)
    pub total_rows: usize,
    /// 0-based index of the detected header row
    pub header_row: Option<usize>,
}

impl<R> ImportReport<R> {
    pub fn accepted_count(&self) -> usize {
        self.records.len()
    }

    pub fn rejection_count(&self) -> usize {
        self.rejections.len()
    }

    /// Rejection reasons as `row N: reason`
    pub fn reasons(&self) -> Vec<String> {
        self.rejections.iter().map(|r| r.to_string()).collect()
    }

    /// No record was accepted (the sheet itself was readable)
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Accepted {} of {} {} rows ({} rejected)",
            self.accepted_count(),
            self.total_rows,
            self.kind,
            self.rejection_count()
        )
    }
}

/// How a grid splits into header and data rows
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub header_row: Option<usize>,
    /// Labels from the header row, absent for headerless sheets
    pub labels: Option<Vec<String>>,
    /// Grid index of the first data row
    pub first_data_row: usize,
}

impl SheetLayout {
    /// Build the label-keyed row for one data row
    pub fn raw_row(&self, cells: &[CellValue]) -> RawRow {
        match &self.labels {
            Some(labels) => RawRow::from_cells(labels, cells),
            None => RawRow::positional(cells),
        }
    }

    pub fn context(&self) -> ResolveContext {
        ResolveContext {
            header_found: self.header_row.is_some(),
        }
    }
}

/// The import normalizer for one record kind
pub struct ImportPipeline<R: LedgerRecord> {
    schema: ImportSchema,
    resolver: FieldResolver,
    dates: DateNormalizer,
    header_scan_rows: usize,
    _record: PhantomData<R>,
}

impl<R: LedgerRecord> Default for ImportPipeline<R> {
    fn default() -> Self {
        Self {
            schema: ImportSchema::for_kind(R::KIND),
            resolver: FieldResolver::default(),
            dates: DateNormalizer::default(),
            header_scan_rows: DEFAULT_HEADER_SCAN_ROWS,
            _record: PhantomData,
        }
    }
}

impl<R: LedgerRecord> ImportPipeline<R> {
    /// Create a pipeline with a custom schema; its kind must match `R`
    pub fn new(schema: ImportSchema) -> crate::domain::result::Result<Self> {
        if schema.kind != R::KIND {
            return Err(Error::validation(format!(
                "Schema for {} cannot build {} records",
                schema.kind,
                R::KIND
            )));
        }
        Ok(Self {
            schema,
            ..Self::default()
        })
    }

    pub fn with_resolver(mut self, resolver: FieldResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_dates(mut self, dates: DateNormalizer) -> Self {
        self.dates = dates;
        self
    }

    pub fn with_header_scan_rows(mut self, rows: usize) -> Self {
        self.header_scan_rows = rows;
        self
    }

    pub fn schema(&self) -> &ImportSchema {
        &self.schema
    }

    pub fn layout(&self, grid: &Grid) -> SheetLayout {
        match locate_header(grid, &self.schema.expected_headers, self.header_scan_rows) {
            Some(idx) => SheetLayout {
                header_row: Some(idx),
                labels: Some(header_labels(&grid[idx])),
                first_data_row: idx + 1,
            },
            None => SheetLayout {
                header_row: None,
                labels: None,
                first_data_row: 0,
            },
        }
    }

    /// Resolve every schema field of one row, keeping the winning strategy
    pub fn resolve_row(&self, row: &RawRow, ctx: &ResolveContext) -> Vec<(Field, Option<Resolution>)> {
        self.schema
            .fields
            .iter()
            .map(|spec| (spec.field, self.resolver.resolve(row, spec, ctx)))
            .collect()
    }

    fn process_row(&self, row_number: usize, row: &RawRow, ctx: &ResolveContext) -> RowOutcome<R> {
        let mut resolved = ResolvedFields::new();
        for (field, resolution) in self.resolve_row(row, ctx) {
            if let Some(resolution) = resolution {
                debug!(row = row_number, field = %field, strategy = resolution.strategy, "field resolved");
                resolved.insert(field, resolution.value);
            }
        }

        match assemble::<R>(&self.schema, &resolved, &self.dates) {
            Ok(record) => RowOutcome::Accepted(record),
            Err(reason) => {
                warn!(row = row_number, kind = %R::KIND, reason = %reason, "row rejected");
                RowOutcome::Rejected(Rejection { row_number, reason })
            }
        }
    }

    /// One outcome per data row, in sheet order
    pub fn outcomes(&self, grid: &Grid) -> (SheetLayout, Vec<RowOutcome<R>>) {
        let layout = self.layout(grid);
        let ctx = layout.context();

        let outcomes = grid
            .iter()
            .enumerate()
            .skip(layout.first_data_row)
            .map(|(idx, cells)| {
                let row = layout.raw_row(cells);
                self.process_row(idx + 1, &row, &ctx)
            })
            .collect();

        (layout, outcomes)
    }

    pub fn run(&self, grid: &Grid) -> ImportReport<R> {
        let (layout, outcomes) = self.outcomes(grid);
        match layout.header_row {
            Some(idx) => info!(kind = %R::KIND, header_row = idx + 1, "header row located"),
            None => info!(kind = %R::KIND, "no header row found, using column positions"),
        }

        let total_rows = outcomes.len();
        let mut records = Vec::new();
        let mut rejections = Vec::new();
        for outcome in outcomes {
            match outcome {
                RowOutcome::Accepted(record) => records.push(record),
                RowOutcome::Rejected(rejection) => rejections.push(rejection),
            }
        }

        let report = ImportReport {
            kind: R::KIND,
            records,
            rejections,
            total_rows,
            header_row: layout.header_row,
        };
        info!(
            kind = %R::KIND,
            accepted = report.accepted_count(),
            rejected = report.rejection_count(),
            "import finished"
        );
        report
    }
}

/// Import service - builds pipelines from configuration
pub struct ImportService {
    config: Config,
}

impl ImportService {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pipeline for `R` using the configured schema and scan window
    pub fn pipeline<R: LedgerRecord>(&self) -> ImportPipeline<R> {
        ImportPipeline {
            schema: self.config.schema_for(R::KIND),
            header_scan_rows: self.config.header_scan_rows,
            ..ImportPipeline::default()
        }
    }

    pub fn import_payments(&self, grid: &Grid) -> ImportReport<Payment> {
        self.pipeline::<Payment>().run(grid)
    }

    pub fn import_incomes(&self, grid: &Grid) -> ImportReport<Income> {
        self.pipeline::<Income>().run(grid)
    }

    /// Decode a file's first sheet
    pub fn read_grid(&self, path: &Path) -> Result<Grid> {
        let reader = reader_for_path(path);
        let grid = reader
            .read_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        debug!(reader = reader.name(), rows = grid.len(), "grid decoded");
        Ok(grid)
    }

    /// Read a file and import it as `R` records
    pub fn import_file<R: LedgerRecord>(&self, path: &Path) -> Result<ImportReport<R>> {
        let grid = self.read_grid(path)?;
        Ok(self.pipeline::<R>().run(&grid))
    }
}
