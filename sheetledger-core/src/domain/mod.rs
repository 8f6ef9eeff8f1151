//! Core domain entities
//!
//! Cells, rows, schemas and records. These are pure data structures with
//! no I/O; the import logic that works on them lives in `services`.

pub mod cell;
pub mod outcome;
mod record;
pub mod result;
pub mod schema;

pub use cell::{CellValue, Grid, RawRow};
pub use outcome::{RejectReason, Rejection, RowOutcome};
pub use record::{CanonicalRecord, Income, LedgerRecord, Payment, RecordKind, ValidatedFields};
pub use schema::{Field, FieldSpec, FieldType, ImportSchema, MonthTable};
