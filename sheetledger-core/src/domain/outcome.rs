//! Per-row import outcomes

use std::fmt;

use serde::{Serialize, Serializer};

use super::schema::Field;

/// Why a row was not turned into a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingDate,
    MissingRequiredField(Field),
    InvalidDateFormat,
    MissingTotal,
    InvalidTotal,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingDate => f.write_str("missing_date"),
            RejectReason::MissingRequiredField(field) => {
                write!(f, "missing_required_field({})", field)
            }
            RejectReason::InvalidDateFormat => f.write_str("invalid_date_format"),
            RejectReason::MissingTotal => f.write_str("missing_total"),
            RejectReason::InvalidTotal => f.write_str("invalid_total"),
        }
    }
}

impl Serialize for RejectReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A rejected row, numbered as it appears in the sheet (1-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub row_number: usize,
    pub reason: RejectReason,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row_number, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<R> {
    Accepted(R),
    Rejected(Rejection),
}
