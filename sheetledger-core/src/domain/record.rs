//! Canonical ledger records produced by an import

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schema::Field;

/// Which canonical schema governs an import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Payment,
    Income,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Payment => "payment",
            RecordKind::Income => "income",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "payment" | "payments" => Ok(RecordKind::Payment),
            "income" | "incomes" => Ok(RecordKind::Income),
            other => Err(format!("Unknown record kind: {}", other)),
        }
    }
}

/// A payment made out of a project account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub date: NaiveDate,
    pub beneficiary: String,
    pub account: String,
    pub project: String,
    pub description: String,
    pub total: Decimal,
}

/// Money received for a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub date: NaiveDate,
    pub project: String,
    pub unit: String,
    pub client: String,
    pub description: String,
    pub total: Decimal,
    #[serde(alias = "payment_method")]
    pub payment_method: String,
    #[serde(alias = "payment_proof")]
    pub payment_proof: String,
}

/// Either record shape, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CanonicalRecord {
    Payment(Payment),
    Income(Income),
}

impl CanonicalRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            CanonicalRecord::Payment(_) => RecordKind::Payment,
            CanonicalRecord::Income(_) => RecordKind::Income,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            CanonicalRecord::Payment(p) => p.date,
            CanonicalRecord::Income(i) => i.date,
        }
    }

    pub fn total(&self) -> Decimal {
        match self {
            CanonicalRecord::Payment(p) => p.total,
            CanonicalRecord::Income(i) => i.total,
        }
    }
}

/// Field values of a row that passed validation
///
/// Text values are already trimmed; fields that were not resolved are simply
/// absent and read back as an empty string.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFields {
    pub date: NaiveDate,
    pub total: Decimal,
    text: HashMap<Field, String>,
}

impl ValidatedFields {
    pub fn new(date: NaiveDate, total: Decimal) -> Self {
        Self {
            date,
            total,
            text: HashMap::new(),
        }
    }

    pub fn set_text(&mut self, field: Field, value: impl Into<String>) {
        self.text.insert(field, value.into());
    }

    /// Take a text value out, defaulting to an empty string
    pub fn take_text(&mut self, field: Field) -> String {
        self.text.remove(&field).unwrap_or_default()
    }
}

/// A record shape the import pipeline can assemble
pub trait LedgerRecord: Sized + Serialize {
    const KIND: RecordKind;

    fn from_fields(fields: ValidatedFields) -> Self;

    fn into_canonical(self) -> CanonicalRecord;
}

impl LedgerRecord for Payment {
    const KIND: RecordKind = RecordKind::Payment;

    fn from_fields(mut fields: ValidatedFields) -> Self {
        Self {
            date: fields.date,
            beneficiary: fields.take_text(Field::Beneficiary),
            account: fields.take_text(Field::Account),
            project: fields.take_text(Field::Project),
            description: fields.take_text(Field::Description),
            total: fields.total,
        }
    }

    fn into_canonical(self) -> CanonicalRecord {
        CanonicalRecord::Payment(self)
    }
}

impl LedgerRecord for Income {
    const KIND: RecordKind = RecordKind::Income;

    fn from_fields(mut fields: ValidatedFields) -> Self {
        Self {
            date: fields.date,
            project: fields.take_text(Field::Project),
            unit: fields.take_text(Field::Unit),
            client: fields.take_text(Field::Client),
            description: fields.take_text(Field::Description),
            total: fields.total,
            payment_method: fields.take_text(Field::PaymentMethod),
            payment_proof: fields.take_text(Field::PaymentProof),
        }
    }

    fn into_canonical(self) -> CanonicalRecord {
        CanonicalRecord::Income(self)
    }
}
