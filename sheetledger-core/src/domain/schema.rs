//! Import schemas: header synonyms, required fields and column positions
//!
//! The tables here are plain data. `ImportSchema::payment()` and
//! `ImportSchema::income()` build the defaults; callers (and `Config`) can
//! extend or replace them before handing a schema to the pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::RecordKind;

/// Rows scanned when looking for a header row
pub const DEFAULT_HEADER_SCAN_ROWS: usize = 10;

/// Upper bound (exclusive) for the last-resort total scan
pub const TOTAL_SCAN_CEILING: f64 = 1_000_000.0;

/// Days between the spreadsheet epoch (1899-12-30) and 1970-01-01
pub const SERIAL_EPOCH_OFFSET_DAYS: i64 = 25_569;

// Payment header synonyms, in lookup order

pub const PAYMENT_DATE_SYNONYMS: &[&str] = &[
    "التاريخ من",
    "تاريخ من",
    "Date From",
    "date from",
    "dateFrom",
    "التاريخ الى",
    "تاريخ الى",
    "Date To",
    "date to",
    "dateTo",
    "تاريخ",
    "Date",
    "date",
    "التاريخ",
];
pub const BENEFICIARY_SYNONYMS: &[&str] = &["المستفيد", "Beneficiary", "beneficiary"];
pub const ACCOUNT_SYNONYMS: &[&str] = &["الحساب", "Account", "account"];
pub const PROJECT_SYNONYMS: &[&str] = &["المشروع", "Project", "project"];
pub const DESCRIPTION_SYNONYMS: &[&str] = &[
    "وصف البند",
    "وصف",
    "Description",
    "description",
    "الوصف",
    "Description of Item",
];
pub const TOTAL_SYNONYMS: &[&str] = &["الاجمالي", "الإجمالي", "Total", "total", "Amount", "amount"];

pub const PAYMENT_EXPECTED_HEADERS: &[&str] = &[
    "التاريخ من",
    "التاريخ الى",
    "المستفيد",
    "الحساب",
    "المشروع",
    "وصف",
    "الاجمالي",
    "وصف البند",
];

// Income header synonyms

pub const INCOME_DATE_SYNONYMS: &[&str] = &["التاريخ", "تاريخ", "Date", "date"];
pub const UNIT_SYNONYMS: &[&str] = &["الوحدة", "Unit", "unit"];
pub const CLIENT_SYNONYMS: &[&str] = &["العميل", "Client", "client", "Customer", "customer"];
pub const PAYMENT_METHOD_SYNONYMS: &[&str] = &[
    "وسيلة الدفع",
    "طريقة الدفع",
    "Payment Method",
    "payment method",
    "paymentMethod",
];
pub const PAYMENT_PROOF_SYNONYMS: &[&str] = &[
    "إثبات الدفع",
    "اثبات الدفع",
    "إثبات الدفع (رابط)",
    "Payment Proof",
    "payment proof",
    "paymentProof",
];

pub const INCOME_EXPECTED_HEADERS: &[&str] = &[
    "العميل",
    "الوحدة",
    "وسيلة الدفع",
    "إثبات الدفع",
    "Client",
    "Payment Method",
];

/// Month names accepted in `D-Mon-YYYY` dates (English matched case-insensitively)
pub const MONTH_NAMES: &[(&str, u32)] = &[
    ("Jan", 1),
    ("Feb", 2),
    ("Mar", 3),
    ("Apr", 4),
    ("May", 5),
    ("Jun", 6),
    ("Jul", 7),
    ("Aug", 8),
    ("Sep", 9),
    ("Oct", 10),
    ("Nov", 11),
    ("Dec", 12),
    ("يناير", 1),
    ("فبراير", 2),
    ("مارس", 3),
    ("أبريل", 4),
    ("ابريل", 4),
    ("مايو", 5),
    ("يونيو", 6),
    ("يوليو", 7),
    ("أغسطس", 8),
    ("اغسطس", 8),
    ("سبتمبر", 9),
    ("أكتوبر", 10),
    ("اكتوبر", 10),
    ("نوفمبر", 11),
    ("ديسمبر", 12),
];

/// Canonical field of a ledger record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Date,
    Beneficiary,
    Account,
    Project,
    Unit,
    Client,
    Description,
    Total,
    PaymentMethod,
    PaymentProof,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Beneficiary => "beneficiary",
            Field::Account => "account",
            Field::Project => "project",
            Field::Unit => "unit",
            Field::Client => "client",
            Field::Description => "description",
            Field::Total => "total",
            Field::PaymentMethod => "payment_method",
            Field::PaymentProof => "payment_proof",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Date,
    Text,
    Decimal,
}

/// How to find one canonical field in a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: Field,
    /// Header labels to try, in order
    pub synonyms: Vec<String>,
    pub required: bool,
    pub field_type: FieldType,
    /// Column indices consulted as `EMPTY_<n>` when the sheet has no header
    pub positions: Vec<usize>,
    /// Allow scanning the row by content shape (totals only)
    pub content_scan: bool,
}

impl FieldSpec {
    pub fn new(field: Field, synonyms: &[&str], field_type: FieldType) -> Self {
        Self {
            field,
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            required: false,
            field_type,
            positions: Vec::new(),
            content_scan: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn at(mut self, positions: &[usize]) -> Self {
        self.positions = positions.to_vec();
        self
    }

    pub fn scan_content(mut self) -> Self {
        self.content_scan = true;
        self
    }
}

/// Everything the pipeline needs to know about one record kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSchema {
    pub kind: RecordKind,
    pub expected_headers: Vec<String>,
    pub fields: Vec<FieldSpec>,
}

impl ImportSchema {
    pub fn for_kind(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Payment => Self::payment(),
            RecordKind::Income => Self::income(),
        }
    }

    pub fn payment() -> Self {
        Self::with_headers(
            RecordKind::Payment,
            PAYMENT_EXPECTED_HEADERS,
            vec![
                FieldSpec::new(Field::Date, PAYMENT_DATE_SYNONYMS, FieldType::Date)
                    .required()
                    .at(&[0, 1]),
                FieldSpec::new(Field::Beneficiary, BENEFICIARY_SYNONYMS, FieldType::Text).at(&[2]),
                FieldSpec::new(Field::Account, ACCOUNT_SYNONYMS, FieldType::Text)
                    .required()
                    .at(&[3]),
                FieldSpec::new(Field::Project, PROJECT_SYNONYMS, FieldType::Text)
                    .required()
                    .at(&[4]),
                FieldSpec::new(Field::Description, DESCRIPTION_SYNONYMS, FieldType::Text).at(&[5]),
                FieldSpec::new(Field::Total, TOTAL_SYNONYMS, FieldType::Decimal)
                    .required()
                    .at(&[6])
                    .scan_content(),
            ],
        )
    }

    pub fn income() -> Self {
        Self::with_headers(
            RecordKind::Income,
            INCOME_EXPECTED_HEADERS,
            vec![
                FieldSpec::new(Field::Date, INCOME_DATE_SYNONYMS, FieldType::Date)
                    .required()
                    .at(&[0]),
                FieldSpec::new(Field::Project, PROJECT_SYNONYMS, FieldType::Text)
                    .required()
                    .at(&[1]),
                FieldSpec::new(Field::Unit, UNIT_SYNONYMS, FieldType::Text).at(&[2]),
                FieldSpec::new(Field::Client, CLIENT_SYNONYMS, FieldType::Text)
                    .required()
                    .at(&[3]),
                FieldSpec::new(Field::Description, DESCRIPTION_SYNONYMS, FieldType::Text).at(&[4]),
                FieldSpec::new(Field::Total, TOTAL_SYNONYMS, FieldType::Decimal)
                    .required()
                    .at(&[5])
                    .scan_content(),
                FieldSpec::new(Field::PaymentMethod, PAYMENT_METHOD_SYNONYMS, FieldType::Text)
                    .at(&[6]),
                FieldSpec::new(Field::PaymentProof, PAYMENT_PROOF_SYNONYMS, FieldType::Text)
                    .at(&[7]),
            ],
        )
    }

    /// Header text is the listed labels followed by every field synonym
    fn with_headers(kind: RecordKind, headers: &[&str], fields: Vec<FieldSpec>) -> Self {
        let mut expected_headers = to_strings(headers);
        for synonym in fields.iter().flat_map(|spec| spec.synonyms.iter()) {
            if !expected_headers.contains(synonym) {
                expected_headers.push(synonym.clone());
            }
        }
        Self {
            kind,
            expected_headers,
            fields,
        }
    }

    pub fn field(&self, field: Field) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.field == field)
    }

    /// Append extra synonyms to a field; they are also accepted as header text
    pub fn add_synonyms(&mut self, field: Field, synonyms: &[String]) {
        if let Some(spec) = self.fields.iter_mut().find(|spec| spec.field == field) {
            for synonym in synonyms {
                let synonym = synonym.trim();
                if synonym.is_empty() || spec.synonyms.iter().any(|s| s == synonym) {
                    continue;
                }
                spec.synonyms.push(synonym.to_string());
                if !self.expected_headers.iter().any(|h| h == synonym) {
                    self.expected_headers.push(synonym.to_string());
                }
            }
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Month-name lookup used by the date normalizer
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTable {
    entries: Vec<(String, u32)>,
}

impl Default for MonthTable {
    fn default() -> Self {
        Self::new(MONTH_NAMES)
    }
}

impl MonthTable {
    pub fn new(entries: &[(&str, u32)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(name, month)| (name.to_lowercase(), *month))
                .collect(),
        }
    }

    pub fn month(&self, name: &str) -> Option<u32> {
        let name = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, month)| *month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_required_fields() {
        let schema = ImportSchema::payment();
        let required: Vec<Field> = schema
            .fields
            .iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.field)
            .collect();
        assert_eq!(
            required,
            vec![Field::Date, Field::Account, Field::Project, Field::Total]
        );
    }

    #[test]
    fn test_income_required_fields() {
        let schema = ImportSchema::income();
        let required: Vec<Field> = schema
            .fields
            .iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.field)
            .collect();
        assert_eq!(
            required,
            vec![Field::Date, Field::Project, Field::Client, Field::Total]
        );
    }

    #[test]
    fn test_only_total_scans_content() {
        for schema in [ImportSchema::payment(), ImportSchema::income()] {
            for spec in &schema.fields {
                assert_eq!(spec.content_scan, spec.field == Field::Total);
            }
        }
    }

    #[test]
    fn test_add_synonyms_extends_headers() {
        let mut schema = ImportSchema::payment();
        schema.add_synonyms(Field::Account, &["Acct".to_string(), "Account".to_string()]);

        let account = schema.field(Field::Account).unwrap();
        assert_eq!(account.synonyms.last().map(String::as_str), Some("Acct"));
        assert_eq!(account.synonyms.iter().filter(|s| *s == "Account").count(), 1);
        assert!(schema.expected_headers.iter().any(|h| h == "Acct"));
    }

    #[test]
    fn test_every_synonym_is_an_expected_header() {
        for schema in [ImportSchema::payment(), ImportSchema::income()] {
            for synonym in schema.fields.iter().flat_map(|spec| spec.synonyms.iter()) {
                assert!(schema.expected_headers.contains(synonym), "{}", synonym);
            }
        }
        let payment = ImportSchema::payment();
        assert_eq!(
            &payment.expected_headers[..PAYMENT_EXPECTED_HEADERS.len()],
            to_strings(PAYMENT_EXPECTED_HEADERS).as_slice()
        );
        assert!(payment.expected_headers.iter().any(|h| h == "Beneficiary"));
        assert!(!payment.expected_headers.iter().any(|h| h == "Client"));
    }

    #[test]
    fn test_month_table() {
        let months = MonthTable::default();
        assert_eq!(months.month("Feb"), Some(2));
        assert_eq!(months.month("feb"), Some(2));
        assert_eq!(months.month("فبراير"), Some(2));
        assert_eq!(months.month("اكتوبر"), Some(10));
        assert_eq!(months.month("Febr"), None);
    }
}
