//! Integration tests for sheetledger-core
//!
//! These run whole sheets through the public API: real CSV and xlsx files
//! on disk, the configured import service, and batched delivery into sinks.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::path::Path;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

use sheetledger_core::adapters::{JsonLinesSink, MemorySink};
use sheetledger_core::config::Config;
use sheetledger_core::domain::schema::PAYMENT_EXPECTED_HEADERS;
use sheetledger_core::domain::{ImportSchema, LedgerRecord};
use sheetledger_core::services::{deliver_in_batches, ImportPipeline, ImportService};
use sheetledger_core::{
    CanonicalRecord, CellValue, EntryPoint, Field, Grid, Income, LedgerContext, Payment,
    RecordKind, RejectReason,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn text_row(cells: &[&str]) -> Vec<CellValue> {
    cells
        .iter()
        .map(|c| if c.is_empty() { CellValue::Empty } else { CellValue::text(*c) })
        .collect()
}

fn payment_header() -> Vec<CellValue> {
    text_row(&["التاريخ من", "التاريخ الى", "المستفيد", "الحساب", "المشروع", "وصف", "الاجمالي"])
}

fn service() -> ImportService {
    ImportService::new(Config::default())
}

/// Sheet whose header uses each field's first synonym
fn canonical_sheet<R: LedgerRecord>(rows: Vec<Vec<CellValue>>) -> Grid {
    let schema = ImportSchema::for_kind(R::KIND);
    let header = schema
        .fields
        .iter()
        .map(|spec| CellValue::text(spec.synonyms[0].clone()))
        .collect();
    let mut grid = vec![header];
    grid.extend(rows);
    grid
}

fn cell(text: &str) -> CellValue {
    if text.is_empty() {
        CellValue::Empty
    } else {
        CellValue::text(text)
    }
}

fn payment_cells(p: &Payment) -> Vec<CellValue> {
    vec![
        CellValue::text(p.date.format("%Y-%m-%d").to_string()),
        cell(&p.beneficiary),
        cell(&p.account),
        cell(&p.project),
        cell(&p.description),
        CellValue::text(p.total.to_string()),
    ]
}

fn income_cells(i: &Income) -> Vec<CellValue> {
    vec![
        CellValue::text(i.date.format("%Y-%m-%d").to_string()),
        cell(&i.project),
        cell(&i.unit),
        cell(&i.client),
        cell(&i.description),
        CellValue::text(i.total.to_string()),
        cell(&i.payment_method),
        cell(&i.payment_proof),
    ]
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Pipeline Tests
// ============================================================================

/// Title rows above the header are never treated as data
#[test]
fn test_payment_sheet_with_title_rows() {
    let mut data = text_row(&["1-Feb-2025", "1-Feb-2025", "Acme", "Main", "ProjA", "desc"]);
    data.push(CellValue::Number(1000.0));
    let grid = vec![
        text_row(&["شركة المثال"]),
        text_row(&["كشف المدفوعات - فبراير"]),
        payment_header(),
        data,
    ];

    let report = service().import_payments(&grid);
    assert_eq!(report.header_row, Some(2));
    assert_eq!(report.total_rows, 1);
    assert_eq!(report.rejection_count(), 0);
    assert_eq!(
        report.records,
        vec![Payment {
            date: date(2025, 2, 1),
            beneficiary: "Acme".to_string(),
            account: "Main".to_string(),
            project: "ProjA".to_string(),
            description: "desc".to_string(),
            total: Decimal::new(1000, 0),
        }]
    );
}

/// One bad row is reported and the rest of the batch still imports
#[test]
fn test_missing_project_continues() {
    let grid = vec![
        payment_header(),
        text_row(&["01/02/2025", "", "Acme", "Main", "ProjA", "", "2,563,345.50"]),
        text_row(&["02/02/2025", "", "Acme", "Main", "", "", "100"]),
        text_row(&["03/02/2025", "", "", "Main", "ProjB", "", "abc"]),
        text_row(&["31/02/2025", "", "", "Main", "ProjB", "", "5"]),
        text_row(&["04/02/2025", "", "", "Main", "ProjC", "", "75"]),
    ];

    let report = service().import_payments(&grid);
    assert_eq!(report.total_rows, 5);
    assert_eq!(report.accepted_count(), 2);
    assert_eq!(report.records[0].total, Decimal::new(25633455, 1));
    assert_eq!(report.records[1].project, "ProjC");
    assert_eq!(
        report.reasons(),
        vec![
            "row 3: missing_required_field(project)",
            "row 4: invalid_total",
            "row 5: invalid_date_format",
        ]
    );
}

/// Accepted records always carry a positive total and a real date
#[test]
fn test_accepted_records_are_well_formed() {
    let mut far_serial = text_row(&["", "", "", "Main", "ProjA", "", "20"]);
    far_serial[0] = CellValue::Number(3_000_000.0);
    let grid = vec![
        payment_header(),
        text_row(&["1-Feb-2025", "", "", "Main", "ProjA", "", "0"]),
        text_row(&["1-Feb-2025", "", "", "Main", "ProjA", "", "-20"]),
        text_row(&["1-Feb-2025", "", "", "Main", "ProjA", "", "20"]),
        text_row(&["soon", "", "", "Main", "ProjA", "", "20"]),
        text_row(&["1/2/20250", "", "", "Main", "ProjA", "", "20"]),
        far_serial,
        text_row(&["31/12/2024", "", "", "Main", "ProjA", "", "35"]),
    ];

    let report = service().import_payments(&grid);
    assert_eq!(report.accepted_count(), 2);
    assert_eq!(
        report.reasons(),
        vec![
            "row 2: invalid_total",
            "row 3: invalid_total",
            "row 5: invalid_date_format",
            "row 6: invalid_date_format",
            "row 7: invalid_date_format",
        ]
    );

    let date_shape = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    for record in &report.records {
        assert!(record.total > Decimal::ZERO);
        let value = serde_json::to_value(record).unwrap();
        let date = value["date"].as_str().unwrap();
        assert!(date_shape.is_match(date), "{}", date);
    }
}

/// English labels are found as a header, so columns are read by name
#[test]
fn test_english_header_is_detected() {
    let grid = vec![
        text_row(&["Date", "Beneficiary", "Account", "Project", "Description", "Ref", "Total"]),
        text_row(&["1-Feb-2025", "Acme", "Main", "ProjA", "desc", "R-1", "1000"]),
    ];

    let report = service().import_payments(&grid);
    assert_eq!(report.header_row, Some(0));
    assert_eq!(report.rejection_count(), 0);
    assert_eq!(
        report.records,
        vec![Payment {
            date: date(2025, 2, 1),
            beneficiary: "Acme".to_string(),
            account: "Main".to_string(),
            project: "ProjA".to_string(),
            description: "desc".to_string(),
            total: Decimal::new(1000, 0),
        }]
    );

    let grid = vec![
        text_row(&["Date", "Project", "Unit", "Client", "Description", "Amount"]),
        text_row(&["1-Mar-2025", "ProjA", "A-1", "Acme", "", "900"]),
    ];
    let report = service().import_incomes(&grid);
    assert_eq!(report.header_row, Some(0));
    assert_eq!(report.accepted_count(), 1);
    assert_eq!(report.records[0].client, "Acme");
    assert_eq!(report.records[0].total, Decimal::new(900, 0));
}

#[test]
fn test_headerless_sheet_uses_column_positions() {
    let grid = vec![vec![
        CellValue::Number(45000.0),
        CellValue::Empty,
        CellValue::text("Acme"),
        CellValue::text("Main"),
        CellValue::text("ProjA"),
        CellValue::Empty,
        CellValue::Number(320.0),
    ]];

    let report = service().import_payments(&grid);
    assert_eq!(report.header_row, None);
    assert_eq!(report.accepted_count(), 1);
    assert_eq!(report.records[0].date, date(2023, 3, 15));
    assert_eq!(report.records[0].account, "Main");
}

/// Sheets exported with labels and values swapped still yield a total
#[test]
fn test_reversed_key_value_total() {
    let grid = vec![
        vec![
            CellValue::text("التاريخ من"),
            CellValue::text("الحساب"),
            CellValue::text("المشروع"),
            CellValue::Number(2563345.0),
        ],
        text_row(&["1-Feb-2025", "Main", "ProjA", "الاجمالي"]),
    ];

    let report = service().import_payments(&grid);
    assert_eq!(report.accepted_count(), 1);
    assert_eq!(report.records[0].total, Decimal::new(2563345, 0));
}

#[test]
fn test_canonical_labels_round_trip() {
    let payments = vec![
        Payment {
            date: date(2025, 2, 1),
            beneficiary: "Acme".to_string(),
            account: "Main".to_string(),
            project: "ProjA".to_string(),
            description: "cement".to_string(),
            total: Decimal::new(125050, 2),
        },
        Payment {
            date: date(2024, 12, 31),
            beneficiary: String::new(),
            account: "Petty".to_string(),
            project: "ProjB".to_string(),
            description: String::new(),
            total: Decimal::new(7, 0),
        },
    ];
    let grid = canonical_sheet::<Payment>(payments.iter().map(payment_cells).collect());
    assert_eq!(service().import_payments(&grid).records, payments);

    let incomes = vec![Income {
        date: date(2025, 3, 9),
        project: "ProjA".to_string(),
        unit: "B-7".to_string(),
        client: "Acme".to_string(),
        description: String::new(),
        total: Decimal::new(4500, 0),
        payment_method: "cash".to_string(),
        payment_proof: "https://example.com/r/1".to_string(),
    }];
    let grid = canonical_sheet::<Income>(incomes.iter().map(income_cells).collect());
    assert_eq!(service().import_incomes(&grid).records, incomes);
}

#[test]
fn test_income_missing_client_is_rejected() {
    let grid = vec![
        text_row(&["التاريخ", "المشروع", "الوحدة", "العميل", "الوصف", "الإجمالي"]),
        text_row(&["1-Mar-2025", "ProjA", "A-1", "", "", "900"]),
        text_row(&["2-مارس-2025", "ProjA", "A-2", "Acme", "", "٩٠٠"]),
    ];

    let report = service().import_incomes(&grid);
    assert_eq!(report.accepted_count(), 1);
    assert_eq!(report.records[0].date, date(2025, 3, 2));
    assert_eq!(report.records[0].total, Decimal::new(900, 0));
    assert_eq!(
        report.rejections[0].reason,
        RejectReason::MissingRequiredField(Field::Client)
    );
}

#[test]
fn test_disabling_reversed_strategy_changes_outcome() {
    use sheetledger_core::services::FieldResolver;

    let grid = vec![
        text_row(&["التاريخ من", "الحساب", "Main"]),
        text_row(&["1-Feb-2025", "x", "المشروع"]),
    ];
    let strict = ImportPipeline::<Payment>::default()
        .with_resolver(FieldResolver::default().without("reversed_key_value"));

    let report = strict.run(&grid);
    assert_eq!(
        report.rejections[0].reason,
        RejectReason::MissingRequiredField(Field::Project)
    );
}

// ============================================================================
// File Reader Tests
// ============================================================================

#[test]
fn test_import_csv_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "payments.csv",
        "كشف المدفوعات,,,,,,\n\
         التاريخ من,التاريخ الى,المستفيد,الحساب,المشروع,وصف,الاجمالي\n\
         01/02/2025,01/02/2025,Acme,1201,ProjA,steel,\"2,563,345.50\"\n\
         02/02/2025,,Acme,1201,,,10\n",
    );

    let report = service().import_file::<Payment>(&path).unwrap();
    assert_eq!(report.header_row, Some(1));
    assert_eq!(report.accepted_count(), 1);
    assert_eq!(report.records[0].account, "1201");
    assert_eq!(report.records[0].total, Decimal::new(25633455, 1));
    assert_eq!(report.reasons(), vec!["row 4: missing_required_field(project)"]);
}

#[test]
fn test_csv_long_account_keeps_every_digit() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "accounts.csv",
        "Date,Beneficiary,Account,Project,Description,Total\n\
         01/02/2025,Acme,12345678901234567890,ProjA,steel,250\n",
    );

    let report = service().import_file::<Payment>(&path).unwrap();
    assert_eq!(report.accepted_count(), 1);
    assert_eq!(report.records[0].account, "12345678901234567890");
}

#[test]
fn test_import_xlsx_with_offset_range() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("payments.xlsx");

    // Sheet starts at B3: calamine trims the empty leading rows and column
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, label) in ["التاريخ من", "التاريخ الى", "المستفيد", "الحساب", "المشروع", "وصف", "الاجمالي"]
        .iter()
        .enumerate()
    {
        sheet.write_string(2, col as u16 + 1, *label).unwrap();
    }
    sheet.write_number(3, 1, 45689.0).unwrap();
    sheet.write_string(3, 3, "Acme").unwrap();
    sheet.write_string(3, 4, "Main").unwrap();
    sheet.write_string(3, 5, "ProjA").unwrap();
    sheet.write_number(3, 7, 1500.25).unwrap();
    sheet.write_number(4, 1, 45690.0).unwrap();
    sheet.write_string(4, 4, "Main").unwrap();
    sheet.write_number(4, 7, 10.0).unwrap();
    workbook.save(&path).unwrap();

    let report = service().import_file::<Payment>(&path).unwrap();
    assert_eq!(report.header_row, Some(2));
    assert_eq!(report.total_rows, 2);
    assert_eq!(report.accepted_count(), 1);
    assert_eq!(report.records[0].date, date(2025, 2, 1));
    assert_eq!(report.records[0].total, Decimal::new(150025, 2));
    assert_eq!(report.rejections[0].row_number, 5);
}

#[test]
fn test_unreadable_file_is_an_error_not_an_empty_report() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "broken.xlsx", "this is not a workbook");
    assert!(service().import_file::<Payment>(&path).is_err());

    let missing = dir.path().join("missing.csv");
    assert!(service().import_file::<Payment>(&missing).is_err());

    let empty = write_file(&dir, "empty.csv", "");
    let report = service().import_file::<Payment>(&empty).unwrap();
    assert!(report.is_empty());
    assert_eq!(report.total_rows, 0);
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_context_applies_configured_synonyms() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("settings.json"),
        r#"{ "synonyms": { "payment": { "project": ["Cost Centre"] } } }"#,
    )
    .unwrap();

    let context = LedgerContext::new(dir.path()).unwrap();
    let grid = vec![
        text_row(&["Date", "Account", "Cost Centre", "Amount"]),
        text_row(&["2025-02-01", "Main", "CC-9", "40"]),
    ];

    let report = context.import_service.import_payments(&grid);
    assert_eq!(report.header_row, Some(0));
    assert_eq!(report.records[0].project, "CC-9");
    assert!(PAYMENT_EXPECTED_HEADERS.iter().all(|h| *h != "Cost Centre"));
}

#[test]
fn test_context_event_log_records_imports() {
    let dir = TempDir::new().unwrap();
    let context = LedgerContext::new(&dir.path().join("data")).unwrap();
    let logger = context.logger(EntryPoint::Library).unwrap();

    let grid = vec![
        payment_header(),
        text_row(&["1-Feb-2025", "", "", "Main", "ProjA", "", "10"]),
        text_row(&["1-Feb-2025", "", "", "Main", "", "", "10"]),
    ];
    let report = context.import_service.import_payments(&grid);
    logger
        .log_import(RecordKind::Payment, report.accepted_count(), report.rejection_count())
        .unwrap();

    let stats = logger.stats().unwrap();
    assert_eq!(stats.imports, 1);
    assert_eq!(stats.records_accepted, 1);
    assert_eq!(stats.records_rejected, 1);
}

// ============================================================================
// Delivery Tests
// ============================================================================

fn payments(n: usize) -> Vec<CanonicalRecord> {
    (0..n)
        .map(|i| {
            Payment {
                date: date(2025, 1, 1),
                beneficiary: String::new(),
                account: "Main".to_string(),
                project: format!("P{}", i),
                description: String::new(),
                total: Decimal::new(i as i64 + 1, 0),
            }
            .into_canonical()
        })
        .collect()
}

/// A failing batch is skipped and later batches are still sent
#[tokio::test]
async fn test_delivery_survives_failed_batch() {
    let sink = MemorySink::failing_on(&[1, 3]);
    let summary = deliver_in_batches(&sink, &payments(250), 100, |_| {})
        .await
        .unwrap();

    assert_eq!(summary.inserted, 100);
    assert_eq!(summary.failed_batches, 2);
    assert_eq!(summary.summary(), "inserted 100 of 250 records; 2 batches failed");

    let stored = sink.records();
    assert_eq!(stored.len(), 100);
    assert!(matches!(&stored[0], CanonicalRecord::Payment(p) if p.project == "P100"));
}

#[tokio::test]
async fn test_json_lines_sink_appends_records() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("records.jsonl");
    let sink = JsonLinesSink::new(&out);

    let summary = deliver_in_batches(&sink, &payments(3), 2, |_| {}).await.unwrap();
    assert!(summary.is_complete());

    let lines = read_lines(&out);
    assert_eq!(lines.len(), 3);
    let first: CanonicalRecord = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(first.kind(), RecordKind::Payment);
    assert_eq!(first.total(), Decimal::new(1, 0));
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}
