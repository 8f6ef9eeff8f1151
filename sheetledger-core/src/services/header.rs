//! Header row detection

use crate::domain::CellValue;

/// Spelling pairs treated as the same header ("date from" / "date to")
const HEADER_VARIANTS: &[(&str, &str)] = &[("التاريخ من", "تاريخ من"), ("التاريخ الى", "تاريخ الى")];

/// Find the first row, within `scan_rows`, that mentions an expected header
///
/// The row's cells are joined with spaces and lowercased; a row matches when
/// that text contains any expected header. Returns `None` when no row in the
/// window matches, in which case the sheet is treated as headerless.
pub fn locate_header(
    grid: &[Vec<CellValue>],
    expected_headers: &[String],
    scan_rows: usize,
) -> Option<usize> {
    let needles: Vec<String> = expected_headers
        .iter()
        .map(|h| normalize_variants(&h.to_lowercase()))
        .filter(|h| !h.trim().is_empty())
        .collect();

    grid.iter().take(scan_rows).position(|row| {
        let text = row_text(row);
        let normalized = normalize_variants(&text);
        needles
            .iter()
            .any(|needle| text.contains(needle.as_str()) || normalized.contains(needle.as_str()))
    })
}

fn row_text(row: &[CellValue]) -> String {
    row.iter()
        .map(CellValue::as_text)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn normalize_variants(text: &str) -> String {
    HEADER_VARIANTS
        .iter()
        .fold(text.to_string(), |acc, (long, short)| acc.replace(long, short))
}
