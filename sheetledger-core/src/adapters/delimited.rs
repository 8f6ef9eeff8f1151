//! CSV/TSV grid reader

use csv::ReaderBuilder;

use crate::domain::result::{Error, Result};
use crate::domain::{CellValue, Grid};
use crate::ports::GridReader;

/// Digits an `f64` holds exactly; longer codes stay text
const MAX_EXACT_DIGITS: usize = 15;

/// Reads delimited text exports as a headerless grid
///
/// Header detection is the pipeline's job, so every record (including the
/// first) is returned as a data row.
#[derive(Debug, Clone)]
pub struct CsvGridReader {
    delimiter: u8,
}

impl Default for CsvGridReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvGridReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab_separated() -> Self {
        Self { delimiter: b'\t' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl GridReader for CsvGridReader {
    fn name(&self) -> &str {
        "csv"
    }

    fn read_bytes(&self, data: &[u8]) -> Result<Grid> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(data);

        let mut grid = Grid::new();
        for (idx, result) in reader.byte_records().enumerate() {
            let record = result
                .map_err(|e| Error::sheet(format!("Failed to read CSV record {}: {}", idx + 1, e)))?;
            grid.push(
                record
                    .iter()
                    .map(|field| convert_field(&String::from_utf8_lossy(field)))
                    .collect(),
            );
        }
        Ok(grid)
    }
}

fn convert_field(field: &str) -> CellValue {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if looks_like_number(trimmed) {
        if let Ok(n) = trimmed.parse::<f64>() {
            return CellValue::Number(n);
        }
    }
    CellValue::Text(field.to_string())
}

/// Plain numbers only; codes with leading zeros or too many digits stay text
fn looks_like_number(s: &str) -> bool {
    let digits = s.trim_start_matches(['-', '+']);
    let leading_zero = digits.len() > 1
        && digits.starts_with('0')
        && digits.chars().nth(1).is_some_and(|c| c.is_ascii_digit());
    !leading_zero
        && digits.chars().any(|c| c.is_ascii_digit())
        && significant_digits(digits) <= MAX_EXACT_DIGITS
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

/// Mantissa digits after dropping leading zeros
fn significant_digits(s: &str) -> usize {
    s.split(['e', 'E'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .skip_while(|c| *c == '0')
        .count()
}
