//! Workbook grid reader (xlsx, xlsm, xlsb, xls, ods) backed by calamine

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};

use crate::domain::result::{Error, Result};
use crate::domain::{CellValue, Grid};
use crate::ports::GridReader;

/// Reads the first worksheet of a workbook
#[derive(Debug, Default, Clone)]
pub struct WorkbookReader;

impl WorkbookReader {
    pub fn new() -> Self {
        Self
    }

    fn first_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Range<Data>> {
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| Error::sheet("Workbook has no sheets"))?;

        workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| Error::sheet(format!("Failed to read sheet '{}': {}", sheet_name, e)))
    }
}

impl GridReader for WorkbookReader {
    fn name(&self) -> &str {
        "workbook"
    }

    fn read_bytes(&self, data: &[u8]) -> Result<Grid> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))
            .map_err(|e| Error::sheet(format!("Failed to open workbook: {}", e)))?;
        let range = Self::first_sheet(&mut workbook)?;
        Ok(range_to_grid(&range))
    }

    fn read_path(&self, path: &Path) -> Result<Grid> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| Error::sheet(format!("Failed to open workbook {}: {}", path.display(), e)))?;
        let range = Self::first_sheet(&mut workbook)?;
        Ok(range_to_grid(&range))
    }
}

/// Convert a calamine range to a grid anchored at A1
///
/// calamine trims leading empty rows and columns; they are padded back so
/// that column positions match the sheet.
fn range_to_grid(range: &Range<Data>) -> Grid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut grid: Grid = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; col_offset];
        cells.extend(row.iter().map(convert_cell));
        grid.push(cells);
    }
    grid
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
        // Dates stay serials; the date normalizer owns the calendar conversion
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cells() {
        assert_eq!(convert_cell(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(convert_cell(&Data::Float(1.5)), CellValue::Number(1.5));
        assert_eq!(convert_cell(&Data::String("x".into())), CellValue::text("x"));
        assert_eq!(convert_cell(&Data::Bool(true)), CellValue::text("TRUE"));
        assert_eq!(convert_cell(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_range_offset_is_padded() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("المشروع".into()));
        range.set_value((3, 2), Data::Float(1000.0));

        let grid = range_to_grid(&range);
        assert_eq!(grid.len(), 4);
        assert!(grid[0].is_empty());
        assert_eq!(grid[2][0], CellValue::Empty);
        assert_eq!(grid[2][1], CellValue::text("المشروع"));
        assert_eq!(grid[3][2], CellValue::Number(1000.0));
    }

    #[test]
    fn test_garbage_bytes_are_a_sheet_error() {
        let err = WorkbookReader::new().read_bytes(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, Error::Sheet(_)));
    }
}
