//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - calamine for workbook files (GridReader)
//! - csv for delimited exports (GridReader)
//! - JSON Lines files for accepted records (RecordSink)
//! - an in-memory sink for tests (RecordSink)

pub mod delimited;
pub mod json_sink;
pub mod memory_sink;
pub mod workbook;

use std::path::Path;

use crate::ports::GridReader;

pub use delimited::CsvGridReader;
pub use json_sink::JsonLinesSink;
pub use memory_sink::MemorySink;
pub use workbook::WorkbookReader;

/// Pick a grid reader from the file extension; unknown extensions are
/// treated as workbooks
pub fn reader_for_path(path: &Path) -> Box<dyn GridReader> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" | "txt" => Box::new(CsvGridReader::new()),
        "tsv" | "tab" => Box::new(CsvGridReader::tab_separated()),
        _ => Box::new(WorkbookReader::new()),
    }
}
