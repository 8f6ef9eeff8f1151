//! Grid reader port - spreadsheet decoding

use std::path::Path;

use crate::domain::result::Result;
use crate::domain::Grid;

/// Decodes the first sheet of a file into rows of cells
///
/// Failing to decode is a sheet-level error: no partial grid is returned.
pub trait GridReader: Send + Sync {
    /// Reader name (e.g., "workbook", "csv")
    fn name(&self) -> &str;

    /// Decode an in-memory file buffer
    fn read_bytes(&self, data: &[u8]) -> Result<Grid>;

    /// Decode a file on disk
    fn read_path(&self, path: &Path) -> Result<Grid> {
        let data = std::fs::read(path)?;
        self.read_bytes(&data)
    }
}
