//! Raw cell values and label-keyed rows

use serde::{Deserialize, Serialize};

/// Prefix for synthetic labels given to columns without header text
pub const PLACEHOLDER_PREFIX: &str = "EMPTY_";

/// A single decoded spreadsheet cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

/// A decoded sheet: rows of cells, fully materialized
pub type Grid = Vec<Vec<CellValue>>;

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// True for empty cells and whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(_) => false,
            CellValue::Text(s) => s.trim().is_empty(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render the cell as text; integral numbers print without a fraction
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Placeholder label for column `index`
pub fn placeholder_label(index: usize) -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, index)
}

pub fn is_placeholder_label(label: &str) -> bool {
    label.starts_with(PLACEHOLDER_PREFIX)
}

/// One data row keyed by header label
///
/// Pairs keep column order. A repeated label keeps its first position and
/// takes the later value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pairs: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from header labels; missing trailing cells become `Empty`
    pub fn from_cells(labels: &[String], cells: &[CellValue]) -> Self {
        let mut row = Self::new();
        for (idx, label) in labels.iter().enumerate() {
            let value = cells.get(idx).cloned().unwrap_or_default();
            row.insert(label.clone(), value);
        }
        row
    }

    /// Build a row for a headerless sheet, labelling every column `EMPTY_<n>`
    pub fn positional(cells: &[CellValue]) -> Self {
        let mut row = Self::new();
        for (idx, cell) in cells.iter().enumerate() {
            row.insert(placeholder_label(idx), cell.clone());
        }
        row
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<CellValue>) {
        let label = label.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(l, _)| *l == label) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((label, value)),
        }
    }

    /// Builder-style insert for tests and fixtures
    pub fn with(mut self, label: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.insert(label, value);
        self
    }

    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.pairs.iter().find(|(l, _)| l == label).map(|(_, v)| v)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.pairs.iter().map(|(l, v)| (l.as_str(), v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.pairs.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Turn a header row into labels: trimmed text, or `EMPTY_<n>` when blank
pub fn header_labels(cells: &[CellValue]) -> Vec<String> {
    cells
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let text = cell.as_text();
            let trimmed = text.trim();
            if trimmed.is_empty() {
                placeholder_label(idx)
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}
