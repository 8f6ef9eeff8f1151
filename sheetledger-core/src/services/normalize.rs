//! Date and amount normalization

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate};
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::domain::schema::SERIAL_EPOCH_OFFSET_DAYS;
use crate::domain::{CellValue, MonthTable};

/// Year-first formats, only tried when the text opens with a 4-digit year
const YEAR_FIRST_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Years that serialize as a plain `YYYY-MM-DD`
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// Formats with a spelled-out month. Numeric day/month orders are left out:
/// those are read day-first by the split fallback.
const NAMED_MONTH_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
];

fn day_month_name_year() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})[-/](\w+)[-/](\d{4})$").expect("valid date regex"))
}

/// Converts raw date cells to calendar dates
#[derive(Debug, Clone, Default)]
pub struct DateNormalizer {
    months: MonthTable,
}

impl DateNormalizer {
    pub fn new(months: MonthTable) -> Self {
        Self { months }
    }

    pub fn normalize(&self, value: &CellValue) -> Option<NaiveDate> {
        self.parse(value)
            .filter(|date| YEAR_RANGE.contains(&date.year()))
    }

    fn parse(&self, value: &CellValue) -> Option<NaiveDate> {
        match value {
            CellValue::Empty => None,
            CellValue::Number(serial) => serial_to_date(*serial),
            CellValue::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                self.parse_month_name(text)
                    .or_else(|| parse_calendar_text(text))
                    .or_else(|| parse_day_month_year(text))
            }
        }
    }

    /// `D-Mon-YYYY` / `D/Mon/YYYY` with an English or Arabic month name
    fn parse_month_name(&self, text: &str) -> Option<NaiveDate> {
        let caps = day_month_name_year().captures(text)?;
        let day: u32 = caps[1].parse().ok()?;
        let month = self.months.month(&caps[2])?;
        let year: i32 = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Spreadsheet serial (1900 date system) to a calendar date
///
/// Serial 1 is 1900-01-01 and serial 60 is the nonexistent 1900-02-29 the
/// format inherited. Serials that have no calendar date under that scheme go
/// through the Unix-epoch offset instead.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    spreadsheet_calendar_date(serial).or_else(|| epoch_offset_date(serial))
}

fn spreadsheet_calendar_date(serial: f64) -> Option<NaiveDate> {
    let days = serial.floor();
    if days < 1.0 || days == 60.0 || days > 2_958_465.0 {
        return None;
    }
    let days = days as i64;
    // Serials before the phantom leap day count from 1899-12-31
    let base = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    base.checked_add_signed(Duration::days(days))
}

fn epoch_offset_date(serial: f64) -> Option<NaiveDate> {
    let seconds = ((serial - SERIAL_EPOCH_OFFSET_DAYS as f64) * 86_400.0).floor();
    if !seconds.is_finite() || seconds.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(seconds as i64, 0).map(|dt| dt.date_naive())
}

fn parse_calendar_text(text: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    let leading_digits = text.chars().take_while(char::is_ascii_digit).count();
    let formats: &[&str] = if leading_digits == 4 {
        YEAR_FIRST_FORMATS
    } else {
        NAMED_MONTH_FORMATS
    };
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Three numeric parts split on `/` or `-`, read as day, month, year
fn parse_day_month_year(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split(['/', '-']).map(str::trim).collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let mut year: i32 = parts[2].parse().ok()?;
    if (0..100).contains(&year) && parts[2].len() <= 2 {
        year += 1900;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalError {
    Missing,
    Invalid,
}

/// Convert a raw total to a positive decimal
pub fn normalize_total(value: &CellValue) -> Result<Decimal, TotalError> {
    let amount = match value {
        CellValue::Empty => return Err(TotalError::Missing),
        CellValue::Number(n) => {
            if !n.is_finite() {
                return Err(TotalError::Invalid);
            }
            Decimal::from_f64(*n).ok_or(TotalError::Invalid)?
        }
        CellValue::Text(text) => {
            if text.trim().is_empty() {
                return Err(TotalError::Missing);
            }
            parse_decimal_text(text).ok_or(TotalError::Invalid)?
        }
    };

    if amount <= Decimal::ZERO {
        return Err(TotalError::Invalid);
    }
    Ok(amount.normalize())
}

/// Parse decorated numeric text: grouping separators, Arabic-Indic digits,
/// scientific notation
pub fn parse_decimal_text(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '\u{066C}') && !c.is_whitespace())
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            '\u{066B}' => '.',
            other => other,
        })
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .ok()
        .or_else(|| Decimal::from_scientific(&cleaned).ok())
}
