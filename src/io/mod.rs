//! Input loaders and CSV export.

pub mod caiso;
pub mod export;
pub mod records;
pub mod workbook;

use chrono::{NaiveDate, NaiveDateTime};

/// Parses a timestamp with the first matching format.
///
/// Date-only formats yield midnight. Formats without a day field (such as
/// `"%Y %B"` for `"1973 January"`) resolve to the first of the month.
pub fn parse_timestamp(text: &str, formats: &[String]) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    for fmt in formats {
        if let Ok(t) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(t);
        }
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
        if !fmt.contains("%d") && !fmt.contains("%e") {
            let padded = format!("{text} 1");
            let padded_fmt = format!("{fmt} %d");
            if let Ok(d) = NaiveDate::parse_from_str(&padded, &padded_fmt) {
                return d.and_hms_opt(0, 0, 0);
            }
        }
    }
    None
}

/// Parses a numeric cell; empty or non-numeric cells are `None`.
///
/// Thousands separators are ignored (`"1,234.5"` parses as 1234.5).
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let cleaned: String = text.chars().filter(|&c| c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// File name used in error messages.
pub(crate) fn source_name(path: &std::path::Path) -> String {
    path.display().to_string()
}
