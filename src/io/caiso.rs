//! CAISO "Today's Outlook" daily CSV exports.
//!
//! The header row holds `"<label> <MM/DD/YYYY>"` in its first cell and one
//! `HH:MM` time per remaining cell. Each further row is a named series with
//! one value per time column.

use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::{parse_number, source_name};
use crate::config::IntermittencyConfig;
use crate::error::PlotError;
use crate::series::TimeSeries;

/// Column layout of a daily export.
#[derive(Debug, Clone)]
pub struct DailyLayout {
    /// Columns read per row, label column included.
    pub max_columns: usize,
    /// Format of `"<date> <time>"`.
    pub timestamp_format: String,
}

impl From<&IntermittencyConfig> for DailyLayout {
    fn from(cfg: &IntermittencyConfig) -> Self {
        Self {
            max_columns: cfg.max_columns,
            timestamp_format: cfg.timestamp_format.clone(),
        }
    }
}

/// Reads the first row whose name starts with `row_prefix` as a series.
///
/// Rows that do not match (day-ahead and hour-ahead forecasts, other
/// sources) are skipped.
///
/// # Errors
///
/// Returns `MissingFile` when `path` does not exist, `SchemaMismatch` when
/// no row matches `row_prefix`, and `Malformed` for an unreadable header or
/// a non-numeric sample.
pub fn read_daily_series(
    path: &Path,
    row_prefix: &str,
    label: &str,
    layout: &DailyLayout,
) -> Result<TimeSeries, PlotError> {
    info!(file = %path.display(), "opening CAISO export");
    let name = source_name(path);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| PlotError::csv(path, e))?;
    let mut records = rdr.records();

    let header = match records.next() {
        Some(rec) => rec.map_err(|e| PlotError::csv(path, e))?,
        None => return Err(PlotError::malformed(name, "file is empty")),
    };
    let timestamps = header_timestamps(&header, layout, &name)?;

    for rec in records {
        let rec = rec.map_err(|e| PlotError::csv(path, e))?;
        let row_name = rec.get(0).unwrap_or("").trim();
        if !row_name.starts_with(row_prefix) {
            debug!(row = row_name, "skipping row");
            continue;
        }

        info!(row = row_name, label, "reading series");
        let end = rec.len().min(layout.max_columns);
        let mut values = Vec::with_capacity(end.saturating_sub(1));
        for col in 1..end {
            let cell = rec.get(col).unwrap_or("");
            let value = parse_number(cell).ok_or_else(|| {
                PlotError::malformed(
                    name.clone(),
                    format!("row \"{row_name}\" column {col}: cannot parse \"{cell}\" as a number"),
                )
            })?;
            values.push(value);
        }
        if values.len() != timestamps.len() {
            return Err(PlotError::malformed(
                name,
                format!(
                    "row \"{row_name}\" has {} values but the header has {} times",
                    values.len(),
                    timestamps.len()
                ),
            ));
        }

        return Ok(TimeSeries::new(label, timestamps, values)?);
    }

    Err(PlotError::schema(name, format!("row starting with \"{row_prefix}\"")))
}

fn header_timestamps(
    header: &csv::StringRecord,
    layout: &DailyLayout,
    name: &str,
) -> Result<Vec<NaiveDateTime>, PlotError> {
    let first = header.get(0).unwrap_or("");
    let date = first.split_whitespace().nth(1).ok_or_else(|| {
        PlotError::malformed(
            name,
            format!("header cell \"{first}\" does not carry a date"),
        )
    })?;

    let end = header.len().min(layout.max_columns);
    (1..end)
        .map(|col| {
            let time = header.get(col).unwrap_or("").trim();
            let text = format!("{date} {time}");
            NaiveDateTime::parse_from_str(&text, &layout.timestamp_format).map_err(|e| {
                PlotError::malformed(name, format!("header time \"{text}\": {e}"))
            })
        })
        .collect()
}
