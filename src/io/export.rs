//! CSV export of the derived series behind a chart.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::PlotError;

/// Column header of the derived-series export.
const HEADER: &str = "series,x,value";

/// A named set of plotted points (x is hours, decimal years, an index...).
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

impl DerivedSeries {
    pub fn new(name: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }
}

/// Exports derived series to a CSV file at the given path.
///
/// Writes one header row and one row per point, series in the given
/// order. Produces identical output for identical inputs.
///
/// # Errors
///
/// Returns `PlotError::Io` (or `MissingFile` for a missing directory) if
/// the file cannot be created or written.
pub fn export_csv(series: &[DerivedSeries], path: &Path) -> Result<(), PlotError> {
    let file = File::create(path).map_err(|e| PlotError::io(path, e))?;
    let buf = io::BufWriter::new(file);
    write_csv(series, buf).map_err(|e| PlotError::io(path, e))
}

/// Writes derived series as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(series: &[DerivedSeries], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;
    for s in series {
        for (x, value) in &s.points {
            wtr.write_record(&[s.name.clone(), format!("{x:.6}"), format!("{value:.6}")])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
