//! Spreadsheet workbooks exported as one CSV file per sheet.
//!
//! A workbook is a directory holding `<sheet name>.csv` files. Each sheet
//! may start with a free-text preamble, followed by a header row and one
//! row per timestamp.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::{parse_number, parse_timestamp, source_name};
use crate::config::{NuclearCfConfig, WindConfig};
use crate::error::PlotError;
use crate::series::TimeSeries;

/// How to read the rows of one sheet.
#[derive(Debug, Clone)]
pub struct SheetLayout {
    /// Preamble lines before the header row.
    pub skip_rows: usize,
    /// Column holding the row timestamp.
    pub timestamp_column: String,
    /// Accepted timestamp formats, tried in order.
    pub timestamp_formats: Vec<String>,
    /// Source column name -> short name.
    pub renames: BTreeMap<String, String>,
    /// Rows with more empty cells than this are dropped.
    pub max_missing: usize,
}

impl From<&WindConfig> for SheetLayout {
    fn from(cfg: &WindConfig) -> Self {
        Self {
            skip_rows: cfg.skip_rows,
            timestamp_column: cfg.timestamp_column.clone(),
            timestamp_formats: cfg.timestamp_formats.clone(),
            renames: cfg.renames.clone(),
            max_missing: cfg.max_missing,
        }
    }
}

impl From<&NuclearCfConfig> for SheetLayout {
    fn from(cfg: &NuclearCfConfig) -> Self {
        Self {
            skip_rows: cfg.skip_rows,
            timestamp_column: cfg.date_column.clone(),
            timestamp_formats: cfg.timestamp_formats.clone(),
            renames: BTreeMap::new(),
            max_missing: usize::MAX,
        }
    }
}

/// A directory of per-sheet CSV exports.
#[derive(Debug, Clone)]
pub struct Workbook {
    dir: PathBuf,
}

impl Workbook {
    /// Opens the workbook directory.
    ///
    /// # Errors
    ///
    /// Returns `MissingFile` if `dir` is not a directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PlotError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(PlotError::MissingFile { path: dir });
        }
        Ok(Self { dir })
    }

    /// Path of the CSV export for `sheet`.
    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{sheet}.csv"))
    }

    /// Reads one sheet into a table.
    ///
    /// # Errors
    ///
    /// Returns `MissingFile` when the sheet export is absent and
    /// `SchemaMismatch` when the header lacks the timestamp column.
    pub fn read_sheet(&self, sheet: &str, layout: &SheetLayout) -> Result<Table, PlotError> {
        let path = self.sheet_path(sheet);
        info!(file = %path.display(), sheet, "loading sheet");
        read_sheet_file(&path, layout)
    }

    /// Reads `sheets` in order and stacks their rows.
    ///
    /// # Errors
    ///
    /// Propagates `read_sheet` errors and returns `SchemaMismatch` when the
    /// sheets do not share the same columns.
    pub fn read_sheets(&self, sheets: &[String], layout: &SheetLayout) -> Result<Table, PlotError> {
        let mut iter = sheets.iter();
        let first = iter
            .next()
            .ok_or_else(|| PlotError::schema(source_name(&self.dir), "at least one sheet"))?;
        let mut table = self.read_sheet(first, layout)?;
        for sheet in iter {
            table = table.concat(self.read_sheet(sheet, layout)?)?;
        }
        Ok(table)
    }
}

/// A named numeric column with possibly missing cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Option<f64>>,
}

/// Rows indexed by timestamp with named numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    source: String,
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<Column>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Looks up a column by exact name.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` naming the column when it is absent.
    pub fn column(&self, name: &str) -> Result<&Column, PlotError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| PlotError::schema(self.source.clone(), format!("column \"{name}\"")))
    }

    /// Builds a series from a column, skipping empty cells.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` when the column is absent and `InvalidInput`
    /// when the row timestamps are not strictly increasing.
    pub fn series(&self, name: &str) -> Result<TimeSeries, PlotError> {
        let column = self.column(name)?;
        let (timestamps, values): (Vec<_>, Vec<_>) = self
            .timestamps
            .iter()
            .zip(&column.cells)
            .filter_map(|(t, v)| v.map(|v| (*t, v)))
            .unzip();
        Ok(TimeSeries::new(name, timestamps, values)?)
    }

    /// Rows whose timestamp lies in `[start, end]`.
    pub fn between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let keep: Vec<bool> = self
            .timestamps
            .iter()
            .map(|t| *t >= start && *t <= end)
            .collect();
        let timestamps = self
            .timestamps
            .iter()
            .zip(&keep)
            .filter(|(_, k)| **k)
            .map(|(t, _)| *t)
            .collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                cells: c
                    .cells
                    .iter()
                    .zip(&keep)
                    .filter(|(_, k)| **k)
                    .map(|(v, _)| *v)
                    .collect(),
            })
            .collect();
        Self {
            source: self.source.clone(),
            timestamps,
            columns,
        }
    }

    /// Appends the rows of `other` below `self`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` when the column sets differ.
    pub fn concat(mut self, other: Table) -> Result<Self, PlotError> {
        for column in &self.columns {
            if !other.columns.iter().any(|c| c.name == column.name) {
                return Err(PlotError::schema(
                    other.source,
                    format!("column \"{}\"", column.name),
                ));
            }
        }
        if other.columns.len() != self.columns.len() {
            if let Some(extra) = other
                .columns
                .iter()
                .find(|c| !self.columns.iter().any(|s| s.name == c.name))
            {
                return Err(PlotError::schema(
                    self.source,
                    format!("column \"{}\"", extra.name),
                ));
            }
        }

        let Table {
            source,
            timestamps,
            mut columns,
        } = other;
        self.timestamps.extend(timestamps);
        for column in &mut self.columns {
            if let Some(pos) = columns.iter().position(|c| c.name == column.name) {
                column.cells.append(&mut columns[pos].cells);
            }
        }
        self.source = format!("{} + {source}", self.source);
        Ok(self)
    }
}

fn read_sheet_file(path: &Path, layout: &SheetLayout) -> Result<Table, PlotError> {
    let name = source_name(path);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| PlotError::csv(path, e))?;
    let mut records = rdr.records().skip(layout.skip_rows);

    let header = match records.next() {
        Some(rec) => rec.map_err(|e| PlotError::csv(path, e))?,
        None => return Err(PlotError::malformed(name, "no header row after preamble")),
    };
    let names: Vec<String> = header
        .iter()
        .map(|h| {
            let h = h.trim();
            layout
                .renames
                .get(h)
                .cloned()
                .unwrap_or_else(|| h.to_string())
        })
        .collect();

    let ts_idx = names
        .iter()
        .position(|n| *n == layout.timestamp_column)
        .ok_or_else(|| {
            PlotError::schema(
                name.clone(),
                format!("column \"{}\"", layout.timestamp_column),
            )
        })?;
    let value_idx: Vec<usize> = (0..names.len())
        .filter(|&i| i != ts_idx && !names[i].is_empty())
        .collect();

    let mut timestamps = Vec::new();
    let mut columns: Vec<Column> = value_idx
        .iter()
        .map(|&i| Column {
            name: names[i].clone(),
            cells: Vec::new(),
        })
        .collect();
    let mut dropped = 0usize;

    for rec in records {
        let rec = rec.map_err(|e| PlotError::csv(path, e))?;
        let Some(t) = parse_timestamp(rec.get(ts_idx).unwrap_or(""), &layout.timestamp_formats)
        else {
            debug!(line = ?rec.position().map(|p| p.line()), "row without timestamp");
            dropped += 1;
            continue;
        };
        let cells: Vec<Option<f64>> = value_idx
            .iter()
            .map(|&i| rec.get(i).and_then(parse_number))
            .collect();
        let missing = cells.iter().filter(|c| c.is_none()).count();
        if missing > layout.max_missing {
            dropped += 1;
            continue;
        }
        timestamps.push(t);
        for (column, cell) in columns.iter_mut().zip(cells) {
            column.cells.push(cell);
        }
    }

    if dropped > 0 {
        warn!(file = %path.display(), dropped, "dropped incomplete rows");
    }

    Ok(Table {
        source: name,
        timestamps,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn layout() -> SheetLayout {
        let mut renames = BTreeMap::new();
        renames.insert(
            "TOTAL WIND GENERATION (MW)".to_string(),
            "Wind".to_string(),
        );
        SheetLayout {
            skip_rows: 2,
            timestamp_column: "Date/Time".to_string(),
            timestamp_formats: vec!["%m/%d/%y %H:%M".to_string()],
            renames,
            max_missing: 1,
        }
    }

    fn workbook(sheets: &[(&str, &str)]) -> (tempfile::TempDir, Workbook) {
        let dir = tempfile::tempdir().expect("temp dir");
        for (name, body) in sheets {
            fs::write(dir.path().join(format!("{name}.csv")), body).expect("write sheet");
        }
        let wb = Workbook::open(dir.path()).expect("dir exists");
        (dir, wb)
    }

    const FIRST: &str = "BPA Balancing Authority\nPreamble line\n\
        Date/Time,TOTAL WIND GENERATION (MW),Hydro\n\
        01/01/20 00:00,100,5000\n\
        01/01/20 00:05,120,\n\
        01/01/20 00:10,,\n";
    const SECOND: &str = "BPA Balancing Authority\nPreamble line\n\
        Date/Time,TOTAL WIND GENERATION (MW),Hydro\n\
        07/01/20 00:00,300,6000\n";

    #[test]
    fn renames_and_drops_sparse_rows() {
        let (_dir, wb) = workbook(&[("January-June", FIRST)]);
        let table = wb.read_sheet("January-June", &layout()).expect("sheet reads");
        // third data row has two empty cells, more than max_missing
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["Wind", "Hydro"]);
        let hydro = table.series("Hydro").expect("column present");
        assert_eq!(hydro.values(), &[5000.0]);
    }

    #[test]
    fn concatenates_sheets_in_order() {
        let (_dir, wb) = workbook(&[("January-June", FIRST), ("July-December", SECOND)]);
        let sheets = vec!["January-June".to_string(), "July-December".to_string()];
        let table = wb.read_sheets(&sheets, &layout()).expect("sheets read");
        assert_eq!(table.len(), 3);
        let wind = table.series("Wind").expect("column present");
        assert_eq!(wind.values(), &[100.0, 120.0, 300.0]);
    }

    #[test]
    fn missing_sheet_is_missing_file() {
        let (_dir, wb) = workbook(&[("January-June", FIRST)]);
        let err = wb
            .read_sheet("July-December", &layout())
            .expect_err("sheet absent");
        assert!(matches!(err, PlotError::MissingFile { .. }));
        assert!(err.to_string().contains("July-December.csv"));
    }

    #[test]
    fn missing_column_is_schema_mismatch() {
        let (_dir, wb) = workbook(&[("January-June", FIRST)]);
        let table = wb.read_sheet("January-June", &layout()).expect("sheet reads");
        let err = table.series("Nuclear").expect_err("no nuclear column");
        assert!(matches!(err, PlotError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("Nuclear"));
    }

    #[test]
    fn missing_timestamp_column() {
        let mut l = layout();
        l.timestamp_column = "Timestamp".to_string();
        let (_dir, wb) = workbook(&[("January-June", FIRST)]);
        let err = wb.read_sheet("January-June", &l).expect_err("no such column");
        assert!(err.to_string().contains("Timestamp"));
    }

    #[test]
    fn between_filters_rows() {
        let (_dir, wb) = workbook(&[("January-June", FIRST), ("July-December", SECOND)]);
        let sheets = vec!["January-June".to_string(), "July-December".to_string()];
        let table = wb.read_sheets(&sheets, &layout()).expect("sheets read");
        let t = |s: &str| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").expect("valid timestamp")
        };
        let cut = table.between(t("2020-06-01 00:00"), t("2020-12-31 23:59"));
        assert_eq!(cut.len(), 1);
    }

    #[test]
    fn mismatched_sheets_rejected() {
        let other = "x\ny\nDate/Time,Hydro\n07/01/20 00:00,1\n";
        let (_dir, wb) = workbook(&[("January-June", FIRST), ("July-December", other)]);
        let sheets = vec!["January-June".to_string(), "July-December".to_string()];
        let err = wb.read_sheets(&sheets, &layout()).expect_err("columns differ");
        assert!(matches!(err, PlotError::SchemaMismatch { .. }));
    }

    #[test]
    fn open_missing_dir() {
        let err = Workbook::open("no/such/workbook").expect_err("dir absent");
        assert!(matches!(err, PlotError::MissingFile { .. }));
    }
}
