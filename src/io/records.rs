//! Category datasets, reactor programs and small delimited tables.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use super::{parse_number, source_name};
use crate::error::PlotError;

/// A dataset value: one number or a list (e.g. min/median/max).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CategoryValue {
    Single(f64),
    Many(Vec<f64>),
}

impl CategoryValue {
    pub fn to_vec(&self) -> Vec<f64> {
        match self {
            Self::Single(v) => vec![*v],
            Self::Many(vs) => vs.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CategoryTable {
    title: String,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    ylabel: Option<String>,
    #[serde(default)]
    xlabel: Option<String>,
    #[serde(default, rename = "ref")]
    reference: Option<String>,
    #[serde(default)]
    start_year: Option<i32>,
    val: BTreeMap<String, CategoryValue>,
}

/// A label with one or more numeric attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRecord {
    pub label: String,
    pub values: Vec<f64>,
}

/// One named table of a key-value dataset file.
///
/// Records are ordered by label; display order is chosen by the chart.
#[derive(Debug, Clone)]
pub struct CategoryDataset {
    pub key: String,
    pub title: String,
    pub units: Option<String>,
    pub ylabel: Option<String>,
    pub xlabel: Option<String>,
    pub reference: Option<String>,
    pub start_year: Option<i32>,
    pub records: Vec<CategoryRecord>,
}

/// Loads table `key` from a TOML dataset file.
///
/// # Errors
///
/// Returns `MissingFile` if the file does not exist, `SchemaMismatch` if
/// `key` is absent, and `Malformed` if the file or table does not parse.
pub fn load_dataset(path: &Path, key: &str) -> Result<CategoryDataset, PlotError> {
    info!(file = %path.display(), key, "loading dataset");
    let name = source_name(path);
    let content = fs::read_to_string(path).map_err(|e| PlotError::io(path, e))?;
    let mut doc: toml::Table = content
        .parse()
        .map_err(|e: toml::de::Error| PlotError::malformed(name.clone(), e.to_string()))?;

    let value = doc
        .remove(key)
        .ok_or_else(|| PlotError::schema(name.clone(), format!("table \"{key}\"")))?;
    let table = value
        .try_into::<CategoryTable>()
        .map_err(|e: toml::de::Error| PlotError::malformed(name, format!("[{key}]: {e}")))?;

    Ok(CategoryDataset {
        key: key.to_string(),
        title: table.title,
        units: table.units,
        ylabel: table.ylabel,
        xlabel: table.xlabel,
        reference: table.reference,
        start_year: table.start_year,
        records: table
            .val
            .into_iter()
            .map(|(label, v)| CategoryRecord {
                label,
                values: v.to_vec(),
            })
            .collect(),
    })
}

/// Milestones of one reactor in a demonstration program.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactorRecord {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    #[serde(default, rename = "MWe")]
    pub mwe: Option<f64>,
    #[serde(default)]
    pub solicited: Option<NaiveDate>,
    #[serde(default)]
    pub contracted: Option<NaiveDate>,
    #[serde(default)]
    pub ground_broken: Option<NaiveDate>,
    #[serde(default)]
    pub critical: Option<NaiveDate>,
    #[serde(default)]
    pub fullpower: Option<NaiveDate>,
    #[serde(default)]
    pub shutdown: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct ReactorFile {
    reactors: BTreeMap<String, ReactorRecord>,
}

/// Loads the `[reactors.<name>]` tables of a program file.
///
/// Dates are quoted ISO strings (`"1957-12-02"`).
///
/// # Errors
///
/// Returns `MissingFile` if the file does not exist and `Malformed` if it
/// does not parse.
pub fn load_reactors(path: &Path) -> Result<Vec<ReactorRecord>, PlotError> {
    info!(file = %path.display(), "loading reactor program");
    let content = fs::read_to_string(path).map_err(|e| PlotError::io(path, e))?;
    let file: ReactorFile = toml::from_str(&content)
        .map_err(|e| PlotError::malformed(source_name(path), e.to_string()))?;
    Ok(file
        .reactors
        .into_iter()
        .map(|(name, mut r)| {
            r.name = name;
            r
        })
        .collect())
}

/// Reads header-less `label,value` lines.
///
/// # Errors
///
/// Returns `MissingFile` if the file does not exist and `Malformed` for a
/// line without a numeric second field.
pub fn read_label_values(path: &Path) -> Result<Vec<(String, f64)>, PlotError> {
    info!(file = %path.display(), "loading label/value table");
    let name = source_name(path);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| PlotError::csv(path, e))?;

    let mut rows = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec.map_err(|e| PlotError::csv(path, e))?;
        let label = rec.get(0).unwrap_or("").trim().to_string();
        let value = rec.get(1).and_then(parse_number).ok_or_else(|| {
            PlotError::malformed(
                name.clone(),
                format!("line {}: expected \"label,value\"", line + 1),
            )
        })?;
        rows.push((label, value));
    }
    Ok(rows)
}

/// Reads a whitespace-delimited study table.
///
/// The label is the first `label_tokens` tokens joined by a space, with a
/// running per-label counter appended (`"Smith 2008_2"` for the second row
/// of that study). The value is the token at `value_column`.
///
/// # Errors
///
/// Returns `MissingFile` if the file does not exist and `Malformed` for a
/// short line or a non-numeric value.
pub fn read_study_table(
    path: &Path,
    label_tokens: usize,
    value_column: usize,
) -> Result<Vec<(String, f64)>, PlotError> {
    info!(file = %path.display(), "loading study table");
    let content = fs::read_to_string(path).map_err(|e| PlotError::io(path, e))?;
    parse_study_table(&content, label_tokens, value_column, &source_name(path))
}

fn parse_study_table(
    content: &str,
    label_tokens: usize,
    value_column: usize,
    name: &str,
) -> Result<Vec<(String, f64)>, PlotError> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut rows = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let raw = tokens.get(value_column).ok_or_else(|| {
            PlotError::malformed(
                name,
                format!(
                    "line {}: {} fields, value column is {value_column}",
                    line_no + 1,
                    tokens.len()
                ),
            )
        })?;
        let value = parse_number(raw).ok_or_else(|| {
            PlotError::malformed(
                name,
                format!("line {}: cannot parse \"{raw}\" as a number", line_no + 1),
            )
        })?;

        let base = tokens[..label_tokens.min(tokens.len())].join(" ");
        let count = counts.entry(base.clone()).or_insert(0);
        *count += 1;
        rows.push((format!("{base}_{count}"), value));
    }
    Ok(rows)
}
