//! Bar chart of one table of the key-value dataset (capacity factors,
//! lifecycle emissions and similar per-source figures).

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{Prepared, capitalize};
use crate::error::PlotError;
use crate::io::export::DerivedSeries;
use crate::io::records::{CategoryDataset, load_dataset};
use crate::render::palette::{WINTER, yl_gn};
use crate::render::{AxisFormat, Bar, Figure, Layer};

const BAR_WIDTH: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    /// Alphabetical by label.
    #[default]
    Label,
    /// Largest value first.
    Descending,
    /// Smallest value first.
    Ascending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub title: String,
    pub units: Option<String>,
    /// Display order.
    pub rows: Vec<(String, f64)>,
}

impl fmt::Display for CategorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--- {} ---", self.title)?;
        let units = self.units.as_deref().unwrap_or("");
        for (label, value) in &self.rows {
            write!(f, "\n{label:<18} {value:>10.1} {units}")?;
        }
        Ok(())
    }
}

/// Picks one attribute per record, capitalizes labels and sorts.
///
/// `attribute` indexes into list values; `None` takes the middle element
/// (the median of a `[min, median, max]` triple, or the only value).
///
/// # Errors
///
/// Returns `SchemaMismatch` when a record has no value at `attribute`.
pub fn select(
    dataset: &CategoryDataset,
    attribute: Option<usize>,
    order: SortOrder,
) -> Result<Vec<(String, f64)>, PlotError> {
    let mut rows = dataset
        .records
        .iter()
        .map(|r| {
            let idx = attribute.unwrap_or(r.values.len() / 2);
            r.values
                .get(idx)
                .map(|&v| (capitalize(&r.label), v))
                .ok_or_else(|| {
                    PlotError::schema(
                        dataset.key.as_str(),
                        format!("attribute {idx} of \"{}\"", r.label),
                    )
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    match order {
        SortOrder::Label => rows.sort_by(|a, b| a.0.cmp(&b.0)),
        SortOrder::Descending => rows.sort_by(|a, b| b.1.total_cmp(&a.1)),
        SortOrder::Ascending => rows.sort_by(|a, b| a.1.total_cmp(&b.1)),
    }
    Ok(rows)
}

/// Loads dataset table `key` and builds its bar chart.
///
/// Percent tables get a yellow-green gradient and a fixed 0-100 axis.
///
/// # Errors
///
/// Returns loader errors and `SchemaMismatch` for missing keys or
/// attributes.
pub fn prepare(
    path: &Path,
    key: &str,
    attribute: Option<usize>,
    order: SortOrder,
) -> Result<Prepared<CategorySummary>, PlotError> {
    let dataset = load_dataset(path, key)?;
    let rows = select(&dataset, attribute, order)?;
    info!(key, rows = rows.len(), ?order, "selected categories");

    let percent = dataset.units.as_deref() == Some("%");
    let y_desc = match (&dataset.ylabel, &dataset.units) {
        (Some(label), _) => label.clone(),
        (None, Some(units)) => format!("{} ({units})", capitalize(&key.replace('_', " "))),
        (None, None) => String::new(),
    };
    let labels: Vec<String> = rows.iter().map(|r| r.0.clone()).collect();
    let n = rows.len() as f64;

    let mut figure = Figure::new(dataset.title.clone())
        .axes(dataset.xlabel.clone().unwrap_or_default(), y_desc)
        .formats(
            AxisFormat::Labels(labels),
            AxisFormat::Number { decimals: 0 },
        )
        .x_range(-0.5..(n - 0.5).max(0.5));
    if percent {
        figure = figure.y_range(0.0..100.0);
    } else {
        let top = rows.iter().map(|r| r.1).fold(0.0, f64::max);
        figure = figure.y_range(0.0..(top * 1.1).max(1.0));
    }
    figure.push(Layer::Bars {
        bars: rows
            .iter()
            .enumerate()
            .map(|(i, (_, v))| {
                let color = if percent { yl_gn(v / 100.0) } else { WINTER };
                Bar::column(i as f64, BAR_WIDTH, *v, color)
            })
            .collect(),
        label: None,
    });

    let points = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, r.1))
        .collect();
    Ok(Prepared {
        summary: CategorySummary {
            title: dataset.title.clone(),
            units: dataset.units.clone(),
            rows,
        },
        figure,
        derived: vec![DerivedSeries::new(key, points)],
        default_output: PathBuf::from(format!("{key}.png")),
    })
}
