//! Pie chart of worldwide primary energy consumption by source.

use std::f64::consts::TAU;
use std::fmt;
use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use tracing::{info, warn};

use super::{Prepared, capitalize};
use crate::error::{PlotError, SeriesError};
use crate::io::export::DerivedSeries;
use crate::io::records::{CategoryDataset, load_dataset};
use crate::render::{Anchor, AxisFormat, Figure, Layer};

/// Slice order and colors: fossil greys first, then the low-carbon greens.
const SOURCES: [(&str, RGBColor); 6] = [
    ("oil", RGBColor(128, 128, 128)),
    ("natural gas", RGBColor(153, 153, 153)),
    ("coal", RGBColor(179, 179, 179)),
    ("nuclear", RGBColor(173, 255, 47)),
    ("hydro", RGBColor(50, 205, 50)),
    ("renewables", RGBColor(0, 255, 127)),
];

const RADIUS: f64 = 1.0;
/// Arc resolution of each wedge outline.
const STEPS_PER_TURN: f64 = 360.0;

#[derive(Debug, Clone, PartialEq)]
pub struct EnergyShare {
    pub source: String,
    pub value: f64,
    /// Share of the total, 0-100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryEnergySummary {
    pub title: String,
    pub units: Option<String>,
    pub reference: Option<String>,
    pub shares: Vec<EnergyShare>,
}

impl fmt::Display for PrimaryEnergySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--- {} ---", self.title)?;
        let units = self.units.as_deref().unwrap_or("");
        for s in &self.shares {
            write!(
                f,
                "\n{:<12} {:>9.1} {units}  {:>3.0}%",
                s.source, s.value, s.percent
            )?;
        }
        if let Some(reference) = &self.reference {
            write!(f, "\nData from: {reference}")?;
        }
        Ok(())
    }
}

/// Outline of the wedge between `start` and `end` (radians, counterclockwise
/// from the positive x axis).
fn wedge(start: f64, end: f64, radius: f64) -> Vec<(f64, f64)> {
    let steps = (((end - start) / TAU) * STEPS_PER_TURN).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push((0.0, 0.0));
    for i in 0..=steps {
        let a = start + (end - start) * i as f64 / steps as f64;
        points.push((radius * a.cos(), radius * a.sin()));
    }
    points
}

/// Values of the fixed sources in slice order, with their share of the total.
///
/// # Errors
///
/// Returns `SchemaMismatch` when a source is missing from the table and
/// `InvalidInput` when the values sum to zero.
pub fn shares(dataset: &CategoryDataset) -> Result<Vec<EnergyShare>, PlotError> {
    for extra in dataset
        .records
        .iter()
        .filter(|r| !SOURCES.iter().any(|(s, _)| *s == r.label))
    {
        warn!(source = %extra.label, "not part of the consumption breakdown, ignoring");
    }

    let values = SOURCES
        .iter()
        .map(|(source, _)| {
            dataset
                .records
                .iter()
                .find(|r| r.label == *source)
                .and_then(|r| r.values.get(r.values.len() / 2).copied())
                .ok_or_else(|| {
                    PlotError::schema(dataset.key.as_str(), format!("source \"{source}\""))
                })
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(SeriesError::ZeroIntegral.into());
    }
    Ok(SOURCES
        .iter()
        .zip(values)
        .map(|((source, _), value)| EnergyShare {
            source: capitalize(source),
            value,
            percent: value / total * 100.0,
        })
        .collect())
}

/// Loads consumption table `key` and lays out the pie.
///
/// # Errors
///
/// Returns loader errors and the errors of [`shares`].
pub fn prepare(path: &Path, key: &str) -> Result<Prepared<PrimaryEnergySummary>, PlotError> {
    let dataset = load_dataset(path, key)?;
    let shares = shares(&dataset)?;
    info!(key, sources = shares.len(), "primary energy shares");

    let mut figure = Figure::new(dataset.title.clone())
        .formats(AxisFormat::Hidden, AxisFormat::Hidden)
        .x_range(-2.0..2.0)
        .y_range(-1.42..1.42);
    figure.grid = false;

    let mut start = 0.0;
    for (share, (_, color)) in shares.iter().zip(SOURCES) {
        let end = start + share.percent / 100.0 * TAU;
        figure.push(Layer::Polygon {
            points: wedge(start, end, RADIUS),
            color,
            alpha: 1.0,
            outline: false,
        });

        let mid = (start + end) / 2.0;
        let (cos, sin) = (mid.cos(), mid.sin());
        figure.push(Layer::text(
            0.6 * RADIUS * cos,
            0.6 * RADIUS * sin,
            &format!("{:.0}%", share.percent),
            14,
            Anchor::Center,
        ));
        let anchor = if cos < 0.0 { Anchor::Right } else { Anchor::Left };
        figure.push(Layer::text(
            1.1 * RADIUS * cos,
            1.1 * RADIUS * sin,
            &share.source,
            15,
            anchor,
        ));
        start = end;
    }
    if let Some(reference) = &dataset.reference {
        figure.push(Layer::text(
            -0.4,
            -1.3,
            &format!("Data from: {reference}"),
            11,
            Anchor::Left,
        ));
    }

    let points = shares
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64, s.percent))
        .collect();
    Ok(Prepared {
        summary: PrimaryEnergySummary {
            title: dataset.title,
            units: dataset.units,
            reference: dataset.reference,
            shares,
        },
        figure,
        derived: vec![DerivedSeries::new("Share (%)", points)],
        default_output: PathBuf::from("primary-energy-consumption.png"),
    })
}
