//! Exponential decay curves for a handful of half-lives.

use std::fmt;
use std::path::PathBuf;

use super::Prepared;
use crate::config::HalfLifeConfig;
use crate::error::PlotError;
use crate::io::export::DerivedSeries;
use crate::physics::{decay_curve, remaining};
use crate::render::palette::{REFERENCE, series_color};
use crate::render::{Anchor, AxisFormat, Figure, Layer, LineStyle};

#[derive(Debug, Clone, PartialEq)]
pub struct HalfLifeSummary {
    pub initial: f64,
    pub years: u32,
    /// Half-life and the quantity left at the horizon.
    pub remaining: Vec<(f64, f64)>,
}

impl fmt::Display for HalfLifeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--- Remaining after {} years ---", self.years)?;
        for (half_life, left) in &self.remaining {
            write!(f, "\nHalf-life {half_life:>5} y: {left:>7.2}%")?;
        }
        Ok(())
    }
}

/// Builds one decay curve per configured half-life.
///
/// # Errors
///
/// Does not fail for a validated config; the signature matches the other
/// charts.
pub fn prepare(cfg: &HalfLifeConfig) -> Result<Prepared<HalfLifeSummary>, PlotError> {
    let half = cfg.initial / 2.0;
    let horizon = f64::from(cfg.years);
    let mut figure = Figure::new("Half life")
        .axes(
            "Time since start of decay (years)",
            "Percentage of atoms remaining (%)",
        )
        .formats(
            AxisFormat::Number { decimals: 0 },
            AxisFormat::Number { decimals: 0 },
        )
        .x_range(0.0..horizon)
        .y_range(0.0..cfg.initial);

    let mut derived = Vec::with_capacity(cfg.half_lives.len());
    for (i, &half_life) in cfg.half_lives.iter().enumerate() {
        let points = decay_curve(cfg.initial, half_life, cfg.years);
        let label = format!("Half-life = {half_life} years");
        figure.push(Layer::line(points.clone(), series_color(i), label.as_str()));
        figure.push(Layer::Line {
            points: vec![(half_life, half), (half_life, 0.0)],
            color: REFERENCE,
            style: LineStyle::Dashed,
            width: 1,
            label: None,
        });
        derived.push(DerivedSeries::new(label, points));
    }

    let last = cfg.half_lives.iter().copied().fold(0.0, f64::max);
    figure.push(Layer::Line {
        points: vec![(0.0, half), (last, half)],
        color: REFERENCE,
        style: LineStyle::Dashed,
        width: 1,
        label: None,
    });
    figure.push(Layer::text(last + 30.0, half, "Halfway point", 14, Anchor::Left));

    Ok(Prepared {
        summary: HalfLifeSummary {
            initial: cfg.initial,
            years: cfg.years,
            remaining: cfg
                .half_lives
                .iter()
                .map(|&h| (h, remaining(cfg.initial, h, horizon)))
                .collect(),
        },
        figure,
        derived,
        default_output: PathBuf::from("half-life.svg"),
    })
}
