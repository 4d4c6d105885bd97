//! Monthly US nuclear capacity factors with a rolling annual average.

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use tracing::info;

use super::Prepared;
use crate::config::NuclearCfConfig;
use crate::error::{PlotError, SeriesError};
use crate::io::export::DerivedSeries;
use crate::io::workbook::{SheetLayout, Workbook};
use crate::reconcile::rolling_average;
use crate::render::palette::{LIGHT_SKY_BLUE, REFERENCE};
use crate::render::{Anchor, AxisFormat, Bar, Figure, Layer, Legend, LineStyle};

/// Bar width: one month in decimal years.
const MONTH_WIDTH: f64 = 31.0 / 365.25;

#[derive(Debug, Clone, PartialEq)]
pub struct NuclearCfSummary {
    pub months: usize,
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub window: usize,
    pub latest_monthly: f64,
    /// `None` when there are fewer months than the window.
    pub latest_average: Option<f64>,
    pub best_average: Option<(NaiveDate, f64)>,
}

impl fmt::Display for NuclearCfSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- US nuclear capacity factor ---")?;
        writeln!(
            f,
            "Months:            {} ({} to {})",
            self.months, self.first, self.last
        )?;
        write!(f, "Latest month:      {:.1}%", self.latest_monthly)?;
        if let Some(avg) = self.latest_average {
            write!(f, "\nLatest {}-mo avg:  {avg:.1}%", self.window)?;
        }
        if let Some((date, avg)) = self.best_average {
            write!(f, "\nBest {}-mo avg:    {avg:.1}% ({date})", self.window)?;
        }
        Ok(())
    }
}

/// Loads the capacity factor column and its rolling average.
///
/// # Errors
///
/// Returns loader errors, `SchemaMismatch` when the value column is absent
/// and `InvalidInput` for an empty column or a zero window.
pub fn prepare(cfg: &NuclearCfConfig) -> Result<Prepared<NuclearCfSummary>, PlotError> {
    let workbook = Workbook::open(&cfg.workbook)?;
    let table = workbook.read_sheet(&cfg.sheet, &SheetLayout::from(cfg))?;
    let monthly = table.series(&cfg.value_column)?;
    let average = rolling_average(&monthly, cfg.window)?;
    info!(months = monthly.len(), window = cfg.window, "rolling average");

    let (first, last) = match (monthly.timestamps().first(), monthly.timestamps().last()) {
        (Some(f), Some(l)) => (f.date(), l.date()),
        _ => return Err(SeriesError::Empty.into()),
    };
    let latest_monthly = monthly.values().last().copied().unwrap_or_default();
    let best_average = average
        .iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(t, v)| (t.date(), v));
    let end_year = last.year();

    let bars_xy = monthly.decimal_year_points();
    let avg_xy = average.decimal_year_points();

    let x0 = bars_xy.first().map_or(0.0, |p| p.0) - MONTH_WIDTH;
    let x1 = bars_xy.last().map_or(1.0, |p| p.0) + MONTH_WIDTH;
    let mut figure = Figure::new(format!(
        "US Nuclear Power Plant Capacity Factors through {end_year}"
    ))
    .axes("", "Capacity Factor (%)")
    .formats(AxisFormat::Year, AxisFormat::Number { decimals: 0 })
    .x_range(x0..x1)
    .y_range(0.0..100.0)
    .legend(Legend::LowerRight);

    figure.push(Layer::Bars {
        bars: bars_xy
            .iter()
            .map(|&(x, v)| Bar::column(x + MONTH_WIDTH / 2.0, MONTH_WIDTH, v, LIGHT_SKY_BLUE))
            .collect(),
        label: Some("Monthly".to_string()),
    });
    figure.push(Layer::Line {
        points: avg_xy.clone(),
        color: REFERENCE,
        style: LineStyle::Solid,
        width: 2,
        label: Some("Avg".to_string()),
    });
    figure.push(Layer::text(
        x0 + (x1 - x0) * 0.02,
        8.0,
        "Data from EIA Annual Energy Review\nhttps://www.eia.gov/totalenergy/data/annual/",
        11,
        Anchor::Left,
    ));

    Ok(Prepared {
        summary: NuclearCfSummary {
            months: monthly.len(),
            first,
            last,
            window: cfg.window,
            latest_monthly,
            latest_average: average.values().last().copied(),
            best_average,
        },
        figure,
        derived: vec![
            DerivedSeries::new("Monthly", bars_xy),
            DerivedSeries::new(format!("{}-month average", cfg.window), avg_xy),
        ],
        default_output: PathBuf::from(format!("nuclear-capacity-factors-{end_year}.png")),
    })
}
