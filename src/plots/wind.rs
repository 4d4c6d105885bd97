//! BPA wind generation against its own peak, and the generation mix.

use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{info, warn};

use super::Prepared;
use crate::config::WindConfig;
use crate::error::PlotError;
use crate::io::export::DerivedSeries;
use crate::io::workbook::{SheetLayout, Table, Workbook};
use crate::reconcile::{capacity_factor, peak};
use crate::render::palette::{EMPHASIS, LIGHT_SKY_BLUE, PHASE_GREEN, series_color};
use crate::render::{Anchor, AxisFormat, Figure, Layer, Legend, LineStyle};
use crate::series::TimeSeries;

const AREA_NAME: &str = "Bonneville Power Administration Control Area";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WindView {
    /// Wind output filled against the observed (or configured) capacity.
    Capacity,
    /// Wind, hydro, nuclear and fossil/biomass lines.
    Mix,
}

/// Which slice of the workbook to chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindRequest {
    pub view: WindView,
    /// Year shown in the title and output name.
    pub year: i32,
    pub start: NaiveDate,
    /// Inclusive: samples through 23:59:59 of this day are kept.
    pub end: NaiveDate,
}

impl WindRequest {
    /// Fills unset dates with the view's default range: the whole year for
    /// the capacity view, December 1-25 for the mix view.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` when `year` has no valid calendar dates or the
    /// range is inverted.
    pub fn new(
        view: WindView,
        year: i32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, PlotError> {
        let date = |m, d| {
            NaiveDate::from_ymd_opt(year, m, d)
                .ok_or_else(|| PlotError::malformed("--year", format!("{year} is out of range")))
        };
        let (default_start, default_end) = match view {
            WindView::Capacity => (date(1, 1)?, date(12, 31)?),
            WindView::Mix => (date(12, 1)?, date(12, 25)?),
        };
        let start = start.unwrap_or(default_start);
        let end = end.unwrap_or(default_end);
        if end < start {
            return Err(PlotError::malformed(
                "--start/--end",
                format!("range {start} to {end} is inverted"),
            ));
        }
        Ok(Self {
            view,
            year,
            start,
            end,
        })
    }

    fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        let last = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        (self.start.and_time(NaiveTime::MIN), self.end.and_time(last))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStat {
    pub name: String,
    pub peak_mw: f64,
    pub mean_mw: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindSummary {
    pub year: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub samples: usize,
    pub columns: Vec<ColumnStat>,
    /// Capacity view only.
    pub capacity_mw: Option<f64>,
    pub capacity_factor: Option<f64>,
}

impl fmt::Display for WindSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- BPA generation {} ---", self.year)?;
        writeln!(f, "Range:             {} to {}", self.start, self.end)?;
        write!(f, "Samples:           {}", self.samples)?;
        for c in &self.columns {
            write!(
                f,
                "\n{:<18} peak {:.0} MW, mean {:.0} MW",
                format!("{}:", c.name),
                c.peak_mw,
                c.mean_mw
            )?;
        }
        if let (Some(cap), Some(cf)) = (self.capacity_mw, self.capacity_factor) {
            write!(f, "\nCapacity:          {cap:.0} MW")?;
            write!(f, "\nCapacity factor:   {:.1}%", cf * 100.0)?;
        }
        Ok(())
    }
}

fn column_stat(series: &TimeSeries) -> Result<ColumnStat, PlotError> {
    let peak_mw = peak(series)?;
    let mean_mw = series.values().iter().sum::<f64>() / series.len() as f64;
    Ok(ColumnStat {
        name: series.label().to_string(),
        peak_mw,
        mean_mw,
    })
}

/// Loads every configured sheet of the workbook as one table.
///
/// # Errors
///
/// Returns `MissingFile` for a missing workbook or sheet and loader errors
/// for malformed sheets.
pub fn load(cfg: &WindConfig) -> Result<Table, PlotError> {
    let workbook = Workbook::open(&cfg.workbook)?;
    workbook.read_sheets(&cfg.sheets, &SheetLayout::from(cfg))
}

/// Loads the workbook, slices the requested range and builds the figure.
///
/// # Errors
///
/// Returns loader errors, `SchemaMismatch` for a missing generation column
/// and `InvalidInput` when the range holds no samples.
pub fn prepare(cfg: &WindConfig, req: &WindRequest) -> Result<Prepared<WindSummary>, PlotError> {
    let table = load(cfg)?;
    let (from, to) = req.bounds();
    let table = table.between(from, to);
    info!(rows = table.len(), %from, %to, "sliced workbook");
    if table.is_empty() {
        warn!(start = %req.start, end = %req.end, "no samples in range");
    }

    match req.view {
        WindView::Capacity => capacity_view(cfg, req, &table),
        WindView::Mix => mix_view(req, &table),
    }
}

fn capacity_view(
    cfg: &WindConfig,
    req: &WindRequest,
    table: &Table,
) -> Result<Prepared<WindSummary>, PlotError> {
    let wind = table.series("Wind")?;
    let stat = column_stat(&wind)?;
    let capacity = match cfg.capacity_mw {
        Some(c) => c,
        None => stat.peak_mw,
    };
    let cf = capacity_factor(&wind, Some(capacity))?;
    info!(capacity, capacity_factor = cf, "wind capacity factor");

    let points = wind.decimal_year_points();
    let first_x = points.first().map_or(f64::from(req.year), |p| p.0);
    let last_x = points.last().map_or(first_x + 1.0, |p| p.0);

    let mut figure = Figure::new(format!(
        "Electricity Generation by Wind in the {AREA_NAME} ({})",
        req.year
    ))
    .axes("", "Electricity Generation from Wind (Megawatts)")
    .formats(AxisFormat::Month, AxisFormat::Number { decimals: 0 })
    .x_range(first_x..last_x.max(first_x + 1e-3))
    .y_range(0.0..capacity * 1.15)
    .legend(Legend::LowerRight);

    let ceiling: Vec<(f64, f64)> = points.iter().map(|&(x, _)| (x, capacity)).collect();
    figure.push(Layer::Area {
        points: ceiling,
        color: LIGHT_SKY_BLUE,
        alpha: 1.0,
        label: Some("Calm".to_string()),
    });
    figure.push(Layer::Area {
        points: points.clone(),
        color: PHASE_GREEN,
        alpha: 1.0,
        label: Some("Windy".to_string()),
    });
    figure.push(Layer::HLine {
        y: capacity,
        color: EMPHASIS,
        style: LineStyle::Dashed,
        label: None,
    });
    let span = last_x - first_x;
    figure.push(Layer::Text {
        x: first_x + span * 0.5,
        y: capacity * 1.04,
        lines: vec!["Max capacity if all turbines were spinning".to_string()],
        size: 14,
        color: EMPHASIS,
        anchor: Anchor::Left,
    });
    figure.push(Layer::text(
        first_x + span * 0.25,
        capacity * 1.1,
        &format!("Approx. capacity factor: {:.0}%", cf * 100.0),
        16,
        Anchor::Left,
    ));

    Ok(Prepared {
        summary: WindSummary {
            year: req.year,
            start: req.start,
            end: req.end,
            samples: wind.len(),
            columns: vec![stat],
            capacity_mw: Some(capacity),
            capacity_factor: Some(cf),
        },
        figure,
        derived: vec![DerivedSeries::new("Wind", points)],
        default_output: PathBuf::from(format!("wind-generation-{}.png", req.year)),
    })
}

fn mix_view(req: &WindRequest, table: &Table) -> Result<Prepared<WindSummary>, PlotError> {
    let mut figure = Figure::new(format!(
        "{} Electricity Generation in the {AREA_NAME}",
        req.start.format("%B %Y")
    ))
    .axes("Date", "Electricity Generation (Megawatts)")
    .formats(AxisFormat::Date, AxisFormat::Number { decimals: 0 })
    .legend(Legend::UpperRight);

    let mut columns = Vec::new();
    let mut derived = Vec::new();
    let mut top: f64 = 0.0;
    let mut samples = 0;
    for (i, name) in WindConfig::MIX_COLUMNS.iter().enumerate() {
        let series = table.series(name)?;
        let stat = column_stat(&series)?;
        top = top.max(stat.peak_mw);
        samples = samples.max(series.len());
        let points = series.decimal_year_points();
        figure.push(Layer::line(points.clone(), series_color(i), *name));
        derived.push(DerivedSeries::new(*name, points));
        columns.push(stat);
    }
    figure = figure.y_range(0.0..(top * 1.1).max(1.0));

    Ok(Prepared {
        summary: WindSummary {
            year: req.year,
            start: req.start,
            end: req.end,
            samples,
            columns,
            capacity_mw: None,
            capacity_factor: None,
        },
        figure,
        derived,
        default_output: PathBuf::from(format!("generation-mix-{}.png", req.year)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn capacity_view_defaults_to_whole_year() {
        let req = WindRequest::new(WindView::Capacity, 2020, None, None).expect("valid year");
        assert_eq!(req.start, date(2020, 1, 1));
        assert_eq!(req.end, date(2020, 12, 31));
    }

    #[test]
    fn mix_view_defaults_to_december() {
        let req = WindRequest::new(WindView::Mix, 2017, None, None).expect("valid year");
        assert_eq!(req.start, date(2017, 12, 1));
        assert_eq!(req.end, date(2017, 12, 25));
    }

    #[test]
    fn end_day_is_inclusive() {
        let req = WindRequest::new(
            WindView::Capacity,
            2020,
            Some(date(2020, 1, 1)),
            Some(date(2020, 10, 17)),
        )
        .expect("valid range");
        let (_, to) = req.bounds();
        assert_eq!(to.to_string(), "2020-10-17 23:59:59");
    }

    #[test]
    fn inverted_range_rejected() {
        let err = WindRequest::new(
            WindView::Mix,
            2020,
            Some(date(2020, 5, 2)),
            Some(date(2020, 5, 1)),
        );
        assert!(matches!(err, Err(PlotError::Malformed { .. })));
    }

    #[test]
    fn summary_reports_capacity_factor() {
        let summary = WindSummary {
            year: 2020,
            start: date(2020, 1, 1),
            end: date(2020, 12, 31),
            samples: 3,
            columns: vec![ColumnStat {
                name: "Wind".to_string(),
                peak_mw: 2800.0,
                mean_mw: 700.0,
            }],
            capacity_mw: Some(2800.0),
            capacity_factor: Some(0.25),
        };
        let text = summary.to_string();
        assert!(text.contains("Capacity factor:   25.0%"));
        assert!(text.contains("Wind:"));
    }
}
