//! Seasonal demand and solar supply in California, and what 100% solar
//! would take.
//!
//! Energy figures are integrals of 5-minute MW samples reported in GWd.
//! The scenario rescales each season's solar profile until its integral
//! matches that day's demand, then reports the peak capacity this requires
//! and the energy that would have to be stored (the part of the required
//! supply above the demand curve).

use std::fmt;
use std::path::PathBuf;

use tracing::info;

use super::Prepared;
use crate::config::IntermittencyConfig;
use crate::error::{PlotError, SeriesError};
use crate::io::caiso::{DailyLayout, read_daily_series};
use crate::io::export::DerivedSeries;
use crate::reconcile::{difference, integrate, peak, positive_part, rescale, scale_factor};
use crate::render::palette::{SUMMER, WINTER};
use crate::render::{Anchor, AxisFormat, Figure, Layer, Legend, LineStyle};
use crate::series::TimeSeries;

const MW_PER_GW: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum IntermittencyPlot {
    /// Summer vs winter demand.
    Demand,
    /// Summer vs winter solar supply.
    Solar,
    /// Demand, current solar and the solar required to meet demand.
    Scenario,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Summer,
    Winter,
}

impl Season {
    pub fn name(self) -> &'static str {
        match self {
            Self::Summer => "Summer",
            Self::Winter => "Winter",
        }
    }

    fn color(self) -> plotters::style::RGBColor {
        match self {
            Self::Summer => SUMMER,
            Self::Winter => WINTER,
        }
    }
}

/// Energy balance of one day under the 100% solar scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonBalance {
    pub season: Season,
    pub demand_gwd: f64,
    pub supply_gwd: f64,
    /// Multiplier bringing the solar integral up to the demand integral.
    pub scale_up: f64,
    pub required_gwd: f64,
    pub current_peak_gw: f64,
    pub required_peak_gw: f64,
    /// Energy of the required supply above the demand curve.
    pub storage_gwd: f64,
}

impl SeasonBalance {
    /// Computes the balance and returns the required supply series (MW).
    ///
    /// # Errors
    ///
    /// Fails for empty series, a zero solar integral, or series of
    /// different lengths.
    pub fn compute(
        season: Season,
        demand: &TimeSeries,
        solar: &TimeSeries,
        interval_minutes: f64,
    ) -> Result<(Self, TimeSeries), SeriesError> {
        let demand_gwd = integrate(demand, interval_minutes)? / MW_PER_GW;
        let supply_gwd = integrate(solar, interval_minutes)? / MW_PER_GW;
        let scale_up = scale_factor(solar, demand, interval_minutes)?;
        let required = rescale(solar, scale_up)
            .with_label(format!("{} supply required", season.name()));
        let excess = positive_part(&difference(&required, demand)?);

        let balance = Self {
            season,
            demand_gwd,
            supply_gwd,
            scale_up,
            required_gwd: integrate(&required, interval_minutes)? / MW_PER_GW,
            current_peak_gw: peak(solar)? / MW_PER_GW,
            required_peak_gw: peak(&required)? / MW_PER_GW,
            storage_gwd: integrate(&excess, interval_minutes)? / MW_PER_GW,
        };
        Ok((balance, required))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntermittencySummary {
    /// `(label, GWd)` per plotted day.
    Integrals(Vec<(String, f64)>),
    Scenario(Vec<SeasonBalance>),
}

impl fmt::Display for IntermittencySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Daily energy ---")?;
        match self {
            Self::Integrals(rows) => {
                for (i, (label, gwd)) in rows.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{label:<18} {gwd:>8.1} GWd")?;
                }
            }
            Self::Scenario(balances) => {
                for (i, b) in balances.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    writeln!(f, "{}:", b.season.name())?;
                    writeln!(f, "  Demand:            {:.1} GWd", b.demand_gwd)?;
                    writeln!(f, "  Current supply:    {:.1} GWd", b.supply_gwd)?;
                    writeln!(f, "  Scale-up:          {:.2}x", b.scale_up)?;
                    writeln!(f, "  Required supply:   {:.1} GWd", b.required_gwd)?;
                    writeln!(f, "  Current peak:      {:.1} GW", b.current_peak_gw)?;
                    writeln!(f, "  Required peak:     {:.1} GW", b.required_peak_gw)?;
                    write!(f, "  Storage:           {:.1} GWd", b.storage_gwd)?;
                }
            }
        }
        Ok(())
    }
}

fn path(cfg: &IntermittencyConfig, file: &str) -> PathBuf {
    cfg.data_dir.join(file)
}

fn load_demand(cfg: &IntermittencyConfig, season: Season) -> Result<TimeSeries, PlotError> {
    let file = match season {
        Season::Summer => &cfg.summer_demand,
        Season::Winter => &cfg.winter_demand,
    };
    read_daily_series(
        &path(cfg, file),
        &cfg.demand_row_prefix,
        &format!("{} demand", season.name()),
        &DailyLayout::from(cfg),
    )
}

fn load_solar(cfg: &IntermittencyConfig, season: Season) -> Result<TimeSeries, PlotError> {
    let file = match season {
        Season::Summer => &cfg.summer_solar,
        Season::Winter => &cfg.winter_solar,
    };
    read_daily_series(
        &path(cfg, file),
        &cfg.solar_row_prefix,
        &format!("{} solar", season.name()),
        &DailyLayout::from(cfg),
    )
}

fn gw_points(series: &TimeSeries) -> Vec<(f64, f64)> {
    series
        .hour_of_day_points()
        .into_iter()
        .map(|(h, mw)| (h, mw / MW_PER_GW))
        .collect()
}

fn day_note(summer: &TimeSeries, winter: &TimeSeries) -> String {
    let date = |s: &TimeSeries| {
        s.timestamps()
            .first()
            .map(|t| t.date().to_string())
            .unwrap_or_default()
    };
    format!("W: {}\nS: {}\nData: CAISO", date(winter), date(summer))
}

fn base_figure(title: &str, y_desc: &str) -> Figure {
    Figure::new(title)
        .axes("Time (hour of day)", y_desc)
        .formats(
            AxisFormat::Number { decimals: 0 },
            AxisFormat::Number { decimals: 0 },
        )
        .x_range(0.0..24.0)
}

/// Loads the CAISO days the chart needs and builds its figure.
///
/// # Errors
///
/// Returns loader errors for missing or malformed exports and
/// `InvalidInput` when a series cannot be integrated or rescaled.
pub fn prepare(
    cfg: &IntermittencyConfig,
    plot: IntermittencyPlot,
) -> Result<Prepared<IntermittencySummary>, PlotError> {
    let interval = cfg.sample_interval_minutes;
    match plot {
        IntermittencyPlot::Demand | IntermittencyPlot::Solar => {
            let demand = plot == IntermittencyPlot::Demand;
            let (title, y_desc, legend, output) = if demand {
                (
                    "Seasonal demand variation in California",
                    "Demand (GW)",
                    Legend::LowerRight,
                    "seasonal-demand-variation.png",
                )
            } else {
                (
                    "Seasonal solar variation in California",
                    "Solar supply (GW)",
                    Legend::UpperLeft,
                    "seasonal-solar-variation.png",
                )
            };
            let load = |season| {
                if demand {
                    load_demand(cfg, season)
                } else {
                    load_solar(cfg, season)
                }
            };

            let summer = load(Season::Summer)?;
            let winter = load(Season::Winter)?;

            let mut rows = Vec::new();
            let mut derived = Vec::new();
            let mut figure = base_figure(title, y_desc).legend(legend);
            for (season, series) in [(Season::Summer, &summer), (Season::Winter, &winter)] {
                let gwd = integrate(series, interval)? / MW_PER_GW;
                info!(series = series.label(), gwd, "integrated");
                let points = gw_points(series);
                figure.push(Layer::line(
                    points.clone(),
                    season.color(),
                    format!("{} ({gwd:.1} GWd)", series.label()),
                ));
                derived.push(DerivedSeries::new(series.label(), points));
                rows.push((series.label().to_string(), gwd));
            }
            let top = derived
                .iter()
                .flat_map(|d| d.points.iter())
                .map(|p| p.1)
                .fold(0.0, f64::max);
            figure = figure.y_range(0.0..(top * 1.1).max(1.0));
            figure.push(Layer::text(
                1.0,
                top * 0.1,
                &day_note(&summer, &winter),
                12,
                Anchor::Left,
            ));

            Ok(Prepared {
                summary: IntermittencySummary::Integrals(rows),
                figure,
                derived,
                default_output: PathBuf::from(output),
            })
        }
        IntermittencyPlot::Scenario => {
            let mut figure = base_figure(
                "Seasonal implications of 100% solar in California",
                "Power (GW)",
            )
            .legend(Legend::UpperLeft);
            let mut balances = Vec::new();
            let mut derived = Vec::new();
            let mut days = Vec::new();

            for season in [Season::Winter, Season::Summer] {
                let demand = load_demand(cfg, season)?;
                let solar = load_solar(cfg, season)?;
                let (balance, required) =
                    SeasonBalance::compute(season, &demand, &solar, interval)?;
                info!(
                    season = season.name(),
                    scale_up = balance.scale_up,
                    storage_gwd = balance.storage_gwd,
                    "scenario balance"
                );

                let color = season.color();
                let name = season.name();
                let lines = [
                    (
                        &demand,
                        LineStyle::Dashed,
                        format!("{name} Demand ({:.1} GWd)", balance.demand_gwd),
                    ),
                    (
                        &solar,
                        LineStyle::Solid,
                        format!("{name} Supply Current ({:.1} GWd)", balance.supply_gwd),
                    ),
                    (
                        &required,
                        LineStyle::Dotted,
                        format!("{name} Supply Required ({:.1} GWd)", balance.required_gwd),
                    ),
                ];
                for (series, style, label) in lines {
                    let points = gw_points(series);
                    figure.push(Layer::Line {
                        points: points.clone(),
                        color,
                        style,
                        width: 2,
                        label: Some(label),
                    });
                    derived.push(DerivedSeries::new(series.label(), points));
                }
                balances.push(balance);
                days.push(demand);
            }

            let top = balances
                .iter()
                .map(|b| b.required_peak_gw)
                .fold(0.0, f64::max);
            figure = figure.y_range(0.0..(top * 1.1).max(1.0));
            if let [winter, summer] = days.as_slice() {
                figure.push(Layer::text(
                    1.0,
                    top * 0.05,
                    &day_note(summer, winter),
                    12,
                    Anchor::Left,
                ));
            }

            Ok(Prepared {
                summary: IntermittencySummary::Scenario(balances),
                figure,
                derived,
                default_output: PathBuf::from("solar-scenario.png"),
            })
        }
    }
}
