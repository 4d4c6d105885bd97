//! Breakdown of the energy released by fissioning one kilogram of U-235.

use std::fmt;
use std::path::PathBuf;

use tracing::info;

use super::Prepared;
use crate::config::FissionConfig;
use crate::error::PlotError;
use crate::io::export::DerivedSeries;
use crate::io::records::read_label_values;
use crate::physics::EV_PER_MEV;
use crate::reconcile::normalize_to_total;
use crate::render::palette::{LIGHT_SKY_BLUE, REFERENCE, WHEAT, WINTER};
use crate::render::{Anchor, AxisFormat, Bar, Figure, Layer, LineStyle};

const BAR_WIDTH: f64 = 0.35;
const Y_MAX: f64 = 900.0;

/// Callouts: position, text, and whether the box is highlighted.
const CALLOUTS: &[(f64, f64, &str, bool)] = &[
    (
        1.3,
        600.0,
        "These come\nimmediately after\nfission and\nstop after\nreactor shutdown",
        false,
    ),
    (
        4.0,
        600.0,
        "These come between\nmilliseconds and millenia\nafter fission and continue\nafter reactor shutdown",
        false,
    ),
    (
        4.0,
        200.0,
        "This afterglow heat\nis why nuclear\nwaste is hazardous",
        true,
    ),
    (
        6.0,
        600.0,
        "These\nrarely\ninteract\nwith\nanything!",
        false,
    ),
];

#[derive(Debug, Clone, PartialEq)]
pub struct FissionSummary {
    pub total_mwd: f64,
    /// Component label and its share in MWd.
    pub components: Vec<(String, f64)>,
    /// Sum of each group between consecutive breaks.
    pub groups: Vec<f64>,
}

impl fmt::Display for FissionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--- Fission of 1 kg U-235 ({:.0} MWd) ---", self.total_mwd)?;
        for (label, mwd) in &self.components {
            write!(f, "\n{label:<28} {}", value_label(*mwd))?;
        }
        for (i, sum) in self.groups.iter().enumerate() {
            write!(f, "\nGroup {}:{:>21.1}", i + 1, sum)?;
        }
        Ok(())
    }
}

/// Bar annotation: three decimals below one, whole numbers otherwise.
pub fn value_label(v: f64) -> String {
    if v < 1.0 {
        format!("{v:.3}")
    } else {
        format!("{v:.0}")
    }
}

/// Sums `values` into groups split at the (fractional) bar positions in
/// `breaks`.
pub fn group_sums(values: &[f64], breaks: &[f64]) -> Vec<f64> {
    let mut sums = vec![0.0; breaks.len() + 1];
    for (i, v) in values.iter().enumerate() {
        let group = breaks.iter().filter(|&&b| (i as f64) > b).count();
        sums[group] += v;
    }
    sums
}

/// Reads the energy components (eV), converts to MeV and scales them so
/// they add up to the configured total.
///
/// # Errors
///
/// Returns loader errors and `InvalidInput` for an empty or all-zero table.
pub fn prepare(cfg: &FissionConfig) -> Result<Prepared<FissionSummary>, PlotError> {
    let rows = read_label_values(&cfg.path)?;
    let mev: Vec<f64> = rows.iter().map(|r| r.1 / EV_PER_MEV).collect();
    let mwd = normalize_to_total(&mev, cfg.total_mwd_per_kg)?;
    info!(components = rows.len(), total_mev = mev.iter().sum::<f64>(), "fission energy");

    let labels: Vec<String> = rows.iter().map(|r| r.0.clone()).collect();
    let n = labels.len() as f64;
    let mut figure = Figure::new("Energy release from fission of 1 kg U-235")
        .axes("", "Energy released (megawatt days)")
        .formats(
            AxisFormat::Labels(labels.clone()),
            AxisFormat::Number { decimals: 0 },
        )
        .x_range(-0.5..n - 0.5)
        .y_range(0.0..Y_MAX);
    figure.grid = false;

    figure.push(Layer::Bars {
        bars: mwd
            .iter()
            .enumerate()
            .map(|(i, &v)| Bar::column(i as f64, BAR_WIDTH, v, WINTER))
            .collect(),
        label: None,
    });
    for (i, &v) in mwd.iter().enumerate() {
        figure.push(Layer::text(i as f64, v, &value_label(v), 10, Anchor::Above));
    }
    for &x in &cfg.group_breaks {
        figure.push(Layer::VLine {
            x,
            color: REFERENCE,
            style: LineStyle::Dashed,
        });
    }
    for &(x, y, text, highlight) in CALLOUTS {
        let rows = text.lines().count() as f64;
        let half_width = text.lines().map(str::len).max().unwrap_or(0) as f64 * 0.035;
        figure.push(Layer::Bars {
            bars: vec![Bar {
                x0: x - half_width,
                x1: x + half_width,
                y0: y - rows * 14.0,
                y1: y + rows * 14.0,
                color: if highlight { LIGHT_SKY_BLUE } else { WHEAT },
                alpha: 0.5,
            }],
            label: None,
        });
        figure.push(Layer::text(x, y, text, 13, Anchor::Center));
    }

    let groups = group_sums(&mwd, &cfg.group_breaks);
    let points = mwd.iter().enumerate().map(|(i, &v)| (i as f64, v)).collect();
    Ok(Prepared {
        summary: FissionSummary {
            total_mwd: cfg.total_mwd_per_kg,
            components: labels.into_iter().zip(mwd).collect(),
            groups,
        },
        figure,
        derived: vec![DerivedSeries::new("MWd per kg", points)],
        default_output: PathBuf::from("fission-energy.svg"),
    })
}
