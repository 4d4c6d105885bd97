//! Why the midpoint of the extremes misrepresents a skewed set of studies.

use std::fmt;
use std::path::PathBuf;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::info;

use super::Prepared;
use crate::config::{ExtremesConfig, SyntheticConfig};
use crate::error::PlotError;
use crate::io::export::DerivedSeries;
use crate::io::records::read_study_table;
use crate::render::palette::{EMPHASIS, PHASE_GREEN, PROJECTED, WINTER};
use crate::render::{Anchor, AxisFormat, Bar, Figure, Layer, LineStyle};
use crate::stats::Summary;

/// Standard normal draw using the Box-Muller transform.
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Demo dataset: `lower`, then `count` normal draws, then `upper`, all
/// clamped into `[lower, upper]`. Deterministic for a given seed.
pub fn synthetic_values(cfg: &SyntheticConfig) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let mut values = Vec::with_capacity(cfg.count + 2);
    values.push(cfg.lower);
    values.extend(
        (0..cfg.count).map(|_| (cfg.center + standard_normal(&mut rng) * cfg.std_dev)
            .clamp(cfg.lower, cfg.upper)),
    );
    values.push(cfg.upper);
    values
}

/// Where the studies came from.
#[derive(Debug, Clone, PartialEq)]
pub enum StudySource {
    Table(PathBuf),
    Synthetic { seed: u64 },
}

impl fmt::Display for StudySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table(path) => write!(f, "{}", path.display()),
            Self::Synthetic { seed } => write!(f, "synthetic (seed {seed})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtremesSummary {
    pub source: StudySource,
    pub stats: Summary,
}

impl fmt::Display for ExtremesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Studies from {}", self.source)?;
        write!(f, "{}", self.stats)
    }
}

/// Loads the study table (or generates the demo set) and marks its mean,
/// median and mean of the extremes.
///
/// # Errors
///
/// Returns loader errors and `InvalidInput` for an empty table.
pub fn prepare(
    cfg: &ExtremesConfig,
    synthetic: bool,
) -> Result<Prepared<ExtremesSummary>, PlotError> {
    let (source, studies) = if synthetic {
        let values = synthetic_values(&cfg.synthetic);
        let studies = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect();
        (StudySource::Synthetic { seed: cfg.synthetic.seed }, studies)
    } else {
        let studies = read_study_table(&cfg.path, cfg.label_tokens, cfg.value_column)?;
        (StudySource::Table(cfg.path.clone()), studies)
    };

    let (labels, values): (Vec<String>, Vec<f64>) = studies.into_iter().unzip();
    let stats = Summary::from_values(&values)?;
    info!(studies = stats.count, %source, "study statistics");

    let n = values.len() as f64;
    let mut figure = Figure::new("The problem with the 'mean of the extremes'")
        .axes(
            "Study considered in Yale meta-analysis",
            "Lifecycle CO2-eq/kWh of nuclear (harmonized)",
        )
        .formats(AxisFormat::Labels(labels), AxisFormat::Number { decimals: 0 })
        .x_range(-1.0..n)
        .y_range(0.0..stats.max * 1.05);
    figure.grid = false;

    figure.push(Layer::Bars {
        bars: values
            .iter()
            .enumerate()
            .map(|(i, &v)| Bar::column(i as f64, 0.8, v, WINTER))
            .collect(),
        label: None,
    });
    let marks = [
        ("Mean", stats.mean, PHASE_GREEN, LineStyle::Solid),
        ("Median", stats.median, PROJECTED, LineStyle::Dashed),
        ("Mean of extremes", stats.mean_of_extremes, EMPHASIS, LineStyle::Dotted),
    ];
    for (name, y, color, style) in marks {
        figure.push(Layer::HLine {
            y,
            color,
            style,
            label: Some(format!("{name}: {y:.1}")),
        });
    }
    figure.push(Layer::text(
        n * 0.3,
        stats.mean_of_extremes + 20.0,
        &format!(
            "'Mean of extremes': {:.1}\nUsed to insinuate that nuclear\nis bad for climate",
            stats.mean_of_extremes
        ),
        12,
        Anchor::Center,
    ));

    let points = values.iter().enumerate().map(|(i, &v)| (i as f64, v)).collect();
    Ok(Prepared {
        summary: ExtremesSummary { source, stats },
        figure,
        derived: vec![DerivedSeries::new("Studies", points)],
        default_output: PathBuf::from("mean-of-extremes.png"),
    })
}
