//! One module per chart: `prepare` loads and transforms, [`run`] renders.

pub mod categories;
pub mod emissions;
pub mod extremes;
pub mod fission;
pub mod half_life;
pub mod intermittency;
pub mod nuclear_cf;
pub mod planets;
pub mod primary_energy;
pub mod timeline;
pub mod venn;
pub mod wind;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::PlotError;
use crate::io::export::{DerivedSeries, export_csv};
use crate::render::{Figure, render};

/// Output of a chart's `prepare` step.
#[derive(Debug, Clone)]
pub struct Prepared<S> {
    pub summary: S,
    pub figure: Figure,
    /// Plotted series, exported with `--series-out`.
    pub derived: Vec<DerivedSeries>,
    /// File name used when no output path is given.
    pub default_output: PathBuf,
}

/// Per-invocation output settings.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub output: Option<PathBuf>,
    pub size: (u32, u32),
    pub summary_only: bool,
    pub series_out: Option<PathBuf>,
}

impl RunOptions {
    /// Where the image goes: the explicit path or the chart's default.
    pub fn output_path<'a>(&'a self, default: &'a Path) -> &'a Path {
        self.output.as_deref().unwrap_or(default)
    }
}

/// Writes the derived series (if requested) and renders the figure.
///
/// Returns the image path, or `None` with `summary_only`.
///
/// # Errors
///
/// Propagates export and render failures.
pub fn run<S: fmt::Display>(
    prepared: &Prepared<S>,
    opts: &RunOptions,
) -> Result<Option<PathBuf>, PlotError> {
    if let Some(path) = &opts.series_out {
        if prepared.derived.is_empty() {
            info!("chart has no derived series to export");
        } else {
            export_csv(&prepared.derived, path)?;
            info!(file = %path.display(), series = prepared.derived.len(), "series written");
        }
    }
    if opts.summary_only {
        return Ok(None);
    }

    let path = opts.output_path(&prepared.default_output).to_path_buf();
    render(&prepared.figure, &path, opts.size)?;
    info!(file = %path.display(), "chart saved");
    Ok(Some(path))
}

/// Uppercases the first character and lowercases the rest ("natural Gas"
/// becomes "Natural gas").
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_like_titles() {
        assert_eq!(capitalize("natural Gas"), "Natural gas");
        assert_eq!(capitalize("PV"), "Pv");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn explicit_output_wins() {
        let opts = RunOptions {
            output: Some(PathBuf::from("out/custom.svg")),
            ..RunOptions::default()
        };
        assert_eq!(
            opts.output_path(Path::new("default.png")),
            Path::new("out/custom.svg")
        );
        assert_eq!(
            RunOptions::default().output_path(Path::new("default.png")),
            Path::new("default.png")
        );
    }

    #[test]
    fn summary_only_skips_rendering() {
        let prepared = Prepared {
            summary: "s",
            figure: Figure::new("t"),
            derived: Vec::new(),
            default_output: PathBuf::from("no/such/dir/x.png"),
        };
        let opts = RunOptions {
            summary_only: true,
            ..RunOptions::default()
        };
        assert_eq!(run(&prepared, &opts).ok(), Some(None));
    }

    #[test]
    fn series_export_precedes_render() {
        let dir = tempfile::tempdir().expect("temp dir");
        let csv = dir.path().join("series.csv");
        let prepared = Prepared {
            summary: "s",
            figure: Figure::new("t"),
            derived: vec![DerivedSeries::new("a", vec![(0.0, 1.0)])],
            default_output: PathBuf::from("unused.png"),
        };
        let opts = RunOptions {
            summary_only: true,
            series_out: Some(csv.clone()),
            ..RunOptions::default()
        };
        run(&prepared, &opts).expect("export succeeds");
        let text = std::fs::read_to_string(csv).expect("exported");
        assert!(text.starts_with("series,x,value"));
    }
}
