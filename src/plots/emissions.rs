//! Yearly CO2 emissions per region.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use super::Prepared;
use crate::error::PlotError;
use crate::io::export::DerivedSeries;
use crate::io::records::load_dataset;
use crate::render::palette::series_color;
use crate::render::{Anchor, AxisFormat, Figure, Layer, Legend};

/// Emission tables are stored in million tonnes.
const MILLION_PER_BILLION: f64 = 1.0e3;

#[derive(Debug, Clone, PartialEq)]
pub struct RegionTrend {
    pub region: String,
    /// Billion tonnes in the first year.
    pub first: f64,
    /// Billion tonnes in the last year.
    pub last: f64,
}

impl RegionTrend {
    /// Relative change from first to last year in percent.
    pub fn change_percent(&self) -> Option<f64> {
        (self.first != 0.0).then(|| (self.last - self.first) / self.first * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmissionsSummary {
    pub title: String,
    pub first_year: i32,
    pub last_year: i32,
    pub regions: Vec<RegionTrend>,
}

impl fmt::Display for EmissionsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--- {} ({}-{}) ---",
            self.title, self.first_year, self.last_year
        )?;
        for r in &self.regions {
            write!(f, "\n{:<16} {:>6.2} -> {:>6.2} Gt", r.region, r.first, r.last)?;
            if let Some(change) = r.change_percent() {
                write!(f, " ({change:+.1}%)")?;
            }
        }
        Ok(())
    }
}

/// Loads the yearly trend table `key`, one line per region.
///
/// # Errors
///
/// Returns loader errors and `SchemaMismatch` when the table has no
/// `start_year`.
pub fn prepare(path: &Path, key: &str) -> Result<Prepared<EmissionsSummary>, PlotError> {
    let dataset = load_dataset(path, key)?;
    let start_year = dataset
        .start_year
        .ok_or_else(|| PlotError::schema(key, "start_year"))?;

    let mut figure = Figure::new(dataset.title.clone())
        .axes(
            dataset.xlabel.clone().unwrap_or_else(|| "Year".to_string()),
            "Billion tonnes CO2",
        )
        .formats(AxisFormat::Year, AxisFormat::Number { decimals: 0 })
        .legend(Legend::UpperLeft);

    let mut regions = Vec::with_capacity(dataset.records.len());
    let mut derived = Vec::with_capacity(dataset.records.len());
    let mut last_year = start_year;
    for (i, record) in dataset.records.iter().enumerate() {
        let points: Vec<(f64, f64)> = (start_year..)
            .zip(&record.values)
            .map(|(year, v)| (f64::from(year), v / MILLION_PER_BILLION))
            .collect();
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            continue;
        };
        last_year = last_year.max(start_year + record.values.len() as i32 - 1);
        regions.push(RegionTrend {
            region: record.label.clone(),
            first: first.1,
            last: last.1,
        });

        let color = series_color(i);
        figure.push(Layer::line(points.clone(), color, record.label.as_str()));
        figure.push(Layer::Markers {
            points: points.clone(),
            color,
            size: 4,
            label: None,
        });
        derived.push(DerivedSeries::new(record.label.as_str(), points));
    }
    info!(key, regions = regions.len(), start_year, last_year, "emission trends");

    if let Some(reference) = &dataset.reference {
        let (x, y) = figure.ranges();
        figure.push(Layer::text(
            x.start + (x.end - x.start) * 0.6,
            y.start + (y.end - y.start) * 0.03,
            &format!("Data from: {reference}"),
            10,
            Anchor::Left,
        ));
    }

    Ok(Prepared {
        summary: EmissionsSummary {
            title: dataset.title.clone(),
            first_year: start_year,
            last_year,
            regions,
        },
        figure,
        derived,
        default_output: PathBuf::from("world-co2-emissions.png"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const DATA: &str = r#"
[co2_emissions]
title = "CO2 emissions"
units = "million tonnes"
ref = "BP Statistical Review"
start_year = 2008

[co2_emissions.val]
World = [29000.0, 28500.0, 30000.0]
China = [7000.0, 7500.0]

[undated]
title = "No years"
val = { a = 1.0 }
"#;

    fn write_data() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("energy.toml"), DATA).expect("write dataset");
        dir
    }

    #[test]
    fn converts_to_billion_tonnes() {
        let dir = write_data();
        let prepared =
            prepare(&dir.path().join("energy.toml"), "co2_emissions").expect("valid dataset");
        let summary = &prepared.summary;
        assert_eq!((summary.first_year, summary.last_year), (2008, 2010));

        let world = summary
            .regions
            .iter()
            .find(|r| r.region == "World")
            .expect("world present");
        assert_eq!((world.first, world.last), (29.0, 30.0));
        assert!(prepared.derived.iter().any(|d| d.points[1] == (2009.0, 7.5)));
    }

    #[test]
    fn start_year_is_required() {
        let dir = write_data();
        let err = prepare(&dir.path().join("energy.toml"), "undated").expect_err("no start year");
        assert!(matches!(err, PlotError::SchemaMismatch { .. }));
        assert!(err.to_string().contains("start_year"));
    }

    #[test]
    fn change_percent_skips_zero_base() {
        let trend = RegionTrend {
            region: "x".to_string(),
            first: 0.0,
            last: 1.0,
        };
        assert_eq!(trend.change_percent(), None);
    }
}
