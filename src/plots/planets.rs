//! How bright the Sun is from each planet: inverse-square insolence on a
//! log axis, with marker size following the planet's radius.

use std::f64::consts::PI;
use std::fmt;
use std::path::PathBuf;

use plotters::style::RGBColor;

use super::Prepared;
use crate::error::PlotError;
use crate::io::export::DerivedSeries;
use crate::physics::{SOLAR_CONSTANT_W_M2, relative_insolence};
use crate::render::palette::REFERENCE;
use crate::render::{Anchor, AxisFormat, Figure, Layer, LineStyle};

/// A body of the solar system as drawn on the chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Planet {
    pub name: &'static str,
    /// Mean distance from the Sun (AU).
    pub distance_au: f64,
    pub radius_km: f64,
    pub color: RGBColor,
}

#[rustfmt::skip]
pub const PLANETS: [Planet; 9] = [
    Planet { name: "Mercury", distance_au: 0.4, radius_km: 2440.0, color: RGBColor(128, 128, 128) },
    Planet { name: "Venus", distance_au: 0.7, radius_km: 6052.0, color: RGBColor(255, 249, 208) },
    Planet { name: "Earth", distance_au: 1.0, radius_km: 6378.0, color: RGBColor(117, 187, 253) },
    Planet { name: "Mars", distance_au: 1.5, radius_km: 3397.0, color: RGBColor(127, 43, 10) },
    Planet { name: "Jupiter", distance_au: 5.2, radius_km: 71492.0, color: RGBColor(255, 165, 0) },
    Planet { name: "Saturn", distance_au: 9.5, radius_km: 60268.0, color: RGBColor(253, 222, 108) },
    Planet { name: "Uranus", distance_au: 19.2, radius_km: 25559.0, color: RGBColor(208, 254, 254) },
    Planet { name: "Neptune", distance_au: 30.1, radius_km: 24766.0, color: RGBColor(208, 254, 254) },
    Planet { name: "Pluto", distance_au: 39.0, radius_km: 1150.0, color: RGBColor(173, 129, 80) },
];

/// Marker radius in pixels; the marker's area grows with the planet radius.
fn marker_size(radius_km: f64) -> u32 {
    ((radius_km / 100.0 / PI).sqrt() * 1.5).round().max(2.0) as u32
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanetRow {
    pub name: String,
    pub distance_au: f64,
    pub relative: f64,
    pub irradiance_w_m2: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanetsSummary {
    pub rows: Vec<PlanetRow>,
}

impl fmt::Display for PlanetsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--- Solar insolence relative to Earth ---")?;
        for r in &self.rows {
            write!(
                f,
                "\n{:<8} {:>5.1} AU  {:>9.5}  {:>7.1} W/m²",
                r.name, r.distance_au, r.relative, r.irradiance_w_m2
            )?;
        }
        Ok(())
    }
}

/// Builds the insolence chart; y values are plotted as `log10`.
///
/// # Errors
///
/// Does not fail; the signature matches the other charts.
pub fn prepare() -> Result<Prepared<PlanetsSummary>, PlotError> {
    let points: Vec<(f64, f64)> = PLANETS
        .iter()
        .map(|p| (p.distance_au, relative_insolence(p.distance_au)))
        .collect();
    let log_points: Vec<(f64, f64)> = points.iter().map(|&(x, y)| (x, y.log10())).collect();

    let mut figure = Figure::new("How bright the Sun is from different planets")
        .axes("Distance from Sun (AU)", "Relative solar insolence")
        .formats(AxisFormat::Number { decimals: 0 }, AxisFormat::Log10)
        .x_range(0.0..44.0)
        .y_range(-3.6..1.3);

    figure.push(Layer::Line {
        points: log_points.clone(),
        color: REFERENCE,
        style: LineStyle::Dashed,
        width: 1,
        label: None,
    });
    for (planet, &point) in PLANETS.iter().zip(&log_points) {
        figure.push(Layer::Markers {
            points: vec![point],
            color: planet.color,
            size: marker_size(planet.radius_km),
            label: None,
        });
        figure.push(Layer::text(
            point.0 + 1.2,
            point.1 + 0.12,
            planet.name,
            13,
            Anchor::Left,
        ));
    }
    figure.push(Layer::text(1.0, -3.0, "whatisnuclear.com", 12, Anchor::Left));

    let rows = PLANETS
        .iter()
        .zip(&points)
        .map(|(p, &(_, relative))| PlanetRow {
            name: p.name.to_string(),
            distance_au: p.distance_au,
            relative,
            irradiance_w_m2: relative * SOLAR_CONSTANT_W_M2,
        })
        .collect();

    Ok(Prepared {
        summary: PlanetsSummary { rows },
        figure,
        derived: vec![DerivedSeries::new("Relative insolence", points)],
        default_output: PathBuf::from("solar-system-insolence.png"),
    })
}
