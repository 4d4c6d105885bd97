//! Three-set diagram of energy sources: renewable, scalable now, low carbon.

use std::f64::consts::TAU;
use std::fmt;
use std::path::PathBuf;

use plotters::style::RGBColor;

use super::Prepared;
use crate::error::PlotError;
use crate::render::{Anchor, AxisFormat, Figure, Layer};

const RADIUS: f64 = 0.75;
const CIRCLE_STEPS: usize = 180;

/// One set of the diagram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Set {
    pub name: &'static str,
    pub center: (f64, f64),
    pub color: RGBColor,
    /// Where the set's name is printed.
    pub title_at: (f64, f64),
}

pub const SETS: [Set; 3] = [
    Set {
        name: "RENEWABLE",
        center: (-0.5, 0.35),
        color: RGBColor(207, 240, 255),
        title_at: (-0.9, 1.25),
    },
    Set {
        name: "SCALABLE NOW",
        center: (0.5, 0.35),
        color: RGBColor(235, 198, 250),
        title_at: (0.9, 1.25),
    },
    Set {
        name: "LOW CARBON",
        center: (0.0, -0.5),
        color: RGBColor(147, 255, 180),
        title_at: (0.0, -1.38),
    },
];

/// A region of the diagram: which sets it belongs to and what sits there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub member: [bool; 3],
    pub sources: &'static str,
    pub at: (f64, f64),
    pub bold: bool,
    pub note: Option<&'static str>,
}

pub const REGIONS: [Region; 7] = [
    Region {
        member: [true, false, false],
        sources: "Whale oil",
        at: (-0.8, 0.55),
        bold: false,
        note: Some("Could be farmed?\n(gross)"),
    },
    Region {
        member: [false, true, false],
        sources: "Coal,\nNatural gas,\nOil",
        at: (0.8, 0.55),
        bold: false,
        note: None,
    },
    Region {
        member: [false, false, true],
        sources: "Fusion",
        at: (0.0, -0.85),
        bold: false,
        note: Some("Not ready yet"),
    },
    Region {
        member: [true, true, false],
        sources: "Biofuel\n(wood, corn)",
        at: (0.0, 0.72),
        bold: false,
        note: None,
    },
    Region {
        member: [true, false, true],
        sources: "Geothermal,\nTidal",
        at: (-0.45, -0.25),
        bold: false,
        note: None,
    },
    Region {
        member: [false, true, true],
        sources: "Fission",
        at: (0.45, -0.25),
        bold: true,
        note: None,
    },
    Region {
        member: [true, true, true],
        sources: "Wind,\nHydro,\nSolar",
        at: (0.0, 0.1),
        bold: true,
        note: None,
    },
];

fn inside(p: (f64, f64), set: &Set) -> bool {
    let (dx, dy) = (p.0 - set.center.0, p.1 - set.center.1);
    dx * dx + dy * dy < RADIUS * RADIUS
}

fn circle(center: (f64, f64)) -> Vec<(f64, f64)> {
    (0..CIRCLE_STEPS)
        .map(|i| {
            let a = TAU * i as f64 / CIRCLE_STEPS as f64;
            (center.0 + RADIUS * a.cos(), center.1 + RADIUS * a.sin())
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct VennSummary {
    /// Set names joined with " + ", and the sources in that region.
    pub regions: Vec<(String, String)>,
}

impl fmt::Display for VennSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--- Energy sources by property ---")?;
        for (sets, sources) in &self.regions {
            write!(f, "\n{sets:<38} {sources}")?;
        }
        Ok(())
    }
}

/// Lays out the three circles, region labels and annotations.
///
/// # Errors
///
/// Does not fail; the signature matches the other charts.
pub fn prepare() -> Result<Prepared<VennSummary>, PlotError> {
    let mut figure = Figure::new("Renewable, scalable now, low carbon")
        .formats(AxisFormat::Hidden, AxisFormat::Hidden)
        .x_range(-2.0..2.0)
        .y_range(-1.5..1.5);
    figure.grid = false;

    for set in &SETS {
        figure.push(Layer::Polygon {
            points: circle(set.center),
            color: set.color,
            alpha: 0.6,
            outline: true,
        });
    }
    for set in &SETS {
        figure.push(Layer::text(set.title_at.0, set.title_at.1, set.name, 24, Anchor::Center));
    }

    let mut regions = Vec::with_capacity(REGIONS.len());
    for region in &REGIONS {
        let size = if region.bold { 18 } else { 16 };
        figure.push(Layer::text(region.at.0, region.at.1, region.sources, size, Anchor::Center));
        if let Some(note) = region.note {
            figure.push(Layer::text(
                region.at.0 - 0.35,
                region.at.1 - 0.3,
                note,
                10,
                Anchor::Center,
            ));
        }

        let sets: Vec<&str> = SETS
            .iter()
            .zip(region.member)
            .filter_map(|(s, m)| m.then_some(s.name))
            .collect();
        regions.push((sets.join(" + "), region.sources.replace('\n', " ")));
    }

    Ok(Prepared {
        summary: VennSummary { regions },
        figure,
        derived: Vec::new(),
        default_output: PathBuf::from("renewable-venn.png"),
    })
}
