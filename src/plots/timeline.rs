//! Gantt-style timeline of a reactor demonstration program.

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, NaiveTime};
use tracing::{info, warn};

use super::Prepared;
use crate::config::TimelineConfig;
use crate::error::PlotError;
use crate::io::records::{ReactorRecord, load_reactors};
use crate::render::palette::{PHASE_GREEN, REFERENCE, WINTER};
use crate::render::{Anchor, AxisFormat, Bar, Figure, Layer, Legend};
use crate::series::decimal_year;

const LINE_HEIGHT: f64 = 0.1;

/// Phase opacity from planning (faint) to operation (solid).
const PHASE_ALPHA: [f64; 5] = [0.2, 0.4, 0.6, 0.8, 1.0];

fn year_of(date: NaiveDate) -> f64 {
    decimal_year(date.and_time(NaiveTime::MIN))
}

fn years_between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Option<f64> {
    Some(year_of(to?) - year_of(from?))
}

/// Part of a phase inside the chart's `[x0, x1]` window, if any.
fn visible_span(from: NaiveDate, to: NaiveDate, x0: f64, x1: f64) -> Option<(f64, f64)> {
    let start = year_of(from).max(x0);
    let end = year_of(to).min(x1);
    (start < end).then_some((start, end))
}

/// Keeps contracted reactors, latest first (by solicitation, falling back
/// to the contract date, then by contract date).
pub fn arrange(reactors: Vec<ReactorRecord>) -> (Vec<ReactorRecord>, Vec<String>) {
    let (mut kept, dropped): (Vec<_>, Vec<_>) =
        reactors.into_iter().partition(|r| r.contracted.is_some());
    let skipped: Vec<String> = dropped.into_iter().map(|r| r.name).collect();
    for name in &skipped {
        warn!(reactor = %name, "no contract date, skipping");
    }
    kept.sort_by_key(|r| std::cmp::Reverse((r.solicited.or(r.contracted), r.contracted)));
    (kept, skipped)
}

/// Consecutive milestone pairs, stopping at the first missing milestone.
fn phases(r: &ReactorRecord) -> Vec<(NaiveDate, NaiveDate, f64)> {
    let milestones = [
        r.solicited,
        r.contracted,
        r.ground_broken,
        r.critical,
        r.fullpower,
        r.shutdown,
    ];
    let mut spans = Vec::new();
    for (i, pair) in milestones.windows(2).enumerate() {
        match (pair[0], pair[1]) {
            (Some(from), Some(to)) => spans.push((from, to, PHASE_ALPHA[i])),
            // unsolicited reactors start at the contract
            (None, _) if i == 0 => {}
            _ => break,
        }
    }
    spans
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactorSpan {
    pub name: String,
    pub contract_to_critical: Option<f64>,
    pub operating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineSummary {
    pub reactors: Vec<ReactorSpan>,
    pub skipped: Vec<String>,
}

impl fmt::Display for TimelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--- Reactor program ({} reactors) ---", self.reactors.len())?;
        let years = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |y| format!("{y:.1} y"));
        for r in &self.reactors {
            write!(
                f,
                "\n{:<24} contract->critical {:>7}  operating {:>7}",
                r.name,
                years(r.contract_to_critical),
                years(r.operating)
            )?;
        }
        if !self.skipped.is_empty() {
            write!(f, "\nSkipped (no contract): {}", self.skipped.join(", "))?;
        }
        Ok(())
    }
}

/// Loads the program, drops uncontracted reactors and lays out one row of
/// phase spans and milestone markers per reactor.
///
/// # Errors
///
/// Returns loader errors.
pub fn prepare(cfg: &TimelineConfig) -> Result<Prepared<TimelineSummary>, PlotError> {
    let (reactors, skipped) = arrange(load_reactors(&cfg.path)?);
    info!(reactors = reactors.len(), skipped = skipped.len(), "reactor timeline");

    let x0 = f64::from(cfg.start_year);
    let x1 = f64::from(cfg.end_year);
    let rows = reactors.len() as f64;
    let mut figure = Figure::new("The Power Demonstration Reactor Program")
        .formats(AxisFormat::Year, AxisFormat::Hidden)
        .x_range(x0..x1)
        .y_range(0.5..rows + 1.0)
        .legend(Legend::UpperRight);

    let mut bars = Vec::new();
    let mut solicited = Vec::new();
    let mut contracted = Vec::new();
    let mut critical = Vec::new();
    let mut shutdown = Vec::new();
    let mut spans = Vec::with_capacity(reactors.len());

    for (i, r) in reactors.iter().enumerate() {
        let y = (i + 1) as f64;
        for (from, to, alpha) in phases(r) {
            if let Some((start, end)) = visible_span(from, to, x0, x1) {
                bars.push(Bar::span(y, LINE_HEIGHT, start, end, PHASE_GREEN, alpha));
            }
        }
        let mark = |list: &mut Vec<(f64, f64)>, date: Option<NaiveDate>| {
            if let Some(d) = date.filter(|d| year_of(*d) <= x1) {
                list.push((year_of(d), y));
            }
        };
        mark(&mut solicited, r.solicited);
        mark(&mut contracted, r.contracted);
        mark(&mut critical, r.critical);
        mark(&mut shutdown, r.shutdown);

        let start = r.solicited.or(r.contracted).map_or(x0, year_of);
        let mwe = r.mwe.map_or_else(|| "-".to_string(), |m| format!("{m}"));
        figure.push(Layer::text(
            start,
            y + 0.3,
            &format!("{} {} in {} ({mwe} MWe)", r.name, r.kind, r.location),
            15,
            Anchor::Left,
        ));
        if let Some(end) = r.shutdown.filter(|d| d.year() > cfg.end_year) {
            figure.push(Layer::text(
                x1 - 1.6,
                y + 0.3,
                &format!("{} →", end.year()),
                13,
                Anchor::Left,
            ));
        }

        spans.push(ReactorSpan {
            name: r.name.clone(),
            contract_to_critical: years_between(r.contracted, r.critical),
            operating: years_between(r.fullpower, r.shutdown),
        });
    }

    figure.push(Layer::Bars { bars, label: None });
    let markers = [
        ("Solicited", solicited, PHASE_GREEN),
        ("Contracted", contracted, PHASE_GREEN),
        ("Critical", critical, WINTER),
        ("Shutdown", shutdown, REFERENCE),
    ];
    for (label, points, color) in markers {
        figure.push(Layer::Markers {
            points,
            color,
            size: 6,
            label: Some(label.to_string()),
        });
    }

    Ok(Prepared {
        summary: TimelineSummary {
            reactors: spans,
            skipped,
        },
        figure,
        derived: Vec::new(),
        default_output: PathBuf::from("power-demonstration-reactor-program.png"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn reactor(name: &str, solicited: Option<NaiveDate>, contracted: Option<NaiveDate>) -> ReactorRecord {
        ReactorRecord {
            name: name.to_string(),
            kind: "PWR".to_string(),
            location: "Somewhere".to_string(),
            mwe: Some(60.0),
            solicited,
            contracted,
            ground_broken: None,
            critical: None,
            fullpower: None,
            shutdown: None,
        }
    }

    #[test]
    fn drops_uncontracted_and_sorts_latest_first() {
        let (kept, skipped) = arrange(vec![
            reactor("Early", date(1955, 1, 1), date(1956, 1, 1)),
            reactor("Draft", date(1957, 1, 1), None),
            reactor("Late", None, date(1958, 3, 1)),
        ]);
        let names: Vec<&str> = kept.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Late", "Early"]);
        assert_eq!(skipped, vec!["Draft".to_string()]);
    }

    #[test]
    fn phases_stop_at_first_gap() {
        let mut r = reactor("Yankee", date(1955, 1, 1), date(1956, 6, 1));
        r.ground_broken = date(1957, 11, 1);
        r.fullpower = date(1961, 1, 1);
        let spans = phases(&r);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].2, 0.4);
    }

    #[test]
    fn phases_without_solicitation_start_at_contract() {
        let mut r = reactor("Elk River", None, date(1958, 1, 1));
        r.ground_broken = date(1959, 1, 1);
        let spans = phases(&r);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].0, NaiveDate::from_ymd_opt(1958, 1, 1).expect("valid"));
    }

    #[test]
    fn spans_are_clipped_to_the_window() {
        let (x0, x1) = (1950.0, 1980.0);
        let jan = |y| date(y, 1, 1).expect("valid");
        let span = |a, b| visible_span(jan(a), jan(b), x0, x1);
        assert_eq!(span(1960, 1970), Some((1960.0, 1970.0)));
        assert_eq!(span(1960, 1990), Some((1960.0, 1980.0)));
        assert_eq!(span(1945, 1955), Some((1950.0, 1955.0)));
        assert_eq!(span(1981, 1990), None);
        assert_eq!(span(1940, 1949), None);
    }
}
