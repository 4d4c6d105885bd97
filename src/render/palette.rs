//! Color constants and auto-scaling helpers for charts.

use plotters::style::RGBColor;

/// Summer series (demand, solar).
pub const SUMMER: RGBColor = RGBColor(255, 127, 14);
/// Winter series.
pub const WINTER: RGBColor = RGBColor(31, 119, 180);
/// Scaled or projected series.
pub const PROJECTED: RGBColor = RGBColor(44, 160, 44);
/// Monthly bars of the capacity factor chart.
pub const LIGHT_SKY_BLUE: RGBColor = RGBColor(135, 206, 250);
/// Rolling averages and other emphasized lines.
pub const EMPHASIS: RGBColor = RGBColor(214, 39, 40);
/// Program timeline phases.
pub const PHASE_GREEN: RGBColor = RGBColor(0, 128, 0);
/// Reference lines and dividers.
pub const REFERENCE: RGBColor = RGBColor(0, 0, 0);
/// Annotation box fill.
pub const WHEAT: RGBColor = RGBColor(245, 222, 179);
/// Grid lines.
pub const GRID: RGBColor = RGBColor(179, 179, 179);

const CYCLE: [RGBColor; 8] = [
    WINTER,
    SUMMER,
    PROJECTED,
    EMPHASIS,
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

/// Returns the `i`-th color of the default line cycle.
pub fn series_color(i: usize) -> RGBColor {
    CYCLE[i % CYCLE.len()]
}

/// Yellow-to-green gradient; `fraction` is clamped into `[0, 1]`.
pub fn yl_gn(fraction: f64) -> RGBColor {
    const STOPS: [(f64, (u8, u8, u8)); 3] = [
        (0.0, (255, 255, 229)),
        (0.5, (120, 198, 121)),
        (1.0, (0, 69, 41)),
    ];
    let f = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (lo, hi) = if f <= STOPS[1].0 {
        (STOPS[0], STOPS[1])
    } else {
        (STOPS[1], STOPS[2])
    };
    let t = (f - lo.0) / (hi.0 - lo.0);
    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    RGBColor(
        lerp(lo.1.0, hi.1.0),
        lerp(lo.1.1, hi.1.1),
        lerp(lo.1.2, hi.1.2),
    )
}

/// Computes axis bounds from values with 10% padding.
pub fn auto_bounds(values: impl IntoIterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() || !max.is_finite() {
        return [-1.0, 1.0];
    }
    let range = (max - min).max(0.1);
    let pad = range * 0.1;
    [min - pad, max + pad]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints() {
        assert_eq!(yl_gn(0.0), RGBColor(255, 255, 229));
        assert_eq!(yl_gn(1.0), RGBColor(0, 69, 41));
        assert_eq!(yl_gn(7.0), yl_gn(1.0));
        assert_eq!(yl_gn(f64::NAN), yl_gn(0.0));
    }

    #[test]
    fn gradient_darkens() {
        let light = yl_gn(0.2);
        let dark = yl_gn(0.9);
        assert!(light.1 > dark.1);
    }

    #[test]
    fn bounds_are_padded() {
        let [lo, hi] = auto_bounds([0.0, 10.0]);
        assert!((lo + 1.0).abs() < 1e-12);
        assert!((hi - 11.0).abs() < 1e-12);
    }

    #[test]
    fn bounds_fallback_when_empty() {
        assert_eq!(auto_bounds(std::iter::empty()), [-1.0, 1.0]);
    }

    #[test]
    fn cycle_wraps() {
        assert_eq!(series_color(0), series_color(8));
    }
}
