//! Layered 2-D figure drawn with `plotters`.

use std::ops::Range;

use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};

use chrono::Datelike;

use super::palette::{GRID, auto_bounds};
use super::{Chart, DrawResult};
use crate::series::from_decimal_year;

type Plane = Cartesian2d<RangedCoordf64, RangedCoordf64>;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Stroke pattern of a line layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

/// How tick values on an axis are printed.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisFormat {
    Number { decimals: usize },
    /// Whole years (`1973`).
    Year,
    /// Month abbreviation of a decimal year.
    Month,
    /// Month and day of a decimal year (`Dec 3`).
    Date,
    /// Powers of ten for values already in log10 space.
    Log10,
    /// Category names at integer positions.
    Labels(Vec<String>),
    Hidden,
}

impl AxisFormat {
    /// Text for the tick at `v`.
    pub fn label(&self, v: f64) -> String {
        match self {
            Self::Number { decimals } => format!("{v:.decimals$}"),
            Self::Year => format!("{v:.0}"),
            Self::Month => from_decimal_year(v)
                .map(|t| MONTHS[t.month0() as usize].to_string())
                .unwrap_or_default(),
            Self::Date => from_decimal_year(v)
                .map(|t| format!("{} {}", MONTHS[t.month0() as usize], t.day()))
                .unwrap_or_default(),
            Self::Log10 => {
                let r = v.round();
                if (v - r).abs() < 1e-6 {
                    match r as i32 {
                        0 => "1".to_string(),
                        1 => "10".to_string(),
                        k => format!("1e{k}"),
                    }
                } else {
                    String::new()
                }
            }
            Self::Labels(labels) => {
                let r = v.round();
                if (v - r).abs() < 1e-6 && r >= 0.0 {
                    labels.get(r as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            }
            Self::Hidden => String::new(),
        }
    }

    fn tick_count(&self) -> usize {
        match self {
            Self::Labels(labels) => labels.len() + 1,
            Self::Month => 13,
            _ => 10,
        }
    }
}

/// Corner holding the legend box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Legend {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

impl From<Legend> for SeriesLabelPosition {
    fn from(l: Legend) -> Self {
        match l {
            Legend::UpperLeft => Self::UpperLeft,
            Legend::UpperRight => Self::UpperRight,
            Legend::LowerLeft => Self::LowerLeft,
            Legend::LowerRight => Self::LowerRight,
        }
    }
}

/// Placement of a text layer relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Center,
    /// Centered horizontally, just above the point (bar value labels).
    Above,
    Left,
    /// Text ends at the point.
    Right,
}

/// One axis-aligned filled rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub color: RGBColor,
    pub alpha: f64,
}

impl Bar {
    /// A vertical bar of `width` centered on `x`, from zero to `height`.
    pub fn column(x: f64, width: f64, height: f64, color: RGBColor) -> Self {
        Self {
            x0: x - width / 2.0,
            x1: x + width / 2.0,
            y0: 0.0,
            y1: height,
            color,
            alpha: 1.0,
        }
    }

    /// A horizontal span from `start` to `end` of `height` centered on `y`.
    pub fn span(y: f64, height: f64, start: f64, end: f64, color: RGBColor, alpha: f64) -> Self {
        Self {
            x0: start,
            x1: end,
            y0: y - height / 2.0,
            y1: y + height / 2.0,
            color,
            alpha,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Line {
        points: Vec<(f64, f64)>,
        color: RGBColor,
        style: LineStyle,
        width: u32,
        label: Option<String>,
    },
    /// Filled region between the points and y = 0.
    Area {
        points: Vec<(f64, f64)>,
        color: RGBColor,
        alpha: f64,
        label: Option<String>,
    },
    Bars {
        bars: Vec<Bar>,
        label: Option<String>,
    },
    /// Closed filled outline (pie wedges, diagram regions).
    Polygon {
        points: Vec<(f64, f64)>,
        color: RGBColor,
        alpha: f64,
        outline: bool,
    },
    HLine {
        y: f64,
        color: RGBColor,
        style: LineStyle,
        label: Option<String>,
    },
    VLine {
        x: f64,
        color: RGBColor,
        style: LineStyle,
    },
    Markers {
        points: Vec<(f64, f64)>,
        color: RGBColor,
        size: u32,
        label: Option<String>,
    },
    Text {
        x: f64,
        y: f64,
        lines: Vec<String>,
        size: u32,
        color: RGBColor,
        anchor: Anchor,
    },
}

impl Layer {
    pub fn line(points: Vec<(f64, f64)>, color: RGBColor, label: impl Into<String>) -> Self {
        Self::Line {
            points,
            color,
            style: LineStyle::Solid,
            width: 2,
            label: Some(label.into()),
        }
    }

    /// Multi-line text; `text` is split on `'\n'`.
    pub fn text(x: f64, y: f64, text: &str, size: u32, anchor: Anchor) -> Self {
        Self::Text {
            x,
            y,
            lines: text.lines().map(str::to_string).collect(),
            size,
            color: BLACK,
            anchor,
        }
    }

    fn label(&self) -> Option<&str> {
        match self {
            Self::Line { label, .. }
            | Self::Area { label, .. }
            | Self::Bars { label, .. }
            | Self::HLine { label, .. }
            | Self::Markers { label, .. } => label.as_deref(),
            Self::VLine { .. } | Self::Text { .. } | Self::Polygon { .. } => None,
        }
    }

    fn extend_bounds(&self, xs: &mut Vec<f64>, ys: &mut Vec<f64>) {
        match self {
            Self::Line { points, .. }
            | Self::Markers { points, .. }
            | Self::Polygon { points, .. } => {
                xs.extend(points.iter().map(|p| p.0));
                ys.extend(points.iter().map(|p| p.1));
            }
            Self::Area { points, .. } => {
                xs.extend(points.iter().map(|p| p.0));
                ys.extend(points.iter().map(|p| p.1));
                ys.push(0.0);
            }
            Self::Bars { bars, .. } => {
                for b in bars {
                    xs.extend([b.x0, b.x1]);
                    ys.extend([b.y0, b.y1]);
                }
            }
            Self::HLine { y, .. } => ys.push(*y),
            Self::VLine { x, .. } => xs.push(*x),
            Self::Text { .. } => {}
        }
    }
}

/// A titled chart: axes plus an ordered stack of layers.
///
/// Axis ranges default to the layers' extent with 10% padding.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub x_format: AxisFormat,
    pub y_format: AxisFormat,
    pub x_range: Option<Range<f64>>,
    pub y_range: Option<Range<f64>>,
    pub grid: bool,
    pub legend: Legend,
    pub layers: Vec<Layer>,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_desc: String::new(),
            y_desc: String::new(),
            x_format: AxisFormat::Number { decimals: 0 },
            y_format: AxisFormat::Number { decimals: 0 },
            x_range: None,
            y_range: None,
            grid: true,
            legend: Legend::UpperRight,
            layers: Vec::new(),
        }
    }

    pub fn axes(mut self, x_desc: impl Into<String>, y_desc: impl Into<String>) -> Self {
        self.x_desc = x_desc.into();
        self.y_desc = y_desc.into();
        self
    }

    pub fn formats(mut self, x: AxisFormat, y: AxisFormat) -> Self {
        self.x_format = x;
        self.y_format = y;
        self
    }

    pub fn x_range(mut self, range: Range<f64>) -> Self {
        self.x_range = Some(range);
        self
    }

    pub fn y_range(mut self, range: Range<f64>) -> Self {
        self.y_range = Some(range);
        self
    }

    pub fn legend(mut self, legend: Legend) -> Self {
        self.legend = legend;
        self
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Diagrams without a grid or tick labels skip the axes entirely.
    pub fn is_frameless(&self) -> bool {
        !self.grid
            && self.x_format == AxisFormat::Hidden
            && self.y_format == AxisFormat::Hidden
    }

    /// Axis ranges: explicit ones, else the padded extent of all layers.
    pub fn ranges(&self) -> (Range<f64>, Range<f64>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for layer in &self.layers {
            layer.extend_bounds(&mut xs, &mut ys);
        }
        let x = self.x_range.clone().unwrap_or_else(|| {
            let [lo, hi] = auto_bounds(xs);
            lo..hi
        });
        let y = self.y_range.clone().unwrap_or_else(|| {
            let [lo, hi] = auto_bounds(ys);
            lo..hi
        });
        (x, y)
    }
}

fn font<'a>(size: f64) -> FontDesc<'a> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal)
}

fn stroke<DB>(
    chart: &mut ChartContext<'_, DB, Plane>,
    points: Vec<(f64, f64)>,
    shape: ShapeStyle,
    style: LineStyle,
    label: Option<&str>,
) -> DrawResult
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let anno = match style {
        LineStyle::Solid => chart.draw_series(LineSeries::new(points, shape))?,
        LineStyle::Dashed => chart.draw_series(DashedLineSeries::new(points, 10, 6, shape))?,
        LineStyle::Dotted => chart.draw_series(DashedLineSeries::new(points, 2, 4, shape))?,
    };
    if let Some(label) = label {
        anno.label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], shape));
    }
    Ok(())
}

impl Chart for Figure {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        let (x_range, y_range) = self.ranges();
        let x_categorical = matches!(self.x_format, AxisFormat::Labels(_));
        let y_categorical = matches!(self.y_format, AxisFormat::Labels(_));

        let frameless = self.is_frameless();
        let (x_area, y_area) = match (frameless, x_categorical, y_categorical) {
            (true, _, _) => (0, 0),
            (false, x, y) => (if x { 110 } else { 50 }, if y { 170 } else { 70 }),
        };

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, font(22.0))
            .margin(20)
            .x_label_area_size(x_area)
            .y_label_area_size(y_area)
            .build_cartesian_2d(x_range.clone(), y_range.clone())?;

        let x_fmt = |v: &f64| self.x_format.label(*v);
        let y_fmt = |v: &f64| self.y_format.label(*v);
        if !frameless {
            let mut mesh = chart.configure_mesh();
            mesh.x_desc(self.x_desc.as_str())
                .y_desc(self.y_desc.as_str())
                .x_labels(self.x_format.tick_count())
                .y_labels(self.y_format.tick_count())
                .x_label_formatter(&x_fmt)
                .y_label_formatter(&y_fmt)
                .label_style(font(14.0))
                .light_line_style(TRANSPARENT)
                .bold_line_style(GRID.mix(0.6));
            if x_categorical {
                mesh.x_label_style(font(12.0).transform(FontTransform::Rotate90));
            }
            if !self.grid {
                mesh.disable_mesh();
            }
            mesh.draw()?;
        }

        for layer in &self.layers {
            match layer {
                Layer::Line {
                    points,
                    color,
                    style,
                    width,
                    label,
                } => {
                    let shape = color.stroke_width(*width);
                    stroke(&mut chart, points.clone(), shape, *style, label.as_deref())?;
                }
                Layer::Area {
                    points,
                    color,
                    alpha,
                    label,
                } => {
                    let fill = color.mix(*alpha).filled();
                    let anno = chart.draw_series(
                        AreaSeries::new(points.iter().copied(), 0.0, fill)
                            .border_style(color.stroke_width(1)),
                    )?;
                    if let Some(label) = label {
                        anno.label(label).legend(move |(x, y)| {
                            Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill)
                        });
                    }
                }
                Layer::Bars { bars, label } => {
                    let anno = chart.draw_series(bars.iter().map(|b| {
                        Rectangle::new([(b.x0, b.y0), (b.x1, b.y1)], b.color.mix(b.alpha).filled())
                    }))?;
                    if let (Some(label), Some(first)) = (label, bars.first()) {
                        let fill = first.color.mix(first.alpha).filled();
                        anno.label(label).legend(move |(x, y)| {
                            Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill)
                        });
                    }
                }
                Layer::Polygon {
                    points,
                    color,
                    alpha,
                    outline,
                } => {
                    chart.draw_series(std::iter::once(Polygon::new(
                        points.clone(),
                        color.mix(*alpha).filled(),
                    )))?;
                    if *outline {
                        let mut ring = points.clone();
                        ring.extend(points.first().copied());
                        chart.draw_series(LineSeries::new(ring, BLACK.stroke_width(1)))?;
                    }
                }
                Layer::HLine {
                    y,
                    color,
                    style,
                    label,
                } => {
                    let points = vec![(x_range.start, *y), (x_range.end, *y)];
                    stroke(&mut chart, points, color.stroke_width(2), *style, label.as_deref())?;
                }
                Layer::VLine { x, color, style } => {
                    let points = vec![(*x, y_range.start), (*x, y_range.end)];
                    stroke(&mut chart, points, color.stroke_width(1), *style, None)?;
                }
                Layer::Markers {
                    points,
                    color,
                    size,
                    label,
                } => {
                    let fill = color.filled();
                    let radius = *size;
                    let anno = chart
                        .draw_series(points.iter().map(|&p| Circle::new(p, radius, fill)))?;
                    if let Some(label) = label {
                        anno.label(label)
                            .legend(move |(x, y)| Circle::new((x + 10, y), radius, fill));
                    }
                }
                Layer::Text {
                    x,
                    y,
                    lines,
                    size,
                    color,
                    anchor,
                } => {
                    let pos = match anchor {
                        Anchor::Center => Pos::new(HPos::Center, VPos::Center),
                        Anchor::Above => Pos::new(HPos::Center, VPos::Bottom),
                        Anchor::Left => Pos::new(HPos::Left, VPos::Center),
                        Anchor::Right => Pos::new(HPos::Right, VPos::Center),
                    };
                    let style = font(f64::from(*size)).color(color).pos(pos);
                    let line_height = (*size as i32) + 2;
                    let first = match anchor {
                        Anchor::Above => -(line_height * (lines.len() as i32 - 1)) - 3,
                        _ => -(line_height * (lines.len() as i32 - 1)) / 2,
                    };
                    chart.draw_series(lines.iter().enumerate().map(|(i, line)| {
                        EmptyElement::at((*x, *y))
                            + Text::new(
                                line.clone(),
                                (0, first + line_height * i as i32),
                                style.clone(),
                            )
                    }))?;
                }
            }
        }

        if self.layers.iter().any(|l| l.label().is_some()) {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font(font(14.0))
                .position(self.legend.into())
                .draw()?;
        }

        Ok(())
    }
}
