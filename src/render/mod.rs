//! Static chart rendering to PNG or SVG.

pub mod figure;
pub mod palette;

use std::error::Error;
use std::panic;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::error::PlotError;

pub use figure::{Anchor, AxisFormat, Bar, Figure, Layer, Legend, LineStyle};

pub type DrawResult = Result<(), Box<dyn Error>>;

/// Anything that can draw itself onto a `plotters` drawing area.
pub trait Chart {
    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> DrawResult
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    /// `.svg` (any case) selects SVG; everything else is PNG.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => Self::Svg,
            _ => Self::Png,
        }
    }
}

/// Renders `chart` to `path` at `size` pixels.
///
/// # Errors
///
/// Returns `PlotError::RenderFailure` naming `path` when its directory does
/// not exist, when drawing fails, or when the backend panics (font loading).
pub fn render<C: Chart>(chart: &C, path: &Path, size: (u32, u32)) -> Result<(), PlotError> {
    let failure = |detail: String| PlotError::RenderFailure {
        path: path.to_path_buf(),
        detail,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(failure(format!(
            "output directory \"{}\" does not exist",
            dir.display()
        )));
    }

    let format = ImageFormat::from_path(path);
    info!(file = %path.display(), ?format, width = size.0, height = size.1, "rendering chart");

    let draw = || -> DrawResult {
        match format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(path, size).into_drawing_area();
                chart.draw(&root)?;
                root.present()?;
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(path, size).into_drawing_area();
                chart.draw(&root)?;
                root.present()?;
            }
        }
        Ok(())
    };

    match panic::catch_unwind(panic::AssertUnwindSafe(draw)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(failure(e.to_string())),
        Err(_) => Err(failure("plotting backend panicked".to_string())),
    }
}
