//! Explanatory energy and nuclear charts built from public grid data.

pub mod config;
pub mod error;
pub mod io;
pub mod physics;
pub mod plots;
pub mod reconcile;
pub mod render;
pub mod series;
pub mod stats;
