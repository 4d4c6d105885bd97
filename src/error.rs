//! Error types shared by loaders, the reconciler and the renderer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Validation failures of the pure series operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("series is empty")]
    Empty,
    #[error("rolling window must be at least one sample")]
    ZeroWindow,
    #[error("series lengths differ ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },
    #[error("source integral is zero, scale factor is undefined")]
    ZeroIntegral,
    #[error("sample interval must be a positive number of minutes, got {0}")]
    InvalidInterval(f64),
    #[error("capacity must be positive, got {0}")]
    NonPositiveCapacity(f64),
    #[error("timestamps must be strictly increasing (index {index})")]
    NotIncreasing { index: usize },
    #[error("{timestamps} timestamps but {values} values")]
    Unaligned { timestamps: usize, values: usize },
}

/// Terminal error of a single plot invocation.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("input file not found: {}", path.display())]
    MissingFile { path: PathBuf },
    #[error("{source_name}: expected {key} not found")]
    SchemaMismatch { source_name: String, key: String },
    #[error("{source_name}: {detail}")]
    Malformed { source_name: String, detail: String },
    #[error("invalid input: {0}")]
    InvalidInput(#[from] SeriesError),
    #[error("cannot render \"{}\": {detail}", path.display())]
    RenderFailure { path: PathBuf, detail: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to access \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse CSV \"{}\": {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl PlotError {
    /// Builds a `SchemaMismatch` for a key absent from a named source.
    pub fn schema(source_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            source_name: source_name.into(),
            key: key.into(),
        }
    }

    /// Builds a `Malformed` error for an unparseable cell or line.
    pub fn malformed(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Malformed {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    /// Maps an I/O error on `path`, turning `NotFound` into `MissingFile`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::MissingFile { path }
        } else {
            Self::Io { path, source }
        }
    }

    /// Maps a CSV error on `path`, unwrapping I/O failures first.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        let path = path.into();
        if !source.is_io_error() {
            return Self::Csv { path, source };
        }
        match source.into_kind() {
            csv::ErrorKind::Io(err) => Self::io(path, err),
            _ => Self::Io {
                path,
                source: io::Error::other("csv reader i/o failure"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_becomes_missing_file() {
        let err = PlotError::io("data/nope.csv", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, PlotError::MissingFile { .. }));
        assert!(err.to_string().contains("data/nope.csv"));
    }

    #[test]
    fn permission_error_stays_io() {
        let err = PlotError::io(
            "data/locked.csv",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, PlotError::Io { .. }));
    }

    #[test]
    fn schema_message_names_source_and_key() {
        let err = PlotError::schema("demand.csv", "row \"Demand (5\"");
        let msg = err.to_string();
        assert!(msg.contains("demand.csv"));
        assert!(msg.contains("Demand (5"));
    }
}
