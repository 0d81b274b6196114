// File: crates/chart-data/src/error.rs
// Summary: Error type shared by source construction, ingestion and option loading.

use thiserror::Error;

/// Errors raised while turning raw chart data into series data.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Raw data whose shape matches no source format.
    #[error("invalid source: {0}")]
    InvalidSource(String),

    #[error("invalid encode for '{coord_dim}': {reason}")]
    InvalidEncode { coord_dim: String, reason: String },

    #[error("unknown dimension '{0}'")]
    UnknownDimension(String),

    /// A series refers to an axis index the option does not define.
    #[error("series '{series}' refers to missing {kind}[{index}]")]
    UnknownAxis { series: String, kind: &'static str, index: usize },

    #[error("dimension '{0}' has no inverted indices")]
    InvertedIndicesMissing(String),

    /// A shared store has fewer columns than the series needs.
    #[error("store has {actual} dimensions, series needs {expected}")]
    StoreDimensionMismatch { expected: usize, actual: usize },

    /// Stack members must be strictly ascending series indices within range.
    #[error("invalid stack group members {0:?}")]
    InvalidStackGroup(Vec<usize>),

    #[error("coordinate system '{coord_sys}' is not supported by series type '{series_type}'")]
    UnsupportedCoordinateSystem { coord_sys: String, series_type: String },
}

/// Result alias for data operations.
pub type DataResult<T> = Result<T, DataError>;
