//! Error types for export and reporting.

use thiserror::Error;

/// Error type for export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Content that does not have the expected layout
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Artifacts that disagree on node order
    #[error("Misaligned artifacts: {0}")]
    Misaligned(String),

    /// Data error
    #[error(transparent)]
    Data(#[from] patrol_data::DataError),

    /// Network error
    #[error(transparent)]
    Network(#[from] patrol_network::NetworkError),

    /// Model input error
    #[error(transparent)]
    Alaam(#[from] patrol_models::AlaamError),
}
