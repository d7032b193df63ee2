//! Error types for the pipeline.

use patrol_data::OfficerId;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised by the pipeline stages.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Data loading or cleaning error
    #[error(transparent)]
    Data(#[from] patrol_data::DataError),

    /// Network construction error
    #[error(transparent)]
    Network(#[from] patrol_network::NetworkError),

    /// Logistic regression error
    #[error(transparent)]
    Logistic(#[from] patrol_models::LogisticError),

    /// Pooling error
    #[error(transparent)]
    Pooling(#[from] patrol_models::PoolingError),

    /// ALAAM input or estimation error
    #[error(transparent)]
    Alaam(#[from] patrol_models::AlaamError),

    /// Export error
    #[error(transparent)]
    Export(#[from] patrol_output::ExportError),

    /// Report error
    #[error(transparent)]
    Report(#[from] patrol_output::ReportError),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A network node has no row in the attribute table
    #[error("Officer {0} is in the network but has no attribute record")]
    MissingRecord(OfficerId),

    /// Joined table and network disagree on node order
    #[error("Row {position} holds officer {table} but network node {position} is officer {network}")]
    Misaligned {
        /// Position of the first disagreement
        position: usize,
        /// Id in the network
        network: OfficerId,
        /// Id in the joined table
        table: OfficerId,
    },

    /// A value needed for the model is missing
    #[error("Missing value of '{column}' for officer {officer}")]
    MissingValue {
        /// Column holding the value
        column: String,
        /// Officer whose value is missing
        officer: OfficerId,
    },

    /// No officer has every model term observed
    #[error("No complete cases for the model terms")]
    NoCompleteCases,
}
