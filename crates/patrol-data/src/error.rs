//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading and cleaning study tables.
#[derive(Debug, Error)]
pub enum DataError {
    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required column is not present in the table
    #[error("Missing column '{column}' in {table}")]
    MissingColumn {
        /// Column that was looked up
        column: String,
        /// Table the column was expected in
        table: String,
    },

    /// A value could not be interpreted
    #[error("Invalid value in column '{column}': {reason}")]
    InvalidValue {
        /// Column holding the value
        column: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The same officer id appears more than once in a table keyed by officer
    #[error("Duplicate officer id {0}")]
    DuplicateOfficer(i64),

    /// Invalid imputation settings
    #[error("Invalid imputation settings: {0}")]
    InvalidImputation(String),
}
