//! Error types for model fitting, pooling and the ALAAM interface.

use patrol_network::NetworkError;
use thiserror::Error;

/// Errors from the dense linear algebra helpers.
#[derive(Debug, Error)]
pub enum LinalgError {
    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Matrix is not positive definite within tolerance
    #[error("Matrix is singular: pivot {pivot:e} at column {column}")]
    Singular {
        /// Column whose Cholesky pivot failed
        column: usize,
        /// Pivot value before the square root
        pivot: f64,
    },
}

/// Errors raised while fitting a logistic regression.
#[derive(Debug, Error)]
pub enum LogisticError {
    /// Rows of the design matrix and outcome length differ
    #[error("Dimension mismatch: {rows} design rows, {outcomes} outcomes")]
    DimensionMismatch {
        /// Design matrix rows
        rows: usize,
        /// Outcome length
        outcomes: usize,
    },

    /// Number of term names does not match the design columns
    #[error("Expected {expected} term names, got {actual}")]
    TermMismatch {
        /// Design matrix columns
        expected: usize,
        /// Names supplied
        actual: usize,
    },

    /// Outcome value other than 0 or 1
    #[error("Outcome at row {row} is {value}, expected 0 or 1")]
    NonBinaryOutcome {
        /// Row index
        row: usize,
        /// Offending value
        value: f64,
    },

    /// Fewer observations than parameters
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Actual number of observations
        actual: usize,
    },

    /// Design value is NaN or infinite
    #[error("Non-finite design value at row {row}, column {col}")]
    NonFinite {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
    },

    /// Information matrix cannot be inverted
    #[error("Fisher information is singular: {0}")]
    Singular(#[from] LinalgError),

    /// Invalid configuration
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Errors raised while combining fits with Rubin's rules.
#[derive(Debug, Error)]
pub enum PoolingError {
    /// Fewer than two fits
    #[error("Pooling needs at least 2 fits, got {0}")]
    TooFewFits(usize),

    /// Fits disagree on terms
    #[error("Fit {index} has terms {found:?}, expected {expected:?}")]
    TermMismatch {
        /// Position of the offending fit
        index: usize,
        /// Terms of the first fit
        expected: Vec<String>,
        /// Terms of the offending fit
        found: Vec<String>,
    },

    /// Estimates or standard errors of one dataset do not cover every term
    #[error("Dataset {index} does not have {expected} estimates and standard errors")]
    LengthMismatch {
        /// Position of the offending dataset
        index: usize,
        /// Number of terms
        expected: usize,
    },

    /// Every dataset reports the same estimate with zero standard error
    #[error("Term '{0}' has zero total variance; no test statistic exists")]
    ZeroVariance(String),

    /// Reference distribution could not be built
    #[error("Distribution error: {0}")]
    Distribution(String),
}

/// Errors raised around the external ALAAM estimator.
#[derive(Debug, Error)]
pub enum AlaamError {
    /// Lengths that must agree do not
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Which input disagrees
        what: &'static str,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Outcome value other than 0 or 1
    #[error("Outcome at node {index} is {value}, expected 0 or 1")]
    NonBinaryOutcome {
        /// Node index
        index: usize,
        /// Offending value
        value: f64,
    },

    /// Node ids not strictly increasing
    #[error("Node ids must be strictly increasing at position {0}")]
    UnsortedNodes(usize),

    /// Invalid adjacency matrix
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Invalid sampler settings
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Draw file header does not list the expected parameters
    #[error("Draw file parameters {found:?} do not match expected {expected:?}")]
    HeaderMismatch {
        /// Parameters the model has
        expected: Vec<String>,
        /// Parameters found in the file
        found: Vec<String>,
    },

    /// Draw value could not be parsed
    #[error("Invalid draw at row {row}, column '{column}': '{value}'")]
    InvalidDraw {
        /// Data row (1-based, header excluded)
        row: usize,
        /// Column name
        column: String,
        /// Raw text
        value: String,
    },

    /// Too few draws remain after burn-in and thinning
    #[error("Insufficient draws: need at least {required}, got {actual}")]
    InsufficientDraws {
        /// Required number of draws
        required: usize,
        /// Draws available
        actual: usize,
    },

    /// Failure reported by an estimator implementation
    #[error("Estimator failed: {0}")]
    Estimator(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
