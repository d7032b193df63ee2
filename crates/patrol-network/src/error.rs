//! Error types for network construction and covariate derivation.

use patrol_data::OfficerId;
use thiserror::Error;

/// Errors raised while building networks or deriving covariates.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Adjacency matrix is not square
    #[error("Adjacency matrix is not square: {rows} x {cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Adjacency entry other than 0 or 1
    #[error("Adjacency entry ({row}, {col}) is {value}, expected 0 or 1")]
    NonBinary {
        /// Row index
        row: usize,
        /// Column index
        col: usize,
        /// Offending value
        value: f64,
    },

    /// Nonzero diagonal entry
    #[error("Self-loop at node index {0}")]
    SelfLoop(usize),

    /// Lengths that must agree do not
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Node ids are not strictly increasing
    #[error("Node ids must be strictly increasing; {0} is out of order")]
    UnsortedNodes(OfficerId),

    /// Officer id not in the node set
    #[error("Officer {0} is not a node of the network")]
    UnknownNode(OfficerId),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
