#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod alaam;
pub mod error;
pub mod linalg;
pub mod logistic;
pub mod pooling;

pub use alaam::{
    AlaamEstimator, AlaamInput, AlaamPosterior, AlaamSettings, DrawFileEstimator,
    ParameterSummary, read_draws,
};
pub use error::{AlaamError, LinalgError, LogisticError, PoolingError};
pub use logistic::{INTERCEPT, LogisticConfig, LogisticFit, LogisticRegression};
pub use pooling::{PooledEstimate, PooledFit, pool, pool_estimates};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
