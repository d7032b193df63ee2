#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod contagion;
pub mod covariates;
pub mod error;
pub mod graph;
pub mod registry;

pub use contagion::{Contagion, contagion_exposure};
pub use covariates::{
    COVARIATE_NAMES, NetworkCovariates, derive_covariates, triangle_participation,
    validate_adjacency,
};
pub use error::NetworkError;
pub use graph::{DirectedNetwork, EdgeList, Tie};
pub use registry::{
    CovariateCategory, CovariateInfo, available_covariates, count_by_category, covariates_by_category,
    get_covariate_info,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
