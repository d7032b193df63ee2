//! Model inputs handed to an ALAAM estimator.

use crate::error::AlaamError;
use crate::logistic::INTERCEPT;
use ndarray::Array2;
use patrol_data::OfficerId;
use patrol_network::{Contagion, validate_adjacency};

/// Name of the contagion parameter.
pub const CONTAGION: &str = "contagion";

/// Everything an ALAAM run needs, aligned to one node order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlaamInput {
    /// Node ids, strictly increasing; row order of every other field
    pub node_ids: Vec<OfficerId>,
    /// Binary outcome per node
    pub outcome: Vec<f64>,
    /// 0/1 adjacency matrix with zero diagonal
    pub adjacency: Array2<f64>,
    /// Node covariates, one column per name
    pub covariates: Array2<f64>,
    /// Covariate names
    pub covariate_names: Vec<String>,
    /// Whether ties are directed
    pub directed: bool,
    /// Contagion term
    pub contagion: Contagion,
}

impl AlaamInput {
    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Check that every field is aligned and well formed.
    pub fn validate(&self) -> Result<(), AlaamError> {
        let n = self.node_count();
        if let Some(pos) = self.node_ids.windows(2).position(|w| w[0] >= w[1]) {
            return Err(AlaamError::UnsortedNodes(pos + 1));
        }
        if self.outcome.len() != n {
            return Err(AlaamError::DimensionMismatch {
                what: "outcome",
                expected: n,
                actual: self.outcome.len(),
            });
        }
        validate_adjacency(&self.adjacency)?;
        if self.adjacency.nrows() != n {
            return Err(AlaamError::DimensionMismatch {
                what: "adjacency",
                expected: n,
                actual: self.adjacency.nrows(),
            });
        }
        if self.covariates.nrows() != n {
            return Err(AlaamError::DimensionMismatch {
                what: "covariate rows",
                expected: n,
                actual: self.covariates.nrows(),
            });
        }
        if self.covariates.ncols() != self.covariate_names.len() {
            return Err(AlaamError::DimensionMismatch {
                what: "covariate names",
                expected: self.covariates.ncols(),
                actual: self.covariate_names.len(),
            });
        }
        if let Some((index, &value)) = self
            .outcome
            .iter()
            .enumerate()
            .find(|(_, v)| **v != 0.0 && **v != 1.0)
        {
            return Err(AlaamError::NonBinaryOutcome { index, value });
        }
        Ok(())
    }

    /// Parameters of the model, in draw-column order.
    ///
    /// `intercept`, then `contagion` for simple contagion, then the covariates.
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.covariate_names.len() + 2);
        names.push(INTERCEPT.to_string());
        if self.contagion == Contagion::Simple {
            names.push(CONTAGION.to_string());
        }
        names.extend(self.covariate_names.iter().cloned());
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> AlaamInput {
        AlaamInput {
            node_ids: vec![OfficerId(1), OfficerId(2), OfficerId(5)],
            outcome: vec![1.0, 0.0, 1.0],
            adjacency: array![[0.0, 1.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 0.0]],
            covariates: array![[1.0], [2.0], [0.0]],
            covariate_names: vec!["out_degree".to_string()],
            directed: true,
            contagion: Contagion::Simple,
        }
    }

    #[test]
    fn test_valid_input() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_parameter_names() {
        let input = sample();
        assert_eq!(input.parameter_names(), vec!["intercept", "contagion", "out_degree"]);
        let input = AlaamInput { contagion: Contagion::None, ..sample() };
        assert_eq!(input.parameter_names(), vec!["intercept", "out_degree"]);
    }

    #[test]
    fn test_misaligned_outcome() {
        let input = AlaamInput { outcome: vec![1.0, 0.0], ..sample() };
        assert!(matches!(
            input.validate(),
            Err(AlaamError::DimensionMismatch { what: "outcome", .. })
        ));
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut input = sample();
        input.adjacency[[2, 2]] = 1.0;
        assert!(matches!(input.validate(), Err(AlaamError::Network(_))));
    }

    #[test]
    fn test_non_binary_outcome() {
        let input = AlaamInput { outcome: vec![1.0, 0.5, 0.0], ..sample() };
        assert!(matches!(
            input.validate(),
            Err(AlaamError::NonBinaryOutcome { index: 1, .. })
        ));
    }

    #[test]
    fn test_unsorted_nodes() {
        let input = AlaamInput {
            node_ids: vec![OfficerId(1), OfficerId(5), OfficerId(2)],
            ..sample()
        };
        assert!(matches!(input.validate(), Err(AlaamError::UnsortedNodes(2))));
    }
}
