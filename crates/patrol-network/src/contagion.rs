//! Network contagion term.

use crate::covariates::validate_adjacency;
use crate::error::NetworkError;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the outcome of nominated colleagues enters the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Contagion {
    /// No contagion term
    #[default]
    None,
    /// Count of nominated colleagues carrying the outcome
    Simple,
}

impl fmt::Display for Contagion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Simple => f.write_str("simple"),
        }
    }
}

impl FromStr for Contagion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "simple" => Ok(Self::Simple),
            other => Err(format!("unknown contagion '{other}', expected none or simple")),
        }
    }
}

/// Exposure of each node to the outcome: `A · y`.
pub fn contagion_exposure(
    adjacency: &Array2<f64>,
    outcome: &[f64],
) -> Result<Array1<f64>, NetworkError> {
    validate_adjacency(adjacency)?;
    if outcome.len() != adjacency.nrows() {
        return Err(NetworkError::DimensionMismatch {
            expected: adjacency.nrows(),
            actual: outcome.len(),
        });
    }
    Ok(adjacency.dot(&Array1::from(outcome.to_vec())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rstest::rstest;

    #[rstest]
    #[case("none", Contagion::None)]
    #[case("Simple", Contagion::Simple)]
    #[case(" simple ", Contagion::Simple)]
    fn test_parse(#[case] raw: &str, #[case] expected: Contagion) {
        assert_eq!(raw.parse::<Contagion>().unwrap(), expected);
        assert_eq!(expected.to_string().parse::<Contagion>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown() {
        assert!("complex".parse::<Contagion>().is_err());
    }

    #[test]
    fn test_exposure_counts_nominated_outcomes() {
        let a = array![[0.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]];
        let exposure = contagion_exposure(&a, &[1.0, 0.0, 1.0]).unwrap();
        assert_eq!(exposure.to_vec(), vec![1.0, 1.0, 1.0]);
        assert!(contagion_exposure(&a, &[1.0]).is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Contagion::Simple).unwrap();
        assert_eq!(json, "\"simple\"");
    }
}
