//! ALAAM estimation interface
//!
//! The autologistic actor attribute model is estimated by an external MCMC
//! routine. This module fixes what crosses that boundary: the model inputs
//! ([`AlaamInput`]), the sampler settings ([`AlaamSettings`]) and the
//! coefficient draws coming back ([`AlaamPosterior`]). Any sampler is plugged
//! in through [`AlaamEstimator`]; [`DrawFileEstimator`] reads the draws an
//! external run wrote to disk.

pub mod draws;
pub mod input;
pub mod posterior;

pub use draws::{ACCEPTANCE_COLUMN, DrawFileEstimator, read_draws};
pub use input::AlaamInput;
pub use posterior::{AlaamPosterior, ParameterSummary, effective_sample_size};

use crate::error::AlaamError;
use serde::{Deserialize, Serialize};

/// Settings handed to the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlaamSettings {
    /// Total iterations of the chain (default: 50,000)
    pub iterations: usize,
    /// Leading iterations discarded (default: 5,000)
    pub burn_in: usize,
    /// Keep every `thinning`-th iteration after burn-in (default: 10)
    pub thinning: usize,
}

impl Default for AlaamSettings {
    fn default() -> Self {
        Self {
            iterations: 50_000,
            burn_in: 5_000,
            thinning: 10,
        }
    }
}

impl AlaamSettings {
    /// Check the settings describe a non-empty kept sample.
    pub fn validate(&self) -> Result<(), AlaamError> {
        if self.thinning == 0 {
            return Err(AlaamError::InvalidSettings("thinning must be at least 1".into()));
        }
        if self.burn_in >= self.iterations {
            return Err(AlaamError::InvalidSettings(format!(
                "burn-in ({}) must be smaller than iterations ({})",
                self.burn_in, self.iterations
            )));
        }
        Ok(())
    }

    /// Whether iteration `index` (0-based) is kept.
    pub const fn keeps(&self, index: usize) -> bool {
        self.thinning > 0
            && index >= self.burn_in
            && index < self.iterations
            && (index - self.burn_in) % self.thinning == 0
    }

    /// Number of draws kept from a full chain.
    pub const fn kept_draws(&self) -> usize {
        if self.burn_in >= self.iterations || self.thinning == 0 {
            0
        } else {
            (self.iterations - self.burn_in).div_ceil(self.thinning)
        }
    }
}

/// An ALAAM estimation routine.
///
/// Implementations may run a sampler in-process, call out to another
/// program, or read results of an earlier run.
pub trait AlaamEstimator {
    /// Estimate the model, returning the coefficient draws.
    fn estimate(
        &self,
        input: &AlaamInput,
        settings: &AlaamSettings,
    ) -> Result<AlaamPosterior, AlaamError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AlaamSettings { iterations: 10, burn_in: 0, thinning: 1 }, 10)]
    #[case(AlaamSettings { iterations: 10, burn_in: 4, thinning: 3 }, 2)]
    #[case(AlaamSettings { iterations: 11, burn_in: 4, thinning: 3 }, 3)]
    fn test_kept_draws(#[case] settings: AlaamSettings, #[case] expected: usize) {
        assert_eq!(settings.kept_draws(), expected);
        let counted = (0..settings.iterations).filter(|&i| settings.keeps(i)).count();
        assert_eq!(counted, expected);
    }

    #[test]
    fn test_invalid_settings() {
        let zero_thin = AlaamSettings { thinning: 0, ..AlaamSettings::default() };
        assert!(zero_thin.validate().is_err());
        let long_burn = AlaamSettings { iterations: 10, burn_in: 10, thinning: 1 };
        assert!(long_burn.validate().is_err());
        assert!(AlaamSettings::default().validate().is_ok());
    }
}
