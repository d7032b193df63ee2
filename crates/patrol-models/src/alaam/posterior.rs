//! Coefficient draws and their summaries.

use crate::error::AlaamError;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Posterior draws, one row per kept iteration and one column per parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct AlaamPosterior {
    parameter_names: Vec<String>,
    draws: Array2<f64>,
    acceptance_rate: Option<f64>,
}

/// Summary of one parameter's draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSummary {
    /// Parameter name
    pub parameter: String,
    /// Posterior mean
    pub mean: f64,
    /// Posterior standard deviation
    pub sd: f64,
    /// Lower bound of the equal-tailed credible interval
    pub lower: f64,
    /// Upper bound of the equal-tailed credible interval
    pub upper: f64,
    /// Effective sample size
    pub ess: f64,
    /// Whether the interval excludes zero
    pub excludes_zero: bool,
}

impl AlaamPosterior {
    /// Wrap a draw matrix.
    pub fn new(
        parameter_names: Vec<String>,
        draws: Array2<f64>,
        acceptance_rate: Option<f64>,
    ) -> Result<Self, AlaamError> {
        if draws.ncols() != parameter_names.len() {
            return Err(AlaamError::DimensionMismatch {
                what: "draw columns",
                expected: parameter_names.len(),
                actual: draws.ncols(),
            });
        }
        Ok(Self {
            parameter_names,
            draws,
            acceptance_rate,
        })
    }

    /// Parameter names, in column order.
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Draw matrix.
    pub fn draws(&self) -> &Array2<f64> {
        &self.draws
    }

    /// Number of draws.
    pub fn draw_count(&self) -> usize {
        self.draws.nrows()
    }

    /// Share of accepted proposals, when the sampler reported it.
    pub const fn acceptance_rate(&self) -> Option<f64> {
        self.acceptance_rate
    }

    /// Draws of one parameter.
    pub fn parameter(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.parameter_names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.draws.column(idx))
    }

    /// Summarize every parameter with a credible interval at `level`.
    pub fn summarize(&self, level: f64) -> Result<Vec<ParameterSummary>, AlaamError> {
        if !(level > 0.0 && level < 1.0) {
            return Err(AlaamError::InvalidSettings(format!(
                "credible level must be in (0, 1), got {level}"
            )));
        }
        let n = self.draw_count();
        if n < 2 {
            return Err(AlaamError::InsufficientDraws {
                required: 2,
                actual: n,
            });
        }

        let tail = (1.0 - level) / 2.0;
        Ok(self
            .parameter_names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let values = self.draws.column(idx).to_vec();
                let mean = values.iter().sum::<f64>() / n as f64;
                let variance =
                    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
                let mut sorted = values.clone();
                sorted.sort_by(f64::total_cmp);
                let lower = quantile(&sorted, tail);
                let upper = quantile(&sorted, 1.0 - tail);
                ParameterSummary {
                    parameter: name.clone(),
                    mean,
                    sd: variance.sqrt(),
                    lower,
                    upper,
                    ess: effective_sample_size(&values),
                    excludes_zero: lower > 0.0 || upper < 0.0,
                }
            })
            .collect())
    }
}

/// Linear-interpolated quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    let idx = (q * (n - 1) as f64).clamp(0.0, (n - 1) as f64);
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = idx - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

/// Effective sample size of a chain.
///
/// Uses Geyer's initial positive sequence: autocorrelations are summed in
/// adjacent pairs until a pair sum turns non-positive. A chain with no
/// variation has an effective size equal to its length.
pub fn effective_sample_size(chain: &[f64]) -> f64 {
    let n = chain.len();
    if n < 2 {
        return n as f64;
    }
    let mean = chain.iter().sum::<f64>() / n as f64;
    let centered: Vec<f64> = chain.iter().map(|v| v - mean).collect();
    let variance = centered.iter().map(|v| v * v).sum::<f64>() / n as f64;
    if variance <= 0.0 {
        return n as f64;
    }

    let autocorrelation = |lag: usize| -> f64 {
        centered[..n - lag]
            .iter()
            .zip(&centered[lag..])
            .map(|(a, b)| a * b)
            .sum::<f64>()
            / (n as f64 * variance)
    };

    let mut pair_sum_total = 0.0;
    let mut lag = 0;
    while lag + 1 < n {
        let pair = autocorrelation(lag) + autocorrelation(lag + 1);
        if pair <= 0.0 {
            break;
        }
        pair_sum_total += pair;
        lag += 2;
    }

    let tau = (2.0 * pair_sum_total - 1.0).max(1.0 / n as f64);
    (n as f64 / tau).min(n as f64 * n.ilog2().max(1) as f64)
}
