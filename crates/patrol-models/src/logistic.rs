//! Logistic regression
//!
//! Maximum likelihood fit of `P(y = 1 | x) = 1 / (1 + exp(-x'β))` by
//! iteratively reweighted least squares (Newton-Raphson on the log-likelihood).
//! An intercept column is always added in front of the supplied terms.
//!
//! Each Newton step solves `X'WX δ = X'(y − p)` through a Cholesky factor.
//! Standard errors come from the inverse Fisher information `(X'WX)⁻¹` at the
//! final estimate; p-values are two-sided Wald tests against the standard
//! normal.

use crate::error::LogisticError;
use crate::linalg::{Cholesky, spd_inverse};
use log::{debug, warn};
use ndarray::{Array1, Array2, Axis, s};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Name of the intercept term.
pub const INTERCEPT: &str = "intercept";

/// Settings for the IRLS iterations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    /// Maximum Newton steps (default: 50)
    pub max_iterations: usize,
    /// Stop once every coefficient moves less than this (default: 1e-10)
    pub tolerance: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            tolerance: 1e-10,
        }
    }
}

/// A fitted logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticFit {
    /// Term names, `intercept` first
    pub terms: Vec<String>,
    /// Coefficients on the log-odds scale
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients
    pub standard_errors: Vec<f64>,
    /// Wald z statistics
    pub z_values: Vec<f64>,
    /// Two-sided p-values
    pub p_values: Vec<f64>,
    /// Log-likelihood at the estimate
    pub log_likelihood: f64,
    /// Newton steps taken
    pub iterations: usize,
    /// Whether the tolerance was reached
    pub converged: bool,
    /// Number of observations
    pub observations: usize,
}

impl LogisticFit {
    /// `exp(β)` for every term.
    pub fn odds_ratios(&self) -> Vec<f64> {
        self.coefficients.iter().map(|b| b.exp()).collect()
    }

    /// Wald confidence intervals `β ± z·se` at the given level.
    pub fn confidence_intervals(&self, level: f64) -> Vec<(f64, f64)> {
        let z = normal_quantile(0.5 + level / 2.0);
        self.coefficients
            .iter()
            .zip(&self.standard_errors)
            .map(|(b, se)| (b - z * se, b + z * se))
            .collect()
    }

    /// Coefficient of one term.
    pub fn coefficient(&self, term: &str) -> Option<f64> {
        self.terms
            .iter()
            .position(|t| t == term)
            .map(|idx| self.coefficients[idx])
    }

    /// Akaike information criterion.
    pub fn aic(&self) -> f64 {
        2.0 * self.terms.len() as f64 - 2.0 * self.log_likelihood
    }
}

pub(crate) fn normal_quantile(p: f64) -> f64 {
    Normal::standard().inverse_cdf(p)
}

pub(crate) fn two_sided_normal_p(z: f64) -> f64 {
    2.0 * Normal::standard().sf(z.abs())
}

fn sigmoid(eta: f64) -> f64 {
    if eta >= 0.0 {
        1.0 / (1.0 + (-eta).exp())
    } else {
        let e = eta.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + exp(eta))` without overflow
fn softplus(eta: f64) -> f64 {
    eta.max(0.0) + (-eta.abs()).exp().ln_1p()
}

fn log_likelihood(x: &Array2<f64>, y: &Array1<f64>, beta: &Array1<f64>) -> f64 {
    x.dot(beta)
        .iter()
        .zip(y.iter())
        .map(|(&eta, &yi)| yi * eta - softplus(eta))
        .sum()
}

/// Logistic regression estimator
#[derive(Debug, Clone, Default)]
pub struct LogisticRegression {
    config: LogisticConfig,
}

impl LogisticRegression {
    /// Create an estimator with the given settings
    pub const fn new(config: LogisticConfig) -> Self {
        Self { config }
    }

    /// Fit the model.
    ///
    /// # Arguments
    /// * `design` - n × k matrix of predictors, without intercept
    /// * `outcome` - n binary outcomes
    /// * `terms` - k predictor names
    pub fn fit(
        &self,
        design: &Array2<f64>,
        outcome: &[f64],
        terms: &[String],
    ) -> Result<LogisticFit, LogisticError> {
        let (n, k) = design.dim();
        if self.config.max_iterations == 0 || self.config.tolerance <= 0.0 {
            return Err(LogisticError::InvalidParameter(format!(
                "max_iterations must be positive and tolerance > 0, got {:?}",
                self.config
            )));
        }
        if outcome.len() != n {
            return Err(LogisticError::DimensionMismatch {
                rows: n,
                outcomes: outcome.len(),
            });
        }
        if terms.len() != k {
            return Err(LogisticError::TermMismatch {
                expected: k,
                actual: terms.len(),
            });
        }
        if n < k + 1 {
            return Err(LogisticError::InsufficientData {
                required: k + 1,
                actual: n,
            });
        }
        if let Some((row, &value)) = outcome
            .iter()
            .enumerate()
            .find(|(_, v)| **v != 0.0 && **v != 1.0)
        {
            return Err(LogisticError::NonBinaryOutcome { row, value });
        }
        if let Some(((row, col), _)) = design.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(LogisticError::NonFinite { row, col });
        }

        let mut x = Array2::<f64>::ones((n, k + 1));
        x.slice_mut(s![.., 1..]).assign(design);
        let y = Array1::from(outcome.to_vec());

        let mut beta = Array1::<f64>::zeros(k + 1);
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            iterations += 1;
            let p = x.dot(&beta).mapv(sigmoid);
            let w = p.mapv(|pi| pi * (1.0 - pi));
            let gradient = x.t().dot(&(&y - &p));
            let weighted = &x * &w.view().insert_axis(Axis(1));
            let information = x.t().dot(&weighted);
            let step = Cholesky::factor(&information, 1e-12)?.solve(&gradient)?;

            beta += &step;
            let max_step = step.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            debug!("IRLS iteration {iterations}: max step {max_step:e}");
            if max_step < self.config.tolerance {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(
                "logistic regression did not converge after {iterations} iterations; \
                 the outcome may be separated by a predictor"
            );
        }

        let p = x.dot(&beta).mapv(sigmoid);
        let w = p.mapv(|pi| pi * (1.0 - pi));
        let weighted = &x * &w.view().insert_axis(Axis(1));
        let covariance = spd_inverse(&x.t().dot(&weighted), 1e-12)?;

        let coefficients = beta.to_vec();
        let standard_errors: Vec<f64> = covariance.diag().mapv(f64::sqrt).to_vec();
        let z_values: Vec<f64> = coefficients
            .iter()
            .zip(&standard_errors)
            .map(|(b, se)| b / se)
            .collect();
        let p_values = z_values.iter().map(|&z| two_sided_normal_p(z)).collect();

        let mut names = Vec::with_capacity(k + 1);
        names.push(INTERCEPT.to_string());
        names.extend(terms.iter().cloned());

        Ok(LogisticFit {
            terms: names,
            coefficients,
            standard_errors,
            z_values,
            p_values,
            log_likelihood: log_likelihood(&x, &y, &beta),
            iterations,
            converged,
            observations: n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn column(values: &[f64]) -> Array2<f64> {
        Array2::from_shape_vec((values.len(), 1), values.to_vec()).unwrap()
    }

    #[test]
    fn test_binary_predictor_matches_closed_form() {
        // x = 0: 3 of 5 invited; x = 1: 1 of 4 invited
        let x = column(&[0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        let y = [1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        let fit = LogisticRegression::default()
            .fit(&x, &y, &["supervisor".to_string()])
            .unwrap();

        assert!(fit.converged);
        assert_eq!(fit.terms, vec!["intercept", "supervisor"]);
        assert_relative_eq!(fit.coefficients[0], 1.5_f64.ln(), epsilon = 1e-8);
        assert_relative_eq!(fit.coefficients[1], (2.0_f64 / 9.0).ln(), epsilon = 1e-8);
        assert_relative_eq!(
            fit.standard_errors[0],
            (1.0_f64 / 3.0 + 1.0 / 2.0).sqrt(),
            epsilon = 1e-8
        );
        assert_relative_eq!(
            fit.standard_errors[1],
            (1.0_f64 / 3.0 + 1.0 / 2.0 + 1.0 + 1.0 / 3.0).sqrt(),
            epsilon = 1e-8
        );
        assert_relative_eq!(fit.odds_ratios()[1], 2.0 / 9.0, epsilon = 1e-8);
        assert_eq!(fit.coefficient("supervisor"), Some(fit.coefficients[1]));
    }

    #[test]
    fn test_log_likelihood_and_intervals() {
        let x = Array2::<f64>::zeros((4, 0));
        let y = [1.0, 0.0, 0.0, 0.0];
        let fit = LogisticRegression::default().fit(&x, &y, &[]).unwrap();
        // intercept only: logit(1/4)
        assert_relative_eq!(fit.coefficients[0], (1.0_f64 / 3.0).ln(), epsilon = 1e-8);
        let expected_ll = 0.25_f64.ln() + 3.0 * 0.75_f64.ln();
        assert_relative_eq!(fit.log_likelihood, expected_ll, epsilon = 1e-8);

        let (lo, hi) = fit.confidence_intervals(0.95)[0];
        let se = fit.standard_errors[0];
        assert_relative_eq!(hi - lo, 2.0 * 1.959_963_984_540_054 * se, epsilon = 1e-6);
        assert!(fit.p_values[0] > 0.0 && fit.p_values[0] < 1.0);
    }

    #[test]
    fn test_rejects_non_binary_outcome() {
        let x = column(&[0.0, 1.0, 2.0]);
        let err = LogisticRegression::default()
            .fit(&x, &[0.0, 2.0, 1.0], &["x".to_string()])
            .unwrap_err();
        assert!(matches!(err, LogisticError::NonBinaryOutcome { row: 1, .. }));
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let x = column(&[0.0, 1.0, 2.0]);
        assert!(matches!(
            LogisticRegression::default().fit(&x, &[0.0, 1.0], &["x".to_string()]),
            Err(LogisticError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            LogisticRegression::default().fit(&x, &[0.0, 1.0, 1.0], &[]),
            Err(LogisticError::TermMismatch { .. })
        ));
    }

    #[test]
    fn test_separated_outcome_does_not_report_convergence() {
        let x = column(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let y = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        match LogisticRegression::default().fit(&x, &y, &["x".to_string()]) {
            Ok(fit) => assert!(!fit.converged),
            Err(err) => assert!(matches!(err, LogisticError::Singular(_))),
        }
    }

    #[test]
    fn test_constant_predictor_is_singular() {
        let x = column(&[1.0, 1.0, 1.0, 1.0]);
        let result = LogisticRegression::default().fit(&x, &[0.0, 1.0, 0.0, 1.0], &["c".to_string()]);
        assert!(matches!(result, Err(LogisticError::Singular(_))));
    }
}
