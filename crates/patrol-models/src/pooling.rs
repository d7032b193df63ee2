//! Rubin's rules
//!
//! Combines `m` fits of the same model over multiply imputed datasets. For
//! each term with per-dataset estimates `Q_i` and variances `U_i = se_i²`:
//!
//! - pooled estimate `Q̄ = mean(Q_i)`
//! - within-imputation variance `Ū = mean(U_i)`
//! - between-imputation variance `B = Σ(Q_i − Q̄)² / (m − 1)`
//! - total variance `T = Ū + (1 + 1/m)·B`
//! - degrees of freedom `ν = (m − 1)·(1 + Ū / ((1 + 1/m)·B))²`
//!
//! Tests use Student's t with `ν` degrees of freedom; when `B = 0` the
//! reference distribution is the standard normal. A term with `T = 0` has no
//! test statistic and is rejected.

use crate::error::PoolingError;
use crate::logistic::{LogisticFit, normal_quantile, two_sided_normal_p};
use log::info;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Pooled result for one term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PooledEstimate {
    /// Term name
    pub term: String,
    /// Mean of the per-dataset estimates
    pub estimate: f64,
    /// Mean squared standard error
    pub within_variance: f64,
    /// Sample variance of the estimates
    pub between_variance: f64,
    /// Total variance
    pub total_variance: f64,
    /// `sqrt(total_variance)`
    pub standard_error: f64,
    /// Rubin degrees of freedom; infinite when `between_variance` is 0
    pub degrees_of_freedom: f64,
    /// `estimate / standard_error`
    pub t_value: f64,
    /// Two-sided p-value
    pub p_value: f64,
    /// Fraction of missing information
    pub missing_information: f64,
}

/// Fit pooled over imputations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PooledFit {
    /// Number of imputations combined
    pub imputations: usize,
    /// One entry per term, in model order
    pub estimates: Vec<PooledEstimate>,
}

impl PooledEstimate {
    /// Confidence interval at `level` from the t(ν) reference distribution.
    pub fn confidence_interval(&self, level: f64) -> (f64, f64) {
        let p = 0.5 + level / 2.0;
        let quantile = if self.degrees_of_freedom.is_finite() {
            StudentsT::new(0.0, 1.0, self.degrees_of_freedom)
                .map_or_else(|_| normal_quantile(p), |dist| dist.inverse_cdf(p))
        } else {
            normal_quantile(p)
        };
        (
            self.estimate - quantile * self.standard_error,
            self.estimate + quantile * self.standard_error,
        )
    }
}

impl PooledFit {
    /// Pooled estimate of one term.
    pub fn get(&self, term: &str) -> Option<&PooledEstimate> {
        self.estimates.iter().find(|e| e.term == term)
    }
}

/// Combine logistic fits over imputations.
pub fn pool(fits: &[LogisticFit]) -> Result<PooledFit, PoolingError> {
    let first = fits.first().ok_or(PoolingError::TooFewFits(0))?;
    for (index, fit) in fits.iter().enumerate().skip(1) {
        if fit.terms != first.terms {
            return Err(PoolingError::TermMismatch {
                index,
                expected: first.terms.clone(),
                found: fit.terms.clone(),
            });
        }
    }
    let estimates: Vec<Vec<f64>> = fits.iter().map(|f| f.coefficients.clone()).collect();
    let errors: Vec<Vec<f64>> = fits.iter().map(|f| f.standard_errors.clone()).collect();
    pool_estimates(&first.terms, &estimates, &errors)
}

/// Combine raw estimates and standard errors, one inner vector per dataset.
pub fn pool_estimates(
    terms: &[String],
    estimates: &[Vec<f64>],
    standard_errors: &[Vec<f64>],
) -> Result<PooledFit, PoolingError> {
    let m = estimates.len();
    if m < 2 || standard_errors.len() != m {
        return Err(PoolingError::TooFewFits(m.min(standard_errors.len())));
    }
    if let Some(index) = estimates
        .iter()
        .zip(standard_errors)
        .position(|(e, s)| e.len() != terms.len() || s.len() != terms.len())
    {
        return Err(PoolingError::LengthMismatch {
            index,
            expected: terms.len(),
        });
    }
    let m_f = m as f64;

    let mut pooled = Vec::with_capacity(terms.len());
    for (j, term) in terms.iter().enumerate() {
        let q: Vec<f64> = estimates.iter().map(|e| e[j]).collect();
        let u: Vec<f64> = standard_errors.iter().map(|s| s[j] * s[j]).collect();

        let q_bar = q.iter().sum::<f64>() / m_f;
        let u_bar = u.iter().sum::<f64>() / m_f;
        let b = q.iter().map(|v| (v - q_bar).powi(2)).sum::<f64>() / (m_f - 1.0);
        let inflated_b = (1.0 + 1.0 / m_f) * b;
        let t = u_bar + inflated_b;
        if t.is_nan() || t <= 0.0 {
            return Err(PoolingError::ZeroVariance(term.clone()));
        }
        let se = t.sqrt();
        let t_value = q_bar / se;

        let (df, p_value) = if b > 0.0 {
            let df = (m_f - 1.0) * (1.0 + u_bar / inflated_b).powi(2);
            let dist = StudentsT::new(0.0, 1.0, df)
                .map_err(|e| PoolingError::Distribution(e.to_string()))?;
            (df, 2.0 * dist.sf(t_value.abs()))
        } else {
            (f64::INFINITY, two_sided_normal_p(t_value))
        };

        let r = if u_bar > 0.0 { inflated_b / u_bar } else { f64::INFINITY };
        let missing_information = if b == 0.0 {
            0.0
        } else if r.is_infinite() {
            1.0
        } else {
            (r + 2.0 / (df + 3.0)) / (r + 1.0)
        };

        pooled.push(PooledEstimate {
            term: term.clone(),
            estimate: q_bar,
            within_variance: u_bar,
            between_variance: b,
            total_variance: t,
            standard_error: se,
            degrees_of_freedom: df,
            t_value,
            p_value,
            missing_information,
        });
    }

    info!("pooled {} terms over {m} imputations", pooled.len());
    Ok(PooledFit {
        imputations: m,
        estimates: pooled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fit(coefficients: Vec<f64>, standard_errors: Vec<f64>) -> LogisticFit {
        LogisticFit {
            terms: vec!["intercept".to_string(), "x".to_string()],
            coefficients,
            standard_errors,
            z_values: vec![0.0, 0.0],
            p_values: vec![1.0, 1.0],
            log_likelihood: 0.0,
            iterations: 1,
            converged: true,
            observations: 10,
        }
    }

    #[test]
    fn test_rubin_two_imputations() {
        let fits = vec![fit(vec![0.0, 1.0], vec![1.0, 1.0]), fit(vec![0.0, 3.0], vec![1.0, 1.0])];
        let pooled = pool(&fits).unwrap();
        let x = pooled.get("x").unwrap();

        assert_relative_eq!(x.estimate, 2.0);
        assert_relative_eq!(x.within_variance, 1.0);
        assert_relative_eq!(x.between_variance, 2.0);
        assert_relative_eq!(x.total_variance, 4.0);
        assert_relative_eq!(x.standard_error, 2.0);
        assert_relative_eq!(x.degrees_of_freedom, 16.0 / 9.0, epsilon = 1e-12);
        // r = 3, fmi = (3 + 2 / (16/9 + 3)) / 4
        assert_relative_eq!(
            x.missing_information,
            (3.0 + 2.0 / (16.0 / 9.0 + 3.0)) / 4.0,
            epsilon = 1e-12
        );
        assert!(x.p_value > 0.0 && x.p_value < 1.0);

        let (lo, hi) = x.confidence_interval(0.95);
        assert_relative_eq!((lo + hi) / 2.0, 2.0, epsilon = 1e-12);
        // heavier tails than the normal with few degrees of freedom
        assert!(hi - lo > 2.0 * 1.96 * 2.0);
    }

    #[test]
    fn test_identical_fits_use_normal_reference() {
        let fits = vec![fit(vec![0.5, 1.0], vec![0.5, 0.5]); 3];
        let pooled = pool(&fits).unwrap();
        let x = pooled.get("x").unwrap();
        assert_eq!(x.between_variance, 0.0);
        assert!(x.degrees_of_freedom.is_infinite());
        assert_eq!(x.missing_information, 0.0);
        assert_relative_eq!(x.p_value, two_sided_normal_p(2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_total_variance() {
        let fits = vec![fit(vec![0.5, 1.0], vec![0.5, 0.0]); 2];
        match pool(&fits) {
            Err(PoolingError::ZeroVariance(term)) => assert_eq!(term, "x"),
            other => panic!("expected zero variance error, got {other:?}"),
        }
    }

    #[test]
    fn test_requires_two_fits() {
        assert!(matches!(pool(&[]), Err(PoolingError::TooFewFits(0))));
        assert!(matches!(
            pool(&[fit(vec![0.0, 1.0], vec![1.0, 1.0])]),
            Err(PoolingError::TooFewFits(1))
        ));
    }

    #[test]
    fn test_term_mismatch() {
        let mut other = fit(vec![0.0, 1.0], vec![1.0, 1.0]);
        other.terms[1] = "y".to_string();
        let result = pool(&[fit(vec![0.0, 1.0], vec![1.0, 1.0]), other]);
        assert!(matches!(result, Err(PoolingError::TermMismatch { index: 1, .. })));
    }
}
