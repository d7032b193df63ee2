//! Dense symmetric positive definite solves
//!
//! The Fisher information of a logistic model is `X'WX` with positive
//! weights, so a Cholesky factor `L L'` is enough for both the Newton step
//! and the covariance of the estimate.

use crate::error::LinalgError;
use ndarray::{Array1, Array2, ArrayView1};

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix.
#[derive(Debug, Clone)]
pub struct Cholesky {
    lower: Array2<f64>,
}

impl Cholesky {
    /// Factor `matrix`.
    ///
    /// Only the lower triangle is read. A pivot at or below
    /// `relative_tolerance` times the largest diagonal entry is treated as
    /// singular.
    pub fn factor(matrix: &Array2<f64>, relative_tolerance: f64) -> Result<Self, LinalgError> {
        let n = matrix.nrows();
        if n != matrix.ncols() {
            return Err(LinalgError::DimensionMismatch {
                expected: n,
                actual: matrix.ncols(),
            });
        }

        let scale = matrix.diag().iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let threshold = relative_tolerance * scale;
        let mut lower = Array2::<f64>::zeros((n, n));

        for j in 0..n {
            let pivot = matrix[[j, j]] - leading_dot(lower.row(j), lower.row(j), j);
            if !pivot.is_finite() || pivot <= threshold.max(0.0) {
                return Err(LinalgError::Singular { column: j, pivot });
            }
            let diagonal = pivot.sqrt();
            lower[[j, j]] = diagonal;

            for i in (j + 1)..n {
                let value = (matrix[[i, j]] - leading_dot(lower.row(i), lower.row(j), j)) / diagonal;
                lower[[i, j]] = value;
            }
        }

        Ok(Self { lower })
    }

    /// Order of the factored matrix.
    pub fn dim(&self) -> usize {
        self.lower.nrows()
    }

    /// The factor `L`.
    pub const fn lower(&self) -> &Array2<f64> {
        &self.lower
    }

    /// Solve `A x = b` by forward then back substitution.
    pub fn solve(&self, rhs: &Array1<f64>) -> Result<Array1<f64>, LinalgError> {
        let n = self.dim();
        if rhs.len() != n {
            return Err(LinalgError::DimensionMismatch {
                expected: n,
                actual: rhs.len(),
            });
        }

        // L z = b
        let mut z = Array1::<f64>::zeros(n);
        for i in 0..n {
            let value = (rhs[i] - leading_dot(self.lower.row(i), z.view(), i)) / self.lower[[i, i]];
            z[i] = value;
        }
        // L' x = z
        let mut x = Array1::<f64>::zeros(n);
        for i in (0..n).rev() {
            let tail: f64 = ((i + 1)..n).map(|k| self.lower[[k, i]] * x[k]).sum();
            x[i] = (z[i] - tail) / self.lower[[i, i]];
        }
        Ok(x)
    }

    /// `A⁻¹`, one solve per unit vector.
    pub fn inverse(&self) -> Result<Array2<f64>, LinalgError> {
        let n = self.dim();
        let mut inverse = Array2::<f64>::zeros((n, n));
        for j in 0..n {
            let mut unit = Array1::<f64>::zeros(n);
            unit[j] = 1.0;
            inverse.column_mut(j).assign(&self.solve(&unit)?);
        }
        Ok(inverse)
    }
}

/// Dot product of the first `len` entries of two vectors.
fn leading_dot(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, len: usize) -> f64 {
    a.iter().zip(b.iter()).take(len).map(|(x, y)| x * y).sum()
}

/// Inverse of a symmetric positive definite matrix.
///
/// An empty matrix inverts to an empty matrix.
pub fn spd_inverse(matrix: &Array2<f64>, relative_tolerance: f64) -> Result<Array2<f64>, LinalgError> {
    Cholesky::factor(matrix, relative_tolerance)?.inverse()
}
