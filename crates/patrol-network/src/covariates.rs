//! Network covariates.
//!
//! Every covariate is a closed-form function of the adjacency matrix `A`
//! (rows nominate columns):
//!
//! | covariate        | definition                  |
//! |------------------|-----------------------------|
//! | `out_degree`     | row sums of `A`             |
//! | `in_degree`      | column sums of `A`          |
//! | `reciprocity`    | row sums of `A ∘ Aᵀ`        |
//! | `in_two_star`    | `C(in_degree, 2)`           |
//! | `out_two_star`   | `C(out_degree, 2)`          |
//! | `in_three_star`  | `C(in_degree, 3)`           |
//! | `out_three_star` | `C(out_degree, 3)`          |
//! | `mixed_two_star` | `in · out − reciprocity`    |
//! | `triangles`      | row sums of `A ∘ (A · Aᵀ)`  |
//!
//! `triangles` counts, for node `i`, the pairs `(j, k)` with `i → j`, `i → k`
//! and `j → k`: transitive triads in which `i` is the source.

use crate::error::NetworkError;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use patrol_data::{OFFICER_ID, OfficerId};
use polars::prelude::*;

/// Column order of [`NetworkCovariates`].
pub const COVARIATE_NAMES: [&str; 9] = [
    "out_degree",
    "in_degree",
    "reciprocity",
    "in_two_star",
    "out_two_star",
    "in_three_star",
    "out_three_star",
    "mixed_two_star",
    "triangles",
];

/// Check that a matrix is a square 0/1 adjacency matrix without self-loops.
pub fn validate_adjacency(adjacency: &Array2<f64>) -> Result<(), NetworkError> {
    let (rows, cols) = adjacency.dim();
    if rows != cols {
        return Err(NetworkError::NotSquare { rows, cols });
    }
    for ((row, col), &value) in adjacency.indexed_iter() {
        if value != 0.0 && value != 1.0 {
            return Err(NetworkError::NonBinary { row, col, value });
        }
        if row == col && value != 0.0 {
            return Err(NetworkError::SelfLoop(row));
        }
    }
    Ok(())
}

fn choose2(d: f64) -> f64 {
    d * (d - 1.0) / 2.0
}

fn choose3(d: f64) -> f64 {
    d * (d - 1.0) * (d - 2.0) / 6.0
}

/// The n×9 covariate matrix, rows in network node order.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkCovariates {
    values: Array2<f64>,
}

impl NetworkCovariates {
    /// Wrap an existing n×9 matrix, e.g. one reloaded from disk.
    pub fn from_values(values: Array2<f64>) -> Result<Self, NetworkError> {
        if values.ncols() != COVARIATE_NAMES.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: COVARIATE_NAMES.len(),
                actual: values.ncols(),
            });
        }
        Ok(Self { values })
    }

    /// Underlying matrix.
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.values.nrows()
    }

    /// Column names, in matrix order.
    pub fn names(&self) -> &'static [&'static str] {
        &COVARIATE_NAMES
    }

    /// One covariate by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        COVARIATE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|idx| self.values.column(idx))
    }

    /// Covariates as a frame keyed by `officer_id`.
    pub fn to_frame(&self, node_ids: &[OfficerId]) -> Result<DataFrame, NetworkError> {
        if node_ids.len() != self.node_count() {
            return Err(NetworkError::DimensionMismatch {
                expected: self.node_count(),
                actual: node_ids.len(),
            });
        }
        let mut columns = Vec::with_capacity(COVARIATE_NAMES.len() + 1);
        columns.push(Column::new(
            OFFICER_ID.into(),
            node_ids.iter().map(|id| id.get()).collect::<Vec<i64>>(),
        ));
        for (idx, name) in COVARIATE_NAMES.iter().enumerate() {
            columns.push(Column::new(
                (*name).into(),
                self.values.column(idx).to_vec(),
            ));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Derive the nine covariates from an adjacency matrix.
pub fn derive_covariates(adjacency: &Array2<f64>) -> Result<NetworkCovariates, NetworkError> {
    validate_adjacency(adjacency)?;
    let n = adjacency.nrows();

    let out_degree = adjacency.sum_axis(Axis(1));
    let in_degree = adjacency.sum_axis(Axis(0));
    let mutual = adjacency * &adjacency.t();
    let reciprocity = mutual.sum_axis(Axis(1));
    let shared_targets = adjacency.dot(&adjacency.t());
    let triangles = (adjacency * &shared_targets).sum_axis(Axis(1));

    let mixed: Array1<f64> = &in_degree * &out_degree - &reciprocity;

    let mut values = Array2::<f64>::zeros((n, COVARIATE_NAMES.len()));
    for i in 0..n {
        let row = [
            out_degree[i],
            in_degree[i],
            reciprocity[i],
            choose2(in_degree[i]),
            choose2(out_degree[i]),
            choose3(in_degree[i]),
            choose3(out_degree[i]),
            mixed[i],
            triangles[i],
        ];
        for (j, value) in row.into_iter().enumerate() {
            values[[i, j]] = value;
        }
    }
    Ok(NetworkCovariates { values })
}

/// Undirected triangles each node belongs to, ignoring tie direction.
pub fn triangle_participation(adjacency: &Array2<f64>) -> Result<Array1<f64>, NetworkError> {
    validate_adjacency(adjacency)?;
    let symmetric = (adjacency + &adjacency.t()).mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
    let paths = symmetric.dot(&symmetric);
    Ok((&symmetric * &paths).sum_axis(Axis(1)) / 2.0)
}
