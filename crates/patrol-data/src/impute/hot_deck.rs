//! Hot-deck multiple imputation.
//!
//! Each missing cell is replaced by a value drawn at random from the observed
//! values of the same column. Repeating this `m` times gives `m` completed
//! tables whose model fits are combined with Rubin's rules.

use crate::error::{DataError, Result};
use crate::frame::{float_column, sort_by_officer};
use log::{info, warn};
use polars::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Multiple imputation by random draws from observed values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotDeckImputer {
    /// Number of completed tables to produce (at least 2)
    pub imputations: usize,
    /// Seed of the random generator; equal seeds give equal tables
    pub seed: u64,
}

impl Default for HotDeckImputer {
    fn default() -> Self {
        Self {
            imputations: 20,
            seed: 2024,
        }
    }
}

impl HotDeckImputer {
    /// Create an imputer, validating the number of imputations.
    pub fn new(imputations: usize, seed: u64) -> Result<Self> {
        if imputations < 2 {
            return Err(DataError::InvalidImputation(format!(
                "need at least 2 imputations, got {imputations}"
            )));
        }
        Ok(Self { imputations, seed })
    }

    /// Produce the completed tables.
    ///
    /// Only the listed columns are imputed; they come back as `Float64`. The
    /// table is sorted by officer id before drawing so the draws do not depend
    /// on the input row order.
    pub fn complete(&self, df: &DataFrame, columns: &[String]) -> Result<Vec<DataFrame>> {
        if self.imputations < 2 {
            return Err(DataError::InvalidImputation(format!(
                "need at least 2 imputations, got {}",
                self.imputations
            )));
        }

        let sorted = sort_by_officer(df)?;
        let mut observed_columns = Vec::with_capacity(columns.len());
        for column in columns {
            let values = float_column(&sorted, column, "attributes")?;
            let pool: Vec<f64> = values.iter().flatten().copied().collect();
            if pool.is_empty() && values.iter().any(Option::is_none) {
                warn!("column '{column}' has no observed values; left missing");
            }
            observed_columns.push((column, values, pool));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut completed = Vec::with_capacity(self.imputations);
        for _ in 0..self.imputations {
            let mut table = sorted.clone();
            for (column, values, pool) in &observed_columns {
                let filled: Vec<Option<f64>> = values
                    .iter()
                    .map(|v| v.or_else(|| pool.choose(&mut rng).copied()))
                    .collect();
                table.with_column(Column::new(column.as_str().into(), filled))?;
            }
            completed.push(table);
        }

        info!(
            "hot-deck imputation: {} completed tables over {} columns",
            completed.len(),
            columns.len()
        );
        Ok(completed)
    }
}
