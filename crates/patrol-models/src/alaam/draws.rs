//! Draw-file adapter.
//!
//! The external sampler runs in a separate execution and writes its chain as
//! CSV: a header naming the parameters, then one row per iteration. An
//! optional [`ACCEPTANCE_COLUMN`] holds 1 for accepted and 0 for rejected
//! proposals.

use super::{AlaamEstimator, AlaamInput, AlaamPosterior, AlaamSettings};
use crate::error::AlaamError;
use log::{info, warn};
use ndarray::Array2;
use std::path::{Path, PathBuf};

/// Column holding per-iteration acceptance indicators.
pub const ACCEPTANCE_COLUMN: &str = "accepted";

/// Read a draw file, keeping the iterations selected by `settings`.
pub fn read_draws(path: &Path, settings: &AlaamSettings) -> Result<AlaamPosterior, AlaamError> {
    settings.validate()?;
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let acceptance_idx = headers.iter().position(|h| h == ACCEPTANCE_COLUMN);
    let parameter_idx: Vec<usize> = (0..headers.len())
        .filter(|&i| Some(i) != acceptance_idx)
        .collect();
    let names: Vec<String> = parameter_idx.iter().map(|&i| headers[i].clone()).collect();

    let mut values = Vec::new();
    let mut kept = 0usize;
    let mut accepted = 0.0;
    let mut total_rows = 0usize;

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        total_rows += 1;
        if !settings.keeps(row) {
            continue;
        }
        let parse = |col: usize| -> Result<f64, AlaamError> {
            let raw = record.get(col).unwrap_or_default();
            raw.parse::<f64>().map_err(|_| AlaamError::InvalidDraw {
                row: row + 1,
                column: headers[col].clone(),
                value: raw.to_string(),
            })
        };
        for &col in &parameter_idx {
            values.push(parse(col)?);
        }
        if let Some(col) = acceptance_idx {
            accepted += parse(col)?;
        }
        kept += 1;
    }

    if total_rows < settings.iterations {
        warn!(
            "draw file {} holds {total_rows} iterations, fewer than the {} configured",
            path.display(),
            settings.iterations
        );
    }
    if kept < 2 {
        return Err(AlaamError::InsufficientDraws {
            required: 2,
            actual: kept,
        });
    }

    let draws = Array2::from_shape_vec((kept, names.len()), values).map_err(|e| {
        AlaamError::Estimator(format!("draw matrix has inconsistent shape: {e}"))
    })?;
    let acceptance_rate = acceptance_idx.map(|_| accepted / kept as f64);
    info!(
        "read {kept} of {total_rows} draws for {} parameters from {}",
        names.len(),
        path.display()
    );
    AlaamPosterior::new(names, draws, acceptance_rate)
}

/// Estimator whose results were produced by an external run.
#[derive(Debug, Clone)]
pub struct DrawFileEstimator {
    path: PathBuf,
}

impl DrawFileEstimator {
    /// Read draws from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the draw file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AlaamEstimator for DrawFileEstimator {
    fn estimate(
        &self,
        input: &AlaamInput,
        settings: &AlaamSettings,
    ) -> Result<AlaamPosterior, AlaamError> {
        input.validate()?;
        let posterior = read_draws(&self.path, settings)?;
        let expected = input.parameter_names();
        if posterior.parameter_names() != expected.as_slice() {
            return Err(AlaamError::HeaderMismatch {
                expected,
                found: posterior.parameter_names().to_vec(),
            });
        }
        Ok(posterior)
    }
}
