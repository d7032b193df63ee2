//! Mode substitution.

use crate::error::Result;
use crate::frame::{float_column, sort_by_officer};
use log::{debug, warn};
use polars::prelude::*;

/// Most frequent observed value.
///
/// Ties are broken by the value encountered first in the given order.
/// Returns `None` when no value is observed.
pub fn mode<T: PartialEq + Copy>(values: &[Option<T>]) -> Option<T> {
    // (value, count) in first-seen order
    let mut tally: Vec<(T, usize)> = Vec::new();
    for value in values.iter().flatten() {
        match tally.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => tally.push((*value, 1)),
        }
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in tally {
        // strictly greater keeps the earliest value on ties
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Fill every missing entry with the mode of the observed entries.
///
/// A column with nothing observed is returned unchanged.
pub fn fill_mode<T: PartialEq + Copy>(values: &[Option<T>]) -> Vec<Option<T>> {
    match mode(values) {
        Some(fill) => values.iter().map(|v| Some(v.unwrap_or(fill))).collect(),
        None => values.to_vec(),
    }
}

/// Mode-impute the given columns of an officer table.
///
/// The table is sorted by officer id first, so "first encountered" means
/// lowest officer id among the tied values. Imputed columns are `Float64`.
pub fn impute_mode(df: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    let sorted = sort_by_officer(df)?;

    let mut fills = Vec::with_capacity(columns.len());
    for column in columns {
        let values = float_column(&sorted, column, "attributes")?;
        let missing = values.iter().filter(|v| v.is_none()).count();
        match mode(&values) {
            Some(fill) => {
                if missing > 0 {
                    debug!("mode fill of '{column}': {missing} missing -> {fill}");
                }
                fills.push(
                    col(column.as_str())
                        .cast(DataType::Float64)
                        .fill_null(lit(fill))
                        .alias(column.as_str()),
                );
            }
            None => warn!("column '{column}' has no observed values; left missing"),
        }
    }

    Ok(sorted.lazy().with_columns(fills).collect()?)
}
