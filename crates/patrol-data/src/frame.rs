//! Small helpers for moving between polars frames and plain vectors.

use crate::error::{DataError, Result};
use crate::officer::OFFICER_ID;
use polars::prelude::*;

/// Look up a column, reporting a [`DataError::MissingColumn`] when absent.
pub fn require_column<'a>(df: &'a DataFrame, column: &str, table: &str) -> Result<&'a Column> {
    df.column(column).map_err(|_| DataError::MissingColumn {
        column: column.to_string(),
        table: table.to_string(),
    })
}

/// Read a numeric column as `f64` values in row order, keeping nulls.
pub fn float_column(df: &DataFrame, column: &str, table: &str) -> Result<Vec<Option<f64>>> {
    let values = require_column(df, column, table)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Read an integer column as `i64` values in row order, keeping nulls.
pub fn int_column(df: &DataFrame, column: &str, table: &str) -> Result<Vec<Option<i64>>> {
    let values = require_column(df, column, table)?.cast(&DataType::Int64)?;
    Ok(values.i64()?.into_iter().collect())
}

/// Sort a table by officer id, the single canonical ordering key.
pub fn sort_by_officer(df: &DataFrame) -> Result<DataFrame> {
    Ok(df.sort([OFFICER_ID], SortMultipleOptions::default())?)
}

/// Names of the columns of a frame, in order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::officer::{OfficerId, officer_ids};

    #[test]
    fn test_sort_by_officer() {
        let df = df![OFFICER_ID => [3i64, 1, 2], "x" => [30.0, 10.0, 20.0]].unwrap();
        let sorted = sort_by_officer(&df).unwrap();
        let ids = officer_ids(&sorted, "test").unwrap();
        assert_eq!(ids, vec![OfficerId(1), OfficerId(2), OfficerId(3)]);
        let x = float_column(&sorted, "x", "test").unwrap();
        assert_eq!(x, vec![Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn test_float_column_casts_integers() {
        let df = df!["x" => [Some(1i64), None, Some(3)]].unwrap();
        let x = float_column(&df, "x", "test").unwrap();
        assert_eq!(x, vec![Some(1.0), None, Some(3.0)]);
    }

    #[test]
    fn test_missing_column_error() {
        let df = df!["x" => [1i64]].unwrap();
        let err = float_column(&df, "y", "wave2").unwrap_err();
        assert_eq!(err.to_string(), "Missing column 'y' in wave2");
    }
}
