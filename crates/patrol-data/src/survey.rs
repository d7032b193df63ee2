//! Survey loading and cleaning.
//!
//! Each function here is a pure stage: it takes a frame and returns a new one,
//! leaving its input untouched. The stages are composed by the pipeline in the
//! `patrol` crate.

use crate::error::{DataError, Result};
use crate::frame::{column_names, float_column, require_column, sort_by_officer};
use crate::officer::{OFFICER_ID, ensure_unique, officer_ids};
use log::{debug, info};
use polars::prelude::*;
use std::path::Path;

/// Suffix given to wave-2 columns while the waves are being merged.
const WAVE2_SUFFIX: &str = "__wave2";

/// Read a delimited table with a header row.
///
/// Empty fields and the literal `NA` are read as missing.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .map_parse_options(|opts| {
            opts.with_null_values(Some(NullValues::AllColumnsSingle("NA".into())))
        })
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    info!(
        "read {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

fn sentinel_predicate(column: &str, sentinels: &[i64]) -> Option<Expr> {
    sentinels
        .iter()
        .map(|&s| col(column).eq(lit(s as f64)))
        .reduce(|acc, e| acc.or(e))
}

/// Replace sentinel codes with missing values.
///
/// The listed columns are cast to `Float64`; any value equal to one of the
/// sentinel codes becomes null.
pub fn recode_sentinels(df: &DataFrame, columns: &[String], sentinels: &[i64]) -> Result<DataFrame> {
    for column in columns {
        require_column(df, column, "survey")?;
    }

    let exprs: Vec<Expr> = columns
        .iter()
        .map(|c| {
            let value = col(c.as_str()).cast(DataType::Float64);
            match sentinel_predicate(c, sentinels) {
                Some(is_sentinel) => when(is_sentinel)
                    .then(lit(NULL))
                    .otherwise(value)
                    .alias(c.as_str()),
                None => value.alias(c.as_str()),
            }
        })
        .collect();

    let out = df
        .clone()
        .lazy()
        .with_columns(exprs)
        .collect()?;
    Ok(out)
}

/// Merge two survey waves.
///
/// Wave 1 is the roster: every wave-1 officer is kept, officers that only
/// appear in wave 2 are not. For each of `columns` the wave-2 value is used
/// when it is present and the wave-1 value otherwise. Columns missing from
/// wave 2 keep their wave-1 values. The result is sorted by officer id.
pub fn merge_waves(wave1: &DataFrame, wave2: &DataFrame, columns: &[String]) -> Result<DataFrame> {
    ensure_unique(&officer_ids(wave1, "wave1")?)?;
    ensure_unique(&officer_ids(wave2, "wave2")?)?;
    for column in columns {
        require_column(wave1, column, "wave1")?;
    }

    let shared: Vec<&String> = columns
        .iter()
        .filter(|c| wave2.column(c.as_str()).is_ok())
        .collect();
    debug!(
        "merging waves: {} of {} columns present in wave 2",
        shared.len(),
        columns.len()
    );

    let mut wave2_select = vec![col(OFFICER_ID).cast(DataType::Int64)];
    wave2_select.extend(shared.iter().map(|c| {
        col(c.as_str())
            .cast(DataType::Float64)
            .alias(format!("{c}{WAVE2_SUFFIX}"))
    }));
    let wave2_lf = wave2.clone().lazy().select(wave2_select);

    let mut wave1_casts = vec![col(OFFICER_ID).cast(DataType::Int64)];
    wave1_casts.extend(columns.iter().map(|c| col(c.as_str()).cast(DataType::Float64)));

    let fallbacks: Vec<Expr> = shared
        .iter()
        .map(|c| {
            let wave2_name = format!("{c}{WAVE2_SUFFIX}");
            when(col(wave2_name.as_str()).is_not_null())
                .then(col(wave2_name.as_str()))
                .otherwise(col(c.as_str()))
                .alias(c.as_str())
        })
        .collect();

    let keep: Vec<Expr> = column_names(wave1)
        .iter()
        .map(|name| col(name.as_str()))
        .collect();

    let merged = wave1
        .clone()
        .lazy()
        .with_columns(wave1_casts)
        .join(
            wave2_lf,
            [col(OFFICER_ID)],
            [col(OFFICER_ID)],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns(fallbacks)
        .select(keep)
        .collect()?;

    let merged = sort_by_officer(&merged)?;
    info!("merged waves: {} officers on the roster", merged.height());
    Ok(merged)
}

/// Add a 0/1 role flag derived from rank.
///
/// Officers at or above `supervisor_min_rank` are flagged 1, officers below
/// are flagged 0, and a missing rank stays missing.
pub fn derive_role_flag(
    df: &DataFrame,
    rank_column: &str,
    supervisor_min_rank: f64,
    name: &str,
) -> Result<DataFrame> {
    require_column(df, rank_column, "survey")?;
    let rank = col(rank_column).cast(DataType::Float64);
    let out = df
        .clone()
        .lazy()
        .with_columns([when(rank.clone().gt_eq(lit(supervisor_min_rank)))
            .then(lit(1.0))
            .when(rank.lt(lit(supervisor_min_rank)))
            .then(lit(0.0))
            .otherwise(lit(NULL))
            .alias(name)])
        .collect()?;
    Ok(out)
}

/// Add a scale score: the row mean of the observed items.
///
/// A row with every item missing gets a missing score.
pub fn derive_scale_score(df: &DataFrame, items: &[String], name: &str) -> Result<DataFrame> {
    if items.is_empty() {
        return Err(DataError::InvalidValue {
            column: name.to_string(),
            reason: "a scale needs at least one item".to_string(),
        });
    }

    let columns = items
        .iter()
        .map(|item| float_column(df, item, "survey"))
        .collect::<Result<Vec<_>>>()?;

    let scores: Vec<Option<f64>> = (0..df.height())
        .map(|row| {
            let observed: Vec<f64> = columns.iter().filter_map(|c| c[row]).collect();
            if observed.is_empty() {
                None
            } else {
                Some(observed.iter().sum::<f64>() / observed.len() as f64)
            }
        })
        .collect();

    let mut out = df.clone();
    out.with_column(Column::new(name.into(), scores))?;
    Ok(out)
}

/// Keep only officers who answered the outcome question with a 0/1 value.
pub fn filter_responders(df: &DataFrame, outcome: &str) -> Result<DataFrame> {
    require_column(df, outcome, "survey")?;
    let value = col(outcome).cast(DataType::Float64);
    let out = df
        .clone()
        .lazy()
        .with_columns([value.clone().alias(outcome)])
        .filter(
            value
                .clone()
                .is_not_null()
                .and(value.clone().eq(lit(0.0)).or(value.eq(lit(1.0)))),
        )
        .collect()?;
    let out = sort_by_officer(&out)?;
    info!(
        "outcome filter on '{}': kept {} of {} officers",
        outcome,
        out.height(),
        df.height()
    );
    Ok(out)
}
