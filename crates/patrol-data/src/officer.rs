//! Officer identifiers.
//!
//! Every table in the pipeline is keyed by [`OfficerId`]. Sorting and joining
//! always go through this key so that rows of the network and of the attribute
//! table can never be paired up by position.

use crate::error::{DataError, Result};
use crate::frame::require_column;
use derive_more::{Display, From, Into};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name of the key column shared by every officer-level table.
pub const OFFICER_ID: &str = "officer_id";

/// Unique, stable identifier of a responding officer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    From,
    Into,
)]
#[serde(transparent)]
pub struct OfficerId(pub i64);

impl OfficerId {
    /// Raw integer value of the id.
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Read the officer id column in row order.
///
/// Null ids are rejected; a row without a key cannot be aligned with anything.
pub fn officer_ids(df: &DataFrame, table: &str) -> Result<Vec<OfficerId>> {
    let ids = require_column(df, OFFICER_ID, table)?.cast(&DataType::Int64)?;
    ids.i64()?
        .into_iter()
        .map(|id| {
            id.map(OfficerId).ok_or_else(|| DataError::InvalidValue {
                column: OFFICER_ID.to_string(),
                reason: format!("null officer id in {table}"),
            })
        })
        .collect()
}

/// Fail when an officer id appears more than once.
pub fn ensure_unique(ids: &[OfficerId]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(*id) {
            return Err(DataError::DuplicateOfficer(id.get()));
        }
    }
    Ok(())
}
