//! Operations/incident log.
//!
//! The log holds one row per (officer, incident) involvement, possibly with
//! repeated rows for the same incident. Behavioral counts are the number of
//! distinct incidents of each kind per officer.

use crate::error::{DataError, Result};
use crate::frame::{int_column, require_column, sort_by_officer};
use crate::officer::{OFFICER_ID, OfficerId};
use log::{info, warn};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Column holding the incident identifier.
pub const INCIDENT_ID: &str = "incident_id";

/// Column holding the incident type label.
pub const INCIDENT_TYPE: &str = "incident_type";

/// Kinds of incidents counted per officer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    /// Weapon drawn or pointed
    WeaponDraw,
    /// Weapon used or discharged
    WeaponUse,
    /// Use-of-force incident
    Force,
    /// Misconduct report or complaint
    Misconduct,
}

impl IncidentKind {
    /// All kinds, in output column order.
    pub const fn all() -> [Self; 4] {
        [Self::WeaponDraw, Self::WeaponUse, Self::Force, Self::Misconduct]
    }

    /// Name of the count column for this kind.
    pub const fn count_column(&self) -> &'static str {
        match self {
            Self::WeaponDraw => "weapon_draws",
            Self::WeaponUse => "weapon_uses",
            Self::Force => "force_incidents",
            Self::Misconduct => "misconduct_reports",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::WeaponDraw => 0,
            Self::WeaponUse => 1,
            Self::Force => 2,
            Self::Misconduct => 3,
        }
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::WeaponDraw => "weapon_draw",
            Self::WeaponUse => "weapon_use",
            Self::Force => "force",
            Self::Misconduct => "misconduct",
        };
        f.write_str(label)
    }
}

impl FromStr for IncidentKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "weapon_draw" | "draw" | "weapon_pointed" => Ok(Self::WeaponDraw),
            "weapon_use" | "discharge" | "weapon_discharge" => Ok(Self::WeaponUse),
            "force" | "use_of_force" => Ok(Self::Force),
            "misconduct" | "complaint" => Ok(Self::Misconduct),
            _ => Err(DataError::InvalidValue {
                column: INCIDENT_TYPE.to_string(),
                reason: format!("unknown incident type '{s}'"),
            }),
        }
    }
}

fn string_column(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let values = require_column(df, column, "incident log")?.cast(&DataType::String)?;
    Ok(values
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Count distinct incidents of each kind per officer.
///
/// Rows with a missing officer, incident id or type are skipped, as are rows
/// with an unrecognized type. The result has one row per officer present in
/// the log, sorted by officer id, with an `Int64` count column per kind.
pub fn count_incidents(log: &DataFrame) -> Result<DataFrame> {
    let officers = int_column(log, OFFICER_ID, "incident log")?;
    let incidents = string_column(log, INCIDENT_ID)?;
    let kinds = string_column(log, INCIDENT_TYPE)?;

    let mut distinct: BTreeMap<OfficerId, [BTreeSet<String>; 4]> = BTreeMap::new();
    let mut skipped = 0usize;

    for ((officer, incident), kind) in officers.into_iter().zip(incidents).zip(kinds) {
        let (Some(officer), Some(incident), Some(kind)) = (officer, incident, kind) else {
            skipped += 1;
            continue;
        };
        let kind = match kind.parse::<IncidentKind>() {
            Ok(kind) => kind,
            Err(e) => {
                warn!("skipping incident {incident} for officer {officer}: {e}");
                skipped += 1;
                continue;
            }
        };
        distinct.entry(OfficerId(officer)).or_default()[kind.index()].insert(incident);
    }

    if skipped > 0 {
        info!("incident log: skipped {skipped} incomplete or unrecognized rows");
    }

    let ids: Vec<i64> = distinct.keys().map(|id| id.get()).collect();
    let mut columns = vec![Column::new(OFFICER_ID.into(), ids)];
    for kind in IncidentKind::all() {
        let counts: Vec<i64> = distinct
            .values()
            .map(|sets| sets[kind.index()].len() as i64)
            .collect();
        columns.push(Column::new(kind.count_column().into(), counts));
    }

    Ok(DataFrame::new(columns)?)
}

/// Attach incident counts to officer records.
///
/// Officers without any logged incident receive zero counts. Counts are cast
/// to `Float64` like every other attribute.
pub fn attach_incident_counts(records: &DataFrame, counts: &DataFrame) -> Result<DataFrame> {
    let fills: Vec<Expr> = IncidentKind::all()
        .iter()
        .map(|kind| {
            col(kind.count_column())
                .cast(DataType::Float64)
                .fill_null(lit(0.0))
                .alias(kind.count_column())
        })
        .collect();

    let joined = records
        .clone()
        .lazy()
        .with_columns([col(OFFICER_ID).cast(DataType::Int64)])
        .join(
            counts
                .clone()
                .lazy()
                .with_columns([col(OFFICER_ID).cast(DataType::Int64)]),
            [col(OFFICER_ID)],
            [col(OFFICER_ID)],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns(fills)
        .collect()?;

    sort_by_officer(&joined)
}
