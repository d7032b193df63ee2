//! Fixed-slot nominations.
//!
//! Surveys ask each officer to name up to a fixed number of colleagues per
//! relationship (e.g. three mentors, ten friends), stored as wide columns
//! `mentor_1..mentor_3`, `friend_1..friend_10`. Empty slots carry a sentinel
//! code. This module turns the wide layout into one row of valid targets per
//! officer; building the network from those rows is done in `patrol-network`.

use crate::error::Result;
use crate::frame::int_column;
use crate::officer::{OfficerId, ensure_unique, officer_ids};
use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// A group of nomination slots sharing a column prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGroup {
    /// Column prefix, e.g. `mentor`
    pub prefix: String,
    /// Number of slots; columns are `prefix_1..=prefix_count`
    pub count: usize,
}

impl SlotGroup {
    /// Create a slot group.
    pub fn new(prefix: impl Into<String>, count: usize) -> Self {
        Self {
            prefix: prefix.into(),
            count,
        }
    }

    /// Column names of the slots, in slot order.
    pub fn columns(&self) -> Vec<String> {
        (1..=self.count)
            .map(|slot| format!("{}_{}", self.prefix, slot))
            .collect()
    }

    /// Whether every slot column exists in the frame.
    pub fn present_in(&self, df: &DataFrame) -> bool {
        self.columns().iter().all(|c| df.column(c.as_str()).is_ok())
    }
}

/// The valid nominations made by one officer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NominationRow {
    /// Nominating officer
    pub officer: OfficerId,
    /// Nominated officers in slot order; may repeat a target
    pub targets: Vec<OfficerId>,
}

impl NominationRow {
    /// Whether the officer made no valid nomination.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Nomination rows for every officer of a table, sorted by officer id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NominationTable {
    rows: Vec<NominationRow>,
}

impl NominationTable {
    /// Build a table from rows; rows are sorted by officer id.
    pub fn from_rows(mut rows: Vec<NominationRow>) -> Result<Self> {
        rows.sort_by_key(|row| row.officer);
        let ids: Vec<OfficerId> = rows.iter().map(|row| row.officer).collect();
        ensure_unique(&ids)?;
        Ok(Self { rows })
    }

    /// Extract nominations from the wide slot columns of a survey table.
    ///
    /// Null slots and slots holding one of `sentinels` are "no nomination" and
    /// are left out. Every officer of the table gets a row, including officers
    /// who nominated nobody.
    pub fn from_frame(df: &DataFrame, groups: &[SlotGroup], sentinels: &[i64]) -> Result<Self> {
        let officers = officer_ids(df, "nominations")?;
        let slots = groups
            .iter()
            .flat_map(SlotGroup::columns)
            .map(|column| int_column(df, &column, "nominations"))
            .collect::<Result<Vec<_>>>()?;

        let rows = officers
            .into_iter()
            .enumerate()
            .map(|(row, officer)| NominationRow {
                officer,
                targets: slots
                    .iter()
                    .filter_map(|slot| slot[row])
                    .filter(|code| !sentinels.contains(code))
                    .map(OfficerId)
                    .collect(),
            })
            .collect();

        let table = Self::from_rows(rows)?;
        debug!(
            "extracted nominations for {} officers ({} nominated nobody)",
            table.len(),
            table.officers_without_nominations().len()
        );
        Ok(table)
    }

    /// Combine two waves of nominations.
    ///
    /// The `fallback` table is the roster. An officer's nominations come from
    /// `preferred` when the officer made at least one valid nomination there,
    /// otherwise from `fallback`. Officers only present in `preferred` are
    /// dropped.
    pub fn prefer(preferred: &Self, fallback: &Self) -> Self {
        let rows = fallback
            .rows
            .iter()
            .map(|row| match preferred.get(row.officer) {
                Some(newer) if !newer.is_empty() => newer.clone(),
                _ => row.clone(),
            })
            .collect();
        Self { rows }
    }

    /// Union of two tables built from different slot groups.
    ///
    /// An officer in both tables gets this table's targets followed by
    /// `other`'s. Officers in only one table keep their own row.
    pub fn merge(&self, other: &Self) -> Self {
        let mut rows = self.rows.clone();
        for row in &other.rows {
            match rows.binary_search_by_key(&row.officer, |r| r.officer) {
                Ok(idx) => rows[idx].targets.extend_from_slice(&row.targets),
                Err(idx) => rows.insert(idx, row.clone()),
            }
        }
        Self { rows }
    }

    /// Rows in officer id order.
    pub fn rows(&self) -> &[NominationRow] {
        &self.rows
    }

    /// Row of one officer.
    pub fn get(&self, officer: OfficerId) -> Option<&NominationRow> {
        self.rows
            .binary_search_by_key(&officer, |row| row.officer)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    /// Number of officers.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no officers.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Officers who made no valid nomination.
    pub fn officers_without_nominations(&self) -> Vec<OfficerId> {
        self.rows
            .iter()
            .filter(|row| row.is_empty())
            .map(|row| row.officer)
            .collect()
    }

    /// Total number of valid nominations, counting repeats.
    pub fn nomination_count(&self) -> usize {
        self.rows.iter().map(|row| row.targets.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::officer::OFFICER_ID;

    fn ids(raw: &[i64]) -> Vec<OfficerId> {
        raw.iter().copied().map(OfficerId).collect()
    }

    #[test]
    fn test_slot_columns() {
        let group = SlotGroup::new("mentor", 3);
        assert_eq!(group.columns(), vec!["mentor_1", "mentor_2", "mentor_3"]);
    }

    #[test]
    fn test_from_frame_drops_sentinels_and_nulls() {
        let df = df![
            OFFICER_ID => [2i64, 1, 3],
            "mentor_1" => [Some(1i64), Some(-99), None],
            "mentor_2" => [Some(0i64), Some(2), None],
            "friend_1" => [Some(3i64), Some(2), Some(0)],
        ]
        .unwrap();
        let groups = vec![SlotGroup::new("mentor", 2), SlotGroup::new("friend", 1)];

        let table = NominationTable::from_frame(&df, &groups, &[0, -9, -99]).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0].officer, OfficerId(1));
        assert_eq!(table.get(OfficerId(1)).unwrap().targets, ids(&[2, 2]));
        assert_eq!(table.get(OfficerId(2)).unwrap().targets, ids(&[1, 3]));
        assert!(table.get(OfficerId(3)).unwrap().is_empty());
        assert_eq!(table.officers_without_nominations(), ids(&[3]));
        assert_eq!(table.nomination_count(), 4);
    }

    #[test]
    fn test_missing_slot_column() {
        let df = df![OFFICER_ID => [1i64], "mentor_1" => [2i64]].unwrap();
        let groups = vec![SlotGroup::new("mentor", 2)];
        assert!(NominationTable::from_frame(&df, &groups, &[]).is_err());
        assert!(!groups[0].present_in(&df));
    }

    #[test]
    fn test_prefer_wave2_when_nonempty() {
        let wave1 = NominationTable::from_rows(vec![
            NominationRow { officer: OfficerId(1), targets: ids(&[2]) },
            NominationRow { officer: OfficerId(2), targets: ids(&[1]) },
            NominationRow { officer: OfficerId(3), targets: vec![] },
        ])
        .unwrap();
        let wave2 = NominationTable::from_rows(vec![
            NominationRow { officer: OfficerId(1), targets: ids(&[3]) },
            NominationRow { officer: OfficerId(2), targets: vec![] },
            NominationRow { officer: OfficerId(9), targets: ids(&[1]) },
        ])
        .unwrap();

        let merged = NominationTable::prefer(&wave2, &wave1);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get(OfficerId(1)).unwrap().targets, ids(&[3]));
        assert_eq!(merged.get(OfficerId(2)).unwrap().targets, ids(&[1]));
        assert!(merged.get(OfficerId(3)).unwrap().is_empty());
        assert!(merged.get(OfficerId(9)).is_none());
    }

    #[test]
    fn test_merge_slot_groups() {
        let mentors = NominationTable::from_rows(vec![
            NominationRow { officer: OfficerId(1), targets: ids(&[3]) },
            NominationRow { officer: OfficerId(2), targets: vec![] },
        ])
        .unwrap();
        let friends = NominationTable::from_rows(vec![
            NominationRow { officer: OfficerId(1), targets: ids(&[2]) },
            NominationRow { officer: OfficerId(4), targets: ids(&[1]) },
        ])
        .unwrap();

        let merged = mentors.merge(&friends);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get(OfficerId(1)).unwrap().targets, ids(&[3, 2]));
        assert!(merged.get(OfficerId(2)).unwrap().is_empty());
        assert_eq!(merged.get(OfficerId(4)).unwrap().targets, ids(&[1]));
        assert_eq!(merged.rows()[2].officer, OfficerId(4));
    }

    #[test]
    fn test_duplicate_officer_rows_rejected() {
        let rows = vec![
            NominationRow { officer: OfficerId(1), targets: vec![] },
            NominationRow { officer: OfficerId(1), targets: vec![] },
        ];
        assert!(NominationTable::from_rows(rows).is_err());
    }
}
