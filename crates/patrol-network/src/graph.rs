//! Nomination-to-graph construction.
//!
//! Construction runs in three steps:
//!
//! 1. [`EdgeList::from_nominations`]: one [`Tie::Nomination`] per valid
//!    nomination, and one [`Tie::Placeholder`] for each officer who nominated
//!    nobody so the officer is not lost.
//! 2. [`EdgeList::restrict_to`]: ties touching officers outside the responding
//!    set are dropped, then officers left without ties get a placeholder.
//! 3. [`DirectedNetwork::build`]: every responder becomes a node, ordered by
//!    officer id; nominations become deduplicated edges and placeholders
//!    become nothing, so "nominated nobody" and "nominated only
//!    non-responders" both end as isolates.

use crate::error::NetworkError;
use log::{debug, info};
use ndarray::Array2;
use patrol_data::{NominationTable, OfficerId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// An entry of the intermediate edge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tie {
    /// `from` named `to`
    Nomination {
        /// Nominating officer
        from: OfficerId,
        /// Nominated officer
        to: OfficerId,
    },
    /// Keeps an officer without outgoing ties in the edge list
    Placeholder(OfficerId),
}

impl Tie {
    /// The officer the tie belongs to.
    pub const fn nominator(&self) -> OfficerId {
        match self {
            Self::Nomination { from, .. } => *from,
            Self::Placeholder(id) => *id,
        }
    }
}

/// Intermediate, long-format list of ties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeList {
    ties: Vec<Tie>,
}

impl EdgeList {
    /// Turn per-officer nomination rows into ties.
    ///
    /// Officers naming themselves are treated as making no nomination.
    pub fn from_nominations(table: &NominationTable) -> Self {
        let mut ties = Vec::with_capacity(table.nomination_count() + table.len());
        for row in table.rows() {
            let before = ties.len();
            ties.extend(
                row.targets
                    .iter()
                    .filter(|&&to| to != row.officer)
                    .map(|&to| Tie::Nomination {
                        from: row.officer,
                        to,
                    }),
            );
            if ties.len() == before {
                ties.push(Tie::Placeholder(row.officer));
            }
        }
        Self { ties }
    }

    /// Drop ties outside the responding set and re-apply the placeholder rule.
    ///
    /// A responder whose nominations all pointed at non-responders ends up with
    /// a placeholder, exactly like a responder who nominated nobody.
    pub fn restrict_to(&self, responders: &BTreeSet<OfficerId>) -> Self {
        let mut dropped = 0usize;
        let mut kept: Vec<Tie> = Vec::with_capacity(self.ties.len());
        for tie in &self.ties {
            match *tie {
                Tie::Nomination { from, to }
                    if responders.contains(&from) && responders.contains(&to) =>
                {
                    kept.push(*tie);
                }
                Tie::Nomination { .. } => dropped += 1,
                Tie::Placeholder(_) => {}
            }
        }

        let with_ties: BTreeSet<OfficerId> = kept.iter().map(Tie::nominator).collect();
        let nominators: BTreeSet<OfficerId> = self.ties.iter().map(Tie::nominator).collect();
        kept.extend(
            nominators
                .iter()
                .filter(|id| responders.contains(id) && !with_ties.contains(id))
                .map(|&id| Tie::Placeholder(id)),
        );

        debug!("restricted edge list: dropped {dropped} ties to or from non-responders");
        Self { ties: kept }
    }

    /// All ties.
    pub fn ties(&self) -> &[Tie] {
        &self.ties
    }

    /// Officers held in the list by a placeholder.
    pub fn placeholders(&self) -> BTreeSet<OfficerId> {
        self.ties
            .iter()
            .filter_map(|tie| match tie {
                Tie::Placeholder(id) => Some(*id),
                Tie::Nomination { .. } => None,
            })
            .collect()
    }

    /// Number of nomination ties, counting duplicates.
    pub fn nomination_count(&self) -> usize {
        self.ties
            .iter()
            .filter(|tie| matches!(tie, Tie::Nomination { .. }))
            .count()
    }
}

/// Directed, unweighted, loop-free network over responding officers.
///
/// Nodes are indexed `0..n` in increasing officer id order; this order is the
/// row/column order of [`DirectedNetwork::adjacency`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectedNetwork {
    index_to_node: Vec<OfficerId>,
    node_to_index: HashMap<OfficerId, usize>,
    successors: Vec<BTreeSet<usize>>,
    predecessors: Vec<BTreeSet<usize>>,
}

impl DirectedNetwork {
    fn with_nodes(mut nodes: Vec<OfficerId>) -> Self {
        nodes.sort();
        nodes.dedup();
        let node_to_index = nodes.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let n = nodes.len();
        Self {
            index_to_node: nodes,
            node_to_index,
            successors: vec![BTreeSet::new(); n],
            predecessors: vec![BTreeSet::new(); n],
        }
    }

    fn insert_edge(&mut self, from: usize, to: usize) {
        if from != to {
            self.successors[from].insert(to);
            self.predecessors[to].insert(from);
        }
    }

    /// Build the network over `responders` from an edge list.
    ///
    /// Every responder is a node. Nominations whose endpoints are not both
    /// responders are ignored, duplicates collapse to one edge, and
    /// placeholders contribute no edge.
    pub fn build(responders: &[OfficerId], edges: &EdgeList) -> Self {
        let mut network = Self::with_nodes(responders.to_vec());
        for tie in edges.ties() {
            if let Tie::Nomination { from, to } = *tie
                && let (Some(&i), Some(&j)) =
                    (network.node_to_index.get(&from), network.node_to_index.get(&to))
            {
                network.insert_edge(i, j);
            }
        }
        info!(
            "built network: {} nodes, {} edges, {} isolates",
            network.node_count(),
            network.edge_count(),
            network.isolates().len()
        );
        network
    }

    /// Run the full construction from nomination rows.
    pub fn from_nominations(table: &NominationTable, responders: &[OfficerId]) -> Self {
        let responder_set: BTreeSet<OfficerId> = responders.iter().copied().collect();
        let edges = EdgeList::from_nominations(table).restrict_to(&responder_set);
        Self::build(responders, &edges)
    }

    /// Rebuild a network from node ids and a dense adjacency matrix.
    ///
    /// The ids must be strictly increasing and the matrix must be a square
    /// 0/1 matrix with a zero diagonal in the same order.
    pub fn from_adjacency(
        node_ids: &[OfficerId],
        adjacency: &Array2<f64>,
    ) -> Result<Self, NetworkError> {
        crate::covariates::validate_adjacency(adjacency)?;
        if adjacency.nrows() != node_ids.len() {
            return Err(NetworkError::DimensionMismatch {
                expected: node_ids.len(),
                actual: adjacency.nrows(),
            });
        }
        if let Some(pair) = node_ids.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(NetworkError::UnsortedNodes(pair[1]));
        }

        let mut network = Self::with_nodes(node_ids.to_vec());
        for ((i, j), &value) in adjacency.indexed_iter() {
            if value == 1.0 {
                network.insert_edge(i, j);
            }
        }
        Ok(network)
    }

    /// Node ids in index order.
    pub fn node_ids(&self) -> &[OfficerId] {
        &self.index_to_node
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.index_to_node.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(BTreeSet::len).sum()
    }

    /// Index of an officer in node order.
    pub fn index_of(&self, id: OfficerId) -> Option<usize> {
        self.node_to_index.get(&id).copied()
    }

    fn require(&self, id: OfficerId) -> Result<usize, NetworkError> {
        self.index_of(id).ok_or(NetworkError::UnknownNode(id))
    }

    /// Whether `from` nominated `to`.
    pub fn has_edge(&self, from: OfficerId, to: OfficerId) -> bool {
        match (self.index_of(from), self.index_of(to)) {
            (Some(i), Some(j)) => self.successors[i].contains(&j),
            _ => false,
        }
    }

    /// Number of officers nominated by `id`.
    pub fn out_degree(&self, id: OfficerId) -> Result<usize, NetworkError> {
        Ok(self.successors[self.require(id)?].len())
    }

    /// Number of officers nominating `id`.
    pub fn in_degree(&self, id: OfficerId) -> Result<usize, NetworkError> {
        Ok(self.predecessors[self.require(id)?].len())
    }

    /// Officers nominated by `id`, in id order.
    pub fn successors(&self, id: OfficerId) -> Result<Vec<OfficerId>, NetworkError> {
        Ok(self.successors[self.require(id)?]
            .iter()
            .map(|&j| self.index_to_node[j])
            .collect())
    }

    /// Nodes with no incoming and no outgoing edge.
    pub fn isolates(&self) -> Vec<OfficerId> {
        (0..self.node_count())
            .filter(|&i| self.successors[i].is_empty() && self.predecessors[i].is_empty())
            .map(|i| self.index_to_node[i])
            .collect()
    }

    /// Edges as (from, to) pairs, ordered by from then to.
    pub fn edges(&self) -> Vec<(OfficerId, OfficerId)> {
        self.successors
            .iter()
            .enumerate()
            .flat_map(|(i, out)| {
                out.iter()
                    .map(move |&j| (self.index_to_node[i], self.index_to_node[j]))
            })
            .collect()
    }

    /// Number of reciprocated dyads.
    pub fn mutual_dyads(&self) -> usize {
        self.successors
            .iter()
            .enumerate()
            .map(|(i, out)| {
                out.iter()
                    .filter(|&&j| i < j && self.successors[j].contains(&i))
                    .count()
            })
            .sum()
    }

    /// Dense 0/1 adjacency matrix in node order.
    pub fn adjacency(&self) -> Array2<f64> {
        let n = self.node_count();
        let mut matrix = Array2::<f64>::zeros((n, n));
        for (i, out) in self.successors.iter().enumerate() {
            for &j in out {
                matrix[[i, j]] = 1.0;
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patrol_data::NominationRow;

    fn ids(raw: &[i64]) -> Vec<OfficerId> {
        raw.iter().copied().map(OfficerId).collect()
    }

    fn table(rows: &[(i64, &[i64])]) -> NominationTable {
        NominationTable::from_rows(
            rows.iter()
                .map(|(officer, targets)| NominationRow {
                    officer: OfficerId(*officer),
                    targets: ids(targets),
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_placeholder_for_empty_row() {
        let edges = EdgeList::from_nominations(&table(&[(1, &[2]), (2, &[])]));
        assert_eq!(edges.nomination_count(), 1);
        assert_eq!(edges.placeholders(), ids(&[2]).into_iter().collect());
    }

    #[test]
    fn test_self_nomination_becomes_placeholder() {
        let edges = EdgeList::from_nominations(&table(&[(1, &[1])]));
        assert_eq!(edges.ties(), &[Tie::Placeholder(OfficerId(1))]);
    }

    #[test]
    fn test_restrict_reapplies_placeholder() {
        let responders: BTreeSet<OfficerId> = ids(&[1, 2]).into_iter().collect();
        // officer 1 only nominates a non-responder, officer 3 is not a responder
        let edges = EdgeList::from_nominations(&table(&[(1, &[3]), (2, &[1]), (3, &[1])]))
            .restrict_to(&responders);
        assert_eq!(edges.nomination_count(), 1);
        assert_eq!(edges.placeholders(), ids(&[1]).into_iter().collect());
    }

    #[test]
    fn test_build_collapses_duplicates() {
        let responders = ids(&[1, 2]);
        let network = DirectedNetwork::from_nominations(&table(&[(1, &[2, 2]), (2, &[])]), &responders);
        assert_eq!(network.edge_count(), 1);
        assert!(network.has_edge(OfficerId(1), OfficerId(2)));
        assert!(!network.has_edge(OfficerId(2), OfficerId(1)));
    }

    #[test]
    fn test_nodes_sorted_and_complete() {
        // responder 7 has no nomination row at all
        let responders = ids(&[5, 1, 7, 3]);
        let network = DirectedNetwork::from_nominations(&table(&[(5, &[1]), (3, &[])]), &responders);
        assert_eq!(network.node_ids(), ids(&[1, 3, 5, 7]).as_slice());
        assert_eq!(network.isolates(), ids(&[3, 7]));
    }

    #[test]
    fn test_isolates_both_paths_same_end_state() {
        let responders = ids(&[1, 2, 3]);
        // 2 nominated nobody; 3 nominated only the non-responder 9
        let network = DirectedNetwork::from_nominations(
            &table(&[(1, &[2]), (2, &[]), (3, &[9]), (9, &[3])]),
            &responders,
        );
        assert_eq!(network.out_degree(OfficerId(2)).unwrap(), 0);
        assert_eq!(network.out_degree(OfficerId(3)).unwrap(), 0);
        assert_eq!(network.in_degree(OfficerId(3)).unwrap(), 0);
        assert_eq!(network.isolates(), ids(&[3]));
        let adjacency = network.adjacency();
        for i in 0..3 {
            assert_eq!(adjacency[[i, i]], 0.0);
        }
    }

    #[test]
    fn test_from_adjacency_round_trip() {
        let responders = ids(&[10, 20, 30]);
        let network = DirectedNetwork::from_nominations(
            &table(&[(10, &[20, 30]), (20, &[10]), (30, &[])]),
            &responders,
        );
        let rebuilt = DirectedNetwork::from_adjacency(network.node_ids(), &network.adjacency()).unwrap();
        assert_eq!(rebuilt, network);
        assert_eq!(rebuilt.mutual_dyads(), 1);
        assert_eq!(
            rebuilt.edges(),
            vec![
                (OfficerId(10), OfficerId(20)),
                (OfficerId(10), OfficerId(30)),
                (OfficerId(20), OfficerId(10)),
            ]
        );
    }

    #[test]
    fn test_from_adjacency_rejects_unsorted_ids() {
        let adjacency = Array2::<f64>::zeros((2, 2));
        let err = DirectedNetwork::from_adjacency(&ids(&[2, 1]), &adjacency).unwrap_err();
        assert!(matches!(err, NetworkError::UnsortedNodes(id) if id == OfficerId(1)));
    }

    #[test]
    fn test_unknown_node() {
        let network = DirectedNetwork::build(&ids(&[1]), &EdgeList::default());
        assert!(network.out_degree(OfficerId(2)).is_err());
        assert_eq!(network.successors(OfficerId(1)).unwrap(), vec![]);
    }
}
