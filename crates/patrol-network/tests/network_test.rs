//! End-to-end construction from survey slots to covariates.

use patrol_data::{NominationTable, OFFICER_ID, OfficerId, SlotGroup};
use patrol_network::{DirectedNetwork, contagion_exposure, derive_covariates};
use polars::prelude::*;

#[test]
fn test_slots_to_covariates() {
    // officer 4 is not a responder; 3 nominates only 4 and itself
    let survey = df![
        OFFICER_ID => [3i64, 1, 2, 4],
        "mentor_1" => [Some(4i64), Some(2), Some(1), Some(1)],
        "mentor_2" => [Some(3i64), Some(2), Some(-99), None],
        "friend_1" => [Some(0i64), Some(3), Some(0), Some(0)],
    ]
    .unwrap();
    let groups = vec![SlotGroup::new("mentor", 2), SlotGroup::new("friend", 1)];
    let table = NominationTable::from_frame(&survey, &groups, &[0, -9, -99]).unwrap();
    let responders = vec![OfficerId(3), OfficerId(1), OfficerId(2)];

    let network = DirectedNetwork::from_nominations(&table, &responders);

    assert_eq!(network.node_ids(), &[OfficerId(1), OfficerId(2), OfficerId(3)]);
    assert_eq!(network.edge_count(), 3);
    assert_eq!(network.out_degree(OfficerId(3)).unwrap(), 0);
    assert!(network.isolates().is_empty());

    let covariates = derive_covariates(&network.adjacency()).unwrap();
    assert_eq!(covariates.column("out_degree").unwrap().to_vec(), vec![2.0, 1.0, 0.0]);
    assert_eq!(covariates.column("in_degree").unwrap().to_vec(), vec![1.0, 1.0, 1.0]);
    assert_eq!(covariates.column("reciprocity").unwrap().to_vec(), vec![1.0, 1.0, 0.0]);
    assert_eq!(covariates.column("triangles").unwrap().to_vec(), vec![0.0, 0.0, 0.0]);

    let exposure = contagion_exposure(&network.adjacency(), &[0.0, 1.0, 1.0]).unwrap();
    assert_eq!(exposure.to_vec(), vec![2.0, 0.0, 0.0]);

    let frame = covariates.to_frame(network.node_ids()).unwrap();
    assert_eq!(frame.height(), 3);
}
