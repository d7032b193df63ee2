//! Integration tests for reading and cleaning survey tables from disk.

use patrol_data::frame::float_column;
use patrol_data::survey::{filter_responders, merge_waves, read_table, recode_sentinels};
use patrol_data::{NominationTable, OFFICER_ID, OfficerId, SlotGroup, officer::officer_ids};
use std::fs;

fn write(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_read_recode_merge_filter() {
    let dir = tempfile::tempdir().unwrap();
    let wave1 = write(
        &dir,
        "wave1.csv",
        "officer_id,gender,invited,mentor_1,mentor_2\n\
         3,1,NA,1,0\n\
         1,-99,0,2,3\n\
         2,0,1,-99,-99\n",
    );
    let wave2 = write(
        &dir,
        "wave2.csv",
        "officer_id,gender,invited,mentor_1,mentor_2\n\
         1,1,,3,0\n\
         3,,1,,\n",
    );

    let wave1 = read_table(&wave1).unwrap();
    let wave2 = read_table(&wave2).unwrap();
    let columns = vec!["gender".to_string(), "invited".to_string()];

    let wave1_clean = recode_sentinels(&wave1, &columns, &[-9, -99]).unwrap();
    let wave2_clean = recode_sentinels(&wave2, &columns, &[-9, -99]).unwrap();
    let merged = merge_waves(&wave1_clean, &wave2_clean, &columns).unwrap();

    assert_eq!(
        float_column(&merged, "gender", "t").unwrap(),
        vec![Some(1.0), Some(0.0), Some(1.0)]
    );
    assert_eq!(
        float_column(&merged, "invited", "t").unwrap(),
        vec![Some(0.0), Some(1.0), Some(1.0)]
    );

    let responders = filter_responders(&merged, "invited").unwrap();
    assert_eq!(
        officer_ids(&responders, "t").unwrap(),
        vec![OfficerId(1), OfficerId(2), OfficerId(3)]
    );

    let groups = vec![SlotGroup::new("mentor", 2)];
    let sentinels = [0, -9, -99];
    let first = NominationTable::from_frame(&wave1, &groups, &sentinels).unwrap();
    let second = NominationTable::from_frame(&wave2, &groups, &sentinels).unwrap();
    let nominations = NominationTable::prefer(&second, &first);

    assert_eq!(nominations.get(OfficerId(1)).unwrap().targets, vec![OfficerId(3)]);
    assert!(nominations.get(OfficerId(2)).unwrap().is_empty());
    assert_eq!(nominations.get(OfficerId(3)).unwrap().targets, vec![OfficerId(1)]);
    assert_eq!(merged.column(OFFICER_ID).unwrap().len(), 3);
}
