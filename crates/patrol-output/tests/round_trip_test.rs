//! Integration tests for writing and reloading ALAAM artifacts.

use ndarray::{Array2, Axis, concatenate};
use patrol_data::OfficerId;
use patrol_models::AlaamInput;
use patrol_network::{COVARIATE_NAMES, Contagion, DirectedNetwork, derive_covariates};
use patrol_output::{AlaamArtifacts, Artifact, ExportError, ExportFormat, OutcomeExport};
use rstest::rstest;

fn study_input() -> AlaamInput {
    let ids: Vec<OfficerId> = [4, 9, 15, 16, 42].into_iter().map(OfficerId).collect();
    let mut adjacency = Array2::<f64>::zeros((5, 5));
    for (i, j) in [(0, 1), (1, 0), (1, 2), (2, 3), (0, 2)] {
        adjacency[[i, j]] = 1.0;
    }
    let network = DirectedNetwork::from_adjacency(&ids, &adjacency).unwrap();
    let structural = derive_covariates(&network.adjacency()).unwrap();

    // attribute values without a short decimal form
    let attitude = Array2::from_shape_vec(
        (5, 1),
        vec![1.0 / 3.0, 0.1 + 0.2, -2.0 / 7.0, 1e-17, 12345.678_901_234_5],
    )
    .unwrap();
    let covariates = concatenate(Axis(1), &[structural.values().view(), attitude.view()]).unwrap();
    let mut names: Vec<String> = COVARIATE_NAMES.iter().map(|s| s.to_string()).collect();
    names.push("attitude_score".to_string());

    AlaamInput {
        node_ids: ids,
        outcome: vec![1.0, 0.0, 0.0, 1.0, 0.0],
        adjacency: network.adjacency(),
        covariates,
        covariate_names: names,
        directed: true,
        contagion: Contagion::Simple,
    }
}

#[rstest]
#[case(ExportFormat::Csv)]
#[case(ExportFormat::Json)]
#[case(ExportFormat::PrettyJson)]
fn test_write_and_reload_is_exact(#[case] format: ExportFormat) {
    let dir = tempfile::tempdir().unwrap();
    let input = study_input();
    let artifacts = AlaamArtifacts::from_input(&input, "invited").unwrap();

    let paths = artifacts.write(dir.path(), format).unwrap();
    assert_eq!(paths.len(), 3);
    assert!(paths.iter().all(|p| p.exists()));

    let loaded = AlaamArtifacts::load(dir.path(), format).unwrap();
    assert_eq!(loaded, artifacts);

    let rebuilt = loaded.to_input(true, Contagion::Simple).unwrap();
    assert_eq!(rebuilt, input);
    assert_eq!(rebuilt.node_ids, input.node_ids);
}

#[test]
fn test_reload_detects_misaligned_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let artifacts = AlaamArtifacts::from_input(&study_input(), "invited").unwrap();
    artifacts.write(dir.path(), ExportFormat::Csv).unwrap();

    // outcome rows in a different order
    let mut outcome = artifacts.outcome.clone();
    outcome.node_ids.swap(0, 1);
    outcome.values.swap(0, 1);
    let path = OutcomeExport::path_in(dir.path(), ExportFormat::Csv);
    patrol_output::Exporter::export_to_file(&outcome, &path, ExportFormat::Csv).unwrap();

    assert!(matches!(
        AlaamArtifacts::load(dir.path(), ExportFormat::Csv),
        Err(ExportError::Misaligned(_))
    ));
}

#[test]
fn test_missing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        AlaamArtifacts::load(dir.path(), ExportFormat::Json),
        Err(ExportError::Io(_))
    ));
}
