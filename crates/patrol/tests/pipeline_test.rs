//! End-to-end tests of the preparation and modeling stages.

use ndarray::Array2;
use patrol::data::frame::float_column;
use patrol::data::{OfficerId, SlotGroup};
use patrol::models::{AlaamError, AlaamEstimator, AlaamInput, AlaamPosterior, AlaamSettings};
use patrol::network::Contagion;
use patrol::output::{AlaamArtifacts, ExportFormat};
use patrol::{
    NetworkKind, PipelineConfig, PipelineInputs, alaam_input, build_network, export,
    fit_complete_case, fit_multiply_imputed, prepare, summarize_alaam,
};
use polars::prelude::*;
use rstest::rstest;

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn config() -> PipelineConfig {
    PipelineConfig {
        attribute_columns: strings(&["gender", "rank", "years_service"]),
        attitude_items: strings(&["attitude_1", "attitude_2"]),
        mentor_slots: SlotGroup::new("mentor", 2),
        friend_slots: SlotGroup::new("friend", 2),
        alaam_attributes: strings(&["gender", "supervisor", "attitude_score", "force_incidents"]),
        regression_terms: strings(&["in_degree", "gender"]),
        imputations: 3,
        seed: 11,
        ..PipelineConfig::default()
    }
}

fn inputs() -> PipelineInputs {
    // officer 9 never answers the outcome question; officer 3 answers in wave 2
    let wave1 = df![
        "officer_id" => [1i64, 2, 3, 4, 5, 6, 7, 8, 9, 10],
        "invited" => [Some(1i64), Some(0), Some(-9), Some(1), Some(0), Some(1), Some(0), Some(1), None, Some(0)],
        "gender" => [1i64, 0, 1, -99, 0, 1, -9, 1, 0, 1],
        "rank" => [1i64, 2, 1, 3, 1, 2, 1, 1, 1, 2],
        "years_service" => [3i64, 10, 2, 15, 4, 8, 1, 5, 2, 9],
        "attitude_1" => [Some(4i64), Some(2), Some(3), Some(5), None, Some(1), Some(2), Some(4), Some(3), Some(5)],
        "attitude_2" => [Some(2i64), Some(2), Some(-9), Some(4), None, Some(3), Some(2), Some(4), Some(3), Some(3)],
        "mentor_1" => [2i64, 1, 9, 0, 6, 5, 8, 1, 1, 7],
        "mentor_2" => [0i64, 0, 0, 0, 6, 0, 0, 0, 0, 0],
        "friend_1" => [3i64, 0, 0, -99, 5, 7, 0, 4, 0, 9],
        "friend_2" => [-99i64, 0, 0, -99, 0, 0, 0, 0, 0, 0],
    ]
    .unwrap();
    // officer 11 only appears in wave 2 and is not on the roster
    let wave2 = df![
        "officer_id" => [1i64, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        "invited" => [None, None, Some(0i64), None, None, None, None, None, None, Some(1), Some(1)],
        "gender" => [None, None, None, Some(0i64), None, None, None, None, None, None, Some(1)],
        "mentor_1" => [0i64, 0, 0, 2, 0, 0, 0, 0, 0, 0, 3],
        "mentor_2" => [0i64, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    ]
    .unwrap();
    let incidents = df![
        "officer_id" => [1i64, 1, 1, 6, 6, 42, 3],
        "incident_id" => ["A1", "A1", "A2", "B1", "B2", "Z9", "C1"],
        "incident_type" => ["force", "force", "Use of Force", "weapon draw", "complaint", "force", "parade"],
    ]
    .unwrap();
    PipelineInputs {
        wave1,
        wave2,
        incidents,
    }
}

fn ids(raw: &[i64]) -> Vec<OfficerId> {
    raw.iter().copied().map(OfficerId).collect()
}

#[test]
fn test_prepare_builds_aligned_study() {
    let prepared = prepare(&inputs(), &config()).unwrap();
    let network = &prepared.network;

    assert_eq!(network.node_ids(), ids(&[1, 2, 3, 4, 5, 6, 7, 8, 10]).as_slice());
    assert_eq!(network.edge_count(), 11);
    // nominated only a non-responder
    assert_eq!(network.out_degree(OfficerId(3)).unwrap(), 0);
    // duplicate and self nominations
    assert_eq!(network.successors(OfficerId(5)).unwrap(), ids(&[6]));
    assert!(!network.has_edge(OfficerId(5), OfficerId(5)));
    // wave-2 nominations replace wave 1
    assert!(network.has_edge(OfficerId(4), OfficerId(2)));
    assert!(network.isolates().is_empty());

    let reciprocity = prepared.covariates.column("reciprocity").unwrap().to_vec();
    assert_eq!(reciprocity, vec![1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0]);

    let dataset = &prepared.dataset;
    assert_eq!(dataset.node_ids(), network.node_ids());
    assert_eq!(
        dataset.outcome().unwrap(),
        vec![1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0]
    );

    // officer 7's gender is missing in both waves and gets the mode
    let raw_gender = float_column(&prepared.responders, "gender", "t").unwrap();
    assert_eq!(raw_gender[6], None);
    let gender = float_column(dataset.table(), "gender", "t").unwrap();
    assert_eq!(gender[6], Some(1.0));
    assert_eq!(gender[3], Some(0.0));

    let force = float_column(dataset.table(), "force_incidents", "t").unwrap();
    assert_eq!(force[0], Some(2.0));
    assert!(force[1..].iter().all(|v| *v == Some(0.0)));

    let supervisor = float_column(dataset.table(), "supervisor", "t").unwrap();
    assert_eq!(
        supervisor,
        [0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0].map(Some).to_vec()
    );
}

#[test]
fn test_wave2_groups_merge_with_wave1_groups() {
    // wave 2 only asked about mentors; friend nominations stay from wave 1
    let inputs = PipelineInputs {
        wave1: df![
            "officer_id" => [1i64, 2, 3],
            "mentor_1" => [0i64, 1, 0],
            "friend_1" => [2i64, 0, 1],
        ]
        .unwrap(),
        wave2: df![
            "officer_id" => [1i64, 2, 3],
            "mentor_1" => [3i64, 0, 0],
        ]
        .unwrap(),
        incidents: DataFrame::empty(),
    };
    let config = PipelineConfig {
        mentor_slots: SlotGroup::new("mentor", 1),
        friend_slots: SlotGroup::new("friend", 1),
        network: NetworkKind::Combined,
        ..PipelineConfig::default()
    };

    let network = build_network(&inputs, &ids(&[1, 2, 3]), &config).unwrap();

    assert!(network.has_edge(OfficerId(1), OfficerId(3)));
    assert!(network.has_edge(OfficerId(1), OfficerId(2)));
    // no wave-2 mentor answer, so wave 1 is kept
    assert!(network.has_edge(OfficerId(2), OfficerId(1)));
    assert!(network.has_edge(OfficerId(3), OfficerId(1)));
    assert_eq!(network.edge_count(), 4);
}

#[rstest]
#[case(NetworkKind::Mentor, 8)]
#[case(NetworkKind::Friend, 3)]
#[case(NetworkKind::Combined, 11)]
fn test_network_kind(#[case] network: NetworkKind, #[case] edges: usize) {
    let config = PipelineConfig {
        network,
        ..config()
    };
    let prepared = prepare(&inputs(), &config).unwrap();
    assert_eq!(prepared.network.edge_count(), edges);
    assert_eq!(prepared.network.node_count(), 9);
}

#[test]
fn test_regressions() {
    let config = config();
    let prepared = prepare(&inputs(), &config).unwrap();

    let complete = fit_complete_case(&prepared, &config).unwrap();
    assert_eq!(complete.terms, strings(&["intercept", "in_degree", "gender"]));
    assert_eq!(complete.observations, 8);

    let imputed = fit_multiply_imputed(&prepared, &config).unwrap();
    assert_eq!(imputed.fits.len(), 3);
    assert!(imputed.fits.iter().all(|fit| fit.observations == 9));
    assert_eq!(imputed.pooled.imputations, 3);
    assert_eq!(imputed.pooled.estimates.len(), 3);

    let again = fit_multiply_imputed(&prepared, &config).unwrap();
    assert_eq!(again.pooled, imputed.pooled);
}

#[test]
fn test_export_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = config();
    let prepared = prepare(&inputs(), &config).unwrap();

    let paths = export(&prepared, &config, dir.path(), ExportFormat::Csv).unwrap();
    assert_eq!(paths.len(), 5);
    assert!(paths.iter().all(|p| p.exists()));

    let expected = alaam_input(&prepared, &config).unwrap();
    let reloaded = AlaamArtifacts::load(dir.path(), ExportFormat::Csv)
        .unwrap()
        .to_input(true, Contagion::Simple)
        .unwrap();
    assert_eq!(reloaded, expected);
}

/// Stand-in for the external sampler: a deterministic chain per parameter.
struct SyntheticChain;

impl AlaamEstimator for SyntheticChain {
    fn estimate(
        &self,
        input: &AlaamInput,
        settings: &AlaamSettings,
    ) -> Result<AlaamPosterior, AlaamError> {
        input.validate()?;
        let names = input.parameter_names();
        let draws = Array2::from_shape_fn((settings.kept_draws(), names.len()), |(i, j)| {
            j as f64 + ((i % 7) as f64 - 3.0) * 0.01
        });
        AlaamPosterior::new(names, draws, Some(0.25))
    }
}

#[test]
fn test_summarize_alaam() {
    let config = PipelineConfig {
        alaam: AlaamSettings {
            iterations: 1_000,
            burn_in: 100,
            thinning: 10,
        },
        ..config()
    };
    let prepared = prepare(&inputs(), &config).unwrap();
    let input = alaam_input(&prepared, &config).unwrap();

    let summaries = summarize_alaam(&SyntheticChain, &input, &config).unwrap();
    assert_eq!(summaries.len(), 2 + 9 + 4);
    assert_eq!(summaries[0].parameter, "intercept");
    assert_eq!(summaries[1].parameter, "contagion");
    assert_eq!(summaries[14].parameter, "force_incidents");
    assert!(!summaries[0].excludes_zero);
    assert!(summaries[1].excludes_zero);
}
