//! Pipeline stages.
//!
//! Each stage takes its inputs by reference and returns new values; nothing
//! is modified in place. A run is the composition
//!
//! ```text
//! clean_records -> filter_responders -> build_network -> derive_covariates
//!   -> impute_mode -> ModelDataset::assemble -> export / fit
//! ```
//!
//! [`prepare`] performs everything up to the assembled dataset.

use crate::config::PipelineConfig;
use crate::dataset::ModelDataset;
use crate::error::Result;
use log::info;
use patrol_data::officer::officer_ids;
use patrol_data::survey::{
    derive_role_flag, derive_scale_score, filter_responders, merge_waves, read_table,
    recode_sentinels,
};
use patrol_data::{
    HotDeckImputer, NominationTable, OfficerId, attach_incident_counts,
    count_incidents, impute_mode,
};
use patrol_models::{
    AlaamEstimator, AlaamInput, LogisticFit, LogisticRegression, ParameterSummary, PooledFit,
    pool,
};
use patrol_network::{COVARIATE_NAMES, DirectedNetwork, NetworkCovariates, derive_covariates};
use patrol_output::{AlaamArtifacts, ExportFormat, Exporter, describe, summarize_network};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};

/// Raw tables of a study.
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    /// First survey wave; its officers form the roster
    pub wave1: DataFrame,
    /// Second survey wave
    pub wave2: DataFrame,
    /// Incident log, one row per officer and incident
    pub incidents: DataFrame,
}

impl PipelineInputs {
    /// Read the three tables from CSV files.
    pub fn read(wave1: &Path, wave2: &Path, incidents: &Path) -> Result<Self> {
        Ok(Self {
            wave1: read_table(wave1)?,
            wave2: read_table(wave2)?,
            incidents: read_table(incidents)?,
        })
    }
}

/// Merge and clean the officer records.
///
/// Sentinel codes become missing, the waves are merged with wave 1 as the
/// roster, incident counts are attached and the supervisor flag and attitude
/// score are derived. Every roster officer is kept.
pub fn clean_records(inputs: &PipelineInputs, config: &PipelineConfig) -> Result<DataFrame> {
    let columns = config.survey_columns();
    let wave2_columns: Vec<String> = columns
        .iter()
        .filter(|c| inputs.wave2.column(c.as_str()).is_ok())
        .cloned()
        .collect();

    let wave1 = recode_sentinels(&inputs.wave1, &columns, &config.attribute_sentinels)?;
    let wave2 = recode_sentinels(&inputs.wave2, &wave2_columns, &config.attribute_sentinels)?;
    let merged = merge_waves(&wave1, &wave2, &columns)?;

    let counts = count_incidents(&inputs.incidents)?;
    let records = attach_incident_counts(&merged, &counts)?;
    let records = derive_role_flag(
        &records,
        &config.rank_column,
        config.supervisor_min_rank,
        &config.supervisor_column,
    )?;
    let records = derive_scale_score(&records, &config.attitude_items, &config.attitude_column)?;
    info!("cleaned {} officer records", records.height());
    Ok(records)
}

/// Nominations of the configured network.
///
/// Each slot group is resolved on its own: when wave 2 carries the group,
/// an officer's wave-2 nominations in it replace wave 1 if there is at least
/// one; groups missing from wave 2 come from wave 1 alone. The groups are then
/// merged per officer.
pub fn nominations(inputs: &PipelineInputs, config: &PipelineConfig) -> Result<NominationTable> {
    let sentinels = &config.nomination_sentinels;
    let mut combined: Option<NominationTable> = None;

    for group in config.slot_groups() {
        let groups = std::slice::from_ref(&group);
        let first = NominationTable::from_frame(&inputs.wave1, groups, sentinels)?;
        let table = if group.present_in(&inputs.wave2) {
            let second = NominationTable::from_frame(&inputs.wave2, groups, sentinels)?;
            NominationTable::prefer(&second, &first)
        } else {
            info!("wave 2 has no {} slots; using wave 1", group.prefix);
            first
        };
        combined = Some(match combined {
            Some(merged) => merged.merge(&table),
            None => table,
        });
    }

    Ok(combined.unwrap_or_default())
}

/// Build the network over the responding officers.
pub fn build_network(
    inputs: &PipelineInputs,
    responders: &[OfficerId],
    config: &PipelineConfig,
) -> Result<DirectedNetwork> {
    let table = nominations(inputs, config)?;
    info!(
        "{} network: {} nominations from {} officers",
        config.network,
        table.nomination_count(),
        table.len()
    );
    Ok(DirectedNetwork::from_nominations(&table, responders))
}

/// Everything derived from the raw tables before any model is fitted.
#[derive(Debug, Clone)]
pub struct PreparedStudy {
    /// Responder records, sorted by officer id, with missing values kept
    pub responders: DataFrame,
    /// Responder records with the ALAAM attributes mode-imputed
    pub imputed: DataFrame,
    /// Nomination network over the responders
    pub network: DirectedNetwork,
    /// Network covariates in node order
    pub covariates: NetworkCovariates,
    /// Covariates and imputed attributes aligned with the network
    pub dataset: ModelDataset,
}

/// Run the preparation stages.
pub fn prepare(inputs: &PipelineInputs, config: &PipelineConfig) -> Result<PreparedStudy> {
    config.validate()?;
    let records = clean_records(inputs, config)?;
    let responders = filter_responders(&records, &config.outcome)?;
    let ids = officer_ids(&responders, "responders")?;

    let network = build_network(inputs, &ids, config)?;
    let covariates = derive_covariates(&network.adjacency())?;
    let imputed = impute_mode(&responders, &config.alaam_attributes)?;
    let dataset = ModelDataset::assemble(
        &network,
        &covariates,
        &imputed,
        &config.outcome,
        &config.alaam_attributes,
    )?;

    Ok(PreparedStudy {
        responders,
        imputed,
        network,
        covariates,
        dataset,
    })
}

fn regression_dataset(
    prepared: &PreparedStudy,
    attributes: &DataFrame,
    config: &PipelineConfig,
) -> Result<ModelDataset> {
    ModelDataset::assemble(
        &prepared.network,
        &prepared.covariates,
        attributes,
        &config.outcome,
        &config.regression_attributes(),
    )
}

/// Logistic regression over the officers with every term observed.
pub fn fit_complete_case(prepared: &PreparedStudy, config: &PipelineConfig) -> Result<LogisticFit> {
    let dataset = regression_dataset(prepared, &prepared.responders, config)?;
    let (design, outcome) = dataset.complete_cases(&config.regression_terms)?;
    info!(
        "complete-case regression on {} of {} officers",
        outcome.len(),
        dataset.len()
    );
    Ok(LogisticRegression::new(config.logistic).fit(
        &design,
        &outcome,
        &config.regression_terms,
    )?)
}

/// Per-imputation fits and their pooled result.
#[derive(Debug, Clone)]
pub struct MultipleImputationFit {
    /// One fit per completed dataset
    pub fits: Vec<LogisticFit>,
    /// Fits combined with Rubin's rules
    pub pooled: PooledFit,
}

/// Logistic regression over hot-deck imputed datasets, pooled.
pub fn fit_multiply_imputed(
    prepared: &PreparedStudy,
    config: &PipelineConfig,
) -> Result<MultipleImputationFit> {
    fit_multiply_imputed_with_progress(prepared, config, |_| {})
}

/// [`fit_multiply_imputed`], calling `on_fit` after each completed fit.
pub fn fit_multiply_imputed_with_progress(
    prepared: &PreparedStudy,
    config: &PipelineConfig,
    mut on_fit: impl FnMut(usize),
) -> Result<MultipleImputationFit> {
    let imputer = HotDeckImputer::new(config.imputations, config.seed)?;
    let tables = imputer.complete(&prepared.responders, &config.regression_attributes())?;
    let model = LogisticRegression::new(config.logistic);

    let mut fits = Vec::with_capacity(tables.len());
    for (index, table) in tables.iter().enumerate() {
        let dataset = regression_dataset(prepared, table, config)?;
        let design = dataset.design_matrix(&config.regression_terms)?;
        fits.push(model.fit(&design, &dataset.outcome()?, &config.regression_terms)?);
        on_fit(index + 1);
    }

    let pooled = pool(&fits)?;
    Ok(MultipleImputationFit { fits, pooled })
}

/// ALAAM inputs of a prepared study.
pub fn alaam_input(prepared: &PreparedStudy, config: &PipelineConfig) -> Result<AlaamInput> {
    prepared.dataset.to_alaam_input(config.contagion)
}

/// File holding the per-variable descriptive table.
pub const DESCRIPTIVES_FILE: &str = "descriptives.csv";

/// File holding the network summary.
pub const NETWORK_SUMMARY_FILE: &str = "network_summary.csv";

/// Write the ALAAM artifacts and descriptive tables into `dir`.
pub fn export(
    prepared: &PreparedStudy,
    config: &PipelineConfig,
    dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>> {
    let input = alaam_input(prepared, config)?;
    let mut paths = AlaamArtifacts::from_input(&input, &config.outcome)?.write(dir, format)?;

    let covariate_names: Vec<String> = COVARIATE_NAMES.iter().map(|s| s.to_string()).collect();
    let mut descriptives =
        describe(&prepared.responders, &config.imputed_columns(), &config.outcome)?;
    descriptives.extend(describe(
        prepared.dataset.table(),
        &covariate_names,
        &config.outcome,
    )?);
    let path = dir.join(DESCRIPTIVES_FILE);
    descriptives.export_to_file(&path, ExportFormat::Csv)?;
    paths.push(path);

    let path = dir.join(NETWORK_SUMMARY_FILE);
    summarize_network(&prepared.network)?.export_to_file(&path, ExportFormat::Csv)?;
    paths.push(path);

    info!("exported {} files to {}", paths.len(), dir.display());
    Ok(paths)
}

/// Run an ALAAM estimator and summarize its draws at the configured interval
/// level.
pub fn summarize_alaam(
    estimator: &dyn AlaamEstimator,
    input: &AlaamInput,
    config: &PipelineConfig,
) -> Result<Vec<ParameterSummary>> {
    let posterior = estimator.estimate(input, &config.alaam)?;
    if let Some(rate) = posterior.acceptance_rate() {
        info!("ALAAM acceptance rate {rate:.3}");
    }
    Ok(posterior.summarize(config.interval_level)?)
}
