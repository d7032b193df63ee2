//! Pipeline configuration.

use crate::error::{PipelineError, Result};
use patrol_data::SlotGroup;
use patrol_models::{AlaamSettings, INTERCEPT, LogisticConfig, alaam::input::CONTAGION};
use patrol_network::{COVARIATE_NAMES, Contagion};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which nomination relationship forms the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    /// Mentor nominations only
    Mentor,
    /// Friend nominations only
    Friend,
    /// Mentor and friend nominations together
    #[default]
    Combined,
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mentor => f.write_str("mentor"),
            Self::Friend => f.write_str("friend"),
            Self::Combined => f.write_str("combined"),
        }
    }
}

impl FromStr for NetworkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mentor" => Ok(Self::Mentor),
            "friend" => Ok(Self::Friend),
            "combined" => Ok(Self::Combined),
            other => Err(format!(
                "unknown network '{other}', expected mentor, friend or combined"
            )),
        }
    }
}

/// Settings of a pipeline run.
///
/// Every field has a default, so a JSON file only needs to list what differs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Binary outcome column (default: `invited`)
    pub outcome: String,
    /// Attribute columns read from the surveys
    pub attribute_columns: Vec<String>,
    /// Rank column the supervisor flag is derived from
    pub rank_column: String,
    /// Lowest rank counted as supervisor
    pub supervisor_min_rank: f64,
    /// Name of the supervisor flag column
    pub supervisor_column: String,
    /// Attitude items averaged into the scale score
    pub attitude_items: Vec<String>,
    /// Name of the scale score column
    pub attitude_column: String,
    /// Mentor nomination slots
    pub mentor_slots: SlotGroup,
    /// Friend nomination slots
    pub friend_slots: SlotGroup,
    /// Slot codes meaning "no nomination"
    pub nomination_sentinels: Vec<i64>,
    /// Attribute codes meaning "missing"
    pub attribute_sentinels: Vec<i64>,
    /// Relationship forming the network
    pub network: NetworkKind,
    /// Attributes entering the ALAAM after the network covariates
    pub alaam_attributes: Vec<String>,
    /// Contagion term of the ALAAM
    pub contagion: Contagion,
    /// Sampler settings handed to the ALAAM estimator
    pub alaam: AlaamSettings,
    /// Predictors of the logistic regression
    pub regression_terms: Vec<String>,
    /// IRLS settings
    pub logistic: LogisticConfig,
    /// Completed datasets for multiple imputation
    pub imputations: usize,
    /// Seed of the imputation draws
    pub seed: u64,
    /// Level of confidence and credible intervals
    pub interval_level: f64,
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            outcome: "invited".to_string(),
            attribute_columns: strings(&["gender", "race", "ethnicity", "rank", "years_service"]),
            rank_column: "rank".to_string(),
            supervisor_min_rank: 2.0,
            supervisor_column: "supervisor".to_string(),
            attitude_items: strings(&["attitude_1", "attitude_2", "attitude_3", "attitude_4"]),
            attitude_column: "attitude_score".to_string(),
            mentor_slots: SlotGroup::new("mentor", 3),
            friend_slots: SlotGroup::new("friend", 10),
            nomination_sentinels: vec![0, -9, -99],
            attribute_sentinels: vec![-9, -99],
            network: NetworkKind::Combined,
            alaam_attributes: strings(&[
                "gender",
                "supervisor",
                "years_service",
                "attitude_score",
                "weapon_draws",
                "force_incidents",
                "misconduct_reports",
            ]),
            contagion: Contagion::Simple,
            alaam: AlaamSettings::default(),
            regression_terms: strings(&[
                "out_degree",
                "in_degree",
                "reciprocity",
                "gender",
                "supervisor",
                "years_service",
                "attitude_score",
                "force_incidents",
            ]),
            logistic: LogisticConfig::default(),
            imputations: 20,
            seed: 2024,
            interval_level: 0.95,
        }
    }
}

impl PipelineConfig {
    /// Read a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Slot groups of the configured network.
    pub fn slot_groups(&self) -> Vec<SlotGroup> {
        match self.network {
            NetworkKind::Mentor => vec![self.mentor_slots.clone()],
            NetworkKind::Friend => vec![self.friend_slots.clone()],
            NetworkKind::Combined => vec![self.mentor_slots.clone(), self.friend_slots.clone()],
        }
    }

    /// Survey columns recoded and merged across waves: the outcome, the
    /// attributes and the attitude items.
    pub fn survey_columns(&self) -> Vec<String> {
        let mut columns = vec![self.outcome.clone()];
        for column in self.attribute_columns.iter().chain(&self.attitude_items) {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        columns
    }

    /// Attribute columns filled by imputation: everything the models read
    /// from the officer table except the outcome.
    pub fn imputed_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for column in self
            .alaam_attributes
            .iter()
            .chain(&self.regression_terms)
            .filter(|c| !is_network_term(c))
        {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
        columns
    }

    /// Regression terms read from the officer table.
    pub fn regression_attributes(&self) -> Vec<String> {
        self.regression_terms
            .iter()
            .filter(|term| !is_network_term(term))
            .cloned()
            .collect()
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.regression_terms.is_empty() {
            return Err(PipelineError::Config("no regression terms".to_string()));
        }
        if self.imputations < 2 {
            return Err(PipelineError::Config(format!(
                "need at least 2 imputations, got {}",
                self.imputations
            )));
        }
        if !(self.interval_level > 0.0 && self.interval_level < 1.0) {
            return Err(PipelineError::Config(format!(
                "interval level must be in (0, 1), got {}",
                self.interval_level
            )));
        }
        if let Some(name) = self
            .alaam_attributes
            .iter()
            .find(|name| is_network_term(name) || name.as_str() == INTERCEPT)
        {
            return Err(PipelineError::Config(format!(
                "ALAAM attribute '{name}' clashes with a model term"
            )));
        }
        if self.regression_terms.iter().any(|term| term == INTERCEPT) {
            return Err(PipelineError::Config(
                "the intercept is always included; remove it from the regression terms".to_string(),
            ));
        }
        self.alaam.validate()?;
        Ok(())
    }
}

/// Whether a term is computed from the network rather than read from the
/// officer table.
pub fn is_network_term(term: &str) -> bool {
    term == CONTAGION || COVARIATE_NAMES.contains(&term)
}
