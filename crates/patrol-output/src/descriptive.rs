//! Descriptive tables.
//!
//! Flat tables for the study write-up: per-variable summaries split by
//! outcome group, a one-row network summary, and coefficient tables for the
//! logistic, pooled and ALAAM results.

use crate::error::ExportError;
use crate::export::{ExportFormat, Exporter, serialize_records};
use patrol_data::frame::float_column;
use patrol_models::{LogisticFit, ParameterSummary, PooledFit};
use patrol_network::{DirectedNetwork, derive_covariates, triangle_participation};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Outcome group of a summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeGroup {
    /// Every row
    All,
    /// Rows with outcome 1
    Invited,
    /// Rows with outcome 0
    NotInvited,
}

impl OutcomeGroup {
    fn admits(&self, outcome: Option<f64>) -> bool {
        match self {
            Self::All => true,
            Self::Invited => matches!(outcome, Some(v) if v == 1.0),
            Self::NotInvited => matches!(outcome, Some(v) if v == 0.0),
        }
    }
}

/// Summary statistics of one variable within one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSummary {
    /// Variable name
    pub variable: String,
    /// Outcome group
    pub group: OutcomeGroup,
    /// Observed values
    pub n: usize,
    /// Missing values
    pub missing: usize,
    /// Mean of observed values
    pub mean: f64,
    /// Sample standard deviation
    pub sd: f64,
    /// Smallest observed value
    pub min: f64,
    /// Largest observed value
    pub max: f64,
}

impl VariableSummary {
    fn from_values(variable: &str, group: OutcomeGroup, values: &[Option<f64>]) -> Self {
        let observed: Vec<f64> = values.iter().flatten().copied().collect();
        let n = observed.len();
        let mean = observed.iter().sum::<f64>() / n as f64;
        let sd = if n > 1 {
            (observed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            f64::NAN
        };
        Self {
            variable: variable.to_string(),
            group,
            n,
            missing: values.len() - n,
            mean,
            sd,
            min: observed.iter().copied().fold(f64::NAN, f64::min),
            max: observed.iter().copied().fold(f64::NAN, f64::max),
        }
    }
}

/// Summarize `variables` overall and within each outcome group.
///
/// Rows with a missing outcome only count towards the `all` group. Statistics
/// of an empty group are NaN.
pub fn describe(
    df: &DataFrame,
    variables: &[String],
    outcome: &str,
) -> Result<Vec<VariableSummary>, ExportError> {
    let outcomes = float_column(df, outcome, "descriptive table")?;
    let groups = [OutcomeGroup::All, OutcomeGroup::Invited, OutcomeGroup::NotInvited];

    let mut rows = Vec::with_capacity(variables.len() * groups.len());
    for variable in variables {
        let values = float_column(df, variable, "descriptive table")?;
        for group in groups {
            let selected: Vec<Option<f64>> = values
                .iter()
                .zip(&outcomes)
                .filter(|(_, y)| group.admits(**y))
                .map(|(v, _)| *v)
                .collect();
            rows.push(VariableSummary::from_values(variable, group, &selected));
        }
    }
    Ok(rows)
}

/// Whole-network statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSummary {
    /// Nodes, isolates included
    pub nodes: usize,
    /// Directed edges
    pub edges: usize,
    /// `edges / (nodes · (nodes − 1))`
    pub density: f64,
    /// Nodes with no ties
    pub isolates: usize,
    /// Reciprocated dyads
    pub mutual_dyads: usize,
    /// Share of edges that are reciprocated
    pub reciprocity: f64,
    /// Transitive triads `i→j, j→k, i→k`
    pub transitive_triads: usize,
    /// Triangles of the symmetrised graph
    pub triangles: usize,
}

/// Summarize a network.
pub fn summarize_network(network: &DirectedNetwork) -> Result<NetworkSummary, ExportError> {
    let nodes = network.node_count();
    let edges = network.edge_count();
    let mutual_dyads = network.mutual_dyads();
    let adjacency = network.adjacency();
    let covariates = derive_covariates(&adjacency)?;
    let transitive = covariates
        .column("triangles")
        .map_or(0.0, |column| column.sum());
    let participation = triangle_participation(&adjacency)?.sum();

    Ok(NetworkSummary {
        nodes,
        edges,
        density: if nodes > 1 {
            edges as f64 / (nodes * (nodes - 1)) as f64
        } else {
            0.0
        },
        isolates: network.isolates().len(),
        mutual_dyads,
        reciprocity: if edges > 0 {
            2.0 * mutual_dyads as f64 / edges as f64
        } else {
            0.0
        },
        transitive_triads: transitive.round() as usize,
        triangles: (participation / 3.0).round() as usize,
    })
}

impl Exporter for NetworkSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => serialize_records(std::slice::from_ref(self), format),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for Vec<VariableSummary> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        serialize_records(self, format)
    }
}

/// One row of a coefficient table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRow {
    /// Model label, e.g. `complete_case`
    pub model: String,
    /// Term name
    pub term: String,
    /// Coefficient on the log-odds scale
    pub estimate: f64,
    /// Standard error, or posterior sd
    pub standard_error: f64,
    /// Test statistic; absent for posterior summaries
    pub statistic: Option<f64>,
    /// Two-sided p-value; absent for posterior summaries
    pub p_value: Option<f64>,
    /// Lower interval bound
    pub lower: f64,
    /// Upper interval bound
    pub upper: f64,
    /// `exp(estimate)`
    pub odds_ratio: f64,
    /// Effective sample size of the draws
    pub ess: Option<f64>,
}

/// Coefficient table of a single logistic fit with Wald intervals at `level`.
pub fn logistic_table(model: &str, fit: &LogisticFit, level: f64) -> Vec<CoefficientRow> {
    let intervals = fit.confidence_intervals(level);
    fit.terms
        .iter()
        .enumerate()
        .map(|(idx, term)| CoefficientRow {
            model: model.to_string(),
            term: term.clone(),
            estimate: fit.coefficients[idx],
            standard_error: fit.standard_errors[idx],
            statistic: Some(fit.z_values[idx]),
            p_value: Some(fit.p_values[idx]),
            lower: intervals[idx].0,
            upper: intervals[idx].1,
            odds_ratio: fit.coefficients[idx].exp(),
            ess: None,
        })
        .collect()
}

/// Coefficient table of a pooled fit with t(ν) intervals at `level`.
pub fn pooled_table(model: &str, fit: &PooledFit, level: f64) -> Vec<CoefficientRow> {
    fit.estimates
        .iter()
        .map(|estimate| {
            let (lower, upper) = estimate.confidence_interval(level);
            CoefficientRow {
                model: model.to_string(),
                term: estimate.term.clone(),
                estimate: estimate.estimate,
                standard_error: estimate.standard_error,
                statistic: Some(estimate.t_value),
                p_value: Some(estimate.p_value),
                lower,
                upper,
                odds_ratio: estimate.estimate.exp(),
                ess: None,
            }
        })
        .collect()
}

/// Coefficient table of posterior summaries.
pub fn posterior_table(model: &str, summaries: &[ParameterSummary]) -> Vec<CoefficientRow> {
    summaries
        .iter()
        .map(|summary| CoefficientRow {
            model: model.to_string(),
            term: summary.parameter.clone(),
            estimate: summary.mean,
            standard_error: summary.sd,
            statistic: None,
            p_value: None,
            lower: summary.lower,
            upper: summary.upper,
            odds_ratio: summary.mean.exp(),
            ess: Some(summary.ess),
        })
        .collect()
}

impl Exporter for Vec<CoefficientRow> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        serialize_records(self, format)
    }
}
