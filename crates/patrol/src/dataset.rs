//! Model-ready dataset.
//!
//! Network covariates and officer attributes are combined by joining on
//! `officer_id`, never by row position. After the join the id column is
//! compared with the network's node order, so every row of the table, every
//! row of the adjacency matrix and every entry of the outcome refer to the
//! same officer.

use crate::error::{PipelineError, Result};
use log::debug;
use ndarray::Array2;
use patrol_data::frame::{float_column, require_column};
use patrol_data::officer::officer_ids;
use patrol_data::{OFFICER_ID, OfficerId};
use patrol_models::AlaamInput;
use patrol_models::alaam::input::CONTAGION;
use patrol_network::{
    COVARIATE_NAMES, Contagion, DirectedNetwork, NetworkCovariates, contagion_exposure,
};
use polars::prelude::*;

/// Covariates and attributes aligned with a network.
#[derive(Debug, Clone)]
pub struct ModelDataset {
    node_ids: Vec<OfficerId>,
    adjacency: Array2<f64>,
    table: DataFrame,
    outcome_column: String,
    attribute_columns: Vec<String>,
}

impl ModelDataset {
    /// Join covariates and attributes on `officer_id` and check the result
    /// lines up with the network.
    ///
    /// Every network node must have an attribute row with an observed
    /// outcome. Attribute rows for officers outside the network are dropped.
    pub fn assemble(
        network: &DirectedNetwork,
        covariates: &NetworkCovariates,
        attributes: &DataFrame,
        outcome_column: &str,
        attribute_columns: &[String],
    ) -> Result<Self> {
        let node_ids = network.node_ids().to_vec();
        let covariate_frame = covariates.to_frame(&node_ids)?;

        require_column(attributes, outcome_column, "attributes")?;
        for column in attribute_columns {
            require_column(attributes, column, "attributes")?;
        }
        let mut selection = vec![
            col(OFFICER_ID).cast(DataType::Int64),
            col(outcome_column).cast(DataType::Float64),
        ];
        selection.extend(
            attribute_columns
                .iter()
                .map(|c| col(c.as_str()).cast(DataType::Float64)),
        );

        let table = covariate_frame
            .lazy()
            .join(
                attributes.clone().lazy().select(selection),
                [col(OFFICER_ID)],
                [col(OFFICER_ID)],
                JoinArgs::new(JoinType::Left),
            )
            .sort([OFFICER_ID], SortMultipleOptions::default())
            .collect()?;

        let joined_ids = officer_ids(&table, "model dataset")?;
        if let Some(position) = joined_ids
            .iter()
            .zip(&node_ids)
            .position(|(table_id, node_id)| table_id != node_id)
        {
            return Err(PipelineError::Misaligned {
                position,
                network: node_ids[position],
                table: joined_ids[position],
            });
        }
        if joined_ids.len() != node_ids.len() {
            return Err(PipelineError::Config(format!(
                "joined table has {} rows for {} nodes; attribute ids must be unique",
                joined_ids.len(),
                node_ids.len()
            )));
        }

        let outcome = float_column(&table, outcome_column, "model dataset")?;
        if let Some(position) = outcome.iter().position(Option::is_none) {
            return Err(PipelineError::MissingRecord(node_ids[position]));
        }
        debug!(
            "assembled model dataset: {} nodes, {} attribute columns",
            node_ids.len(),
            attribute_columns.len()
        );

        Ok(Self {
            node_ids,
            adjacency: network.adjacency(),
            table,
            outcome_column: outcome_column.to_string(),
            attribute_columns: attribute_columns.to_vec(),
        })
    }

    /// Node ids; the row order of everything else.
    pub fn node_ids(&self) -> &[OfficerId] {
        &self.node_ids
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.node_ids.len()
    }

    /// Whether the network has no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_ids.is_empty()
    }

    /// Adjacency matrix in node order.
    pub fn adjacency(&self) -> &Array2<f64> {
        &self.adjacency
    }

    /// Joined table: `officer_id`, the nine covariates, the outcome and the
    /// attributes, sorted by officer id.
    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    /// Outcome column name.
    pub fn outcome_column(&self) -> &str {
        &self.outcome_column
    }

    /// Attribute columns carried next to the covariates.
    pub fn attribute_columns(&self) -> &[String] {
        &self.attribute_columns
    }

    /// Outcome in node order.
    pub fn outcome(&self) -> Result<Vec<f64>> {
        let values = float_column(&self.table, &self.outcome_column, "model dataset")?;
        values
            .into_iter()
            .zip(&self.node_ids)
            .map(|(value, &officer)| {
                value.ok_or_else(|| PipelineError::MissingValue {
                    column: self.outcome_column.clone(),
                    officer,
                })
            })
            .collect()
    }

    /// Values of one term, in node order.
    ///
    /// `contagion` is the number of nominated colleagues with outcome 1.
    fn term_values(&self, term: &str) -> Result<Vec<Option<f64>>> {
        if term == CONTAGION {
            let exposure = contagion_exposure(&self.adjacency, &self.outcome()?)?;
            return Ok(exposure.into_iter().map(Some).collect());
        }
        Ok(float_column(&self.table, term, "model dataset")?)
    }

    /// Design matrix of `terms`, one column per term.
    ///
    /// Fails on the first missing value.
    pub fn design_matrix(&self, terms: &[String]) -> Result<Array2<f64>> {
        let mut matrix = Array2::<f64>::zeros((self.len(), terms.len()));
        for (j, term) in terms.iter().enumerate() {
            for (i, value) in self.term_values(term)?.into_iter().enumerate() {
                matrix[[i, j]] = value.ok_or_else(|| PipelineError::MissingValue {
                    column: term.clone(),
                    officer: self.node_ids[i],
                })?;
            }
        }
        Ok(matrix)
    }

    /// Design matrix and outcome over the officers with every term observed.
    pub fn complete_cases(&self, terms: &[String]) -> Result<(Array2<f64>, Vec<f64>)> {
        let columns = terms
            .iter()
            .map(|term| self.term_values(term))
            .collect::<Result<Vec<_>>>()?;
        let outcome = self.outcome()?;
        let rows: Vec<usize> = (0..self.len())
            .filter(|&i| columns.iter().all(|c| c[i].is_some()))
            .collect();
        if rows.is_empty() {
            return Err(PipelineError::NoCompleteCases);
        }
        debug!(
            "complete cases: {} of {} officers",
            rows.len(),
            self.len()
        );

        let design = Array2::from_shape_fn((rows.len(), terms.len()), |(r, j)| {
            columns[j][rows[r]].unwrap_or(f64::NAN)
        });
        let outcome = rows.iter().map(|&i| outcome[i]).collect();
        Ok((design, outcome))
    }

    /// Inputs for the ALAAM estimator: all nine network covariates followed
    /// by the attribute columns.
    ///
    /// Attributes must be complete; mode-impute them first.
    pub fn to_alaam_input(&self, contagion: Contagion) -> Result<AlaamInput> {
        let mut names: Vec<String> = COVARIATE_NAMES.iter().map(|s| s.to_string()).collect();
        names.extend(self.attribute_columns.iter().cloned());
        let input = AlaamInput {
            node_ids: self.node_ids.clone(),
            outcome: self.outcome()?,
            adjacency: self.adjacency.clone(),
            covariates: self.design_matrix(&names)?,
            covariate_names: names,
            directed: true,
            contagion,
        };
        input.validate()?;
        Ok(input)
    }
}
