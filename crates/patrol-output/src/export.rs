//! Export of the ALAAM input artifacts.
//!
//! Three artifacts describe one model run, all in network node order:
//!
//! - `adjacency`: the n×n 0/1 nomination matrix
//! - `outcome`: the binary outcome per officer
//! - `covariates`: the n×k covariate matrix with named columns
//!
//! Each is written as CSV (generic tabular form, first column `officer_id`)
//! and as JSON (native serialized form). Numbers are written in their
//! shortest round-tripping representation, so loading either form gives back
//! the exact node order and values.

use crate::error::ExportError;
use log::info;
use ndarray::Array2;
use patrol_data::{OFFICER_ID, OfficerId};
use patrol_models::AlaamInput;
use patrol_network::{Contagion, DirectedNetwork};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// An artifact that can be read back from either form.
pub trait Artifact: Exporter + DeserializeOwned {
    /// File stem, e.g. `adjacency`.
    const STEM: &'static str;

    /// Parse the CSV form.
    fn from_csv_str(content: &str) -> Result<Self, ExportError>;

    /// Parse the JSON form.
    fn from_json_str(content: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(content)?)
    }

    /// File name in a directory for the given format.
    fn path_in(dir: &Path, format: ExportFormat) -> PathBuf {
        dir.join(format!("{}.{}", Self::STEM, format.extension()))
    }

    /// Load from a file written in `format`.
    fn load(path: &Path, format: ExportFormat) -> Result<Self, ExportError> {
        let content = fs::read_to_string(path)?;
        match format {
            ExportFormat::Csv => Self::from_csv_str(&content),
            ExportFormat::Json | ExportFormat::PrettyJson => Self::from_json_str(&content),
        }
    }
}

pub(crate) fn writer_into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

pub(crate) fn serialize_records<T: Serialize>(
    records: &[T],
    format: ExportFormat,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            for record in records {
                wtr.serialize(record)?;
            }
            writer_into_string(wtr)
        }
        ExportFormat::Json => Ok(serde_json::to_string(records)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(records)?),
    }
}

fn serialize_json<T: Serialize>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

/// Write a table keyed by officer id: header `officer_id,<columns>`.
fn write_keyed_csv(
    node_ids: &[OfficerId],
    columns: &[String],
    rows: &[Vec<f64>],
) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push(OFFICER_ID.to_string());
    header.extend(columns.iter().cloned());
    wtr.write_record(&header)?;
    for (id, row) in node_ids.iter().zip(rows) {
        let mut record = Vec::with_capacity(row.len() + 1);
        record.push(id.to_string());
        record.extend(row.iter().map(f64::to_string));
        wtr.write_record(&record)?;
    }
    writer_into_string(wtr)
}

/// Table parsed from the keyed CSV form.
struct KeyedTable {
    node_ids: Vec<OfficerId>,
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

fn read_keyed_csv(content: &str) -> Result<KeyedTable, ExportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let headers = reader.headers()?.clone();
    if headers.get(0) != Some(OFFICER_ID) {
        return Err(ExportError::InvalidFormat(format!(
            "first column must be '{OFFICER_ID}'"
        )));
    }
    let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut node_ids = Vec::new();
    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let bad = |field: &str| {
            ExportError::InvalidFormat(format!("row {}: cannot parse '{field}'", line + 1))
        };
        let mut fields = record.iter();
        let id = fields.next().unwrap_or_default();
        node_ids.push(OfficerId(id.parse::<i64>().map_err(|_| bad(id))?));
        let row = fields
            .map(|field| field.parse::<f64>().map_err(|_| bad(field)))
            .collect::<Result<Vec<_>, _>>()?;
        if row.len() != columns.len() {
            return Err(ExportError::InvalidFormat(format!(
                "row {} has {} values, header has {}",
                line + 1,
                row.len(),
                columns.len()
            )));
        }
        rows.push(row);
    }
    Ok(KeyedTable {
        node_ids,
        columns,
        rows,
    })
}

fn rows_of(matrix: &Array2<f64>) -> Vec<Vec<f64>> {
    matrix.rows().into_iter().map(|row| row.to_vec()).collect()
}

fn matrix_of(rows: &[Vec<f64>], ncols: usize) -> Result<Array2<f64>, ExportError> {
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), ncols), flat)
        .map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

/// Adjacency matrix in node order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyExport {
    /// Node ids; row and column order of the matrix
    pub node_ids: Vec<OfficerId>,
    /// Rows of the matrix; `matrix[i][j] = 1` when `i` nominated `j`
    pub matrix: Vec<Vec<f64>>,
}

impl AdjacencyExport {
    /// Capture a network.
    pub fn from_network(network: &DirectedNetwork) -> Self {
        Self {
            node_ids: network.node_ids().to_vec(),
            matrix: rows_of(&network.adjacency()),
        }
    }

    /// Dense matrix.
    pub fn to_array(&self) -> Result<Array2<f64>, ExportError> {
        matrix_of(&self.matrix, self.node_ids.len())
    }

    /// Rebuild the network.
    pub fn to_network(&self) -> Result<DirectedNetwork, ExportError> {
        Ok(DirectedNetwork::from_adjacency(&self.node_ids, &self.to_array()?)?)
    }
}

impl Exporter for AdjacencyExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let columns: Vec<String> = self.node_ids.iter().map(ToString::to_string).collect();
                write_keyed_csv(&self.node_ids, &columns, &self.matrix)
            }
            _ => serialize_json(self, format),
        }
    }
}

impl Artifact for AdjacencyExport {
    const STEM: &'static str = "adjacency";

    fn from_csv_str(content: &str) -> Result<Self, ExportError> {
        let table = read_keyed_csv(content)?;
        let header_ids: Vec<String> = table.node_ids.iter().map(ToString::to_string).collect();
        if header_ids != table.columns {
            return Err(ExportError::Misaligned(
                "adjacency column ids differ from row ids".to_string(),
            ));
        }
        Ok(Self {
            node_ids: table.node_ids,
            matrix: table.rows,
        })
    }
}

/// Outcome vector in node order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeExport {
    /// Node ids
    pub node_ids: Vec<OfficerId>,
    /// Outcome column name
    pub name: String,
    /// Outcome per node
    pub values: Vec<f64>,
}

impl Exporter for OutcomeExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let rows: Vec<Vec<f64>> = self.values.iter().map(|v| vec![*v]).collect();
                write_keyed_csv(&self.node_ids, std::slice::from_ref(&self.name), &rows)
            }
            _ => serialize_json(self, format),
        }
    }
}

impl Artifact for OutcomeExport {
    const STEM: &'static str = "outcome";

    fn from_csv_str(content: &str) -> Result<Self, ExportError> {
        let table = read_keyed_csv(content)?;
        let [name] = <[String; 1]>::try_from(table.columns).map_err(|columns| {
            ExportError::InvalidFormat(format!("outcome needs one column, got {}", columns.len()))
        })?;
        Ok(Self {
            node_ids: table.node_ids,
            name,
            values: table.rows.into_iter().map(|row| row[0]).collect(),
        })
    }
}

/// Covariate matrix in node order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovariateExport {
    /// Node ids
    pub node_ids: Vec<OfficerId>,
    /// Column names
    pub names: Vec<String>,
    /// One row per node
    pub rows: Vec<Vec<f64>>,
}

impl CovariateExport {
    /// Dense matrix.
    pub fn to_array(&self) -> Result<Array2<f64>, ExportError> {
        matrix_of(&self.rows, self.names.len())
    }
}

impl Exporter for CovariateExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => write_keyed_csv(&self.node_ids, &self.names, &self.rows),
            _ => serialize_json(self, format),
        }
    }
}

impl Artifact for CovariateExport {
    const STEM: &'static str = "covariates";

    fn from_csv_str(content: &str) -> Result<Self, ExportError> {
        let table = read_keyed_csv(content)?;
        Ok(Self {
            node_ids: table.node_ids,
            names: table.columns,
            rows: table.rows,
        })
    }
}

/// The three artifacts of one ALAAM run.
#[derive(Debug, Clone, PartialEq)]
pub struct AlaamArtifacts {
    /// Adjacency matrix
    pub adjacency: AdjacencyExport,
    /// Outcome vector
    pub outcome: OutcomeExport,
    /// Covariate matrix
    pub covariates: CovariateExport,
}

impl AlaamArtifacts {
    /// Capture a validated model input.
    pub fn from_input(input: &AlaamInput, outcome_name: &str) -> Result<Self, ExportError> {
        input.validate()?;
        Ok(Self {
            adjacency: AdjacencyExport {
                node_ids: input.node_ids.clone(),
                matrix: rows_of(&input.adjacency),
            },
            outcome: OutcomeExport {
                node_ids: input.node_ids.clone(),
                name: outcome_name.to_string(),
                values: input.outcome.clone(),
            },
            covariates: CovariateExport {
                node_ids: input.node_ids.clone(),
                names: input.covariate_names.clone(),
                rows: rows_of(&input.covariates),
            },
        })
    }

    /// Write the artifacts into `dir`, returning the written paths.
    pub fn write(&self, dir: &Path, format: ExportFormat) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(dir)?;
        let paths = vec![
            AdjacencyExport::path_in(dir, format),
            OutcomeExport::path_in(dir, format),
            CovariateExport::path_in(dir, format),
        ];
        self.adjacency.export_to_file(&paths[0], format)?;
        self.outcome.export_to_file(&paths[1], format)?;
        self.covariates.export_to_file(&paths[2], format)?;
        info!(
            "wrote {} artifacts for {} nodes to {}",
            format.extension(),
            self.adjacency.node_ids.len(),
            dir.display()
        );
        Ok(paths)
    }

    /// Load artifacts from `dir`, checking that all three share one node order.
    pub fn load(dir: &Path, format: ExportFormat) -> Result<Self, ExportError> {
        let artifacts = Self {
            adjacency: AdjacencyExport::load(&AdjacencyExport::path_in(dir, format), format)?,
            outcome: OutcomeExport::load(&OutcomeExport::path_in(dir, format), format)?,
            covariates: CovariateExport::load(&CovariateExport::path_in(dir, format), format)?,
        };
        if artifacts.outcome.node_ids != artifacts.adjacency.node_ids {
            return Err(ExportError::Misaligned(
                "outcome node order differs from adjacency".to_string(),
            ));
        }
        if artifacts.covariates.node_ids != artifacts.adjacency.node_ids {
            return Err(ExportError::Misaligned(
                "covariate node order differs from adjacency".to_string(),
            ));
        }
        Ok(artifacts)
    }

    /// Rebuild the model input.
    pub fn to_input(&self, directed: bool, contagion: Contagion) -> Result<AlaamInput, ExportError> {
        let input = AlaamInput {
            node_ids: self.adjacency.node_ids.clone(),
            outcome: self.outcome.values.clone(),
            adjacency: self.adjacency.to_array()?,
            covariates: self.covariates.to_array()?,
            covariate_names: self.covariates.names.clone(),
            directed,
            contagion,
        };
        input.validate()?;
        Ok(input)
    }
}
