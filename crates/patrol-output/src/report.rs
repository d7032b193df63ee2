//! Run reports.

use crate::descriptive::NetworkSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The report lacks a required field.
    #[error("Missing report field: {0}")]
    MissingField(&'static str),
}

/// Record of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Stage or command that produced the report.
    pub stage: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Nodes in the network.
    pub nodes: usize,

    /// Directed edges in the network.
    pub edges: usize,

    /// Files written by the run.
    pub artifacts: Vec<PathBuf>,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl RunReport {
    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for run reports.
#[derive(Debug, Default)]
pub struct RunReportBuilder {
    stage: Option<String>,
    nodes: usize,
    edges: usize,
    artifacts: Vec<PathBuf>,
    contents: Option<serde_json::Value>,
}

impl RunReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stage name.
    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    /// Take node and edge counts from a network summary.
    pub const fn network(mut self, summary: &NetworkSummary) -> Self {
        self.nodes = summary.nodes;
        self.edges = summary.edges;
        self
    }

    /// Add written files.
    pub fn artifacts(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.artifacts.extend(paths);
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Build the report.
    pub fn build(self) -> Result<RunReport, ReportError> {
        Ok(RunReport {
            stage: self.stage.ok_or(ReportError::MissingField("stage"))?,
            timestamp: Utc::now(),
            nodes: self.nodes,
            edges: self.edges,
            artifacts: self.artifacts,
            contents: self.contents.unwrap_or(serde_json::Value::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> NetworkSummary {
        NetworkSummary {
            nodes: 12,
            edges: 30,
            density: 30.0 / 132.0,
            isolates: 2,
            mutual_dyads: 4,
            reciprocity: 8.0 / 30.0,
            transitive_triads: 6,
            triangles: 2,
        }
    }

    #[test]
    fn test_report_builder() {
        let report = RunReportBuilder::new()
            .stage("prepare")
            .network(&summary())
            .artifacts([PathBuf::from("out/adjacency.csv")])
            .contents(serde_json::json!({"isolates": 2}))
            .build()
            .unwrap();

        assert_eq!(report.stage, "prepare");
        assert_eq!((report.nodes, report.edges), (12, 30));
        assert_eq!(report.artifacts.len(), 1);
        assert!(report.to_json().unwrap().contains("\"isolates\": 2"));
    }

    #[test]
    fn test_stage_required() {
        assert!(matches!(
            RunReportBuilder::new().build(),
            Err(ReportError::MissingField("stage"))
        ));
    }

    #[test]
    fn test_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        RunReportBuilder::new()
            .stage("regress")
            .build()
            .unwrap()
            .write(&path)
            .unwrap();
        let parsed: RunReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.stage, "regress");
    }
}
