#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod descriptive;
pub mod error;
pub mod export;
pub mod report;

pub use descriptive::{
    CoefficientRow, NetworkSummary, OutcomeGroup, VariableSummary, describe, logistic_table,
    posterior_table, pooled_table, summarize_network,
};
pub use error::ExportError;
pub use export::{
    AdjacencyExport, AlaamArtifacts, Artifact, CovariateExport, ExportFormat, Exporter,
    OutcomeExport,
};
pub use report::{ReportError, RunReport, RunReportBuilder};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
