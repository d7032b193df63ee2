#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod dataset;
pub mod error;
pub mod pipeline;

// Re-export main types from sub-crates
pub use patrol_data as data;
pub use patrol_models as models;
pub use patrol_network as network;
pub use patrol_output as output;

pub use config::{NetworkKind, PipelineConfig, is_network_term};
pub use dataset::ModelDataset;
pub use error::{PipelineError, Result};
pub use pipeline::{
    DESCRIPTIVES_FILE, MultipleImputationFit, NETWORK_SUMMARY_FILE, PipelineInputs,
    PreparedStudy, alaam_input, build_network, clean_records, export, fit_complete_case,
    fit_multiply_imputed, fit_multiply_imputed_with_progress, nominations, prepare,
    summarize_alaam,
};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
