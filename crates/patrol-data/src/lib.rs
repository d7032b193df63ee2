#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frame;
pub mod impute;
pub mod incidents;
pub mod nominations;
pub mod officer;
pub mod survey;

pub use error::{DataError, Result};
pub use impute::{HotDeckImputer, fill_mode, impute_mode, mode};
pub use incidents::{IncidentKind, attach_incident_counts, count_incidents};
pub use nominations::{NominationRow, NominationTable, SlotGroup};
pub use officer::{OFFICER_ID, OfficerId};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
