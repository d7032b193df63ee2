//! Missing-data handling for officer attributes.
//!
//! Two policies are provided:
//!
//! - [`mode`]/[`impute_mode`]: a one-time, non-iterative fill with the column
//!   mode, used before covariates are assembled for the ALAAM export.
//! - [`HotDeckImputer`]: multiple imputation producing several completed
//!   tables, used for the logistic-regression robustness check where the
//!   per-table fits are pooled afterwards.

pub mod hot_deck;
pub mod mode;

pub use hot_deck::HotDeckImputer;
pub use mode::{fill_mode, impute_mode, mode};
