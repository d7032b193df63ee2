//! Covariate Registry
//!
//! Central registry of the network covariates. Allows lookup by name and
//! grouping by category for listings and documentation.

use crate::covariates::COVARIATE_NAMES;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Covariate categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CovariateCategory {
    /// Degree counts (in, out)
    Degree,
    /// Mutual ties
    Reciprocity,
    /// Star configurations (two-, three- and mixed stars)
    Star,
    /// Closed configurations (triangles)
    Closure,
}

impl fmt::Display for CovariateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Degree => "degree",
            Self::Reciprocity => "reciprocity",
            Self::Star => "star",
            Self::Closure => "closure",
        };
        f.write_str(name)
    }
}

/// Covariate metadata
#[derive(Debug, Clone, Serialize)]
pub struct CovariateInfo {
    /// Covariate name, also its column name
    pub name: &'static str,
    /// Covariate category
    pub category: CovariateCategory,
    /// Column position in the covariate matrix
    pub position: usize,
    /// What the covariate counts
    pub description: &'static str,
}

/// All covariates, in matrix column order
pub fn available_covariates() -> Vec<CovariateInfo> {
    let entries = [
        (CovariateCategory::Degree, "Number of colleagues the officer nominated"),
        (CovariateCategory::Degree, "Number of colleagues nominating the officer"),
        (CovariateCategory::Reciprocity, "Number of mutual nominations"),
        (CovariateCategory::Star, "Pairs of colleagues both nominating the officer"),
        (CovariateCategory::Star, "Pairs of colleagues both nominated by the officer"),
        (CovariateCategory::Star, "Triples of colleagues all nominating the officer"),
        (CovariateCategory::Star, "Triples of colleagues all nominated by the officer"),
        (CovariateCategory::Star, "Two-paths through the officer, excluding mutual returns"),
        (CovariateCategory::Closure, "Transitive triads in which the officer is the source"),
    ];
    COVARIATE_NAMES
        .iter()
        .zip(entries)
        .enumerate()
        .map(|(position, (&name, (category, description)))| CovariateInfo {
            name,
            category,
            position,
            description,
        })
        .collect()
}

/// Covariates of one category
pub fn covariates_by_category(category: CovariateCategory) -> Vec<CovariateInfo> {
    available_covariates()
        .into_iter()
        .filter(|c| c.category == category)
        .collect()
}

/// Covariate info by name
pub fn get_covariate_info(name: &str) -> Option<CovariateInfo> {
    available_covariates().into_iter().find(|c| c.name == name)
}

/// Count covariates by category
pub fn count_by_category() -> HashMap<CovariateCategory, usize> {
    let mut counts = HashMap::new();
    for covariate in available_covariates() {
        *counts.entry(covariate.category).or_insert(0) += 1;
    }
    counts
}
