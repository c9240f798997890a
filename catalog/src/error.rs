//! Error types for the catalog subsystem

use thiserror::Error;

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Embedded offers inherit their target from the enclosing dataset
    #[error("policy {policy} in dataset {dataset} must not carry a target")]
    OfferHasTarget {
        /// Offending policy id
        policy: String,
        /// Enclosing dataset id
        dataset: String,
    },

    /// Datasets are only publishable with at least one usage policy
    #[error("dataset {0} has no usage policy")]
    NoPolicy(String),

    /// Dataset not found
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),
}
