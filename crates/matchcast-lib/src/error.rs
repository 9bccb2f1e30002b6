//! Error taxonomy for the outcome model core

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the model lifecycle
///
/// Input-validation variants are raised before any state mutation, so a
/// failed call never leaves a partially fitted model behind.
#[derive(Debug, Error)]
pub enum ModelError {
    /// No training or input rows were supplied
    #[error("input contains no rows")]
    EmptyInput,

    /// Training rows and labels have different lengths
    #[error("rows/labels length mismatch: {rows} rows vs {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    /// Feature arity does not match the arity the model was fitted with
    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A predict operation was called before a successful fit
    #[error("model has not been fitted")]
    NotFitted,

    /// A durable read or write failed
    #[error("persistence failure at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A state blob could not be encoded or decoded
    #[error("state serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }
}
