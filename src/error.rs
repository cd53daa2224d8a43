//! Error types for the evaluation pipeline
//!
//! Canonicalization itself never fails; these cover everything around it:
//! reading and writing datasets, configuration, and scoring.

use recipe_domain::DatasetError;
use thiserror::Error;

use crate::config::ConfigError;

/// Main error type for the pipeline stages
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Dataset validation failed: {0}")]
    Dataset(#[from] DatasetError),

    #[error(
        "Duplicate prediction for images [{images}]: existing title \"{existing_title}\", duplicate title \"{duplicate_title}\""
    )]
    DuplicatePrediction {
        images: String,
        existing_title: String,
        duplicate_title: String,
    },
}

pub type Result<T> = std::result::Result<T, EvalError>;
