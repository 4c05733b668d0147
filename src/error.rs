// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Failures while building, reading or writing a simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    #[error("field '{field}' has the wrong shape: expected {expected}")]
    InvalidShape {
        field: String,
        expected: &'static str,
    },

    #[error("field '{field}' is out of range: {reason}")]
    OutOfRange { field: String, reason: String },

    #[error("Invalid molecule configuration JSON: {0}")]
    InvalidMoleculeJson(#[source] serde_json::Error),

    #[error("failed to access '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}", path = path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while turning a simulation output file into a point cloud.
#[derive(Debug, Error)]
pub enum VisualizationError {
    #[error("failed to read '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{path}': {source}", path = path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write thumbnail '{path}': {reason}", path = path.display())]
    Thumbnail { path: PathBuf, reason: String },

    #[error("document has no 'molecules' list")]
    MissingMolecules,

    #[error("field '{field}' has the wrong shape: expected {expected}")]
    InvalidShape {
        field: String,
        expected: &'static str,
    },
}
