//! Error types for drift-semantic
//!
//! Provides unified error handling across the similarity pipeline.

use thiserror::Error;

/// Main error type for drift-semantic operations
#[derive(Debug, Error)]
pub enum DriftError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An upstream artifact required by a stage is missing
    #[error("Artifact '{artifact}' not found at {path}. Run the '{producing_stage}' stage first.")]
    MissingArtifact {
        artifact: String,
        path: String,
        producing_stage: String,
    },

    /// An artifact exists but failed to parse as JSON
    #[error("Malformed artifact at {path}: {source}")]
    MalformedArtifact {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// code-units.json was neither a bare array nor `{"units": [...]}`
    #[error("code-units.json must be a JSON array or an object with a 'units' key")]
    InvalidCodeUnits,

    /// An ingested file (purpose-statements.json, findings.json) failed validation
    #[error("Validation errors in {file}:\n{}", .errors.join("\n"))]
    Validation { file: String, errors: Vec<String> },

    /// Failed to connect to the embedding endpoint
    #[error("Cannot connect to embedding endpoint at {url}: {source}")]
    EmbeddingEndpointUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Generic pipeline error
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// Result type alias for drift-semantic operations
pub type Result<T> = std::result::Result<T, DriftError>;
