//! Error types for the eval question analyzer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// Errors that can occur in the analyzer.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// All candidate encodings failed for a dataset file.
    #[error("Could not decode file '{0}' with any supported encoding")]
    Decode(PathBuf),

    /// A source key outside the closed registry set.
    #[error("Invalid source key '{key}'. Valid options are: {valid:?}")]
    UnknownSource {
        key: String,
        valid: Vec<&'static str>,
    },

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Table or field name that is not a valid identifier.
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// Record store error.
    #[error("Record store error: {0}")]
    Storage(String),

    /// Classifier API error (transport or non-success response).
    #[error("Classifier API error: {0}")]
    ClassifierApi(String),

    /// Classifier response failed schema validation.
    #[error("Failed to parse classifier response: {0}")]
    ClassifierParse(String),
}

impl AnalyzerError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<reqwest::Error> for AnalyzerError {
    fn from(err: reqwest::Error) -> Self {
        AnalyzerError::ClassifierApi(err.to_string())
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(err: serde_json::Error) -> Self {
        AnalyzerError::Serialization(err.to_string())
    }
}
