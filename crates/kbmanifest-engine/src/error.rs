//! Engine error types

use kbmanifest_core::CoreError;
use thiserror::Error;

/// Main engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to load kind table {path}: {source}")]
    Table { path: String, source: CoreError },

    #[error("Unknown data source '{name}'")]
    UnknownDataSource {
        name: String,
        suggestion: Option<String>,
    },

    #[error("'{name}' matches several data sources: {}", candidates.join(", "))]
    AmbiguousDataSource {
        name: String,
        candidates: Vec<String>,
    },

    #[error("Unable to marshal model: {0}")]
    Marshal(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Help text to show next to the error, if any
    pub fn help(&self) -> Option<String> {
        match self {
            EngineError::UnknownDataSource { suggestion, .. } => suggestion.clone(),
            EngineError::AmbiguousDataSource { .. } => {
                Some("Use the full data source name or group/version/Kind".to_string())
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
