//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use kbmanifest_core::CoreError;
use kbmanifest_engine::EngineError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Configuration failed validation
    #[error("Validation failed: {message}")]
    #[diagnostic(code(kbmanifest::cli::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Manifest rendering failed
    #[error("Render error: {message}")]
    #[diagnostic(code(kbmanifest::cli::render))]
    Render {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Data source lookup failed
    #[error("{message}")]
    #[diagnostic(code(kbmanifest::cli::data_source))]
    DataSource {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(kbmanifest::cli::io))]
    Io { message: String },

    /// Tool configuration or kind table problem
    #[error("{message}")]
    #[diagnostic(code(kbmanifest::cli::config))]
    Config { message: String },

    /// Wrapped error for passthrough (stores the formatted message)
    #[error("{message}")]
    #[diagnostic(code(kbmanifest::cli::error))]
    Other { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Render { .. } => exit_codes::RENDER_ERROR,
            CliError::DataSource { .. } => exit_codes::DATA_SOURCE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Config { .. } => exit_codes::ERROR,
            CliError::Other { .. } => exit_codes::ERROR,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: None,
        }
    }

    /// Create a validation error with help text
    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
            help: None,
        }
    }

    /// Create an IO error for a path
    pub fn io(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            message: format!("{}: {}", path.display(), err),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
            CoreError::YamlParse(_) | CoreError::ValuesMerge { .. } => {
                CliError::validation(err.to_string())
            }
            CoreError::InvalidSchema { .. } | CoreError::InvalidConfig { .. } => CliError::Config {
                message: err.to_string(),
            },
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        let help = err.help();
        match err {
            EngineError::Core(e) => e.into(),
            EngineError::UnknownDataSource { .. } | EngineError::AmbiguousDataSource { .. } => {
                CliError::DataSource {
                    message: err.to_string(),
                    help,
                }
            }
            EngineError::Table { .. } => CliError::Config {
                message: err.to_string(),
            },
            EngineError::Marshal(_) => CliError::Render {
                message: err.to_string(),
                help,
            },
            EngineError::Io(e) => CliError::Io {
                message: e.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Other {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
