//! Core error types

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid kind table: {message}")]
    InvalidSchema { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {message}")]
    InvalidConfig { message: String },

    #[error("Values merge error: {message}")]
    ValuesMerge { message: String },
}

/// A single constraint violation found while validating a configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationErrorInfo {
    /// Attribute path, e.g. `spec.backup_policies[0].component_def_ref`
    pub path: String,
    /// Human-readable message
    pub message: String,
    /// Expected value or shape, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Actual value, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

pub type Result<T> = std::result::Result<T, CoreError>;
