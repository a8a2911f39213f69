//! kbmanifest Core - types shared by the manifest data sources
//!
//! This crate provides the foundational types used throughout kbmanifest:
//! - `KindSchema`: The data table describing one CRD kind
//! - `SchemaValidator`: Field-level constraint checking for configurations
//! - `Values`: Data source configuration with deep merge support
//! - `ToolConfig`: User configuration file

pub mod config;
pub mod error;
pub mod naming;
pub mod schema;
pub mod values;

pub use config::ToolConfig;
pub use error::{CoreError, ValidationErrorInfo};
pub use schema::{
    AttributeEntry, FieldSchema, FieldType, KeyFormat, KindSchema, SchemaValidator,
    ValidationResult, SCHEMA_VERSION, YAML_ATTRIBUTE,
};
pub use values::{parse_set_values, strip_nulls, Values};
