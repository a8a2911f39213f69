//! kbmanifest Engine - manifest data sources for KubeBlocks kinds
//!
//! This crate provides:
//! - A catalog of kind tables (built-in plus user directories)
//! - A single table-driven renderer shared by every kind
//! - The provider and data source surface (validate, read)
//! - Name suggestions for unknown data sources and attributes

pub mod catalog;
pub mod datasource;
pub mod error;
pub mod render;
pub mod suggestions;

pub use catalog::{Catalog, ManifestKind};
pub use datasource::{
    DataSource, Diagnostic, Provider, ProviderMetadata, ReadRequest, ReadResponse, Severity,
    PROVIDER_TYPE_NAME,
};
pub use error::{EngineError, Result};
pub use render::{build_manifest, render_manifest};
