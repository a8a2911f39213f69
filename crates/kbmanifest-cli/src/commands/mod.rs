//! CLI commands

pub mod list;
pub mod render;
pub mod schema;
pub mod validate;

use kbmanifest_core::{parse_set_values, ToolConfig, Values};
use kbmanifest_engine::{Catalog, Provider};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

/// Everything a command needs: the tool configuration and the provider
pub struct Context {
    pub config: ToolConfig,
    pub provider: Provider,
}

impl Context {
    /// Load the tool configuration and build the catalog
    ///
    /// `schema_dirs` from the command line are loaded after the configured
    /// ones, so their tables win.
    pub fn load(config_path: Option<&Path>, schema_dirs: &[PathBuf]) -> Result<Self> {
        let config = match config_path {
            Some(path) if !path.exists() => {
                return Err(CliError::io(path, "configuration file not found"));
            }
            Some(path) => ToolConfig::load_from(path)?,
            None => ToolConfig::load()?,
        };

        let dirs: Vec<PathBuf> = config
            .schema_dirs
            .iter()
            .chain(schema_dirs)
            .cloned()
            .collect();
        let catalog = Catalog::with_schema_dirs(&dirs)?;

        tracing::debug!(data_sources = catalog.len(), "Catalog ready");

        Ok(Self {
            config,
            provider: Provider::new(catalog),
        })
    }
}

/// Merge configuration files in order, then `--set` overrides
pub fn load_configuration(files: &[PathBuf], set_values: &[String]) -> Result<JsonValue> {
    let mut values = Values::new();

    for file in files {
        if !file.exists() {
            return Err(CliError::io(file, "file not found"));
        }
        let file_values = Values::from_file(file).map_err(|e| {
            CliError::validation(format!("Failed to load {}: {}", file.display(), e))
        })?;
        if file_values.is_empty() {
            continue;
        }
        values.merge(&file_values);
        tracing::debug!(file = %file.display(), "Merged configuration file");
    }

    if !set_values.is_empty() {
        let overrides = parse_set_values(set_values)?;
        values.merge(&overrides);
        tracing::debug!(count = set_values.len(), "Applied --set overrides");
    }

    Ok(values.into_inner())
}

/// Set `metadata.namespace` from the tool configuration when it is unset
pub fn apply_default_namespace(config: &mut JsonValue, namespaced: bool, default: Option<&str>) {
    let (true, Some(namespace)) = (namespaced, default) else {
        return;
    };
    let Some(attrs) = config.as_object_mut() else {
        return;
    };

    let metadata = attrs
        .entry("metadata")
        .or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
    if let Some(metadata) = metadata.as_object_mut() {
        if metadata.get("namespace").is_none_or(|v| v.is_null()) {
            metadata.insert(
                "namespace".to_string(),
                JsonValue::String(namespace.to_string()),
            );
        }
    }
}
