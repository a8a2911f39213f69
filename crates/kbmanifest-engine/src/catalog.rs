//! Catalog of manifest kinds
//!
//! Built-in kind tables are embedded at build time. Extra tables can be
//! loaded from directories; a table whose data source name matches a
//! built-in one replaces it.

use kbmanifest_core::{KindSchema, SchemaValidator};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};
use crate::suggestions::suggest_data_source;

/// Kind tables shipped with kbmanifest
const BUILTIN_TABLES: &[(&str, &str)] = &[
    (
        "apps.kubeblocks.io_v1alpha1_backuppolicytemplate.yaml",
        include_str!("../schemas/apps.kubeblocks.io_v1alpha1_backuppolicytemplate.yaml"),
    ),
    (
        "apps.kubeblocks.io_v1alpha1_opsrequest.yaml",
        include_str!("../schemas/apps.kubeblocks.io_v1alpha1_opsrequest.yaml"),
    ),
    (
        "apps.kubeblocks.io_v1alpha1_servicedescriptor.yaml",
        include_str!("../schemas/apps.kubeblocks.io_v1alpha1_servicedescriptor.yaml"),
    ),
];

/// A checked kind table with its compiled validator
pub struct ManifestKind {
    data_source: String,
    schema: KindSchema,
    validator: SchemaValidator,
}

impl ManifestKind {
    /// Check and compile a kind table
    pub fn new(schema: KindSchema) -> Result<Self> {
        let validator = SchemaValidator::new(&schema)?;
        Ok(Self {
            data_source: schema.data_source_name(),
            schema,
            validator,
        })
    }

    /// Data source type name
    pub fn data_source_name(&self) -> &str {
        &self.data_source
    }

    pub fn schema(&self) -> &KindSchema {
        &self.schema
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    /// `group/version/Kind`
    pub fn gvk(&self) -> String {
        format!("{}/{}", self.schema.api_version(), self.schema.kind)
    }
}

/// All known manifest kinds, keyed by data source name
#[derive(Default)]
pub struct Catalog {
    kinds: BTreeMap<String, ManifestKind>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the built-in kind tables
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::new();

        for (file, content) in BUILTIN_TABLES {
            let schema = KindSchema::from_yaml(content).map_err(|e| EngineError::Table {
                path: (*file).to_string(),
                source: e,
            })?;
            catalog.insert(schema)?;
        }

        Ok(catalog)
    }

    /// Built-in kinds plus every table found in `dirs`
    pub fn with_schema_dirs(dirs: &[PathBuf]) -> Result<Self> {
        let mut catalog = Self::builtin()?;
        for dir in dirs {
            catalog.load_dir(dir)?;
        }
        Ok(catalog)
    }

    /// Add a kind table; returns true when it replaced an existing one
    pub fn insert(&mut self, schema: KindSchema) -> Result<bool> {
        let kind = ManifestKind::new(schema)?;
        let name = kind.data_source_name().to_string();
        let replaced = self.kinds.insert(name.clone(), kind).is_some();

        if replaced {
            tracing::warn!(data_source = %name, "Kind table overrides an existing data source");
        }

        Ok(replaced)
    }

    /// Load every `*.yaml`/`*.yml` table under `dir`, recursively
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("schema directory not found: {}", dir.display()),
            )));
        }

        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() {
                if let Some(ext) = path.extension() {
                    let ext = ext.to_string_lossy().to_lowercase();
                    if matches!(ext.as_str(), "yaml" | "yml") {
                        files.push(path.to_path_buf());
                    }
                }
            }
        }
        files.sort();

        for path in &files {
            let schema = KindSchema::from_file(path).map_err(|e| EngineError::Table {
                path: path.display().to_string(),
                source: e,
            })?;
            self.insert(schema)?;
        }

        tracing::info!(dir = %dir.display(), tables = files.len(), "Loaded kind tables");
        Ok(files.len())
    }

    /// Look up a kind by exact data source name
    pub fn get(&self, data_source: &str) -> Option<&ManifestKind> {
        self.kinds.get(data_source)
    }

    /// Resolve a data source name, a `Kind` (case-insensitive) or a
    /// `group/version/Kind`
    pub fn resolve(&self, name: &str) -> Result<&ManifestKind> {
        if let Some(kind) = self.get(name) {
            return Ok(kind);
        }

        if let Some(kind) = self.kinds.values().find(|k| k.gvk() == name) {
            return Ok(kind);
        }

        let by_kind: Vec<&ManifestKind> = self
            .kinds
            .values()
            .filter(|k| k.schema().kind.eq_ignore_ascii_case(name))
            .collect();

        match by_kind.as_slice() {
            [kind] => Ok(*kind),
            [] => Err(EngineError::UnknownDataSource {
                name: name.to_string(),
                suggestion: suggest_data_source(name, &self.names()),
            }),
            many => Err(EngineError::AmbiguousDataSource {
                name: name.to_string(),
                candidates: many.iter().map(|k| k.data_source_name().to_string()).collect(),
            }),
        }
    }

    /// Data source names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.kinds.keys().map(|k| k.as_str()).collect()
    }

    /// Kinds, sorted by data source name
    pub fn iter(&self) -> impl Iterator<Item = &ManifestKind> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
