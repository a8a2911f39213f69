//! Provider and data sources
//!
//! The provider exposes one read-only data source per kind in its catalog.
//! A data source validates a configuration against its kind table and, on
//! read, returns the configuration back with the computed `yaml` attribute
//! set to the rendered manifest.

use kbmanifest_core::{strip_nulls, FieldSchema, FieldType, KindSchema, YAML_ATTRIBUTE};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::catalog::{Catalog, ManifestKind};
use crate::error::Result;
use crate::render::render_manifest;
use crate::suggestions::suggest_attribute;

/// Provider type name, the prefix of every data source name
pub const PROVIDER_TYPE_NAME: &str = "k8s";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A problem found while validating or reading a configuration
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Attribute path the problem is attached to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: None,
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(summary)
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Provider metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMetadata {
    pub type_name: String,
    pub version: String,
    pub data_sources: Vec<String>,
}

/// The manifest provider
pub struct Provider {
    catalog: Catalog,
}

impl Provider {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Provider over the built-in kinds
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(Catalog::builtin()?))
    }

    pub fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: PROVIDER_TYPE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_sources: self.catalog.names().into_iter().map(String::from).collect(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Data source for a name, `Kind` or `group/version/Kind`
    pub fn data_source(&self, name: &str) -> Result<DataSource<'_>> {
        Ok(DataSource {
            kind: self.catalog.resolve(name)?,
        })
    }

    /// Every data source, sorted by name
    pub fn data_sources(&self) -> impl Iterator<Item = DataSource<'_>> {
        self.catalog.iter().map(|kind| DataSource { kind })
    }
}

/// Read request: the configuration to render
#[derive(Debug, Clone)]
pub struct ReadRequest {
    pub config: JsonValue,
}

/// Read response
#[derive(Debug, Clone)]
pub struct ReadResponse {
    /// Configuration with the computed `yaml` attribute, `None` on error
    pub state: Option<JsonValue>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReadResponse {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Rendered manifest
    pub fn yaml(&self) -> Option<&str> {
        self.state.as_ref()?.get(YAML_ATTRIBUTE)?.as_str()
    }
}

/// One kind's data source
#[derive(Clone, Copy)]
pub struct DataSource<'a> {
    kind: &'a ManifestKind,
}

impl<'a> DataSource<'a> {
    pub fn type_name(&self) -> &'a str {
        self.kind.data_source_name()
    }

    pub fn schema(&self) -> &'a KindSchema {
        self.kind.schema()
    }

    /// JSON Schema of the configuration
    pub fn json_schema(&self) -> &'a JsonValue {
        self.kind.validator().json_schema()
    }

    /// Check a configuration without rendering it
    pub fn validate_config(&self, config: &JsonValue) -> Vec<Diagnostic> {
        let Some(attrs) = config.as_object() else {
            return vec![
                Diagnostic::error("Configuration must be an object").with_attribute("(root)"),
            ];
        };

        let mut diagnostics = Vec::new();

        if attrs.get(YAML_ATTRIBUTE).is_some_and(|v| !v.is_null()) {
            diagnostics.push(
                Diagnostic::error("Attribute 'yaml' is computed and cannot be set")
                    .with_attribute(YAML_ATTRIBUTE),
            );
        }

        let mut config = config.clone();
        if let Some(attrs) = config.as_object_mut() {
            attrs.remove(YAML_ATTRIBUTE);
        }

        let result = self.kind.validator().validate(&config);
        for error in result.errors {
            let mut diagnostic =
                Diagnostic::error(error.message.clone()).with_attribute(error.path.clone());
            if let Some(hint) = self.unexpected_attribute_hint(&error.path, &error.message) {
                diagnostic = diagnostic.with_detail(hint);
            } else if let Some(expected) = &error.expected {
                diagnostic = diagnostic.with_detail(match &error.actual {
                    Some(actual) => format!("Expected {}, got {}", expected, actual),
                    None => format!("Expected {}", expected),
                });
            }
            diagnostics.push(diagnostic);
        }

        if diagnostics.is_empty() {
            let mut empty = Vec::new();
            let tree = self.schema().attribute_tree();
            empty_collections(&tree, &strip_nulls(&config), "", &mut empty);
            diagnostics.extend(empty.into_iter().map(|path| {
                Diagnostic::warning("Empty collection is left out of the manifest")
                    .with_attribute(path)
            }));
        }

        diagnostics
    }

    /// Validate and render; the state echoes the configuration plus `yaml`
    pub fn read(&self, request: ReadRequest) -> ReadResponse {
        tracing::debug!(data_source = %self.type_name(), "Reading data source");

        let mut diagnostics = self.validate_config(&request.config);
        if diagnostics.iter().any(Diagnostic::is_error) {
            return ReadResponse {
                state: None,
                diagnostics,
            };
        }

        match render_manifest(self.schema(), &request.config) {
            Ok(yaml) => {
                let mut state = request.config;
                if let Some(attrs) = state.as_object_mut() {
                    attrs.insert(YAML_ATTRIBUTE.to_string(), JsonValue::String(yaml));
                }
                ReadResponse {
                    state: Some(state),
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(
                    Diagnostic::error("Unable to marshal model").with_detail(e.to_string()),
                );
                ReadResponse {
                    state: None,
                    diagnostics,
                }
            }
        }
    }

    /// Hint for "Additional properties are not allowed ('x' was unexpected)"
    fn unexpected_attribute_hint(&self, path: &str, message: &str) -> Option<String> {
        let start = message.find("('")? + 2;
        let end = start + message[start..].find('\'')?;
        let attempted = &message[start..end];

        let prefix = if path == "(root)" {
            String::new()
        } else {
            format!("{}.", without_indices(path))
        };
        let entries = self.schema().attributes();
        let siblings: Vec<&str> = entries
            .iter()
            .filter_map(|e| e.path.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('.') && !rest.contains('['))
            .collect();

        suggest_attribute(attempted, &siblings)
    }
}

/// Collect the paths of configured lists and maps that are empty
fn empty_collections(field: &FieldSchema, value: &JsonValue, path: &str, out: &mut Vec<String>) {
    match (field.field_type, value) {
        (FieldType::List, JsonValue::Array(items)) => {
            if items.is_empty() {
                out.push(path.to_string());
            } else if let Some(item_schema) = field.items.as_deref() {
                for (i, item) in items.iter().enumerate() {
                    empty_collections(item_schema, item, &format!("{}[{}]", path, i), out);
                }
            }
        }
        (FieldType::Map, JsonValue::Object(entries)) if entries.is_empty() => {
            out.push(path.to_string());
        }
        (FieldType::Object, JsonValue::Object(attrs)) => {
            let Some(props) = &field.properties else {
                return;
            };
            for (name, child) in props {
                let attribute = child.attribute_name(name);
                if let Some(v) = attrs.get(&attribute) {
                    let child_path = if path.is_empty() {
                        attribute
                    } else {
                        format!("{}.{}", path, attribute)
                    };
                    empty_collections(child, v, &child_path, out);
                }
            }
        }
        _ => {}
    }
}

/// `spec.items[0].name` -> `spec.items[].name`, the form used in attribute listings
fn without_indices(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut in_index = false;
    for c in path.chars() {
        match c {
            '[' => {
                in_index = true;
                out.push(c);
            }
            ']' => {
                in_index = false;
                out.push(c);
            }
            _ if in_index => {}
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SERVICE_DESCRIPTOR: &str = "k8s_apps_kubeblocks_io_service_descriptor_v1alpha1_manifest";

    fn provider() -> Provider {
        Provider::builtin().unwrap()
    }

    #[test]
    fn test_provider_metadata() {
        let metadata = provider().metadata();
        assert_eq!(metadata.type_name, "k8s");
        assert_eq!(metadata.data_sources.len(), 3);
        assert!(metadata
            .data_sources
            .iter()
            .all(|name| name.starts_with("k8s_") && name.ends_with("_manifest")));
    }

    #[test]
    fn test_read_sets_yaml() {
        let provider = provider();
        let ds = provider.data_source(SERVICE_DESCRIPTOR).unwrap();
        let config = json!({
            "metadata": { "name": "svc1", "namespace": "default" },
            "spec": { "service_kind": "mysql", "service_version": "8.0" }
        });

        let response = ds.read(ReadRequest {
            config: config.clone(),
        });
        assert!(!response.has_errors(), "{:?}", response.diagnostics);

        let yaml = response.yaml().unwrap();
        assert!(yaml.starts_with(
            "apiVersion: apps.kubeblocks.io/v1alpha1\nkind: ServiceDescriptor\n"
        ));

        let state = response.state.unwrap();
        assert_eq!(state["metadata"], config["metadata"]);
        assert_eq!(state["spec"], config["spec"]);
    }

    #[test]
    fn test_read_invalid_config_has_no_state() {
        let provider = provider();
        let ds = provider.data_source("ServiceDescriptor").unwrap();
        let response = ds.read(ReadRequest {
            config: json!({ "metadata": { "name": "svc1" }, "spec": { "service_kind": "mysql" } }),
        });

        assert!(response.has_errors());
        assert!(response.state.is_none());
        assert!(response.yaml().is_none());
        assert_eq!(response.diagnostics[0].attribute.as_deref(), Some("spec"));
    }

    #[test]
    fn test_yaml_attribute_is_computed() {
        let provider = provider();
        let ds = provider.data_source("ServiceDescriptor").unwrap();
        let spec = json!({ "service_kind": "mysql", "service_version": "8.0" });
        let diagnostics = ds.validate_config(&json!({
            "metadata": { "name": "svc1" },
            "spec": spec,
            "yaml": "kind: Pod"
        }));

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("yaml"));

        // A null yaml is the same as leaving it unset
        let diagnostics = ds.validate_config(&json!({
            "metadata": { "name": "svc1" },
            "spec": spec,
            "yaml": null
        }));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_non_object_config() {
        let provider = provider();
        let ds = provider.data_source("OpsRequest").unwrap();
        let diagnostics = ds.validate_config(&json!(["not", "an", "object"]));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].is_error());
    }

    #[test]
    fn test_camel_case_attribute_hint() {
        let provider = provider();
        let ds = provider.data_source("ServiceDescriptor").unwrap();
        let diagnostics = ds.validate_config(&json!({
            "metadata": { "name": "svc1" },
            "spec": { "serviceKind": "mysql", "service_version": "8.0" }
        }));

        let hint = diagnostics
            .iter()
            .find_map(|d| d.detail.as_deref())
            .unwrap();
        assert!(hint.contains("`service_kind`"));
    }

    #[test]
    fn test_ops_request_enum_violation() {
        let provider = provider();
        let ds = provider.data_source("OpsRequest").unwrap();
        let diagnostics = ds.validate_config(&json!({
            "metadata": { "name": "ops1", "namespace": "default" },
            "spec": { "cluster_ref": "mycluster", "type": "Explode" }
        }));

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("spec.type"));
        let detail = diagnostics[0].detail.as_deref().unwrap();
        assert!(detail.starts_with("Expected one of ["), "{detail}");
        assert!(detail.ends_with(", got \"Explode\""), "{detail}");
    }

    #[test]
    fn test_attribute_hint_inside_list() {
        let provider = provider();
        let ds = provider.data_source("BackupPolicyTemplate").unwrap();
        let diagnostics = ds.validate_config(&json!({
            "metadata": { "name": "bpt" },
            "spec": {
                "cluster_definition_ref": "mysql",
                "backup_policies": [{
                    "component_def_ref": "mysql",
                    "backup_methods": [{ "name": "xtrabackup" }],
                    "backoffLimit": 2
                }]
            }
        }));

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("spec.backup_policies[0]")
        );
        assert!(diagnostics[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("`backoff_limit`"));
    }

    #[test]
    fn test_env_var_sources() {
        let provider = provider();
        let sd = provider.data_source("ServiceDescriptor").unwrap();
        let diagnostics = sd.validate_config(&json!({
            "metadata": { "name": "svc1" },
            "spec": {
                "service_kind": "mysql",
                "service_version": "8.0",
                "host": { "value_from": { "field_ref": { "field_path": "status.podIP" } } },
                "port": {
                    "value_from": {
                        "resource_field_ref": { "resource": "limits.cpu", "divisor": 1 }
                    }
                }
            }
        }));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);

        let bpt = provider.data_source("BackupPolicyTemplate").unwrap();
        let response = bpt.read(ReadRequest {
            config: json!({
                "metadata": { "name": "bpt" },
                "spec": {
                    "cluster_definition_ref": "mysql",
                    "backup_policies": [{
                        "component_def_ref": "mysql",
                        "backup_methods": [{
                            "name": "xtrabackup",
                            "env": [{
                                "name": "DATA_DIR",
                                "value_from": {
                                    "config_map_key_ref": { "name": "mysql-env", "key": "dataDir" }
                                }
                            }]
                        }]
                    }]
                }
            }),
        });
        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let yaml = response.yaml().unwrap();
        assert!(yaml.contains("valueFrom:"));
        assert!(yaml.contains("configMapKeyRef:"));
    }

    #[test]
    fn test_missing_field_path() {
        let provider = provider();
        let ds = provider.data_source("ServiceDescriptor").unwrap();
        let diagnostics = ds.validate_config(&json!({
            "metadata": { "name": "svc1" },
            "spec": {
                "service_kind": "mysql",
                "service_version": "8.0",
                "host": { "value_from": { "field_ref": { "api_version": "v1" } } }
            }
        }));

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("spec.host.value_from.field_ref")
        );
    }

    #[test]
    fn test_empty_collections_warn() {
        let provider = provider();
        let ds = provider.data_source("BackupPolicyTemplate").unwrap();
        let response = ds.read(ReadRequest {
            config: json!({
                "metadata": { "name": "bpt", "labels": {} },
                "spec": {
                    "cluster_definition_ref": "mysql",
                    "backup_policies": [{
                        "component_def_ref": "mysql",
                        "backup_methods": [{ "name": "xtrabackup", "env": [] }]
                    }]
                }
            }),
        });

        assert!(!response.has_errors());
        assert!(response.yaml().is_some());
        let warned: Vec<&str> = response
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .filter_map(|d| d.attribute.as_deref())
            .collect();
        assert_eq!(
            warned,
            vec![
                "metadata.labels",
                "spec.backup_policies[0].backup_methods[0].env"
            ]
        );
    }

    #[test]
    fn test_without_indices() {
        assert_eq!(
            without_indices("spec.backup_policies[0].backup_methods[12]"),
            "spec.backup_policies[].backup_methods[]"
        );
    }

    #[test]
    fn test_data_sources_iterate_sorted() {
        let provider = provider();
        let names: Vec<&str> = provider.data_sources().map(|ds| ds.type_name()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
