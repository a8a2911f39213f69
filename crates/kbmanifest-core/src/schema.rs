//! Kind tables and configuration validation
//!
//! A kind table is the data description of one CRD kind: its API group,
//! version and kind, and the field tree of its `spec`. Tables are written in
//! YAML using manifest (camelCase) field names; configuration attributes use
//! the snake_case form of those names.
//!
//! Validation works the same way for every kind: the table is converted to a
//! JSON Schema over attribute names and compiled once with `jsonschema`.

use indexmap::IndexMap;
use jsonschema::error::{TypeKind, ValidationErrorKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{CoreError, Result, ValidationErrorInfo};
use crate::naming;
use crate::values::strip_nulls;

/// Kind table format identifier
pub const SCHEMA_VERSION: &str = "kbmanifest/v1";

/// Computed attribute that carries the rendered manifest
pub const YAML_ATTRIBUTE: &str = "yaml";

const DNS_SUBDOMAIN_PATTERN: &str =
    r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";
const DNS_LABEL_PATTERN: &str = r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$";
const QUALIFIED_NAME_PATTERN: &str =
    r"^([a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*/)?[A-Za-z0-9]([-A-Za-z0-9_.]{0,61}[A-Za-z0-9])?$";
/// Prefix of at most 253 characters, name of at most 63
const QUALIFIED_NAME_LENGTH_PATTERN: &str = r"^([^/]{1,253}/)?[^/]{1,63}$";
const LABEL_VALUE_PATTERN: &str = r"^(([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9])?$";

/// Field type in a kind table
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    /// Kubernetes int-or-string (quantities, ports)
    IntOrString,
    /// String to string map
    Map,
    List,
    Object,
    /// Preserve-unknown-fields; copied verbatim
    Any,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::IntOrString => "int-or-string",
            FieldType::Map => "map",
            FieldType::List => "list",
            FieldType::Object => "object",
            FieldType::Any => "any",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Well-known map key formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum KeyFormat {
    /// Kubernetes label/annotation key: optional DNS subdomain prefix and a name
    QualifiedName,
}

/// Schema of a single field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    /// Type of the field
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Description for documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the field must be set
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    /// Attribute name override (defaults to the snake_case field name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,

    /// Allowed values
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<JsonValue>>,

    /// Regex for string values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,

    /// Regex for map keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_format: Option<KeyFormat>,

    /// Schema of map values (always strings)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Box<FieldSchema>>,

    /// Nested fields of an object, in manifest order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, FieldSchema>>,

    /// Item schema of a list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<FieldSchema>>,
}

impl FieldSchema {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Default::default()
        }
    }

    /// Object field with the given nested fields
    pub fn object(properties: IndexMap<String, FieldSchema>) -> Self {
        Self {
            field_type: FieldType::Object,
            properties: Some(properties),
            ..Default::default()
        }
    }

    /// List field with the given item schema
    pub fn list(items: FieldSchema) -> Self {
        Self {
            field_type: FieldType::List,
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    /// Configuration attribute name for a field declared as `field_name`
    pub fn attribute_name(&self, field_name: &str) -> String {
        self.attribute
            .clone()
            .unwrap_or_else(|| naming::to_snake_case(field_name))
    }
}

/// One CRD kind's table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindSchema {
    /// Table format identifier
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// API group (empty for the core group)
    #[serde(default)]
    pub group: String,

    /// API version
    pub version: String,

    /// Kind name
    pub kind: String,

    /// Whether objects of this kind live in a namespace
    #[serde(default = "default_namespaced")]
    pub namespaced: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether `spec` must be present
    #[serde(default)]
    pub spec_required: bool,

    /// Fields of `spec`, in manifest order
    #[serde(default)]
    pub spec: IndexMap<String, FieldSchema>,
}

fn default_schema_version() -> String {
    SCHEMA_VERSION.to_string()
}

fn default_namespaced() -> bool {
    true
}

impl KindSchema {
    /// Load a kind table from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse a kind table from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let schema: KindSchema = serde_yaml::from_str(yaml)?;
        Ok(schema)
    }

    /// `apiVersion` stamped on every rendered manifest
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Data source type name
    pub fn data_source_name(&self) -> String {
        naming::data_source_name(&self.group, &self.version, &self.kind)
    }

    /// Full configuration tree: standard `metadata` plus this kind's `spec`
    pub fn attribute_tree(&self) -> FieldSchema {
        let mut root = IndexMap::new();
        root.insert("metadata".to_string(), standard_metadata(self.namespaced));

        if !self.spec.is_empty() {
            let mut spec = FieldSchema::object(self.spec.clone());
            spec.required = self.spec_required;
            spec.description = self.description.clone();
            root.insert("spec".to_string(), spec);
        }

        FieldSchema::object(root)
    }

    /// Reject malformed tables before they are used
    pub fn check(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(CoreError::InvalidSchema {
                message: format!(
                    "{}: unsupported schemaVersion '{}', expected '{}'",
                    self.kind, self.schema_version, SCHEMA_VERSION
                ),
            });
        }
        if self.kind.is_empty() || self.version.is_empty() {
            return Err(CoreError::InvalidSchema {
                message: "kind and version must not be empty".to_string(),
            });
        }

        check_fields(&self.kind, &self.spec, "spec")
    }

    /// JSON Schema over attribute names for the whole configuration
    pub fn to_json_schema(&self) -> JsonValue {
        let mut schema = field_to_json_schema(&self.attribute_tree());

        if let JsonValue::Object(obj) = &mut schema {
            obj.insert(
                "$schema".into(),
                JsonValue::String("http://json-schema.org/draft-07/schema#".into()),
            );
            obj.insert("title".into(), JsonValue::String(self.data_source_name()));
        }

        schema
    }

    /// Every attribute of the configuration tree, depth first
    pub fn attributes(&self) -> Vec<AttributeEntry> {
        let mut entries = Vec::new();
        if let Some(props) = &self.attribute_tree().properties {
            collect_attributes(props, "", 0, &mut entries);
        }
        entries
    }
}

/// Flattened view of one attribute, for listings
#[derive(Debug, Clone)]
pub struct AttributeEntry {
    /// Dotted attribute path (`spec.auth.username`)
    pub path: String,
    /// Nesting depth, 0 for `metadata`/`spec`
    pub depth: usize,
    pub field_type: FieldType,
    pub required: bool,
    pub description: Option<String>,
}

fn collect_attributes(
    props: &IndexMap<String, FieldSchema>,
    prefix: &str,
    depth: usize,
    out: &mut Vec<AttributeEntry>,
) {
    for (name, field) in props {
        let attr = field.attribute_name(name);
        let path = if prefix.is_empty() {
            attr
        } else {
            format!("{}.{}", prefix, attr)
        };

        out.push(AttributeEntry {
            path: path.clone(),
            depth,
            field_type: field.field_type,
            required: field.required,
            description: field.description.clone(),
        });

        let nested = match field.field_type {
            FieldType::Object => field.properties.as_ref(),
            FieldType::List => field.items.as_ref().and_then(|i| i.properties.as_ref()),
            _ => None,
        };
        if let Some(nested) = nested {
            let child_prefix = if field.field_type == FieldType::List {
                format!("{}[]", path)
            } else {
                path
            };
            collect_attributes(nested, &child_prefix, depth + 1, out);
        }
    }
}

/// Standard object metadata shared by every kind
fn standard_metadata(namespaced: bool) -> FieldSchema {
    let mut props = IndexMap::new();

    props.insert(
        "name".to_string(),
        FieldSchema::new(FieldType::String)
            .required()
            .describe("Unique name of the object, a DNS subdomain")
            .length(Some(1), Some(253))
            .pattern(DNS_SUBDOMAIN_PATTERN),
    );

    if namespaced {
        props.insert(
            "namespace".to_string(),
            FieldSchema::new(FieldType::String)
                .describe("Namespace of the object, a DNS label")
                .length(Some(1), Some(63))
                .pattern(DNS_LABEL_PATTERN),
        );
    }

    let mut labels = FieldSchema::new(FieldType::Map)
        .describe("Map of string keys and values to organize and categorize objects");
    labels.key_format = Some(KeyFormat::QualifiedName);
    labels.values = Some(Box::new(
        FieldSchema::new(FieldType::String)
            .length(None, Some(63))
            .pattern(LABEL_VALUE_PATTERN),
    ));
    props.insert("labels".to_string(), labels);

    let mut annotations = FieldSchema::new(FieldType::Map)
        .describe("Unstructured key value map to store arbitrary metadata");
    annotations.key_format = Some(KeyFormat::QualifiedName);
    props.insert("annotations".to_string(), annotations);

    FieldSchema::object(props)
        .required()
        .describe("Data that helps uniquely identify the object")
}

fn check_fields(kind: &str, props: &IndexMap<String, FieldSchema>, path: &str) -> Result<()> {
    let mut seen = HashSet::new();

    for (name, field) in props {
        let attr = field.attribute_name(name);
        let field_path = format!("{}.{}", path, attr);

        if !seen.insert(attr.clone()) {
            return Err(invalid(kind, &field_path, "duplicate attribute name"));
        }

        check_field(kind, field, &field_path)?;
    }

    Ok(())
}

fn check_field(kind: &str, field: &FieldSchema, path: &str) -> Result<()> {
    for pattern in [&field.pattern, &field.key_pattern].into_iter().flatten() {
        Regex::new(pattern)
            .map_err(|e| invalid(kind, path, &format!("invalid pattern '{}': {}", pattern, e)))?;
    }

    if matches!(&field.enum_values, Some(values) if values.is_empty()) {
        return Err(invalid(kind, path, "enum must list at least one value"));
    }

    if let (Some(min), Some(max)) = (field.min_length, field.max_length) {
        if min > max {
            return Err(invalid(kind, path, "minLength is greater than maxLength"));
        }
    }
    if let (Some(min), Some(max)) = (field.minimum, field.maximum) {
        if min > max {
            return Err(invalid(kind, path, "minimum is greater than maximum"));
        }
    }
    if let (Some(min), Some(max)) = (field.min_items, field.max_items) {
        if min > max {
            return Err(invalid(kind, path, "minItems is greater than maxItems"));
        }
    }

    match field.field_type {
        FieldType::List => match &field.items {
            Some(items) => check_field(kind, items, &format!("{}[]", path)),
            None => Err(invalid(kind, path, "list fields need 'items'")),
        },
        FieldType::Object => match &field.properties {
            Some(props) => check_fields(kind, props, path),
            None => Err(invalid(kind, path, "object fields need 'properties'")),
        },
        FieldType::Map => match &field.values {
            Some(values) if values.field_type != FieldType::String => {
                Err(invalid(kind, path, "map values must be strings"))
            }
            Some(values) => check_field(kind, values, path),
            None => Ok(()),
        },
        _ => Ok(()),
    }
}

fn invalid(kind: &str, path: &str, message: &str) -> CoreError {
    CoreError::InvalidSchema {
        message: format!("{} {}: {}", kind, path, message),
    }
}

fn field_to_json_schema(field: &FieldSchema) -> JsonValue {
    let mut json = serde_json::Map::new();

    match field.field_type {
        FieldType::String => {
            json.insert("type".into(), "string".into());
        }
        FieldType::Integer => {
            json.insert("type".into(), "integer".into());
        }
        FieldType::Number => {
            json.insert("type".into(), "number".into());
        }
        FieldType::Boolean => {
            json.insert("type".into(), "boolean".into());
        }
        FieldType::IntOrString => {
            json.insert("type".into(), serde_json::json!(["integer", "string"]));
        }
        FieldType::Map => {
            json.insert("type".into(), "object".into());
            let values = field
                .values
                .as_deref()
                .map(field_to_json_schema)
                .unwrap_or_else(|| serde_json::json!({ "type": "string" }));
            json.insert("additionalProperties".into(), values);
            let mut key_patterns: Vec<&str> = Vec::new();
            if let Some(KeyFormat::QualifiedName) = field.key_format {
                key_patterns.extend([QUALIFIED_NAME_PATTERN, QUALIFIED_NAME_LENGTH_PATTERN]);
            }
            key_patterns.extend(field.key_pattern.as_deref());
            match key_patterns.as_slice() {
                [] => {}
                [pattern] => {
                    json.insert(
                        "propertyNames".into(),
                        serde_json::json!({ "pattern": pattern }),
                    );
                }
                patterns => {
                    let all: Vec<JsonValue> = patterns
                        .iter()
                        .map(|p| serde_json::json!({ "pattern": p }))
                        .collect();
                    json.insert("propertyNames".into(), serde_json::json!({ "allOf": all }));
                }
            }
        }
        FieldType::List => {
            json.insert("type".into(), "array".into());
            if let Some(items) = &field.items {
                json.insert("items".into(), field_to_json_schema(items));
            }
        }
        FieldType::Object => {
            json.insert("type".into(), "object".into());
            let mut properties = serde_json::Map::new();
            let mut required = Vec::new();

            for (name, nested) in field.properties.iter().flatten() {
                let attr = nested.attribute_name(name);
                if nested.required {
                    required.push(JsonValue::String(attr.clone()));
                }
                properties.insert(attr, field_to_json_schema(nested));
            }

            json.insert("properties".into(), JsonValue::Object(properties));
            if !required.is_empty() {
                json.insert("required".into(), JsonValue::Array(required));
            }
            json.insert("additionalProperties".into(), JsonValue::Bool(false));
        }
        FieldType::Any => {}
    }

    if let Some(desc) = &field.description {
        json.insert("description".into(), JsonValue::String(desc.clone()));
    }
    if let Some(enum_vals) = &field.enum_values {
        json.insert("enum".into(), JsonValue::Array(enum_vals.clone()));
    }
    if let Some(pattern) = &field.pattern {
        json.insert("pattern".into(), JsonValue::String(pattern.clone()));
    }
    if let Some(min_len) = field.min_length {
        json.insert("minLength".into(), JsonValue::from(min_len));
    }
    if let Some(max_len) = field.max_length {
        json.insert("maxLength".into(), JsonValue::from(max_len));
    }
    if let Some(min) = field.minimum {
        json.insert("minimum".into(), JsonValue::from(min));
    }
    if let Some(max) = field.maximum {
        json.insert("maximum".into(), JsonValue::from(max));
    }
    if let Some(min_items) = field.min_items {
        json.insert("minItems".into(), JsonValue::from(min_items));
    }
    if let Some(max_items) = field.max_items {
        json.insert("maxItems".into(), JsonValue::from(max_items));
    }

    JsonValue::Object(json)
}

/// Result of schema validation
#[derive(Debug)]
pub struct ValidationResult {
    /// Whether the configuration is valid
    pub is_valid: bool,
    /// Validation errors
    pub errors: Vec<ValidationErrorInfo>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    /// Create a failed validation result with errors
    pub fn failure(errors: Vec<ValidationErrorInfo>) -> Self {
        Self {
            is_valid: false,
            errors,
        }
    }
}

/// Validator with the kind's JSON Schema compiled once
pub struct SchemaValidator {
    json_schema: JsonValue,
    compiled: jsonschema::Validator,
}

impl SchemaValidator {
    /// Check the table and compile its JSON Schema
    pub fn new(schema: &KindSchema) -> Result<Self> {
        schema.check()?;
        Self::from_json_schema(schema.to_json_schema())
    }

    /// Compile an already converted JSON Schema
    pub fn from_json_schema(json_schema: JsonValue) -> Result<Self> {
        let compiled =
            jsonschema::validator_for(&json_schema).map_err(|e| CoreError::InvalidSchema {
                message: format!("Invalid schema: {}", e),
            })?;

        Ok(Self {
            json_schema,
            compiled,
        })
    }

    /// Validate a configuration; `null` attributes count as unset
    pub fn validate(&self, config: &JsonValue) -> ValidationResult {
        let config = strip_nulls(config);

        if self.compiled.is_valid(&config) {
            return ValidationResult::success();
        }

        let errors: Vec<ValidationErrorInfo> = self
            .compiled
            .iter_errors(&config)
            .map(|e| {
                let actual = match &*e.instance {
                    JsonValue::Object(_) | JsonValue::Array(_) => None,
                    scalar => Some(scalar.to_string()),
                };
                ValidationErrorInfo {
                    path: attribute_path(&e.instance_path.to_string()),
                    message: format_validation_error(&e),
                    expected: expected_value(&e.kind),
                    actual,
                }
            })
            .collect();

        ValidationResult::failure(errors)
    }

    /// The JSON Schema this validator was compiled from
    pub fn json_schema(&self) -> &JsonValue {
        &self.json_schema
    }
}

/// Turn a JSON pointer (`/spec/items/0/name`) into an attribute path
/// (`spec.items[0].name`)
pub fn attribute_path(pointer: &str) -> String {
    let mut path = String::new();

    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&segment);
        }
    }

    if path.is_empty() {
        "(root)".to_string()
    } else {
        path
    }
}

/// What the failing keyword asked for, when it names a value or shape
fn expected_value(kind: &ValidationErrorKind) -> Option<String> {
    match kind {
        ValidationErrorKind::Type {
            kind: TypeKind::Single(ty),
        } => Some(ty.to_string()),
        ValidationErrorKind::Type {
            kind: TypeKind::Multiple(types),
        } => Some(
            types
                .into_iter()
                .map(|ty| ty.to_string())
                .collect::<Vec<_>>()
                .join(" or "),
        ),
        ValidationErrorKind::Enum { options } => Some(format!("one of {}", options)),
        ValidationErrorKind::Pattern { pattern } => Some(format!("a match for {}", pattern)),
        ValidationErrorKind::Minimum { limit } => Some(format!(">= {}", limit)),
        ValidationErrorKind::Maximum { limit } => Some(format!("<= {}", limit)),
        ValidationErrorKind::MinLength { limit } => Some(format!("at least {} characters", limit)),
        ValidationErrorKind::MaxLength { limit } => Some(format!("at most {} characters", limit)),
        _ => None,
    }
}

/// Format a validation error into a user-friendly message
fn format_validation_error(error: &jsonschema::ValidationError) -> String {
    let msg = error.to_string();

    // Clean up common patterns for better readability
    msg.replace('"', "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TABLE: &str = r#"
schemaVersion: kbmanifest/v1
group: example.kubeblocks.io
version: v1alpha1
kind: Widget
description: A test widget
spec:
  widgetName:
    type: string
    required: true
    maxLength: 8
    pattern: '^[a-z]+$'
  strategy:
    type: string
    enum: [Any, All]
  replicas:
    type: integer
    minimum: 0
    maximum: 10
  ports:
    type: list
    minItems: 1
    items:
      type: object
      properties:
        containerPort:
          type: intOrString
          required: true
  TTL:
    type: string
"#;

    fn widget() -> KindSchema {
        KindSchema::from_yaml(TABLE).unwrap()
    }

    #[test]
    fn test_kind_table_parse() {
        let schema = widget();
        assert_eq!(schema.schema_version, SCHEMA_VERSION);
        assert_eq!(schema.api_version(), "example.kubeblocks.io/v1alpha1");
        assert!(schema.namespaced);
        assert_eq!(
            schema.data_source_name(),
            "k8s_example_kubeblocks_io_widget_v1alpha1_manifest"
        );

        let keys: Vec<&str> = schema.spec.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["widgetName", "strategy", "replicas", "ports", "TTL"]);
        schema.check().unwrap();
    }

    #[test]
    fn test_core_group_api_version() {
        let schema = KindSchema::from_yaml("version: v1\nkind: ConfigMap\n").unwrap();
        assert_eq!(schema.api_version(), "v1");
    }

    #[test]
    fn test_json_schema_uses_attribute_names() {
        let json_schema = widget().to_json_schema();

        let spec = &json_schema["properties"]["spec"];
        assert_eq!(spec["additionalProperties"], json!(false));
        assert!(spec["properties"].get("widget_name").is_some());
        assert!(spec["properties"].get("ttl").is_some());
        assert_eq!(spec["required"], json!(["widget_name"]));
        assert_eq!(
            spec["properties"]["ports"]["items"]["properties"]["container_port"]["type"],
            json!(["integer", "string"])
        );

        let metadata = &json_schema["properties"]["metadata"];
        assert_eq!(metadata["required"], json!(["name"]));
        assert!(metadata["properties"].get("namespace").is_some());
        assert_eq!(json_schema["required"], json!(["metadata"]));
    }

    #[test]
    fn test_cluster_scoped_kind_has_no_namespace() {
        let mut schema = widget();
        schema.namespaced = false;
        let json_schema = schema.to_json_schema();
        assert!(json_schema["properties"]["metadata"]["properties"]
            .get("namespace")
            .is_none());
    }

    #[test]
    fn test_check_rejects_bad_pattern() {
        let mut schema = widget();
        schema.spec["widgetName"].pattern = Some("([a-z".to_string());
        let err = schema.check().unwrap_err();
        assert!(err.to_string().contains("spec.widget_name"));
    }

    #[test]
    fn test_check_rejects_duplicate_attribute() {
        let mut schema = widget();
        schema
            .spec
            .insert("widget_name".to_string(), FieldSchema::new(FieldType::String));
        assert!(schema.check().is_err());
    }

    #[test]
    fn test_check_rejects_list_without_items() {
        let mut schema = widget();
        schema.spec["ports"].items = None;
        assert!(schema.check().is_err());
    }

    #[test]
    fn test_check_rejects_inverted_bounds() {
        let mut schema = widget();
        schema.spec["replicas"].minimum = Some(20.0);
        assert!(schema.check().is_err());
    }

    #[test]
    fn test_validation_success() {
        let validator = SchemaValidator::new(&widget()).unwrap();
        let config = json!({
            "metadata": {
                "name": "w1",
                "namespace": "default",
                "labels": { "app.kubernetes.io/name": "w" }
            },
            "spec": {
                "widget_name": "abc",
                "strategy": "All",
                "replicas": 3,
                "ports": [{ "container_port": 8080 }, { "container_port": "http" }],
                "ttl": null
            }
        });

        let result = validator.validate(&config);
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_validation_rejects_constraint_violations() {
        let validator = SchemaValidator::new(&widget()).unwrap();
        let config = json!({
            "metadata": { "name": "w1" },
            "spec": {
                "widget_name": "waytoolongname",
                "strategy": "Some",
                "replicas": 11
            }
        });

        let result = validator.validate(&config);
        assert!(!result.is_valid);
        let paths: Vec<&str> = result.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"spec.widget_name"));
        assert!(paths.contains(&"spec.strategy"));
        assert!(paths.contains(&"spec.replicas"));
    }

    #[test]
    fn test_validation_rejects_bad_metadata_name() {
        let validator = SchemaValidator::new(&widget()).unwrap();

        let too_long = "a".repeat(254);
        for name in [too_long.as_str(), "Not_A_Dns_Name", ""] {
            let result = validator.validate(&json!({ "metadata": { "name": name } }));
            assert!(!result.is_valid, "name {:?} should be rejected", name);
            assert_eq!(result.errors[0].path, "metadata.name");
        }
    }

    #[test]
    fn test_validation_rejects_unknown_and_missing_attributes() {
        let validator = SchemaValidator::new(&widget()).unwrap();

        let result = validator.validate(&json!({
            "metadata": { "name": "w1" },
            "spec": { "widgetName": "abc" }
        }));
        assert!(!result.is_valid);
        assert!(result.errors.iter().all(|e| e.path == "spec"));

        let result = validator.validate(&json!({ "spec": { "widget_name": "abc" } }));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].path, "(root)");
    }

    #[test]
    fn test_validation_rejects_bad_label_key() {
        let validator = SchemaValidator::new(&widget()).unwrap();
        let result = validator.validate(&json!({
            "metadata": { "name": "w1", "labels": { "-bad key": "x" } }
        }));
        assert!(!result.is_valid);
    }

    #[test]
    fn test_label_key_length_limits() {
        let validator = SchemaValidator::new(&widget()).unwrap();
        let label = |key: String| {
            validator.validate(&json!({
                "metadata": { "name": "w1", "labels": { key: "x" } }
            }))
        };

        let prefix = format!("{}.{}", vec!["a".repeat(63); 3].join("."), "b".repeat(61));
        assert_eq!(prefix.len(), 253);
        let name = "n".repeat(63);

        assert!(label(format!("{}/{}", prefix, name)).is_valid);
        assert!(!label("n".repeat(64)).is_valid);
        assert!(!label(format!("{}/{}", prefix, "n".repeat(64))).is_valid);
        assert!(!label(format!("c{}/{}", prefix, name)).is_valid);
    }

    #[test]
    fn test_validation_list_item_path() {
        let validator = SchemaValidator::new(&widget()).unwrap();
        let result = validator.validate(&json!({
            "metadata": { "name": "w1" },
            "spec": { "widget_name": "abc", "ports": [{ "container_port": true }] }
        }));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].path, "spec.ports[0].container_port");
        assert_eq!(result.errors[0].actual.as_deref(), Some("true"));
        assert_eq!(result.errors[0].expected.as_deref(), Some("integer or string"));
    }

    #[test]
    fn test_validation_reports_expected_value() {
        let validator = SchemaValidator::new(&widget()).unwrap();
        let result = validator.validate(&json!({
            "metadata": { "name": "w1" },
            "spec": { "widget_name": "abc", "replicas": 11 }
        }));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].expected.as_deref(), Some("<= 10"));
        assert_eq!(result.errors[0].actual.as_deref(), Some("11"));

        let result = validator.validate(&json!({
            "metadata": { "name": "w1" },
            "spec": { "widget_name": "abc", "strategy": "Some" }
        }));
        assert_eq!(
            result.errors[0].expected.as_deref(),
            Some(r#"one of ["Any","All"]"#)
        );
    }

    #[test]
    fn test_attribute_path() {
        assert_eq!(attribute_path(""), "(root)");
        assert_eq!(attribute_path("/metadata/name"), "metadata.name");
        assert_eq!(
            attribute_path("/spec/backup_policies/0/component_def_ref"),
            "spec.backup_policies[0].component_def_ref"
        );
        assert_eq!(
            attribute_path("/metadata/labels/app.kubernetes.io~1name"),
            "metadata.labels.app.kubernetes.io/name"
        );
    }

    #[test]
    fn test_attributes_listing() {
        let entries = widget().attributes();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();

        assert_eq!(paths[0], "metadata");
        assert!(paths.contains(&"metadata.name"));
        assert!(paths.contains(&"spec.widget_name"));
        assert!(paths.contains(&"spec.ports[].container_port"));

        let name = entries.iter().find(|e| e.path == "metadata.name").unwrap();
        assert!(name.required);
        assert_eq!(name.depth, 1);
    }
}
