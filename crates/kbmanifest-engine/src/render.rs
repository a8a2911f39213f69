//! Table-driven manifest rendering
//!
//! One renderer serves every kind: it walks the kind table and copies each
//! configured attribute to its manifest field. Output key order is
//! `apiVersion`, `kind`, `metadata`, `spec`, then table declaration order;
//! map keys are sorted so the same configuration always renders the same
//! bytes.

use indexmap::IndexMap;
use kbmanifest_core::{strip_nulls, FieldSchema, FieldType, KindSchema};
use serde_json::Value as JsonValue;
use serde_yaml::{Mapping, Value as YamlValue};
use std::collections::BTreeMap;

use crate::error::Result;

/// Build the manifest document for `config`
///
/// `config` is expected to have passed validation. Unset (`null` or absent)
/// attributes are omitted, as are empty lists and maps.
pub fn build_manifest(schema: &KindSchema, config: &JsonValue) -> Result<YamlValue> {
    let config = strip_nulls(config);

    let mut doc = Mapping::new();
    doc.insert("apiVersion".into(), YamlValue::String(schema.api_version()));
    doc.insert("kind".into(), YamlValue::String(schema.kind.clone()));

    let tree = schema.attribute_tree();
    if let (Some(props), JsonValue::Object(attrs)) = (&tree.properties, &config) {
        for (key, value) in copy_fields(props, attrs) {
            doc.insert(key, value);
        }
    }

    Ok(YamlValue::Mapping(doc))
}

/// Render `config` as a YAML manifest
pub fn render_manifest(schema: &KindSchema, config: &JsonValue) -> Result<String> {
    let doc = build_manifest(schema, config)?;
    Ok(serde_yaml::to_string(&doc)?)
}

fn copy_fields(
    props: &IndexMap<String, FieldSchema>,
    attrs: &serde_json::Map<String, JsonValue>,
) -> Mapping {
    let mut out = Mapping::new();

    for (name, field) in props {
        let Some(value) = attrs.get(&field.attribute_name(name)) else {
            continue;
        };
        if let Some(converted) = convert(field, value) {
            out.insert(YamlValue::String(name.clone()), converted);
        }
    }

    out
}

/// Convert one attribute value; `None` means the field is left out
fn convert(field: &FieldSchema, value: &JsonValue) -> Option<YamlValue> {
    match (field.field_type, value) {
        (_, JsonValue::Null) => None,
        (FieldType::Object, JsonValue::Object(attrs)) => {
            let props = field.properties.as_ref()?;
            Some(YamlValue::Mapping(copy_fields(props, attrs)))
        }
        (FieldType::List, JsonValue::Array(items)) => {
            if items.is_empty() {
                return None;
            }
            let converted: Vec<YamlValue> = match field.items.as_deref() {
                Some(item_schema) => items
                    .iter()
                    .filter_map(|item| convert(item_schema, item))
                    .collect(),
                None => items.iter().map(to_yaml).collect(),
            };
            Some(YamlValue::Sequence(converted))
        }
        (FieldType::Map, JsonValue::Object(entries)) => {
            if entries.is_empty() {
                return None;
            }
            let sorted: BTreeMap<&String, &JsonValue> = entries.iter().collect();
            let mut out = Mapping::new();
            for (key, value) in sorted {
                out.insert(YamlValue::String(key.clone()), to_yaml(value));
            }
            Some(YamlValue::Mapping(out))
        }
        (FieldType::Integer | FieldType::IntOrString, JsonValue::Number(n)) => {
            Some(integral(n).unwrap_or_else(|| to_yaml(value)))
        }
        _ => Some(to_yaml(value)),
    }
}

/// Integer fields accept integral floats (`3.0`); emit them as `3`
fn integral(n: &serde_json::Number) -> Option<YamlValue> {
    if n.is_i64() || n.is_u64() {
        return None;
    }
    let f = n.as_f64()?;
    if f.fract() != 0.0 || f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return None;
    }
    Some(YamlValue::Number((f as i64).into()))
}

/// Verbatim JSON to YAML conversion
fn to_yaml(value: &JsonValue) -> YamlValue {
    match value {
        JsonValue::Null => YamlValue::Null,
        JsonValue::Bool(b) => YamlValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                YamlValue::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                YamlValue::Number(u.into())
            } else {
                YamlValue::Number(n.as_f64().unwrap_or_default().into())
            }
        }
        JsonValue::String(s) => YamlValue::String(s.clone()),
        JsonValue::Array(items) => YamlValue::Sequence(items.iter().map(to_yaml).collect()),
        JsonValue::Object(entries) => {
            let mut out = Mapping::new();
            for (key, value) in entries {
                out.insert(YamlValue::String(key.clone()), to_yaml(value));
            }
            YamlValue::Mapping(out)
        }
    }
}
