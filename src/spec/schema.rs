//! Depth-limited schema expansion
//!
//! Schemas may reference themselves, so the walk never follows `$ref`s and
//! stops descending at a fixed depth. Whatever lies below the limit is
//! summarized by a placeholder string.

use super::model::{ReferenceOr, Schema};
use serde_json::{json, Map, Value};

/// Expansion depth for schemas embedded in endpoint details
pub const INLINE_SCHEMA_MAX_DEPTH: usize = 2;

/// Expansion depth for an explicitly requested schema
pub const DETAILED_SCHEMA_MAX_DEPTH: usize = 4;

/// Expand a schema node starting at depth 0.
#[must_use]
pub fn expand_schema_ref(node: &ReferenceOr<Schema>, max_depth: usize) -> Value {
    expand_node(node, 0, max_depth)
}

fn expand_node(node: &ReferenceOr<Schema>, depth: usize, max_depth: usize) -> Value {
    match node {
        ReferenceOr::Reference { reference } => json!({ "$ref": reference }),
        ReferenceOr::Item(schema) => expand_schema(schema, depth, max_depth),
    }
}

/// Expand an inline schema found at `depth`.
///
/// Children are expanded while `depth < max_depth`; at the limit, properties,
/// items and composition members are replaced by placeholders.
#[must_use]
pub fn expand_schema(schema: &Schema, depth: usize, max_depth: usize) -> Value {
    let mut out = Map::new();

    if let Some(type_value) = schema_type(schema) {
        out.insert("type".to_string(), type_value);
    }
    if let Some(format) = schema_format(schema) {
        out.insert("format".to_string(), json!(format));
    }
    if let Some(description) = non_empty(schema.description.as_deref()) {
        out.insert("description".to_string(), json!(description));
    }
    if !schema.required.is_empty() {
        out.insert("required".to_string(), json!(schema.required));
    }

    let compositions = composition(schema);

    if depth < max_depth {
        if !schema.properties.is_empty() {
            let properties: Map<String, Value> = schema
                .properties
                .iter()
                .map(|(name, node)| (name.clone(), expand_node(node, depth + 1, max_depth)))
                .collect();
            out.insert("properties".to_string(), Value::Object(properties));
        }
        if let Some(items) = &schema.items {
            out.insert("items".to_string(), expand_node(items, depth + 1, max_depth));
        }
        for (key, members) in compositions {
            let expanded = members
                .iter()
                .map(|member| expand_node(member, depth + 1, max_depth))
                .collect();
            out.insert(key.to_string(), Value::Array(expanded));
        }
    } else {
        if !schema.properties.is_empty() {
            out.insert(
                "properties".to_string(),
                json!(format!("[{} properties not expanded]", schema.properties.len())),
            );
        }
        if schema.items.is_some() {
            out.insert("items".to_string(), json!("[not expanded]"));
        }
        for (key, members) in compositions {
            out.insert(
                key.to_string(),
                json!(format!("[{} schemas not expanded]", members.len())),
            );
        }
    }

    if !schema.enumeration.is_empty() {
        out.insert("enum".to_string(), json!(schema.enumeration));
    }

    Value::Object(out)
}

/// Declared type: a string for one type, an array for several
#[must_use]
pub fn schema_type(schema: &Schema) -> Option<Value> {
    schema.schema_type.as_ref().and_then(|types| types.to_value())
}

/// Declared format (`int64`, `date-time`, `uuid`, ...), if any
#[must_use]
pub fn schema_format(schema: &Schema) -> Option<&str> {
    non_empty(schema.format.as_deref())
}

/// Non-empty composition lists in a fixed key order
fn composition(schema: &Schema) -> impl Iterator<Item = (&'static str, &[ReferenceOr<Schema>])> {
    [
        ("oneOf", schema.one_of.as_slice()),
        ("allOf", schema.all_of.as_slice()),
        ("anyOf", schema.any_of.as_slice()),
    ]
    .into_iter()
    .filter(|(_, members)| !members.is_empty())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
