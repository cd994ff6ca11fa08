//! Raw JSON Schema document → [`SchemaNode`] tree.
//!
//! This is a structural projection, not a validator: anything the tree cannot
//! express (unknown types, malformed bounds, composition keywords) is read as
//! "not specified" and the node degrades toward [`SchemaNode::Unconstrained`].
//! Use [`crate::lint`] to surface those gaps.
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

use crate::ir::{ArraySchema, Bound, NumericConstraints, ObjectSchema, SchemaNode, StringConstraints};

pub fn read_schema(doc: &Value) -> SchemaNode {
    match doc {
        Value::Object(map) => read_object_node(map),
        // `null`, booleans (`true`/`false` schemas), and anything else.
        _ => SchemaNode::Unconstrained,
    }
}

fn read_object_node(map: &Map<String, Value>) -> SchemaNode {
    // 1) enumeration short-circuits type dispatch
    if let Some(Value::Array(values)) = map.get("enum") {
        return SchemaNode::Enumeration { values: values.clone() };
    }

    // 2) dispatch on `type`
    match map.get("type").and_then(Value::as_str) {
        Some("string") => SchemaNode::String(StringConstraints {
            min_length: map.get("minLength").and_then(non_negative_integer),
            max_length: map.get("maxLength").and_then(non_negative_integer),
            pattern: map
                .get("pattern")
                .and_then(Value::as_str)
                .filter(|p| !p.is_empty())
                .map(str::to_owned),
        }),
        Some("integer") => SchemaNode::Integer(read_numeric(map)),
        Some("number") => SchemaNode::Number(read_numeric(map)),
        Some("boolean") => SchemaNode::Boolean,
        Some("array") => SchemaNode::Array(ArraySchema {
            items: Box::new(map.get("items").map(read_schema).unwrap_or(SchemaNode::Unconstrained)),
            min_items: map.get("minItems").and_then(non_negative_integer),
            max_items: map.get("maxItems").and_then(non_negative_integer),
        }),
        Some("object") => SchemaNode::Object(read_object(map)),
        // no usable `type`, but shaped like an object
        _ if map.get("properties").is_some_and(|p| !p.is_null()) => {
            SchemaNode::Object(read_object(map))
        }
        _ => SchemaNode::Unconstrained,
    }
}

fn read_numeric(map: &Map<String, Value>) -> NumericConstraints {
    NumericConstraints {
        minimum: map.get("minimum").and_then(Bound::from_json),
        maximum: map.get("maximum").and_then(Bound::from_json),
    }
}

fn read_object(map: &Map<String, Value>) -> ObjectSchema {
    let fields: IndexMap<String, SchemaNode> = match map.get("properties") {
        Some(Value::Object(props)) => props
            .iter()
            .map(|(name, child)| (name.clone(), read_schema(child)))
            .collect(),
        _ => IndexMap::new(),
    };
    let required: IndexSet<String> = match map.get("required") {
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
        _ => IndexSet::new(),
    };
    let closed = matches!(map.get("additionalProperties"), Some(Value::Bool(false)));
    ObjectSchema { fields, required, closed }
}

/// Lengths and item counts: non-negative integers, or floats with no fraction.
pub(crate) fn non_negative_integer(value: &Value) -> Option<u64> {
    let Value::Number(n) = value else { return None };
    if let Some(u) = n.as_u64() {
        return Some(u);
    }
    n.as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
        .map(|f| f as u64)
}
