//! Schema-shape findings.
//!
//! The reader never fails: whatever it cannot model silently widens toward
//! "accept anything". This walk reports each such spot against the raw
//! document so callers that want strictness can refuse the schema up front.
//! Findings come out depth-first in document order.
use std::fmt;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::ir::Bound;
use crate::reader::non_negative_integer;

/// Keywords the tree has no representation for.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "$ref", "$defs", "definitions", "anyOf", "oneOf", "allOf", "not", "if", "then", "else",
    "const", "multipleOf", "exclusiveMinimum", "exclusiveMaximum", "uniqueItems", "contains",
    "prefixItems", "additionalItems", "unevaluatedItems", "patternProperties", "propertyNames",
    "minProperties", "maxProperties", "dependentRequired", "dependentSchemas",
    "unevaluatedProperties",
];

const KNOWN_TYPES: &[&str] = &["string", "integer", "number", "boolean", "array", "object"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// JSON Pointer into the source document.
    pub pointer: String,
    #[serde(flatten)]
    pub kind: FindingKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum FindingKind {
    NotASchema,
    UnknownType { name: String },
    TypeUnion,
    UnsupportedKeyword { keyword: String },
    UndeclaredRequired { name: String },
    InvalidPattern { message: String },
    MalformedConstraint { keyword: String },
    EnumOverridesType,
    NonPrimitiveEnum,
    IgnoredFormat { format: String },
    TupleItems,
    SchemaAdditionalProperties,
    ProtoFieldName,
}

pub fn lint_schema(doc: &Value) -> Vec<Finding> {
    let mut out = Vec::new();
    walk(doc, "", &mut out);
    out
}

fn walk(value: &Value, pointer: &str, out: &mut Vec<Finding>) {
    let mut push = |kind: FindingKind| out.push(Finding { pointer: pointer.to_owned(), kind });

    let Value::Object(map) = value else {
        push(FindingKind::NotASchema);
        return;
    };

    for key in map.keys() {
        if UNSUPPORTED_KEYWORDS.contains(&key.as_str()) {
            push(FindingKind::UnsupportedKeyword { keyword: key.clone() });
        }
    }

    match map.get("enum") {
        Some(Value::Array(values)) => {
            if map.contains_key("type") {
                push(FindingKind::EnumOverridesType);
            }
            if values.iter().any(|v| v.is_array() || v.is_object()) {
                push(FindingKind::NonPrimitiveEnum);
            }
            // nothing below an enumeration is read
            return;
        }
        Some(_) => push(FindingKind::MalformedConstraint { keyword: "enum".into() }),
        None => {}
    }

    let has_properties = map.get("properties").is_some_and(|p| !p.is_null());
    match map.get("type") {
        Some(Value::String(name)) if KNOWN_TYPES.contains(&name.as_str()) => {}
        Some(Value::String(name)) => push(FindingKind::UnknownType { name: name.clone() }),
        Some(Value::Array(_)) => push(FindingKind::TypeUnion),
        Some(_) => push(FindingKind::MalformedConstraint { keyword: "type".into() }),
        None => {}
    }

    match map.get("type").and_then(Value::as_str) {
        Some("string") => lint_string(map, &mut push),
        Some("integer" | "number") => {
            for keyword in ["minimum", "maximum"] {
                if map.get(keyword).is_some_and(|v| Bound::from_json(v).is_none()) {
                    push(FindingKind::MalformedConstraint { keyword: keyword.into() });
                }
            }
        }
        Some("array") => {
            check_counts(map, &["minItems", "maxItems"], &mut push);
            match map.get("items") {
                Some(Value::Array(_)) => push(FindingKind::TupleItems),
                Some(items) => walk(items, &format!("{pointer}/items"), out),
                None => {}
            }
        }
        Some("boolean") => {}
        Some("object") => lint_object(map, pointer, out),
        _ if has_properties => lint_object(map, pointer, out),
        _ => {}
    }
}

fn lint_string(map: &Map<String, Value>, push: &mut impl FnMut(FindingKind)) {
    check_counts(map, &["minLength", "maxLength"], push);
    match map.get("pattern") {
        Some(Value::String(p)) if !p.is_empty() => {
            if let Err(err) = Regex::new(p) {
                push(FindingKind::InvalidPattern { message: last_line(&err.to_string()) });
            }
        }
        Some(Value::String(_)) | None => {}
        Some(_) => push(FindingKind::MalformedConstraint { keyword: "pattern".into() }),
    }
    if let Some(format) = map.get("format").and_then(Value::as_str) {
        push(FindingKind::IgnoredFormat { format: format.to_owned() });
    }
}

fn lint_object(map: &Map<String, Value>, pointer: &str, out: &mut Vec<Finding>) {
    let mut push = |kind: FindingKind| out.push(Finding { pointer: pointer.to_owned(), kind });

    let properties = match map.get("properties") {
        Some(Value::Object(props)) => Some(props),
        Some(_) => {
            push(FindingKind::MalformedConstraint { keyword: "properties".into() });
            None
        }
        None => None,
    };

    match map.get("required") {
        Some(Value::Array(names)) => {
            for name in names {
                match name.as_str() {
                    Some(name) if properties.is_some_and(|p| p.contains_key(name)) => {}
                    Some(name) => push(FindingKind::UndeclaredRequired { name: name.to_owned() }),
                    None => push(FindingKind::MalformedConstraint { keyword: "required".into() }),
                }
            }
        }
        Some(_) => push(FindingKind::MalformedConstraint { keyword: "required".into() }),
        None => {}
    }

    match map.get("additionalProperties") {
        Some(Value::Bool(_)) | None => {}
        Some(Value::Object(_)) => push(FindingKind::SchemaAdditionalProperties),
        Some(_) => push(FindingKind::MalformedConstraint { keyword: "additionalProperties".into() }),
    }

    for (name, child) in properties.into_iter().flatten() {
        let child_pointer = format!("{pointer}/properties/{}", escape_pointer(name));
        if name == "__proto__" {
            out.push(Finding { pointer: child_pointer.clone(), kind: FindingKind::ProtoFieldName });
        }
        walk(child, &child_pointer, out);
    }
}

fn check_counts(map: &Map<String, Value>, keywords: &[&str], push: &mut impl FnMut(FindingKind)) {
    for keyword in keywords {
        if map.get(*keyword).is_some_and(|v| non_negative_integer(v).is_none()) {
            push(FindingKind::MalformedConstraint { keyword: (*keyword).to_owned() });
        }
    }
}

/// RFC 6901 reference token.
fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// regex errors end with the one-line reason
fn last_line(s: &str) -> String {
    s.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or(s).trim().to_owned()
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.pointer.is_empty() { "/" } else { self.pointer.as_str() };
        write!(f, "{at}: {}", self.kind)
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingKind::NotASchema => write!(f, "not a schema object; accepts anything"),
            FindingKind::UnknownType { name } => write!(f, "unknown type `{name}`; accepts anything"),
            FindingKind::TypeUnion => write!(f, "type unions are not supported; accepts anything"),
            FindingKind::UnsupportedKeyword { keyword } => write!(f, "`{keyword}` is not supported and is ignored"),
            FindingKind::UndeclaredRequired { name } => {
                write!(f, "required field `{name}` is not declared in `properties` and is ignored")
            }
            FindingKind::InvalidPattern { message } => write!(f, "pattern does not parse: {message}"),
            FindingKind::MalformedConstraint { keyword } => write!(f, "malformed `{keyword}` is ignored"),
            FindingKind::EnumOverridesType => write!(f, "`enum` present; `type` and its constraints are ignored"),
            FindingKind::NonPrimitiveEnum => {
                write!(f, "enum holds arrays or objects; only primitive literals compare by value in every backend")
            }
            FindingKind::IgnoredFormat { format } => write!(f, "format `{format}` is not enforced"),
            FindingKind::TupleItems => write!(f, "array-valued `items` (tuples) is not supported; elements accept anything"),
            FindingKind::SchemaAdditionalProperties => {
                write!(f, "`additionalProperties` schema is not supported; object stays open")
            }
            FindingKind::ProtoFieldName => {
                write!(f, "field `__proto__` collides with the JS prototype accessor; backends may disagree on it")
            }
        }
    }
}
