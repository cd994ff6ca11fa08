// Strongly-typed schema tree for codegen. Built once by `reader`, never mutated afterwards.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use ordered_float::OrderedFloat;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SchemaNode {
    /// `enum` wins over any `type` on the same node.
    Enumeration { values: Vec<Value> },
    String(StringConstraints),
    Integer(NumericConstraints),
    Number(NumericConstraints),
    Boolean,
    Array(ArraySchema),
    Object(ObjectSchema),
    /// absent / unknown `type`: accept anything
    Unconstrained,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StringConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Regular expression source text, kept byte-for-byte.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericConstraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Bound>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArraySchema {
    pub items: Box<SchemaNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectSchema {
    /// Declaration order from the source document.
    pub fields: IndexMap<String, SchemaNode>,
    /// As listed in the source; may name fields that were never declared.
    pub required: IndexSet<String>,
    /// `additionalProperties: false`
    pub closed: bool,
}

/// A declared field as seen by the emitters.
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    pub name: &'a str,
    pub schema: &'a SchemaNode,
    pub required: bool,
}

/// Inclusive numeric bound, kept integral when the source wrote an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Bound {
    Int(i64),
    Float(OrderedFloat<f64>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Enumeration,
    Unconstrained,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl SchemaNode {
    pub fn kind(&self) -> Kind {
        match self {
            SchemaNode::Enumeration { .. } => Kind::Enumeration,
            SchemaNode::String(_) => Kind::String,
            SchemaNode::Integer(_) => Kind::Integer,
            SchemaNode::Number(_) => Kind::Number,
            SchemaNode::Boolean => Kind::Boolean,
            SchemaNode::Array(_) => Kind::Array,
            SchemaNode::Object(_) => Kind::Object,
            SchemaNode::Unconstrained => Kind::Unconstrained,
        }
    }

    pub fn accepts_anything(&self) -> bool {
        matches!(self, SchemaNode::Unconstrained)
    }

    /// Number of nodes in this subtree, root included.
    pub fn node_count(&self) -> usize {
        1 + match self {
            SchemaNode::Array(arr) => arr.items.node_count(),
            SchemaNode::Object(obj) => obj.fields.values().map(SchemaNode::node_count).sum(),
            _ => 0,
        }
    }
}

impl ObjectSchema {
    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// Declared fields in declaration order, with requiredness resolved.
    pub fn fields(&self) -> impl Iterator<Item = Field<'_>> + '_ {
        self.fields.iter().map(|(name, schema)| Field {
            name: name.as_str(),
            schema,
            required: self.is_required(name),
        })
    }
}

impl Bound {
    pub fn from_json(value: &Value) -> Option<Self> {
        let Value::Number(n) = value else { return None };
        if let Some(i) = n.as_i64() {
            return Some(Bound::Int(i));
        }
        n.as_f64()
            .filter(|f| f.is_finite())
            .map(|f| Bound::Float(OrderedFloat(f)))
    }

    /// Prefer integers when exact.
    pub fn to_json(&self) -> Value {
        match *self {
            Bound::Int(i) => Value::from(i),
            Bound::Float(f) => match exact_i64(f.0) {
                Some(i) => Value::from(i),
                None => Value::from(f.0),
            },
        }
    }
}

/// Renders as a JavaScript numeric literal.
impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Bound::Int(i) => write!(f, "{i}"),
            Bound::Float(x) => match exact_i64(x.0) {
                Some(i) => write!(f, "{i}"),
                None => write!(f, "{}", x.0),
            },
        }
    }
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Integer => "integer",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Array => "array",
            Kind::Object => "object",
            Kind::Enumeration => "enumeration",
            Kind::Unconstrained => "unconstrained",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn exact_i64(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}
