//! Multi-target validator codegen.
//!
//! One [`SchemaNode`] tree is compiled into one self-contained ES module per
//! [`Backend`]. The walk is shared ([`translate`]); each backend only supplies
//! its token vocabulary through the [`Emitter`] trait:
//!
//! - enumeration short-circuits everything else on a node,
//! - constraints are appended in a fixed order (min, max, pattern),
//! - object fields keep declaration order; optional fields get the backend's
//!   optionality marker; closed objects get its strictness modifier,
//! - anything unrecognized becomes the backend's accept-anything expression.
//!
//! Every generated module exports one `entry(data) -> { valid, errors }`.
//! Output is a pure function of (tree, backend, options): no clocks, no hash
//! iteration order, no environment.
pub mod ajv;
pub mod joi;
pub mod js;
pub mod zod;

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{CompileOptions, DeclarativeMode};
use crate::ir::{Field, NumericConstraints, SchemaNode, StringConstraints};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
pub enum Backend {
    /// Ajv: the schema itself is the validator.
    #[serde(rename = "ajv", alias = "declarative")]
    #[value(name = "ajv", alias = "declarative")]
    Declarative,
    /// Joi: builder calls with explicit `.required()` / `.optional()`.
    #[serde(rename = "joi", alias = "fluent")]
    #[value(name = "joi", alias = "fluent")]
    Fluent,
    /// Zod: chained assertions, optionality as a wrapper.
    #[serde(rename = "zod", alias = "chainable")]
    #[value(name = "zod", alias = "chainable")]
    Chainable,
}

/// One generated ES module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    pub backend: Backend,
    pub file_name: String,
    /// Name of the single exported function.
    pub entry_point: String,
    pub source: String,
}

/// A translated field handed to [`Emitter::emit_object`].
#[derive(Debug, Clone)]
pub struct FieldExpr<'a, E> {
    pub field: Field<'a>,
    pub expr: E,
}

/// One backend's vocabulary. [`translate`] drives it bottom-up.
pub trait Emitter {
    type Expr;

    fn emit_enum(&self, values: &[Value]) -> Self::Expr;
    fn emit_string(&self, constraints: &StringConstraints) -> Self::Expr;
    fn emit_number(&self, integral: bool, constraints: &NumericConstraints) -> Self::Expr;
    fn emit_boolean(&self) -> Self::Expr;
    fn emit_array(&self, items: Self::Expr, min_items: Option<u64>, max_items: Option<u64>) -> Self::Expr;
    fn emit_object(&self, fields: Vec<FieldExpr<'_, Self::Expr>>, closed: bool) -> Self::Expr;
    fn emit_any(&self) -> Self::Expr;

    fn wrap_module(&self, root: Self::Expr) -> GeneratedModule;
}

// ————————————————————————————————————————————————————————————————————————————
// SHARED TRAVERSAL
// ————————————————————————————————————————————————————————————————————————————

pub fn translate<E: Emitter + ?Sized>(node: &SchemaNode, emitter: &E) -> E::Expr {
    tracing::trace!(kind = %node.kind(), "translate");
    match node {
        SchemaNode::Enumeration { values } => emitter.emit_enum(values),
        SchemaNode::String(c) => emitter.emit_string(c),
        SchemaNode::Integer(c) => emitter.emit_number(true, c),
        SchemaNode::Number(c) => emitter.emit_number(false, c),
        SchemaNode::Boolean => emitter.emit_boolean(),
        SchemaNode::Array(arr) => {
            let items = translate(&arr.items, emitter);
            emitter.emit_array(items, arr.min_items, arr.max_items)
        }
        SchemaNode::Object(obj) => {
            let fields = obj
                .fields()
                .map(|field| FieldExpr { expr: translate(field.schema, emitter), field })
                .collect();
            emitter.emit_object(fields, obj.closed)
        }
        SchemaNode::Unconstrained => emitter.emit_any(),
    }
}

pub fn emit_module<E: Emitter + ?Sized>(node: &SchemaNode, emitter: &E) -> GeneratedModule {
    emitter.wrap_module(translate(node, emitter))
}

// ————————————————————————————————————————————————————————————————————————————
// FRONT API
// ————————————————————————————————————————————————————————————————————————————

/// Compile with default options.
pub fn compile(node: &SchemaNode, backend: Backend) -> GeneratedModule {
    compile_with(node, backend, &CompileOptions::default())
}

/// Compile through the shared translator, whatever `declarative_mode` says.
/// Pass-through needs the source document; see [`compile_document`].
pub fn compile_with(node: &SchemaNode, backend: Backend, options: &CompileOptions) -> GeneratedModule {
    let module = match backend {
        Backend::Declarative => emit_module(node, &ajv::AjvEmitter::new(options)),
        Backend::Fluent => emit_module(node, &joi::JoiEmitter::new(options)),
        Backend::Chainable => emit_module(node, &zod::ZodEmitter::new(options)),
    };
    tracing::debug!(
        %backend,
        file = %module.file_name,
        nodes = node.node_count(),
        bytes = module.source.len(),
        "compiled module"
    );
    module
}

/// Every backend in `options.backends`, in that order.
///
/// Backends compile in parallel; the result is identical to compiling them
/// one after another.
pub fn compile_all(node: &SchemaNode, options: &CompileOptions) -> Vec<GeneratedModule> {
    options
        .backends
        .par_iter()
        .map(|backend| compile_with(node, *backend, options))
        .collect()
}

/// Read `doc` and compile every selected backend, honoring
/// [`DeclarativeMode::Passthrough`] for the declarative one.
pub fn compile_document(doc: &Value, options: &CompileOptions) -> Vec<GeneratedModule> {
    let node = crate::reader::read_schema(doc);
    options
        .backends
        .par_iter()
        .map(|backend| match (backend, options.declarative_mode) {
            (Backend::Declarative, DeclarativeMode::Passthrough) => {
                ajv::compile_passthrough(doc, options)
            }
            _ => compile_with(&node, *backend, options),
        })
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// BACKEND METADATA
// ————————————————————————————————————————————————————————————————————————————

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Declarative, Backend::Fluent, Backend::Chainable];

    /// npm package the generated module imports.
    pub fn library(&self) -> &'static str {
        match self {
            Backend::Declarative => "ajv",
            Backend::Fluent => "joi",
            Backend::Chainable => "zod",
        }
    }

    pub fn file_name(&self) -> String {
        format!("validator-{}.mjs", self.library())
    }

    pub fn default_entry_point(&self) -> &'static str {
        match self {
            Backend::Declarative => "validateAjv",
            Backend::Fluent => "validateJoi",
            Backend::Chainable => "validateZod",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.library())
    }
}
