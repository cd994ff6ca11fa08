//! Compile one JSON Schema into three equivalent JavaScript validators.
//!
//! ```text
//! schema.json ──reader──▶ SchemaNode ──codegen──▶ validator-ajv.mjs  (Ajv, declarative)
//!                                              ├─▶ validator-joi.mjs  (Joi, fluent)
//!                                              └─▶ validator-zod.mjs  (Zod, chainable)
//! ```
//!
//! Each generated module exports one `entry(data) -> { valid, errors }`, and
//! for any record the three agree on `valid`. [`reader`] and [`codegen`] are
//! pure and infallible; I/O lives in [`cli`].
pub mod cli;
pub mod codegen;
pub mod config;
pub mod error;
pub mod ir;
pub mod jq_exec;
pub mod lint;
pub mod path_de;
pub mod reader;

pub use codegen::{compile, compile_all, compile_document, compile_with, Backend, Emitter, GeneratedModule};
pub use config::{CompileOptions, DeclarativeMode};
pub use error::Error;
pub use ir::SchemaNode;
pub use reader::read_schema;
