//! Compile options: which backends to emit and how.
//!
//! Options come from an optional JSON file (`--config`) and are then
//! overridden by CLI flags. Every field has a default, so `{}` is a valid file.
use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::codegen::Backend;
use crate::error::Error;

static JS_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex is valid")
});

const JS_RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield", "let", "static",
];

/// How the declarative (Ajv) backend obtains its schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeclarativeMode {
    /// Rebuild the JSON Schema from the parsed tree, like the other backends.
    #[default]
    Translated,
    /// Embed the source document verbatim and let Ajv interpret it.
    #[serde(alias = "pass-through")]
    #[value(alias = "pass-through")]
    Passthrough,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    /// Backends to emit, in output order.
    pub backends: Vec<Backend>,
    pub declarative_mode: DeclarativeMode,
    /// Exported function name overrides.
    pub entry_points: BTreeMap<Backend, String>,
    /// Start each module with a `// <file> (generated)` line.
    pub header: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionsError {
    #[error("no backends selected")]
    NoBackends,
    #[error("backend `{0}` listed more than once")]
    DuplicateBackend(Backend),
    #[error("entry point `{name}` for backend `{backend}` is not a valid JavaScript identifier")]
    InvalidEntryPoint { backend: Backend, name: String },
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            backends: Backend::ALL.to_vec(),
            declarative_mode: DeclarativeMode::default(),
            entry_points: BTreeMap::new(),
            header: true,
        }
    }
}

impl CompileOptions {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let options = crate::path_de::from_str_with_path::<Self>(&source).map_err(|source| {
            Error::Config { path: path.to_path_buf(), source }
        })?;
        options.validate()?;
        tracing::debug!(path = %path.display(), ?options, "loaded compile options");
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.backends.is_empty() {
            return Err(OptionsError::NoBackends);
        }
        for (i, backend) in self.backends.iter().enumerate() {
            if self.backends[..i].contains(backend) {
                return Err(OptionsError::DuplicateBackend(*backend));
            }
        }
        for (backend, name) in &self.entry_points {
            if !is_js_identifier(name) {
                return Err(OptionsError::InvalidEntryPoint {
                    backend: *backend,
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn entry_point(&self, backend: Backend) -> &str {
        self.entry_points
            .get(&backend)
            .map(String::as_str)
            .unwrap_or_else(|| backend.default_entry_point())
    }
}

pub fn is_js_identifier(name: &str) -> bool {
    JS_IDENTIFIER.is_match(name) && !JS_RESERVED.contains(&name)
}
