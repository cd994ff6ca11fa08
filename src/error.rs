//! Errors of the I/O layers around the compiler.
//!
//! The reader and the code generator are total and have no error type;
//! everything here comes from files, globs, jq filters, or configuration.
use std::path::PathBuf;

use crate::config::OptionsError;
use crate::jq_exec::JqError;
use crate::path_de::PathError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse JSON source file ({}): {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("JSON pointer `{pointer}` selects nothing in {}", path.display())]
    PointerMiss { path: PathBuf, pointer: String },
    #[error("failed to apply jq expression to source file ({}): {source}", path.display())]
    Jq {
        path: PathBuf,
        #[source]
        source: JqError,
    },
    #[error("jq expression produced {count} documents for {}; expected exactly one schema", path.display())]
    JqArity { path: PathBuf, count: usize },
    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: PathError,
    },
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
    #[error("glob pattern matched no files: {0}")]
    NoMatches(String),
    #[error(
        "{} and {} would both be written to {}",
        first.display(),
        second.display(),
        dir.display()
    )]
    OutputCollision { dir: PathBuf, first: PathBuf, second: PathBuf },
    #[error("{} has {count} schema lint finding(s); refusing to compile in strict mode", path.display())]
    Lint { path: PathBuf, count: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
