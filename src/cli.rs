//! CLI: schema → (ajv | joi | zod) validator modules, plus lint and a tree debug view.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde_json::Value;

use crate::codegen::{self, Backend, GeneratedModule};
use crate::config::{CompileOptions, DeclarativeMode};
use crate::error::{Error, Result};
use crate::lint::{self, Finding};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile a JSON Schema into equivalent Ajv, Joi and Zod validator modules
#[derive(Parser, Debug)]
#[command(name = "json-valgen", version)]
pub struct CommandLineInterface {
    /// more log output (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit one validator module per backend
    Compile(CompileOut),
    /// report schema constructs that compile to something looser than written
    Lint(LintOut),
    /// print the parsed schema tree as JSON (debug view)
    Tree(TreeOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to select the schema inside each document (e.g. /definitions/Persona)
    #[arg(long)]
    json_pointer: Option<String>,

    /// jq filter applied to each document; must yield exactly one schema
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CompileOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// backend to emit; repeat for several (default: all, or the config file's list)
    #[arg(long = "backend", short = 'b', value_enum)]
    backends: Vec<Backend>,

    /// how the ajv module gets its schema
    #[arg(long, value_enum)]
    declarative_mode: Option<DeclarativeMode>,

    /// JSON file with compile options
    #[arg(long)]
    config: Option<PathBuf>,

    /// omit the `// validator-*.mjs (generated)` first line
    #[arg(long)]
    no_header: bool,

    /// output directory (stdout if omitted); one subdirectory per input when several
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// refuse schemas with lint findings
    #[arg(long)]
    strict: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct LintOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// print findings as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Parser, Debug)]
struct TreeOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

/// A schema document and where it came from.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub doc: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<SourceDocument>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        source_paths
            .into_iter()
            .map(|path| {
                let doc = read_document(&path)?;
                let doc = self.select(&path, doc)?;
                tracing::debug!(path = %path.display(), "loaded schema document");
                Ok(SourceDocument { path, doc })
            })
            .collect()
    }

    fn select(&self, path: &Path, doc: Value) -> Result<Value> {
        let doc = match self.json_pointer.as_deref() {
            None => doc,
            Some(pointer) => doc.pointer(pointer).cloned().ok_or_else(|| Error::PointerMiss {
                path: path.to_path_buf(),
                pointer: pointer.to_owned(),
            })?,
        };
        match self.jq_expr.as_deref() {
            None => Ok(doc),
            Some(jq_expr) => {
                let mut out = crate::jq_exec::run_jaq(jq_expr, &doc).map_err(|source| Error::Jq {
                    path: path.to_path_buf(),
                    source,
                })?;
                match out.len() {
                    1 => Ok(out.remove(0)),
                    count => Err(Error::JqArity { path: path.to_path_buf(), count }),
                }
            }
        }
    }
}

impl CompileOut {
    fn options(&self) -> Result<CompileOptions> {
        let mut options = match self.config.as_deref() {
            Some(path) => CompileOptions::load(path)?,
            None => CompileOptions::default(),
        };
        if !self.backends.is_empty() {
            options.backends = self.backends.clone();
        }
        if let Some(mode) = self.declarative_mode {
            options.declarative_mode = mode;
        }
        if self.no_header {
            options.header = false;
        }
        options.validate()?;
        Ok(options)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    /// stderr logging; `RUST_LOG` wins over `-v`.
    pub fn init_logging(&self) {
        use tracing_subscriber::EnvFilter;
        let default = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    pub fn run(&self) -> anyhow::Result<ExitCode> {
        match &self.cmd {
            Command::Compile(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(ExitCode::SUCCESS);
                }
                run_compile(target)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Lint(target) => run_lint(target),
            Command::Tree(target) => {
                for source in target.input_settings.load()? {
                    let tree = crate::reader::read_schema(&source.doc);
                    println!("{}", serde_json::to_string_pretty(&tree)?);
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn run_compile(target: &CompileOut) -> Result<()> {
    let options = target.options()?;
    let sources = target.input_settings.load()?;

    // 1) lint + compile every input (independent, so in parallel)
    let compiled = sources
        .par_iter()
        .map(|source| {
            let findings = lint::lint_schema(&source.doc);
            if target.strict && !findings.is_empty() {
                return Err(Error::Lint { path: source.path.clone(), count: findings.len() });
            }
            for finding in &findings {
                tracing::warn!(path = %source.path.display(), "{finding}");
            }
            Ok(codegen::compile_document(&source.doc, &options))
        })
        .collect::<Result<Vec<_>>>()?;

    // 2) hand off, in input order
    match target.out_dir.as_deref() {
        Some(out_dir) => {
            let dirs = output_dirs(out_dir, &sources)?;
            for (dir, modules) in dirs.iter().zip(compiled) {
                for path in write_modules(dir, &modules)? {
                    eprintln!("{} {}", "wrote".green().bold(), path.display());
                }
            }
        }
        None => {
            for module in compiled.iter().flatten() {
                println!("{}", module.source);
            }
        }
    }
    Ok(())
}

fn run_lint(target: &LintOut) -> anyhow::Result<ExitCode> {
    let sources = target.input_settings.load()?;
    let mut total = 0usize;
    let mut report = Vec::new();
    for source in &sources {
        let findings = lint::lint_schema(&source.doc);
        total += findings.len();
        if target.json {
            report.push(serde_json::json!({
                "path": source.path.display().to_string(),
                "findings": findings,
            }));
        } else {
            print_findings(&source.path, &findings);
        }
    }
    if target.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(if total == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_findings(path: &Path, findings: &[Finding]) {
    if findings.is_empty() {
        println!("{} {}", "ok".green().bold(), path.display());
        return;
    }
    println!("{} ({} finding(s))", path.display().to_string().bold(), findings.len());
    for finding in findings {
        println!("  {} {finding}", "warning:".yellow().bold());
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_document(path: &Path) -> Result<Value> {
    let source = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str::<Value>(&source).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write each module as `<dir>/<file_name>`; returns the written paths.
pub fn write_modules(dir: &Path, modules: &[GeneratedModule]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|source| Error::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    modules
        .iter()
        .map(|module| {
            let path = dir.join(&module.file_name);
            std::fs::write(&path, &module.source).map_err(|source| Error::Write {
                path: path.clone(),
                source,
            })?;
            tracing::info!(backend = %module.backend, entry = %module.entry_point, path = %path.display(), "wrote module");
            Ok(path)
        })
        .collect()
}

/// One directory per input: `out_dir` itself for a single input, otherwise
/// `out_dir/<stem>`. Two inputs landing in the same directory is an error.
fn output_dirs(out_dir: &Path, sources: &[SourceDocument]) -> Result<Vec<PathBuf>> {
    if sources.len() <= 1 {
        return Ok(vec![out_dir.to_path_buf(); sources.len()]);
    }
    let mut claimed = IndexMap::<PathBuf, &Path>::new();
    for source in sources {
        let dir = out_dir.join(file_stem(&source.path));
        if let Some(first) = claimed.get(&dir) {
            return Err(Error::OutputCollision {
                dir,
                first: first.to_path_buf(),
                second: source.path.clone(),
            });
        }
        claimed.insert(dir, &source.path);
    }
    Ok(claimed.into_keys().collect())
}

fn file_stem(path: &Path) -> String {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    // persona.schema.json → persona
    stem.strip_suffix(".schema").map(str::to_owned).unwrap_or(stem)
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                return Err(Error::NoMatches(pattern.to_owned()));
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
