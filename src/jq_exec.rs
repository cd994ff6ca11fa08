//! jq pre-filter for schema documents (e.g. `.definitions.Persona` out of a bundle).
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum JqError {
    #[error("{0}")]
    Parse(String),
    #[error("{0}")]
    Undefined(String),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("filter output is not JSON: {0}")]
    Output(#[from] serde_json::Error),
}

/// Run `filter_src` over `input`, collecting every output document.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>, JqError> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let mut it = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    while let Some(item) = it.next() {
        let v = item.map_err(|e| JqError::Runtime(format!("{e:?}")))?;
        // Val: Display -> JSON text
        out.push(serde_json::from_str::<Value>(&v.to_string())?);
    }
    Ok(out)
}

fn format_parse_errors(
    errs: Vec<(load::File<&str, ()>, load::Error<&str>)>,
) -> JqError {
    let mut s = String::new();
    for (file, err) in errs {
        s.push_str(&format!("parse error: {err:?} in `{}`\n", file.code));
    }
    JqError::Parse(s.trim_end().to_owned())
}

fn format_undefined_errors(
    errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>,
) -> JqError {
    let mut s = String::new();
    for (file, list) in errs {
        for (name, undef) in list {
            s.push_str(&format!("undefined `{name}`: {undef:?} in `{}`\n", file.code));
        }
    }
    JqError::Undefined(s.trim_end().to_owned())
}
