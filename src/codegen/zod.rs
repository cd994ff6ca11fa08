//! Chainable backend: Zod.
//!
//! Optionality is a wrapper (`.optional()`), strictness is `.strict()`. Zod's
//! default object already tolerates unknown keys, so open objects need no modifier.
use serde_json::Value;

use super::js;
use super::{Backend, Emitter, FieldExpr, GeneratedModule};
use crate::config::CompileOptions;
use crate::ir::{NumericConstraints, StringConstraints};

pub struct ZodEmitter<'a> {
    options: &'a CompileOptions,
}

impl<'a> ZodEmitter<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Self { options }
    }
}

impl Emitter for ZodEmitter<'_> {
    type Expr = String;

    fn emit_enum(&self, values: &[Value]) -> String {
        match values {
            [] => "z.never()".to_owned(),
            _ if values.iter().all(Value::is_string) => {
                // z.enum takes a tuple of strings
                let items = values.iter().map(js::literal).collect::<Vec<_>>().join(",");
                format!("z.enum([{items}])")
            }
            [single] => format!("z.literal({})", js::literal(single)),
            _ => {
                let arms = values
                    .iter()
                    .map(|v| format!("z.literal({})", js::literal(v)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("z.union([{arms}])")
            }
        }
    }

    fn emit_string(&self, c: &StringConstraints) -> String {
        let mut out = "z.string()".to_owned();
        if let Some(n) = c.min_length {
            out += &format!(".min({n})");
        }
        if let Some(n) = c.max_length {
            out += &format!(".max({n})");
        }
        if let Some(p) = &c.pattern {
            out += &format!(".regex({})", js::regexp(p));
        }
        out
    }

    fn emit_number(&self, integral: bool, c: &NumericConstraints) -> String {
        let mut out = if integral { "z.number().int()" } else { "z.number()" }.to_owned();
        if let Some(b) = c.minimum {
            out += &format!(".gte({b})");
        }
        if let Some(b) = c.maximum {
            out += &format!(".lte({b})");
        }
        out
    }

    fn emit_boolean(&self) -> String {
        "z.boolean()".to_owned()
    }

    fn emit_array(&self, items: String, min_items: Option<u64>, max_items: Option<u64>) -> String {
        let mut out = format!("z.array({items})");
        if let Some(n) = min_items {
            out += &format!(".min({n})");
        }
        if let Some(n) = max_items {
            out += &format!(".max({n})");
        }
        out
    }

    fn emit_object(&self, fields: Vec<FieldExpr<'_, String>>, closed: bool) -> String {
        let entries = fields.into_iter().map(|FieldExpr { field, expr }| {
            let expr = if !field.required {
                format!("{expr}.optional()")
            } else if field.schema.accepts_anything() {
                // z.any() alone also passes when the key is missing
                format!("{expr}.refine((value) => value !== undefined, {{ message: \"Required\" }})")
            } else {
                expr
            };
            (field.name, expr)
        });
        let mut out = format!("z.object({})", js::object_literal(entries));
        if closed {
            out += ".strict()";
        }
        out
    }

    fn emit_any(&self) -> String {
        "z.any()".to_owned()
    }

    fn wrap_module(&self, root: String) -> GeneratedModule {
        let backend = Backend::Chainable;
        let file_name = backend.file_name();
        let entry_point = self.options.entry_point(backend).to_owned();
        let source = format!(
            r#"{header}import {{ z }} from "zod";

const schemaZ = {root};

export function {entry_point}(data) {{
  const res = schemaZ.safeParse(data);
  return {{
    valid: res.success,
    errors: res.success ? [] : res.error.issues
  }};
}}
"#,
            header = js::header(&file_name, self.options.header),
        );
        GeneratedModule { backend, file_name, entry_point, source }
    }
}
