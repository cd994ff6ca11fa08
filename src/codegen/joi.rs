//! Fluent backend: Joi.
//!
//! Joi's defaults differ from JSON Schema in four places, each corrected here:
//! - `Joi.string()` rejects `""`; `.allow("")` is added when the schema would accept it.
//!   With a pattern, only the JS `RegExp` itself can tell, so the module asks it
//!   at load time through `patternJ`.
//! - `Joi.number()` rejects numbers past `Number.MAX_SAFE_INTEGER`; `.unsafe()` lifts that.
//! - `Joi.object()` rejects unknown keys; open objects get `.unknown(true)`.
//! - `validate` coerces (`"5"` passes as a number); modules pass `convert: false`.
use std::cell::Cell;

use serde_json::Value;

use super::js;
use super::{Backend, Emitter, FieldExpr, GeneratedModule};
use crate::config::CompileOptions;
use crate::ir::{NumericConstraints, StringConstraints};

const PATTERN_HELPER: &str = "\
const patternJ = (schema, re) => (re.test(\"\") ? schema.pattern(re).allow(\"\") : schema.pattern(re));

";

pub struct JoiEmitter<'a> {
    options: &'a CompileOptions,
    /// Set once any string node goes through `patternJ`.
    uses_pattern_helper: Cell<bool>,
}

impl<'a> JoiEmitter<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Self { options, uses_pattern_helper: Cell::new(false) }
    }
}

impl Emitter for JoiEmitter<'_> {
    type Expr = String;

    fn emit_enum(&self, values: &[Value]) -> String {
        if values.is_empty() {
            // Joi.valid() needs at least one value
            return r#"Joi.any().custom((value, helpers) => helpers.error("any.invalid"))"#.to_owned();
        }
        let items = values.iter().map(js::literal).collect::<Vec<_>>().join(", ");
        format!("Joi.valid({items})")
    }

    fn emit_string(&self, c: &StringConstraints) -> String {
        let mut out = "Joi.string()".to_owned();
        if let Some(n) = c.min_length {
            out += &format!(".min({n})");
        }
        if let Some(n) = c.max_length {
            out += &format!(".max({n})");
        }
        let empty_ruled_out = c.min_length.is_some_and(|n| n > 0);
        match &c.pattern {
            Some(p) if empty_ruled_out => out += &format!(".pattern({})", js::regexp(p)),
            Some(p) => {
                self.uses_pattern_helper.set(true);
                out = format!("patternJ({out}, {})", js::regexp(p));
            }
            None if empty_ruled_out => {}
            None => out += r#".allow("")"#,
        }
        out
    }

    fn emit_number(&self, integral: bool, c: &NumericConstraints) -> String {
        let mut out = "Joi.number().unsafe()".to_owned();
        if integral {
            out += ".integer()";
        }
        if let Some(b) = c.minimum {
            out += &format!(".min({b})");
        }
        if let Some(b) = c.maximum {
            out += &format!(".max({b})");
        }
        out
    }

    fn emit_boolean(&self) -> String {
        "Joi.boolean()".to_owned()
    }

    fn emit_array(&self, items: String, min_items: Option<u64>, max_items: Option<u64>) -> String {
        let mut out = format!("Joi.array().items({items})");
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
            let presence = if field.required { ".required()" } else { ".optional()" };
            (field.name, format!("{expr}{presence}"))
        });
        let unknown = if closed { ".unknown(false)" } else { ".unknown(true)" };
        format!("Joi.object({}){unknown}", js::object_literal(entries))
    }

    fn emit_any(&self) -> String {
        "Joi.any()".to_owned()
    }

    fn wrap_module(&self, root: String) -> GeneratedModule {
        let backend = Backend::Fluent;
        let file_name = backend.file_name();
        let entry_point = self.options.entry_point(backend).to_owned();
        let source = format!(
            r#"{header}import Joi from "joi";

{helpers}const schemaJ = {root};

export function {entry_point}(data) {{
  const {{ error }} = schemaJ.validate(data, {{ abortEarly: false, convert: false }});
  return {{ valid: !error, errors: error ? error.details : [] }};
}}
"#,
            header = js::header(&file_name, self.options.header),
            helpers = if self.uses_pattern_helper.get() { PATTERN_HELPER } else { "" },
        );
        GeneratedModule { backend, file_name, entry_point, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::{compile, translate};
    use crate::reader::read_schema;
    use serde_json::json;

    fn expr(doc: Value) -> String {
        let options = CompileOptions::default();
        translate(&read_schema(&doc), &JoiEmitter::new(&options))
    }

    #[test]
    fn empty_string_policy() {
        assert_eq!(expr(json!({"type": "string"})), r#"Joi.string().allow("")"#);
        assert_eq!(expr(json!({"type": "string", "minLength": 0})), r#"Joi.string().min(0).allow("")"#);
        assert_eq!(expr(json!({"type": "string", "minLength": 2, "maxLength": 50})), "Joi.string().min(2).max(50)");
        assert_eq!(
            expr(json!({"type": "string", "minLength": 1, "pattern": "^a*$"})),
            r#"Joi.string().min(1).pattern(new RegExp("^a*$"))"#
        );
    }

    #[test]
    fn patterns_defer_the_empty_string_to_the_js_regexp() {
        // lookaround: JS accepts "" here
        assert_eq!(
            expr(json!({"type": "string", "pattern": "^(?![0-9]).*$"})),
            r#"patternJ(Joi.string(), new RegExp("^(?![0-9]).*$"))"#
        );
        // non-unicode JS reads \p{L} as "p{L}", so "" fails here
        assert_eq!(
            expr(json!({"type": "string", "maxLength": 4, "pattern": "\\p{L}*"})),
            r#"patternJ(Joi.string().max(4), new RegExp("\\p{L}*"))"#
        );
    }

    #[test]
    fn pattern_helper_is_defined_only_when_used() {
        let with = compile(&read_schema(&json!({"type": "string", "pattern": "^[0-9]{5}$"})), Backend::Fluent);
        assert!(with.source.contains(&format!("import Joi from \"joi\";\n\n{PATTERN_HELPER}const schemaJ = ")));
        assert_eq!(with.source.matches("const patternJ = ").count(), 1);

        let without = compile(&read_schema(&json!({"type": "string", "minLength": 1})), Backend::Fluent);
        assert!(!without.source.contains("patternJ"));
    }

    #[test]
    fn numbers_lift_the_safe_integer_limit() {
        assert_eq!(expr(json!({"type": "integer", "minimum": 1})), "Joi.number().unsafe().integer().min(1)");
        assert_eq!(
            expr(json!({"type": "number", "minimum": -1.5, "maximum": 1e3})),
            "Joi.number().unsafe().min(-1.5).max(1000)"
        );
    }

    #[test]
    fn enumeration_uses_valid() {
        assert_eq!(expr(json!({"type": "string", "enum": ["user", "admin", 1, null]})), r#"Joi.valid("user", "admin", 1, null)"#);
        assert_eq!(expr(json!({"enum": []})), r#"Joi.any().custom((value, helpers) => helpers.error("any.invalid"))"#);
    }

    #[test]
    fn arrays_use_items() {
        assert_eq!(
            expr(json!({"type": "array", "items": {"enum": ["a"]}, "minItems": 1})),
            r#"Joi.array().items(Joi.valid("a")).min(1)"#
        );
        assert_eq!(expr(json!({"type": "array", "maxItems": 0})), "Joi.array().items(Joi.any()).max(0)");
    }

    #[test]
    fn objects_spell_out_presence_and_unknown_keys() {
        let out = expr(json!({
            "type": "object",
            "properties": {
                "calle": {"type": "string", "minLength": 1},
                "extra": {}
            },
            "required": ["calle"]
        }));
        assert_eq!(
            out,
            "Joi.object({\n  \"calle\": Joi.string().min(1).required(),\n  \"extra\": Joi.any().optional()\n}).unknown(true)"
        );
        let closed = expr(json!({"type": "object", "properties": {}, "additionalProperties": false}));
        assert_eq!(closed, "Joi.object({}).unknown(false)");
    }

    #[test]
    fn module_disables_conversion() {
        let module = compile(&read_schema(&json!({"type": "number"})), Backend::Fluent);
        assert_eq!(module.file_name, "validator-joi.mjs");
        assert!(module.source.starts_with("// validator-joi.mjs (generated)\nimport Joi from \"joi\";\n"));
        assert!(module.source.contains("const schemaJ = Joi.number().unsafe();"));
        assert!(module.source.contains("schemaJ.validate(data, { abortEarly: false, convert: false })"));
        assert!(module.source.contains("export function validateJoi(data) {"));
    }
}
