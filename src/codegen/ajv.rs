//! Declarative backend: Ajv.
//!
//! Ajv interprets a JSON Schema at runtime, so "emitting" means rebuilding a
//! JSON Schema document from the tree. In translated mode that document only
//! contains what the tree models: `enum` alone for enumerations, no `format`,
//! and `required` restricted to declared fields, so Ajv sees exactly what Joi
//! and Zod see. Pass-through mode embeds the source document instead.
use serde_json::{json, Map, Value};

use super::js;
use super::{Backend, Emitter, FieldExpr, GeneratedModule};
use crate::config::CompileOptions;
use crate::ir::{NumericConstraints, SchemaNode, StringConstraints};

pub struct AjvEmitter<'a> {
    options: &'a CompileOptions,
}

impl<'a> AjvEmitter<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Self { options }
    }
}

impl Emitter for AjvEmitter<'_> {
    type Expr = Value;

    fn emit_enum(&self, values: &[Value]) -> Value {
        if values.is_empty() {
            // `enum: []` is not a valid schema; this is the match-nothing spelling
            return json!({ "not": {} });
        }
        json!({ "enum": Value::Array(values.to_vec()) })
    }

    fn emit_string(&self, c: &StringConstraints) -> Value {
        let mut o = json!({ "type": "string" });
        if let Some(n) = c.min_length {
            o["minLength"] = Value::from(n);
        }
        if let Some(n) = c.max_length {
            o["maxLength"] = Value::from(n);
        }
        if let Some(p) = &c.pattern {
            o["pattern"] = Value::from(p.as_str());
        }
        o
    }

    fn emit_number(&self, integral: bool, c: &NumericConstraints) -> Value {
        let mut o = json!({ "type": if integral { "integer" } else { "number" } });
        if let Some(b) = c.minimum {
            o["minimum"] = b.to_json();
        }
        if let Some(b) = c.maximum {
            o["maximum"] = b.to_json();
        }
        o
    }

    fn emit_boolean(&self) -> Value {
        json!({ "type": "boolean" })
    }

    fn emit_array(&self, items: Value, min_items: Option<u64>, max_items: Option<u64>) -> Value {
        let mut o = json!({ "type": "array", "items": items });
        if let Some(n) = min_items {
            o["minItems"] = Value::from(n);
        }
        if let Some(n) = max_items {
            o["maxItems"] = Value::from(n);
        }
        o
    }

    fn emit_object(&self, fields: Vec<FieldExpr<'_, Value>>, closed: bool) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for FieldExpr { field, expr } in fields {
            if field.required {
                required.push(Value::from(field.name));
            }
            properties.insert(field.name.to_owned(), expr);
        }
        let mut o = json!({ "type": "object" });
        o["properties"] = Value::Object(properties);
        if !required.is_empty() {
            o["required"] = Value::Array(required);
        }
        if closed {
            o["additionalProperties"] = Value::Bool(false);
        }
        o
    }

    fn emit_any(&self) -> Value {
        json!({})
    }

    fn wrap_module(&self, root: Value) -> GeneratedModule {
        let preamble = "import Ajv from \"ajv\";\n\n\
            const ajv = new Ajv({ allErrors: true, strict: false, unicodeRegExp: false });\n";
        render(self.options, preamble, &root)
    }
}

/// The JSON Schema the translated module hands to `ajv.compile`.
pub fn translated_schema(node: &SchemaNode) -> Value {
    let options = CompileOptions::default();
    super::translate(node, &AjvEmitter::new(&options))
}

/// Embed `doc` verbatim, with `ajv-formats` registered, and let Ajv decide.
pub fn compile_passthrough(doc: &Value, options: &CompileOptions) -> GeneratedModule {
    let preamble = "import Ajv from \"ajv\";\n\
        import addFormats from \"ajv-formats\";\n\n\
        const ajv = new Ajv({ allErrors: true, strict: false });\n\
        addFormats(ajv);\n";
    let module = render(options, preamble, doc);
    tracing::debug!(file = %module.file_name, "embedded source schema verbatim");
    module
}

fn render(options: &CompileOptions, preamble: &str, schema: &Value) -> GeneratedModule {
    let backend = Backend::Declarative;
    let file_name = backend.file_name();
    let entry_point = options.entry_point(backend).to_owned();
    let source = format!(
        r#"{header}{preamble}const schema = {schema};
const validate = ajv.compile(schema);

export function {entry_point}(data) {{
  const valid = validate(data);
  return {{ valid: Boolean(valid), errors: validate.errors || [] }};
}}
"#,
        header = js::header(&file_name, options.header),
        schema = js::json_literal(schema),
    );
    GeneratedModule { backend, file_name, entry_point, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::compile;
    use crate::config::DeclarativeMode;
    use crate::reader::read_schema;

    fn schema(doc: Value) -> Value {
        translated_schema(&read_schema(&doc))
    }

    #[test]
    fn enumeration_drops_type_and_siblings() {
        assert_eq!(
            schema(json!({"type": "integer", "minimum": 3, "enum": ["a", "b"]})),
            json!({"enum": ["a", "b"]})
        );
        assert_eq!(schema(json!({"enum": []})), json!({"not": {}}));
    }

    #[test]
    fn unsupported_keywords_are_dropped() {
        assert_eq!(
            schema(json!({"type": "string", "format": "email", "minLength": 3, "$comment": "x"})),
            json!({"type": "string", "minLength": 3})
        );
        assert_eq!(schema(json!({"type": "date"})), json!({}));
    }

    #[test]
    fn numeric_bounds_stay_integral() {
        assert_eq!(
            schema(json!({"type": "integer", "minimum": 0, "maximum": 120.0})),
            json!({"type": "integer", "minimum": 0, "maximum": 120})
        );
    }

    #[test]
    fn object_required_follows_declaration_and_skips_undeclared() {
        let out = schema(json!({
            "properties": {
                "b": {"type": "boolean"},
                "a": {"type": "array", "minItems": 1}
            },
            "required": ["ghost", "a", "b"],
            "additionalProperties": false
        }));
        assert_eq!(
            out,
            json!({
                "type": "object",
                "properties": {
                    "b": {"type": "boolean"},
                    "a": {"type": "array", "items": {}, "minItems": 1}
                },
                "required": ["b", "a"],
                "additionalProperties": false
            })
        );
        let keys: Vec<_> = out["properties"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn translated_module_shape() {
        let module = compile(&read_schema(&json!({"type": "boolean"})), Backend::Declarative);
        assert_eq!(
            module.source,
            "// validator-ajv.mjs (generated)\n\
             import Ajv from \"ajv\";\n\n\
             const ajv = new Ajv({ allErrors: true, strict: false, unicodeRegExp: false });\n\
             const schema = {\n  \"type\": \"boolean\"\n};\n\
             const validate = ajv.compile(schema);\n\n\
             export function validateAjv(data) {\n\
             \x20 const valid = validate(data);\n\
             \x20 return { valid: Boolean(valid), errors: validate.errors || [] };\n\
             }\n"
        );
    }

    #[test]
    fn proto_field_stays_a_property_in_the_module() {
        let node = read_schema(&json!({
            "type": "object",
            "properties": {"__proto__": {"type": "string"}},
            "required": ["__proto__"]
        }));
        let module = compile(&node, Backend::Declarative);
        assert!(module.source.contains("  \"properties\": {\n    [\"__proto__\"]: {\n"));
        assert!(module.source.contains("\"required\": [\n    \"__proto__\"\n  ]"));
    }

    #[test]
    fn passthrough_embeds_the_source_document() {
        let doc = json!({"$id": "https://example.local/p.json", "type": "string", "format": "email"});
        let options = CompileOptions { declarative_mode: DeclarativeMode::Passthrough, ..CompileOptions::default() };
        let module = compile_passthrough(&doc, &options);
        assert!(module.source.contains("import addFormats from \"ajv-formats\";"));
        assert!(module.source.contains("addFormats(ajv);"));
        assert!(module.source.contains("\"$id\": \"https://example.local/p.json\""));
        assert!(module.source.contains("\"format\": \"email\""));
        assert_eq!(module.entry_point, "validateAjv");
    }
}
