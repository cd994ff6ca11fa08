//! Runs the generated Ajv, Joi and Zod modules under node and checks that all
//! three return the expected `valid` for every record.
//!
//! Needs `node` on PATH and `npm install` in `tests/js`; otherwise each test
//! prints why and passes without running anything.
use std::path::{Path, PathBuf};
use std::process::Command;

use json_valgen::cli::write_modules;
use json_valgen::{compile_document, CompileOptions};
use serde_json::{json, Value};

const LIBRARIES: [&str; 3] = ["ajv", "joi", "zod"];

fn harness_dir() -> Option<PathBuf> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("js");
    let node = Command::new("node").arg("--version").output().is_ok_and(|out| out.status.success());
    let installed = LIBRARIES
        .iter()
        .all(|lib| dir.join("node_modules").join(lib).join("package.json").is_file());
    if node && installed {
        Some(dir)
    } else {
        eprintln!("skipping differential run: needs `node` and `npm install` in {}", dir.display());
        None
    }
}

/// Compile `schema`, run every record through all three modules, and compare
/// each verdict with the expected one.
fn check(case: &str, schema: Value, records: Vec<(Value, bool)>) {
    let Some(harness) = harness_dir() else { return };

    // under the harness dir so `import "joi"` resolves to its node_modules
    let dir = harness.join(".cases").join(case);
    let _ = std::fs::remove_dir_all(&dir);
    let modules = compile_document(&schema, &CompileOptions::default());
    write_modules(&dir, &modules).unwrap();
    let inputs: Vec<&Value> = records.iter().map(|(record, _)| record).collect();
    std::fs::write(dir.join("records.json"), serde_json::to_string(&inputs).unwrap()).unwrap();

    let out = Command::new("node").arg(harness.join("run.mjs")).arg(&dir).output().unwrap();
    assert!(out.status.success(), "node failed for {case}: {}", String::from_utf8_lossy(&out.stderr));
    let verdicts: Vec<Value> = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(verdicts.len(), records.len());

    for ((record, expected), verdict) in records.iter().zip(&verdicts) {
        for lib in LIBRARIES {
            assert_eq!(
                verdict[lib],
                json!(expected),
                "{case}: {lib} disagrees on {record} (all verdicts: {verdict})"
            );
        }
    }
}

fn persona_schema() -> Value {
    serde_json::from_str(include_str!("../demos/persona.schema.json")).unwrap()
}

fn persona_with(key: &str, value: Value) -> Value {
    let mut record = json!({"id": 1, "nombre": "Luis", "email": "a@b.com", "roles": ["user"]});
    record[key] = value;
    record
}

fn persona_without(key: &str) -> Value {
    let mut record = json!({"id": 1, "nombre": "Luis", "email": "a@b.com", "roles": ["user"]});
    record.as_object_mut().unwrap().remove(key);
    record
}

#[test]
fn persona_scenarios() {
    let full = json!({
        "id": 1,
        "nombre": "Luis",
        "email": "luis@example.com",
        "edad": 30,
        "activo": true,
        "roles": ["user"],
        "direccion": {"calle": "Av siempre viva", "codigoPostal": "12345"}
    });
    check(
        "persona_scenarios",
        persona_schema(),
        vec![
            (json!({"id": 1, "nombre": "Luis", "email": "a@b.com", "roles": ["user"]}), true),
            (json!({"id": 0, "nombre": "A", "email": "x", "roles": [], "extra": "y"}), false),
            (full, true),
            (persona_without("id"), false),
            (persona_without("nombre"), false),
            (persona_without("email"), false),
            (persona_without("roles"), false),
            (persona_with("extra", json!("y")), false),
            (persona_with("direccion", json!({"calle": "x", "piso": 3})), true),
            (persona_with("direccion", json!({"codigoPostal": "12345"})), false),
            (persona_with("edad", json!("30")), false),
            (persona_with("activo", json!("true")), false),
            (persona_with("email", json!("")), true),
            (json!("not an object"), false),
        ],
    );
}

#[test]
fn persona_bounds_one_past_each_limit() {
    check(
        "persona_bounds",
        persona_schema(),
        vec![
            (persona_with("id", json!(1)), true),
            (persona_with("id", json!(0)), false),
            (persona_with("id", json!(1.5)), false),
            (persona_with("nombre", json!("Lu")), true),
            (persona_with("nombre", json!("L")), false),
            (persona_with("nombre", json!("n".repeat(50))), true),
            (persona_with("nombre", json!("n".repeat(51))), false),
            (persona_with("edad", json!(0)), true),
            (persona_with("edad", json!(-1)), false),
            (persona_with("edad", json!(120)), true),
            (persona_with("edad", json!(121)), false),
            (persona_with("roles", json!(["admin", "moderator"])), true),
            (persona_with("roles", json!([])), false),
            (persona_with("roles", json!(["root"])), false),
            (persona_with("direccion", json!({"calle": "x", "codigoPostal": "12345"})), true),
            (persona_with("direccion", json!({"calle": "x", "codigoPostal": "1234"})), false),
            (persona_with("direccion", json!({"calle": "x", "codigoPostal": ""})), false),
        ],
    );
}

#[test]
fn empty_string_follows_the_js_pattern() {
    check(
        "empty_string",
        json!({
            "type": "object",
            "properties": {
                "look": {"type": "string", "pattern": "^(?![0-9]).*$"},
                "prop": {"type": "string", "pattern": "\\p{L}*"},
                "plain": {"type": "string"},
                "min": {"type": "string", "minLength": 1}
            }
        }),
        vec![
            (json!({"look": ""}), true),
            (json!({"look": "abc"}), true),
            (json!({"look": "1abc"}), false),
            (json!({"prop": ""}), false),
            (json!({"prop": "xp{L}"}), true),
            (json!({"plain": ""}), true),
            (json!({"min": ""}), false),
            (json!({"min": "a"}), true),
        ],
    );
}

#[test]
fn numbers_beyond_the_safe_integer_range() {
    check(
        "big_numbers",
        json!({
            "type": "object",
            "properties": {
                "n": {"type": "number"},
                "i": {"type": "integer"}
            }
        }),
        vec![
            (json!({"n": 1e20}), true),
            (json!({"n": -1e20}), true),
            (json!({"i": 1e20}), true),
            (json!({"i": 9007199254740993u64}), true),
            (json!({"i": 1.5}), false),
            (json!({"n": "1"}), false),
        ],
    );
}

#[test]
fn open_and_closed_objects() {
    check(
        "closedness",
        json!({
            "type": "object",
            "properties": {
                "closed": {
                    "type": "object",
                    "properties": {"a": {"type": "boolean"}},
                    "required": ["a"],
                    "additionalProperties": false
                },
                "open": {
                    "type": "object",
                    "properties": {"a": {"type": "boolean"}}
                }
            }
        }),
        vec![
            (json!({"closed": {"a": true}}), true),
            (json!({"closed": {"a": true, "b": 1}}), false),
            (json!({"closed": {}}), false),
            (json!({"open": {"b": 1}}), true),
            (json!({"open": {"a": "yes"}}), false),
            (json!({"other": 1}), true),
        ],
    );
}

#[test]
fn enumerations_and_unconstrained_fields() {
    check(
        "enumerations",
        json!({
            "type": "object",
            "properties": {
                "mixed": {"enum": [1, "a", null, true]},
                "never": {"enum": []},
                "anything": {}
            },
            "required": ["anything"]
        }),
        vec![
            (json!({"anything": 0, "mixed": 1}), true),
            (json!({"anything": 0, "mixed": "a"}), true),
            (json!({"anything": 0, "mixed": null}), true),
            (json!({"anything": 0, "mixed": true}), true),
            (json!({"anything": 0, "mixed": "1"}), false),
            (json!({"anything": 0, "mixed": false}), false),
            (json!({"anything": 0, "never": 1}), false),
            (json!({"anything": null}), true),
            (json!({}), false),
        ],
    );
}

#[test]
fn array_item_bounds() {
    check(
        "arrays",
        json!({"type": "array", "items": {"type": "integer"}, "minItems": 1, "maxItems": 2}),
        vec![
            (json!([1]), true),
            (json!([1, 2]), true),
            (json!([]), false),
            (json!([1, 2, 3]), false),
            (json!(["a"]), false),
            (json!({"0": 1}), false),
        ],
    );
}
