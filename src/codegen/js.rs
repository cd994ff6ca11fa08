//! JavaScript source fragments shared by the backends.
use serde_json::Value;

const INDENT: &str = "  ";

/// `JSON.stringify`-compatible string literal.
pub fn string_literal(s: &str) -> String {
    Value::from(s).to_string()
}

/// Compact JSON is a valid JS expression for any JSON value.
pub fn literal(v: &Value) -> String {
    v.to_string()
}

/// `new RegExp("...")`. The pattern text reaches the RegExp constructor unchanged;
/// only the string-literal quoting is added.
pub fn regexp(pattern: &str) -> String {
    format!("new RegExp({})", string_literal(pattern))
}

/// `{ "k": v, ... }` spread over lines, nested expressions re-indented one level.
pub fn object_literal<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let lines = entries
        .into_iter()
        .map(|(key, expr)| format!("{INDENT}{}: {}", property_key(key), indent_tail(&expr)))
        .collect::<Vec<_>>();
    if lines.is_empty() {
        return "{}".to_owned();
    }
    format!("{{\n{}\n}}", lines.join(",\n"))
}

/// A quoted `"__proto__": v` in a literal sets the prototype instead of
/// defining a property; the computed form defines it.
pub fn property_key(key: &str) -> String {
    if key == "__proto__" {
        format!("[{}]", string_literal(key))
    } else {
        string_literal(key)
    }
}

/// Pretty JSON as a JS expression: the `{:#}` layout, with object keys
/// written through [`property_key`].
pub fn json_literal(v: &Value) -> String {
    match v {
        Value::Object(map) => object_literal(map.iter().map(|(k, v)| (k.as_str(), json_literal(v)))),
        Value::Array(items) if items.is_empty() => "[]".to_owned(),
        Value::Array(items) => {
            let lines = items
                .iter()
                .map(|item| format!("{INDENT}{}", indent_tail(&json_literal(item))))
                .collect::<Vec<_>>();
            format!("[\n{}\n]", lines.join(",\n"))
        }
        scalar => literal(scalar),
    }
}

/// Indent every line after the first by one level.
pub fn indent_tail(expr: &str) -> String {
    expr.replace('\n', &format!("\n{INDENT}"))
}

/// `// validator-x.mjs (generated)` when enabled.
pub fn header(file_name: &str, enabled: bool) -> String {
    if enabled { format!("// {file_name} (generated)\n") } else { String::new() }
}
