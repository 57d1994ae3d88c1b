//! Structured debug dump for any serializable value.
//!
//! Renders nested objects as an indented `key (type): value` listing.
//! Intended for diagnostics output only; nothing parses it back.

use serde::Serialize;
use serde_json::Value;
use tracing::error;

/// Knobs for [`debug_dump`].
#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    /// Substring replaced by `***` wherever it appears in rendered values.
    pub hide: Option<String>,
    /// Include keys starting with `_`.
    pub include_private: bool,
    /// Keys left out entirely, at any depth.
    pub exclude: Vec<String>,
}

const INDENT: &str = "    ";

/// Render `value` under `name`. Serialization failures yield a fixed
/// message and an error log rather than an `Err`.
pub fn debug_dump<T: Serialize>(name: &str, value: &T, options: &DumpOptions) -> String {
    match serde_json::to_value(value) {
        Ok(value) => {
            let mut out = String::new();
            render(name, &value, options, 0, &mut out);
            out
        }
        Err(e) => {
            error!(%name, error = %e, "debug dump failed");
            format!("problems dumping {name}")
        }
    }
}

fn render(name: &str, value: &Value, options: &DumpOptions, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    match value {
        Value::Object(map) => {
            out.push_str(&format!("{pad}{name} (object):\n"));
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                if !options.include_private && key.starts_with('_') {
                    continue;
                }
                if options.exclude.iter().any(|ex| ex == key) {
                    continue;
                }
                render(key, &map[key.as_str()], options, depth + 1, out);
            }
        }
        Value::Array(items) if items.iter().any(is_nested) => {
            out.push_str(&format!("{pad}{name} (array, {} items):\n", items.len()));
            for (i, item) in items.iter().enumerate() {
                render(&format!("[{i}]"), item, options, depth + 1, out);
            }
        }
        leaf => {
            let rendered = sanitize(&leaf.to_string(), options);
            out.push_str(&format!("{pad}{name} ({}): {rendered}\n", type_name(leaf)));
        }
    }
}

fn is_nested(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn sanitize(rendered: &str, options: &DumpOptions) -> String {
    match options.hide.as_deref() {
        Some(secret) if !secret.is_empty() => rendered.replace(secret, "***"),
        _ => rendered.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
