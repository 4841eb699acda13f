use crate::model::ParameterPath;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static EXPRESSION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<<.*?>>").expect("Invalid expression pattern"));

/// `true` when `text` contains a delimited expression in either dialect.
pub fn looks_like_expression(text: &str) -> bool {
    EXPRESSION_PATTERN.is_match(text)
}

/// Paths of every string in `tree` that contains an expression.
///
/// Objects are visited in key order as stored and arrays by index, so the
/// result is stable for a given document.
pub fn identify_expressions_for_review(tree: &Map<String, Value>) -> Vec<String> {
    let mut paths = Vec::new();
    for (key, value) in tree {
        collect(value, &ParameterPath::root().child_key(key), &mut paths);
    }
    paths
}

fn collect(value: &Value, path: &ParameterPath, out: &mut Vec<String>) {
    match value {
        Value::String(s) if looks_like_expression(s) => out.push(path.to_string()),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                collect(item, &path.child_index(i), out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                collect(item, &path.child_key(key), out);
            }
        }
        _ => {}
    }
}
