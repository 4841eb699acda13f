use super::dialect::syntax_of;
use super::template::{ExpressionKind, Piece, Template};
use crate::model::{ParameterPath, Platform};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static SIMPLE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(ctx|\d+)((?:\.[A-Za-z_$][\w$]*|\[\d+\])*)\s*$")
        .expect("Invalid simple reference pattern")
});

/// Outcome of evaluating a template against a context.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// A pure reference resolved to a value, which replaces the whole string.
    Resolved(Value),
    /// Resolvable references were substituted as text; the rest remain expressions.
    Substituted(Template),
}

/// Resolves a single current-record reference (`ctx.a.b` / `1.a.b`) against `context`.
///
/// Anything more than a bare reference is out of reach and yields `None`.
pub fn resolve_reference(inner: &str, dialect: Platform, context: &Map<String, Value>) -> Option<Value> {
    let caps = SIMPLE_REFERENCE.captures(inner)?;
    if &caps[1] != syntax_of(dialect).record_root {
        return None;
    }
    let tail = &caps[2];
    if tail.is_empty() {
        return Some(Value::Object(context.clone()));
    }
    let tail = tail.strip_prefix('.').unwrap_or(tail);
    ParameterPath::parse(tail).ok()?.get(context).cloned()
}

/// Substitutes what `context` can answer in `template`.
pub fn evaluate(template: &Template, dialect: Platform, context: &Map<String, Value>) -> Evaluation {
    if template.kind() == ExpressionKind::Pure {
        if let Some(value) = template
            .expressions()
            .next()
            .and_then(|e| resolve_reference(e, dialect, context))
        {
            return Evaluation::Resolved(value);
        }
    }

    let pieces = template
        .pieces
        .iter()
        .map(|piece| match piece {
            Piece::Expr(e) => match resolve_reference(e, dialect, context) {
                Some(value) => Piece::Text(stringify(&value)),
                None => piece.clone(),
            },
            Piece::Text(_) => piece.clone(),
        })
        .collect();

    Evaluation::Substituted(Template {
        pieces,
        unterminated: template.unterminated,
    })
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
