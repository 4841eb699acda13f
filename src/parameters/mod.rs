//! Recursive parameter-tree processing: expression transpilation, value
//! coercion and review flagging.

mod coercion;
mod review;

pub use coercion::{bool_to_flag, flag_to_bool, normalize_date};
pub use review::{identify_expressions_for_review, looks_like_expression};

use crate::expression::{Evaluation, Template, Transpiler, evaluate};
use crate::model::{Direction, ParameterPath};
use crate::options::ConversionOptions;
use serde_json::{Map, Value};

/// A processed value that should be looked at by a human.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewNote {
    pub path: String,
    pub reason: String,
}

/// Walks parameter trees and rewrites every leaf for the target platform.
///
/// - strings carrying expressions are transpiled (or evaluated, when the
///   options ask for it and a context is given);
/// - booleans become `"0"`/`"1"` flags going forward, and flags become
///   booleans going back;
/// - ISO-8601 date-times are normalized to UTC with millisecond precision;
/// - everything else passes through.
#[derive(Debug, Clone, Copy)]
pub struct ParameterProcessor<'a> {
    direction: Direction,
    options: &'a ConversionOptions,
    transpiler: Transpiler<'a>,
}

impl<'a> ParameterProcessor<'a> {
    pub fn new(direction: Direction, options: &'a ConversionOptions) -> Self {
        Self {
            direction,
            options,
            transpiler: Transpiler::new(),
        }
    }

    pub fn with_transpiler(mut self, transpiler: Transpiler<'a>) -> Self {
        self.transpiler = transpiler;
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Processes a whole tree. Review notes come back in document order.
    pub fn process(&self, tree: &Map<String, Value>) -> (Map<String, Value>, Vec<ReviewNote>) {
        let mut notes = Vec::new();
        let processed = tree
            .iter()
            .map(|(key, value)| {
                let path = ParameterPath::root().child_key(key);
                (key.clone(), self.process_value(value, &path, &mut notes))
            })
            .collect();
        (processed, notes)
    }

    /// Processes one value found at `path`.
    pub fn process_value(&self, value: &Value, path: &ParameterPath, notes: &mut Vec<ReviewNote>) -> Value {
        match value {
            Value::String(s) => self.process_string(s, path, notes),
            Value::Bool(b) if self.direction == Direction::Forward => bool_to_flag(*b),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| self.process_value(item, &path.child_index(i), notes))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.process_value(v, &path.child_key(k), notes)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn process_string(&self, text: &str, path: &ParameterPath, notes: &mut Vec<ReviewNote>) -> Value {
        let source = self.direction.source();
        let target = self.direction.target();

        let Some(template) = Template::parse(text, source) else {
            return self.coerce_plain(text);
        };

        let template = if self.options.evaluate_expressions && !template.unterminated {
            match evaluate(&template, source, &self.options.expression_context) {
                Evaluation::Resolved(Value::Bool(b)) if self.direction == Direction::Forward => {
                    return bool_to_flag(b);
                }
                Evaluation::Resolved(value) => return value,
                Evaluation::Substituted(t) => match t.literal_text() {
                    Some(text) => return Value::String(text),
                    _ => t,
                },
            }
        } else {
            template
        };

        let transpiled = self.transpiler.transpile_template(&template, source, target);
        if transpiled.needs_review() {
            notes.push(ReviewNote {
                path: path.to_string(),
                reason: format!("Expression needs review: {}", transpiled.reason()),
            });
        }
        Value::String(transpiled.text)
    }

    fn coerce_plain(&self, text: &str) -> Value {
        if self.direction == Direction::Reverse {
            if let Some(b) = flag_to_bool(text) {
                return Value::Bool(b);
            }
        }
        match normalize_date(text) {
            Some(date) => Value::String(date),
            None => Value::String(text.to_string()),
        }
    }
}

/// Processes `tree` for `direction` with no positional table.
pub fn process(tree: &Map<String, Value>, direction: Direction, options: &ConversionOptions) -> Map<String, Value> {
    ParameterProcessor::new(direction, options).process(tree).0
}

