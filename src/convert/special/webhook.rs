use super::{flag_notes, malformed};
use crate::diagnostics::Diagnostics;
use crate::error::EntityError;
use crate::expression::{ExpressionKind, classify};
use crate::model::{Direction, Entity, ParameterPath};
use crate::parameters::ParameterProcessor;
use serde_json::Value;

pub const NODE_KEYS: &[&str] = &["httpMethod", "path", "responseMode"];
pub const MODULE_KEYS: &[&str] = &["method", "hookPath", "responseMode"];

const DEFAULT_METHOD: &str = "GET";

/// Response modes, node-graph token first. The first row is the default.
pub const RESPONSE_MODES: &[(&str, &str)] = &[
    ("onReceived", "on receive"),
    ("lastNode", "on completion"),
    ("responseNode", "via response module"),
];

/// Maps method, path and response mode by fixed key names. Absent method
/// and response mode take their defaults.
pub fn convert(
    source: &Entity,
    target: &mut Entity,
    processor: &ParameterProcessor,
    diagnostics: &mut Diagnostics,
) -> Result<(), EntityError> {
    let direction = processor.direction();
    let (source_keys, target_keys) = match direction {
        Direction::Forward => (NODE_KEYS, MODULE_KEYS),
        Direction::Reverse => (MODULE_KEYS, NODE_KEYS),
    };
    let params = &source.parameters;

    let mut notes = Vec::new();
    let method = match params.get(source_keys[0]) {
        None | Some(Value::Null) => Value::String(DEFAULT_METHOD.to_string()),
        Some(value @ Value::String(m)) if classify(m, direction.source()) != ExpressionKind::None => {
            let at = ParameterPath::root().child_key(target_keys[0]);
            processor.process_value(value, &at, &mut notes)
        }
        Some(Value::String(m)) => Value::String(m.to_uppercase()),
        Some(_) => return Err(malformed(source_keys[0], "expected an HTTP method name")),
    };
    target.parameters.insert(target_keys[0].to_string(), method);

    if let Some(path) = params.get(source_keys[1]) {
        let at = ParameterPath::root().child_key(target_keys[1]);
        let path = processor.process_value(path, &at, &mut notes);
        target.parameters.insert(target_keys[1].to_string(), path);
    }

    let mode = match params.get(source_keys[2]).and_then(Value::as_str) {
        None => default_mode(direction),
        Some(token) => translate_mode(token, direction).unwrap_or_else(|| {
            diagnostics.warn(format!(
                "Unknown response mode '{}' on '{}'; using '{}'",
                token,
                source.name,
                default_mode(direction)
            ));
            default_mode(direction)
        }),
    };
    target
        .parameters
        .insert(target_keys[2].to_string(), Value::String(mode.to_string()));

    flag_notes(diagnostics, target, notes);
    Ok(())
}

fn translate_mode(token: &str, direction: Direction) -> Option<&'static str> {
    RESPONSE_MODES.iter().find_map(|(node, module)| match direction {
        Direction::Forward if *node == token => Some(*module),
        Direction::Reverse if *module == token => Some(*node),
        _ => None,
    })
}

fn default_mode(direction: Direction) -> &'static str {
    let (node, module) = RESPONSE_MODES[0];
    match direction {
        Direction::Forward => module,
        Direction::Reverse => node,
    }
}
