use super::flag_notes;
use crate::diagnostics::Diagnostics;
use crate::error::EntityError;
use crate::model::{Direction, Entity, ParameterPath};
use crate::parameters::ParameterProcessor;
use serde_json::Value;

pub const CODE_KEYS: &[&str] = &["code", "jsCode", "pythonCode", "functionCode", "script"];
pub const NOTE_KEYS: &[&str] = &["content", "notes", "text", "note"];

const CODE_FIELD: &str = "code";
const NODE_NOTE_FIELD: &str = "content";
const MODULE_NOTE_FIELD: &str = "notes";

/// Keeps script source verbatim under `code`. Other parameters are processed
/// as usual. Code is never transpiled, so it is always flagged.
pub fn code(
    source: &Entity,
    target: &mut Entity,
    processor: &ParameterProcessor,
    diagnostics: &mut Diagnostics,
) -> Result<(), EntityError> {
    let mut notes = Vec::new();
    let mut found = false;
    for (key, value) in &source.parameters {
        if CODE_KEYS.contains(&key.as_str()) {
            if !found {
                target.parameters.insert(CODE_FIELD.to_string(), value.clone());
                found = true;
            }
            continue;
        }
        let at = ParameterPath::root().child_key(key);
        let value = processor.process_value(value, &at, &mut notes);
        target.parameters.insert(key.clone(), value);
    }

    if found {
        diagnostics.flag(
            &target.id,
            &target.name,
            CODE_FIELD,
            "Code copied verbatim; it is not translated between platforms",
        );
    }
    flag_notes(diagnostics, target, notes);
    Ok(())
}

/// Moves the note text to the target's note field. Nothing else is kept.
pub fn note(source: &Entity, target: &mut Entity, direction: Direction) -> Result<(), EntityError> {
    let text = NOTE_KEYS
        .iter()
        .find_map(|k| source.parameters.get(*k))
        .cloned()
        .or_else(|| source.notes.clone().map(Value::String))
        .unwrap_or_else(|| Value::String(String::new()));
    let field = match direction {
        Direction::Forward => MODULE_NOTE_FIELD,
        Direction::Reverse => NODE_NOTE_FIELD,
    };
    target.parameters.insert(field.to_string(), text);
    Ok(())
}
