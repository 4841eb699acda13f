use super::{flag_notes, malformed};
use crate::diagnostics::Diagnostics;
use crate::error::EntityError;
use crate::model::{Direction, Entity, ParameterPath};
use crate::parameters::ParameterProcessor;
use serde_json::{Map, Value, json};

const NODE_FIELD: &str = "values";
const MODULE_FIELD: &str = "variables";

pub const NODE_KEYS: &[&str] = &[NODE_FIELD];
pub const MODULE_KEYS: &[&str] = &[MODULE_FIELD, "name", "value"];

/// Maps each source name/value pair onto the target's variable list,
/// processing every value on its own.
pub fn convert(
    source: &Entity,
    target: &mut Entity,
    processor: &ParameterProcessor,
    diagnostics: &mut Diagnostics,
) -> Result<(), EntityError> {
    let (pairs, target_field) = match processor.direction() {
        Direction::Forward => (node_pairs(&source.parameters)?, MODULE_FIELD),
        Direction::Reverse => (module_pairs(&source.parameters)?, NODE_FIELD),
    };

    let mut notes = Vec::new();
    let list = pairs
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| {
            let path = ParameterPath::root()
                .child_key(target_field)
                .child_index(i)
                .child_key("value");
            let value = processor.process_value(&value, &path, &mut notes);
            json!({ "name": name, "value": value })
        })
        .collect();

    target
        .parameters
        .insert(target_field.to_string(), Value::Array(list));
    flag_notes(diagnostics, target, notes);
    Ok(())
}

/// Reads `values`: a list of `{name, value}`, a `{name: value}` object, or
/// an object of typed groups (`{"string": [{name, value}], ...}`).
fn node_pairs(parameters: &Map<String, Value>) -> Result<Vec<(String, Value)>, EntityError> {
    match parameters.get(NODE_FIELD) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => pair_list(NODE_FIELD, items),
        Some(Value::Object(map)) if is_typed_groups(map) => {
            let mut pairs = Vec::new();
            for group in map.values() {
                if let Value::Array(items) = group {
                    pairs.extend(pair_list(NODE_FIELD, items)?);
                }
            }
            Ok(pairs)
        }
        Some(Value::Object(map)) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        Some(_) => Err(malformed(NODE_FIELD, "expected a list or an object")),
    }
}

/// Reads `variables`, or the single-variable `{name, value}` layout.
fn module_pairs(parameters: &Map<String, Value>) -> Result<Vec<(String, Value)>, EntityError> {
    match parameters.get(MODULE_FIELD) {
        Some(Value::Array(items)) => pair_list(MODULE_FIELD, items),
        Some(Value::Null) | None => match parameters.get("name") {
            Some(Value::String(name)) => Ok(vec![(
                name.clone(),
                parameters.get("value").cloned().unwrap_or(Value::Null),
            )]),
            _ => Ok(Vec::new()),
        },
        Some(_) => Err(malformed(MODULE_FIELD, "expected a list")),
    }
}

fn pair_list(field: &str, items: &[Value]) -> Result<Vec<(String, Value)>, EntityError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let name = item
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| malformed(field, format!("entry {} has no name", i)))?;
            Ok((
                name.to_string(),
                item.get("value").cloned().unwrap_or(Value::Null),
            ))
        })
        .collect()
}

fn is_typed_groups(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map.values().all(|group| {
            group
                .as_array()
                .is_some_and(|items| items.iter().all(|i| i.get("name").is_some()))
        })
}
