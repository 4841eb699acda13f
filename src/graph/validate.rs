use crate::diagnostics::Diagnostics;
use crate::error::ConversionError;
use crate::model::module_graph::{FLOW_FIELD, LEGACY_MODULES_FIELD};
use crate::model::node_graph::{LEGACY_WRAPPER_FIELD, NODES_FIELD};
use crate::model::{LiftedWorkflow, ModuleWorkflow, NodeWorkflow, Platform};
use itertools::Itertools;
use serde_json::{Map, Value};

/// Reports which platform produced `document`, accepting legacy shapes.
pub fn detect_platform(document: &Value) -> Option<Platform> {
    let map = document.as_object()?;
    let body = unwrap_legacy(map);
    if has_list(body, NODES_FIELD) {
        Some(Platform::NodeGraph)
    } else if has_list(body, FLOW_FIELD) || has_list(body, LEGACY_MODULES_FIELD) {
        Some(Platform::ModuleGraph)
    } else {
        None
    }
}

/// Checks the shape of `document`, normalizes the legacy variant and lifts it
/// into the neutral model.
pub fn lift(document: &Value, platform: Platform, diagnostics: &mut Diagnostics) -> Result<LiftedWorkflow, ConversionError> {
    let map = document
        .as_object()
        .ok_or_else(|| invalid(format!("expected a JSON object, found {}", kind_of(document))))?;

    match platform {
        Platform::NodeGraph => {
            let body = unwrap_legacy(map);
            if !std::ptr::eq(body, map) {
                diagnostics.info("Normalized legacy wrapped node-graph document");
            }
            if !has_list(body, NODES_FIELD) {
                return Err(invalid(format!("node-graph document has no '{}' list", NODES_FIELD)));
            }
            let workflow: NodeWorkflow =
                serde_json::from_value(Value::Object(body.clone())).map_err(|e| invalid(e.to_string()))?;

            let duplicates: Vec<&str> = workflow.nodes.iter().map(|n| n.name.as_str()).duplicates().collect();
            if !duplicates.is_empty() {
                diagnostics.warn(format!(
                    "Node names are not unique ({}); connections to them are ambiguous",
                    duplicates.join(", ")
                ));
            }
            Ok(workflow.lift())
        }
        Platform::ModuleGraph => {
            let body = if has_list(map, FLOW_FIELD) {
                map.clone()
            } else if has_list(map, LEGACY_MODULES_FIELD) {
                diagnostics.info("Normalized legacy module-graph document ('modules' list)");
                let mut body = map.clone();
                if let Some(modules) = body.remove(LEGACY_MODULES_FIELD) {
                    body.insert(FLOW_FIELD.to_string(), modules);
                }
                body
            } else {
                return Err(invalid(format!("module-graph document has no '{}' list", FLOW_FIELD)));
            };
            let workflow: ModuleWorkflow =
                serde_json::from_value(Value::Object(body)).map_err(|e| invalid(e.to_string()))?;
            Ok(workflow.lift())
        }
    }
}

fn unwrap_legacy(map: &Map<String, Value>) -> &Map<String, Value> {
    if has_list(map, NODES_FIELD) {
        return map;
    }
    match map.get(LEGACY_WRAPPER_FIELD) {
        Some(Value::Object(inner)) => inner,
        _ => map,
    }
}

fn has_list(map: &Map<String, Value>, field: &str) -> bool {
    map.get(field).is_some_and(Value::is_array)
}

fn invalid(message: String) -> ConversionError {
    ConversionError::InvalidInput(message)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
