use super::{flag_notes, malformed};
use crate::diagnostics::Diagnostics;
use crate::error::EntityError;
use crate::model::module_graph::ROUTES_PARAMETER;
use crate::model::{Direction, Entity, Filter, FilterCondition, ParameterPath};
use crate::parameters::{ParameterProcessor, ReviewNote};
use serde_json::{Map, Value};

const CONDITIONS_FIELD: &str = "conditions";
const ALWAYS: &str = "always";
const DEFAULT_NODE_OPERATOR: &str = "equal";
const DEFAULT_MODULE_OPERATOR: &str = "text:equal";

pub const NODE_KEYS: &[&str] = &[CONDITIONS_FIELD];
pub const MODULE_KEYS: &[&str] = &[ROUTES_PARAMETER];

/// Comparison operators, node-graph token first. Earlier rows win when a
/// token appears twice.
pub const OPERATORS: &[(&str, &str)] = &[
    ("equal", "text:equal"),
    ("notEqual", "text:notequal"),
    ("larger", "number:greater"),
    ("largerEqual", "number:greaterorequal"),
    ("smaller", "number:less"),
    ("smallerEqual", "number:lessorequal"),
    ("contains", "text:contain"),
    ("notContains", "text:notcontain"),
    ("regex", "text:pattern"),
    ("equal", "number:equal"),
    ("notEqual", "number:notequal"),
];

/// Counterpart of an operator token written for `direction`'s source platform.
pub fn translate_operator(token: &str, direction: Direction) -> Option<&'static str> {
    OPERATORS.iter().find_map(|(node, module)| match direction {
        Direction::Forward if *node == token => Some(*module),
        Direction::Reverse if *module == token => Some(*node),
        _ => None,
    })
}

/// Turns each source condition into one target route, or each route back
/// into one condition. Order is kept; the returned count is the number of
/// output groups the entity has.
pub fn convert(
    source: &Entity,
    target: &mut Entity,
    processor: &ParameterProcessor,
    diagnostics: &mut Diagnostics,
) -> Result<Option<usize>, EntityError> {
    match processor.direction() {
        Direction::Forward => conditions_to_routes(source, target, processor, diagnostics),
        Direction::Reverse => routes_to_conditions(source, target, processor, diagnostics),
    }
}

fn conditions_to_routes(
    source: &Entity,
    target: &mut Entity,
    processor: &ParameterProcessor,
    diagnostics: &mut Diagnostics,
) -> Result<Option<usize>, EntityError> {
    let Some(raw) = source.parameters.get(CONDITIONS_FIELD) else {
        return Ok(None);
    };
    let items = raw
        .as_array()
        .ok_or_else(|| malformed(CONDITIONS_FIELD, "expected a list of conditions"))?;

    let mut notes = Vec::new();
    let mut routes = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let operation = item
            .get("operation")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_NODE_OPERATOR);
        if operation == ALWAYS {
            routes.push(Value::Null);
            continue;
        }

        let o = translate_operator(operation, Direction::Forward).unwrap_or_else(|| {
            diagnostics.warn(format!(
                "Unknown operator '{}' in condition {} of '{}'; using '{}'",
                operation, i, source.name, DEFAULT_NODE_OPERATOR
            ));
            DEFAULT_MODULE_OPERATOR
        });

        let at = ParameterPath::root()
            .child_key(ROUTES_PARAMETER)
            .child_index(i)
            .child_key(CONDITIONS_FIELD)
            .child_index(0)
            .child_index(0);
        let a = processor.process_value(
            item.get("value1").unwrap_or(&Value::Null),
            &at.child_key("a"),
            &mut notes,
        );
        let b = item
            .get("value2")
            .map(|v| processor.process_value(v, &at.child_key("b"), &mut notes));
        let name = item
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| default_route_name(i));

        let filter = Filter {
            name,
            conditions: vec![vec![FilterCondition {
                a,
                o: o.to_string(),
                b,
            }]],
        };
        routes.push(serde_json::to_value(filter).map_err(|e| malformed(ROUTES_PARAMETER, e.to_string()))?);
    }

    target
        .parameters
        .insert(ROUTES_PARAMETER.to_string(), Value::Array(routes));
    flag_notes(diagnostics, target, notes);
    Ok(Some(items.len()))
}

fn routes_to_conditions(
    source: &Entity,
    target: &mut Entity,
    processor: &ParameterProcessor,
    diagnostics: &mut Diagnostics,
) -> Result<Option<usize>, EntityError> {
    let Some(raw) = source.parameters.get(ROUTES_PARAMETER) else {
        return Ok(None);
    };
    let items = raw
        .as_array()
        .ok_or_else(|| malformed(ROUTES_PARAMETER, "expected a list of route filters"))?;

    let mut notes = Vec::new();
    let mut conditions = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let mut condition = Map::new();
        let filter: Option<Filter> = match item {
            Value::Null => None,
            other => Some(
                serde_json::from_value(other.clone())
                    .map_err(|e| malformed(ROUTES_PARAMETER, format!("route {}: {}", i, e)))?,
            ),
        };
        if let Some(name) = filter
            .as_ref()
            .map(|f| &f.name)
            .filter(|n| !n.is_empty() && **n != default_route_name(i))
        {
            condition.insert("name".to_string(), Value::String(name.clone()));
        }

        let first = filter
            .as_ref()
            .and_then(|f| f.conditions.first())
            .and_then(|alternative| alternative.first());
        let Some(first) = first else {
            condition.insert("operation".to_string(), Value::String(ALWAYS.to_string()));
            conditions.push(Value::Object(condition));
            continue;
        };

        let comparisons: usize = filter
            .as_ref()
            .map_or(0, |f| f.conditions.iter().map(Vec::len).sum());
        let at = ParameterPath::root().child_key(CONDITIONS_FIELD).child_index(i);
        if comparisons > 1 {
            diagnostics.warn(format!(
                "Route {} of '{}' combines {} comparisons; only the first was kept",
                i, source.name, comparisons
            ));
            notes.push(ReviewNote {
                path: at.to_string(),
                reason: format!("Route combined {} comparisons; only the first was kept", comparisons),
            });
        }

        let operation = translate_operator(&first.o, Direction::Reverse).unwrap_or_else(|| {
            diagnostics.warn(format!(
                "Unknown operator '{}' in route {} of '{}'; using '{}'",
                first.o, i, source.name, DEFAULT_NODE_OPERATOR
            ));
            DEFAULT_NODE_OPERATOR
        });

        let value1 = processor.process_value(&first.a, &at.child_key("value1"), &mut notes);
        condition.insert("value1".to_string(), value1);
        condition.insert("operation".to_string(), Value::String(operation.to_string()));
        if let Some(b) = &first.b {
            let value2 = processor.process_value(b, &at.child_key("value2"), &mut notes);
            condition.insert("value2".to_string(), value2);
        }
        conditions.push(Value::Object(condition));
    }

    target
        .parameters
        .insert(CONDITIONS_FIELD.to_string(), Value::Array(conditions));
    flag_notes(diagnostics, target, notes);
    Ok(Some(items.len()))
}

/// Name given to the filter of route `index` when its condition has none.
fn default_route_name(index: usize) -> String {
    format!("Route {}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_table_both_ways() {
        assert_eq!(translate_operator("larger", Direction::Forward), Some("number:greater"));
        assert_eq!(translate_operator("text:pattern", Direction::Reverse), Some("regex"));
        assert_eq!(translate_operator("number:equal", Direction::Reverse), Some("equal"));
        assert_eq!(translate_operator("equal", Direction::Forward), Some("text:equal"));
        assert_eq!(translate_operator("between", Direction::Forward), None);
    }
}
