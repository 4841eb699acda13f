//! Common test fixtures: a mapping database and a few workflows of both shapes.
use flowbridge::prelude::*;
use serde_json::{Value, json};

/// Mapping database covering every entity family in both directions.
#[allow(dead_code)]
pub const MAPPINGS_JSON: &str = r#"{
    "version": "2024.1",
    "mappings": [
        {
            "sourceType": "http-request", "targetType": "http-module", "direction": "forward",
            "parameterMap": { "url": "URL", "method": "method" }
        },
        {
            "sourceType": "http-module", "targetType": "http-request", "direction": "reverse",
            "parameterMap": { "URL": "url", "method": "method" }
        },
        {
            "sourceType": "set", "targetType": "util:SetVariables", "direction": "forward"
        },
        {
            "sourceType": "util:SetVariables", "targetType": "set", "direction": "reverse"
        },
        {
            "sourceType": "if", "targetType": "builtin:BasicRouter", "direction": "forward"
        },
        {
            "sourceType": "builtin:BasicRouter", "targetType": "if", "direction": "reverse"
        },
        {
            "sourceType": "webhook", "targetType": "gateway:CustomWebHook", "direction": "forward"
        },
        {
            "sourceType": "gateway:CustomWebHook", "targetType": "webhook", "direction": "reverse"
        },
        {
            "sourceType": "email-send", "targetType": "email:ActionSendEmail", "direction": "forward",
            "parameterMap": {
                "toEmail": "to",
                "subject": { "target": "subject", "transform": "uppercase" },
                "options.priority": { "target": "settings.priority", "default": "normal" }
            }
        },
        {
            "sourceType": "slack:*", "targetType": "slack", "direction": "reverse",
            "parameterMap": { "channel": "channel", "text": "text" }
        }
    ]
}"#;

#[allow(dead_code)]
pub fn registry() -> MappingRegistry {
    MappingRegistry::from_json(MAPPINGS_JSON).expect("fixture mappings should load")
}

/// Three variable nodes and no connections at all.
#[allow(dead_code)]
pub fn unconnected_node_workflow() -> Value {
    json!({
        "name": "Unconnected",
        "nodes": [
            { "id": "a", "name": "First", "type": "set", "parameters": { "values": [{ "name": "x", "value": 1 }] } },
            { "id": "b", "name": "Second", "type": "set", "parameters": { "values": [{ "name": "y", "value": 2 }] } },
            { "id": "c", "name": "Third", "type": "set", "parameters": { "values": [{ "name": "z", "value": 3 }] } }
        ]
    })
}

/// A variable node feeding a three-way branch.
///
/// `Init -> Check`, then `Check[0] -> New`, `Check[1] -> Big`, `Check[2] -> Other`.
#[allow(dead_code)]
pub fn branching_node_workflow() -> Value {
    json!({
        "name": "Branching",
        "nodes": [
            { "id": "a", "name": "Init", "type": "set", "position": [100, 200],
              "parameters": { "values": [{ "name": "status", "value": "new" }] } },
            { "id": "b", "name": "Check", "type": "if", "position": [300, 200],
              "parameters": { "conditions": [
                  { "value1": "=<<ctx.status>>", "operation": "equal", "value2": "new" },
                  { "value1": "=<<ctx.count>>", "operation": "larger", "value2": 5 },
                  { "operation": "always" }
              ] } },
            { "id": "c", "name": "New", "type": "set", "position": [500, 100],
              "parameters": { "values": [{ "name": "kind", "value": "new" }] } },
            { "id": "d", "name": "Big", "type": "set", "position": [500, 200],
              "parameters": { "values": [{ "name": "kind", "value": "big" }] } },
            { "id": "e", "name": "Other", "type": "set", "position": [500, 300],
              "parameters": { "values": [{ "name": "kind", "value": "other" }] } }
        ],
        "connections": {
            "Init": { "main": [[{ "node": "Check", "type": "main", "index": 0 }]] },
            "Check": { "main": [
                [{ "node": "New", "type": "main", "index": 0 }],
                [{ "node": "Big", "type": "main", "index": 0 }],
                [{ "node": "Other", "type": "main", "index": 0 }]
            ] }
        }
    })
}

/// A module flow with a two-route router.
#[allow(dead_code)]
pub fn routed_module_workflow() -> Value {
    json!({
        "name": "Routed",
        "flow": [
            { "id": 1, "module": "gateway:CustomWebHook", "version": 1,
              "mapper": { "method": "post", "hookPath": "orders", "responseMode": "on completion" },
              "metadata": { "designer": { "x": 0, "y": 0, "name": "Incoming" } } },
            { "id": 2, "module": "builtin:BasicRouter", "version": 1,
              "metadata": { "designer": { "x": 300, "y": 0, "name": "Route" } },
              "routes": [
                  { "filter": { "name": "Paid", "conditions": [[{ "a": "<<1.paid>>", "o": "text:equal", "b": "yes" }]] },
                    "flow": [
                        { "id": 3, "module": "http-module", "version": 1,
                          "mapper": { "URL": "https://api.example.com/ship", "method": "POST" },
                          "metadata": { "designer": { "x": 600, "y": -100, "name": "Ship" } } }
                    ] },
                  { "flow": [
                        { "id": 4, "module": "util:SetVariables", "version": 1,
                          "mapper": { "variables": [{ "name": "status", "value": "<<upper(1.status)>>" }] },
                          "metadata": { "designer": { "x": 600, "y": 100, "name": "Hold" } } }
                    ] }
              ] }
        ],
        "metadata": { "version": 1 }
    })
}

/// Names of the node-graph targets on `output` of `source`.
#[allow(dead_code)]
pub fn targets_of(workflow: &Value, source: &str, output: usize) -> Vec<String> {
    workflow["connections"][source]["main"][output]
        .as_array()
        .map(|group| {
            group
                .iter()
                .filter_map(|t| t["node"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Number of log entries at `level`.
#[allow(dead_code)]
pub fn count_logs(result: &ConversionResult, level: LogLevel) -> usize {
    result.logs.iter().filter(|l| l.level == level).count()
}

/// Module ids of a flow list, in order.
#[allow(dead_code)]
pub fn flow_ids(flow: &Value) -> Vec<u64> {
    flow.as_array()
        .map(|modules| modules.iter().filter_map(|m| m["id"].as_u64()).collect())
        .unwrap_or_default()
}
