//! Single-entity conversion, below the graph layer.
mod common;
use common::*;
use flowbridge::convert::defaults::Identity;
use flowbridge::convert::placeholder::is_placeholder;
use flowbridge::convert::{EntityConverter, OutcomeKind};
use flowbridge::error::EntityError;
use flowbridge::mapping::EntityFamily;
use flowbridge::model::Position;
use flowbridge::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

fn params(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn identity(id: &str, name: &str) -> Identity {
    Identity {
        id: id.to_string(),
        name: name.to_string(),
    }
}

#[test]
fn test_http_entity_with_credentials() {
    let registry = registry();
    let options = ConversionOptions::new();
    let source = Entity::new("a", "Fetch", "http-request")
        .with_parameters(params(json!({ "url": "https://example.com", "method": "POST", "authentication": "basicAuth" })))
        .with_credentials(params(json!({ "httpBasicAuth": { "id": 3, "name": "Ops" } })))
        .with_position(10.0, 20.0);

    let outcome = EntityConverter::new(&registry, &options, Direction::Forward)
        .convert(&source, &identity("1", "Fetch"))
        .unwrap();

    assert_eq!(outcome.kind, OutcomeKind::Mapped);
    assert_eq!(outcome.family, EntityFamily::HttpRequest);
    assert_eq!(outcome.entity.entity_type, "http-module");
    assert_eq!(outcome.entity.position, Some(Position::new(10.0, 20.0)));
    assert_eq!(
        Value::Object(outcome.entity.parameters),
        json!({ "URL": "https://example.com", "method": "POST" })
    );
    assert_eq!(
        outcome.entity.credentials.map(Value::Object),
        Some(json!({ "authentication": {
            "type": "basic", "credentialId": "3", "credentialName": "Ops", "username": "", "password": ""
        } }))
    );
    assert_eq!(outcome.diagnostics.review().len(), 1);
    assert_eq!(outcome.diagnostics.mapped_count(), 1);
}

#[test]
fn test_unmapped_entity_becomes_placeholder() {
    let registry = registry();
    let options = ConversionOptions::new();
    let source = Entity::new("x", "Odd", "custom:Weirdo").with_parameters(params(json!({ "knob": 11 })));

    let outcome = EntityConverter::new(&registry, &options, Direction::Forward)
        .convert(&source, &identity("4", "Odd"))
        .unwrap();

    assert_eq!(outcome.kind, OutcomeKind::Placeholder);
    assert!(is_placeholder(&outcome.entity));
    assert_eq!(outcome.entity.id, "4");
    assert_eq!(
        Value::Object(outcome.entity.parameters),
        json!({
            "originalType": "custom:Weirdo",
            "originalName": "Odd",
            "originalParameters": { "knob": 11 },
            "placeholderReason": "No mapping found for type 'custom:Weirdo'"
        })
    );
    assert_eq!(outcome.diagnostics.unmapped(), ["4".to_string()]);
    assert_eq!(outcome.diagnostics.count(LogLevel::Warning), 1);
    assert_eq!(outcome.diagnostics.review()[0].path, "");
}

#[test]
fn test_conditions_become_route_filters() {
    let registry = registry();
    let options = ConversionOptions::new();
    let source = Entity::new("b", "Check", "if").with_parameters(params(json!({ "conditions": [
        { "value1": "=<<ctx.total>>", "operation": "largerEqual", "value2": 100, "name": "Large" },
        { "value1": "=<<ctx.kind>>", "operation": "between", "value2": "a" },
        { "operation": "always" }
    ] })));

    let outcome = EntityConverter::new(&registry, &options, Direction::Forward)
        .convert(&source, &identity("2", "Check"))
        .unwrap();

    assert_eq!(outcome.outputs, Some(3));
    assert_eq!(
        outcome.entity.parameters["routes"],
        json!([
            { "name": "Large", "conditions": [[{ "a": "<<1.total>>", "o": "number:greaterorequal", "b": 100 }]] },
            { "name": "Route 2", "conditions": [[{ "a": "<<1.kind>>", "o": "text:equal", "b": "a" }]] },
            null
        ])
    );
    assert_eq!(outcome.diagnostics.count(LogLevel::Warning), 1);
    assert!(outcome.diagnostics.logs()[0].message.contains("Unknown operator 'between'"));
}

#[test]
fn test_combined_route_filter_keeps_first_comparison() {
    let registry = registry();
    let options = ConversionOptions::new();
    let source = Entity::new("2", "Route", "builtin:BasicRouter").with_parameters(params(json!({ "routes": [
        { "name": "Both", "conditions": [[
            { "a": "<<1.x>>", "o": "number:less", "b": 3 },
            { "a": "<<1.y>>", "o": "text:contain", "b": "z" }
        ]] }
    ] })));

    let outcome = EntityConverter::new(&registry, &options, Direction::Reverse)
        .convert(&source, &identity("node-2", "Route"))
        .unwrap();

    assert_eq!(outcome.entity.entity_type, "if");
    assert_eq!(
        outcome.entity.parameters["conditions"],
        json!([{ "name": "Both", "value1": "=<<ctx.x>>", "operation": "smaller", "value2": 3 }])
    );
    assert_eq!(outcome.diagnostics.count(LogLevel::Warning), 1);
    assert_eq!(outcome.diagnostics.review()[0].path, "conditions[0]");
}

#[test]
fn test_malformed_variables_are_an_entity_error() {
    let registry = registry();
    let options = ConversionOptions::new();
    let source = Entity::new("a", "Vars", "set").with_parameters(params(json!({ "values": 5 })));

    let err = EntityConverter::new(&registry, &options, Direction::Forward)
        .convert(&source, &identity("1", "Vars"))
        .unwrap_err();

    assert!(matches!(err, EntityError::MalformedField { ref field, .. } if field == "values"));
}

#[test]
fn test_webhook_reverse_with_unknown_response_mode() {
    let registry = registry();
    let options = ConversionOptions::new();
    let source = Entity::new("1", "Hook", "gateway:CustomWebHook")
        .with_parameters(params(json!({ "method": "put", "hookPath": "in", "responseMode": "eventually" })));

    let outcome = EntityConverter::new(&registry, &options, Direction::Reverse)
        .convert(&source, &identity("node-1", "Hook"))
        .unwrap();

    assert_eq!(
        Value::Object(outcome.entity.parameters),
        json!({ "httpMethod": "PUT", "path": "in", "responseMode": "onReceived" })
    );
    assert_eq!(outcome.diagnostics.count(LogLevel::Warning), 1);
}

#[test]
fn test_webhook_method_expression_is_transpiled() {
    let registry = registry();
    let options = ConversionOptions::new();
    let source = Entity::new("a", "Hook", "webhook")
        .with_parameters(params(json!({ "httpMethod": "=<<ctx.method>>", "path": "orders" })));

    let outcome = EntityConverter::new(&registry, &options, Direction::Forward)
        .convert(&source, &identity("1", "Hook"))
        .unwrap();

    assert_eq!(
        Value::Object(outcome.entity.parameters),
        json!({ "method": "<<1.method>>", "hookPath": "orders", "responseMode": "on receive" })
    );

    let literal = Entity::new("b", "Hook", "webhook").with_parameters(params(json!({ "httpMethod": "post" })));
    let outcome = EntityConverter::new(&registry, &options, Direction::Forward)
        .convert(&literal, &identity("2", "Hook"))
        .unwrap();
    assert_eq!(outcome.entity.parameters["method"], "POST");
}
