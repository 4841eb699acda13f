//! Mapping registry construction, lookup and the transform hooks it carries.
mod common;
use common::*;
use flowbridge::error::TransformError;
use flowbridge::mapping::{MappingRegistryBuilder, MatchKind};
use flowbridge::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use std::io::Write;
use std::result::Result;

struct StampHook;

impl CustomTransform for StampHook {
    fn name(&self) -> &str {
        "stamp"
    }

    fn transform(&self, source: &Entity, converted: &Entity, direction: Direction) -> Result<Map<String, Value>, TransformError> {
        let mut overrides = Map::new();
        overrides.insert("origin".to_string(), json!(source.entity_type));
        overrides.insert("direction".to_string(), json!(direction.to_string()));
        let url = converted.parameters.get("URL").and_then(Value::as_str).unwrap_or_default();
        overrides.insert("URL".to_string(), json!(format!("{}?via=bridge", url)));
        Ok(overrides)
    }
}

struct BrokenHook;

impl CustomTransform for BrokenHook {
    fn name(&self) -> &str {
        "broken"
    }

    fn transform(&self, _: &Entity, _: &Entity, _: Direction) -> Result<Map<String, Value>, TransformError> {
        Err(TransformError::HookFailed {
            hook: "broken".to_string(),
            message: "upstream catalogue unavailable".to_string(),
        })
    }
}

fn http_workflow() -> Value {
    json!({
        "name": "Hooked",
        "nodes": [{
            "id": "a", "name": "Fetch", "type": "http-request",
            "parameters": { "url": "https://example.com", "method": "GET" }
        }]
    })
}

fn hooked_registry(hook: &str) -> MappingRegistry {
    MappingRegistry::builder()
        .with_record(
            MappingRecord::new("http-request", "http-module", Direction::Forward)
                .map("url", "URL")
                .map("method", "method")
                .custom_transform(hook),
        )
        .with_custom_transform(StampHook)
        .with_custom_transform(BrokenHook)
        .build()
        .unwrap()
}

#[cfg(test)]
mod registry_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_loads_fixture_database() {
        let registry = registry();
        assert_eq!(registry.version(), "2024.1");
        assert_eq!(registry.len(), 10);
    }

    #[test]
    fn test_exact_prefix_and_alias_lookups() {
        let registry = registry();

        let (mapping, kind) = registry.resolve("http-request", Direction::Forward).unwrap();
        assert_eq!(mapping.target_type, "http-module");
        assert_eq!(kind, MatchKind::Exact);

        let (mapping, kind) = registry.resolve("slack:PostMessage", Direction::Reverse).unwrap();
        assert_eq!(mapping.target_type, "slack");
        assert_eq!(kind, MatchKind::Prefix);

        let (mapping, kind) = registry.resolve("setVariables", Direction::Forward).unwrap();
        assert_eq!(mapping.target_type, "util:SetVariables");
        assert_eq!(kind, MatchKind::Alias);

        let (mapping, kind) = registry.resolve("util:SetVariable2", Direction::Reverse).unwrap();
        assert_eq!(mapping.target_type, "set");
        assert_eq!(kind, MatchKind::Alias);

        assert!(registry.lookup("slack:PostMessage", Direction::Forward).is_none());
        assert!(registry.lookup("custom:Weirdo", Direction::Forward).is_none());
    }

    #[test]
    fn test_custom_alias_family() {
        let registry = MappingRegistryBuilder::new()
            .with_record(MappingRecord::new("mail", "email:ActionSendEmail", Direction::Forward))
            .with_alias_family(&["mail", "emailSend", "sendEmail"])
            .build()
            .unwrap();

        let (mapping, kind) = registry.resolve("sendEmail", Direction::Forward).unwrap();
        assert_eq!(mapping.source_type, "mail");
        assert_eq!(kind, MatchKind::Alias);
    }

    #[test]
    fn test_later_record_replaces_earlier() {
        let registry = MappingRegistry::builder()
            .with_record(MappingRecord::new("http-request", "http:ActionSendData", Direction::Forward))
            .with_record(MappingRecord::new("http-request", "http-module", Direction::Forward))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.lookup("http-request", Direction::Forward).unwrap().target_type,
            "http-module"
        );
    }

    #[test]
    fn test_families_are_fixed_at_build_time() {
        let registry = MappingRegistry::builder()
            .with_record(MappingRecord::new("acme:Decide", "if", Direction::Reverse))
            .with_record(MappingRecord::new("acme:Mystery", "acme-mystery", Direction::Reverse))
            .with_record(
                MappingRecord::new("acme:Script", "acme-script", Direction::Reverse)
                    .family(flowbridge::mapping::EntityFamily::Code),
            )
            .build()
            .unwrap();

        let family = |t: &str| registry.lookup(t, Direction::Reverse).unwrap().family.as_str();
        assert_eq!(family("acme:Decide"), "branching");
        assert_eq!(family("acme:Mystery"), "generic");
        assert_eq!(family("acme:Script"), "code");
    }

    #[test]
    fn test_unknown_transform_is_rejected() {
        let json = r#"{ "mappings": [{
            "sourceType": "email-send", "targetType": "email:ActionSendEmail", "direction": "forward",
            "parameterMap": { "subject": { "target": "subject", "transform": "shout" } }
        }] }"#;

        match MappingRegistry::from_json(json) {
            Err(MappingError::UnknownTransform { transform, path, .. }) => {
                assert_eq!(transform, "shout");
                assert_eq!(path, "subject");
            }
            other => panic!("expected UnknownTransform, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_invalid_path_is_rejected() {
        let json = r#"{ "mappings": [{
            "sourceType": "set", "targetType": "util:SetVariables", "direction": "forward",
            "parameterMap": { "options..x": "x" }
        }] }"#;

        let err = MappingRegistry::from_json(json).unwrap_err();
        assert!(matches!(err, MappingError::InvalidPath { ref path, .. } if path == "options..x"));
    }

    #[test]
    fn test_malformed_database() {
        let err = MappingRegistry::from_json("{ not json").unwrap_err();
        assert!(matches!(err, MappingError::JsonParseError(_)));
        assert!(err.to_string().starts_with("Failed to parse mapping database"));
    }

    #[test]
    fn test_file_loader() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MAPPINGS_JSON.as_bytes()).unwrap();

        let registry = MappingRegistry::from_loader(&JsonMappingLoader::from_file(file.path())).unwrap();
        assert_eq!(registry.len(), 10);
        assert!(registry.lookup("email-send", Direction::Forward).is_some());
    }

    #[test]
    fn test_file_loader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("mappings.json");

        let err = MappingRegistry::from_loader(&JsonMappingLoader::from_file(&missing)).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_text_loader_parse_error() {
        let err = MappingRegistry::from_loader(&JsonMappingLoader::from_json("\"mappings\"")).unwrap_err();
        assert!(matches!(err, LoadError::Mapping(MappingError::JsonParseError(_))));
    }

    #[test]
    fn test_custom_loader() {
        struct InMemory(MappingDatabase);

        impl MappingLoader for InMemory {
            fn load(&self) -> Result<MappingDatabase, LoadError> {
                Ok(self.0.clone())
            }
        }

        let database = MappingDatabase {
            version: "7".to_string(),
            mappings: vec![MappingRecord::new("set", "util:SetVariables", Direction::Forward)],
        };
        let registry = MappingRegistry::from_loader(&InMemory(database)).unwrap();
        assert_eq!(registry.version(), "7");
        assert_eq!(registry.len(), 1);
    }
}

#[cfg(test)]
mod transform_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_custom_transform_merges_over_base() {
        let registry = hooked_registry("stamp");
        let result = Converter::new(&registry).convert(&http_workflow(), Direction::Forward);

        assert_eq!(
            result.converted_workflow["flow"][0]["mapper"],
            json!({
                "URL": "https://example.com?via=bridge",
                "method": "GET",
                "origin": "http-request",
                "direction": "node-graph -> module-graph"
            })
        );
        assert_eq!(count_logs(&result, LogLevel::Error), 0);
    }

    #[test]
    fn test_failing_custom_transform_keeps_base() {
        let registry = hooked_registry("broken");
        let result = Converter::new(&registry).convert(&http_workflow(), Direction::Forward);

        assert_eq!(
            result.converted_workflow["flow"][0]["mapper"],
            json!({ "URL": "https://example.com", "method": "GET" })
        );
        let errors: Vec<&LogEntry> = result.logs.iter().filter(|l| l.level == LogLevel::Error).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("upstream catalogue unavailable"));
        assert!(!result.is_fatal());
        assert!(result.unmapped_entities.is_empty());
    }

    #[test]
    fn test_unregistered_hook_is_logged() {
        let registry = hooked_registry("missing");
        let result = Converter::new(&registry).convert(&http_workflow(), Direction::Forward);

        assert_eq!(count_logs(&result, LogLevel::Error), 1);
        assert!(
            result
                .logs
                .iter()
                .any(|l| l.message.contains("Custom transform hook 'missing' is not registered"))
        );
        assert_eq!(result.converted_workflow["flow"][0]["module"], "http-module");
    }

    #[test]
    fn test_functional_transform() {
        let registry = MappingRegistry::builder()
            .with_transform("cents", |value| {
                value
                    .as_f64()
                    .map(|amount| json!((amount * 100.0).round() as i64))
                    .ok_or_else(|| TransformError::Incompatible {
                        transform: "cents".to_string(),
                        value: value.to_string(),
                    })
            })
            .with_record(
                MappingRecord::new("payment", "stripe:CreateCharge", Direction::Forward)
                    .map_with("amount", "charge.amount", Some("cents"), None)
                    .map_with("currency", "charge.currency", Some("lowercase"), Some(json!("EUR"))),
            )
            .build()
            .unwrap();
        let workflow = json!({
            "name": "Pay",
            "nodes": [{ "id": "a", "name": "Charge", "type": "payment", "parameters": { "amount": 12.5 } }]
        });

        let result = Converter::new(&registry).convert(&workflow, Direction::Forward);

        assert_eq!(
            result.converted_workflow["flow"][0]["mapper"],
            json!({ "charge": { "amount": 1250, "currency": "eur" } })
        );
    }

    #[test]
    fn test_failing_value_transform_degrades_to_placeholder() {
        let registry = MappingRegistry::builder()
            .with_record(
                MappingRecord::new("payment", "stripe:CreateCharge", Direction::Forward)
                    .map_with("amount", "amount", Some("toNumber"), None),
            )
            .build()
            .unwrap();
        let workflow = json!({
            "name": "Pay",
            "nodes": [{ "id": "a", "name": "Charge", "type": "payment", "parameters": { "amount": "twelve" } }]
        });

        let result = Converter::new(&registry).convert(&workflow, Direction::Forward);
        let module = &result.converted_workflow["flow"][0];

        assert_eq!(module["module"], "no-op");
        assert_eq!(module["mapper"]["originalType"], "payment");
        assert_eq!(module["mapper"]["originalParameters"], json!({ "amount": "twelve" }));
        assert_eq!(result.unmapped_entities, vec!["1".to_string()]);
        assert!(
            result
                .logs
                .iter()
                .any(|l| l.level == LogLevel::Warning && l.message.contains("Conversion of 'Charge' failed"))
        );
    }

    #[test]
    fn test_transform_sees_processed_value() {
        let registry = MappingRegistry::builder()
            .with_record(
                MappingRecord::new("toggle", "util:Toggle", Direction::Forward)
                    .map_with("active", "flag", Some("toNumber"), None),
            )
            .build()
            .unwrap();
        let workflow = json!({
            "name": "Toggle",
            "nodes": [{ "id": "a", "name": "On", "type": "toggle", "parameters": { "active": true } }]
        });

        let result = Converter::new(&registry).convert(&workflow, Direction::Forward);

        // `true` is already the flag "1" when the transform runs
        assert_eq!(result.converted_workflow["flow"][0]["mapper"], json!({ "flag": 1 }));
    }
}
