//! Integration tests for Flowbridge
//!
//! End-to-end conversions of whole workflows in both directions.
//!
mod common;
use common::*;
use flowbridge::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[cfg(test)]
mod integration_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_http_request_converts_to_http_module() {
        let workflow = json!({
            "name": "Http",
            "nodes": [{
                "id": "n1", "name": "Fetch", "type": "http-request",
                "parameters": { "url": "https://api.example.com", "method": "GET" }
            }]
        });

        let result = Converter::new(&registry()).convert(&workflow, Direction::Forward);

        let module = &result.converted_workflow["flow"][0];
        assert_eq!(module["module"], "http-module");
        assert_eq!(
            module["mapper"],
            json!({ "URL": "https://api.example.com", "method": "GET" })
        );
        assert!(result.unmapped_entities.is_empty());
        assert_eq!(result.debug_info.mapped_count, 1);
    }

    #[test]
    fn test_mapped_entities_take_the_declared_target_type() {
        let registry = registry();
        let result = Converter::new(&registry).convert(&branching_node_workflow(), Direction::Forward);
        let flow = &result.converted_workflow["flow"];

        assert_eq!(flow[0]["module"], "util:SetVariables");
        assert_eq!(flow[1]["module"], "builtin:BasicRouter");
        for route in flow[1]["routes"].as_array().unwrap() {
            assert_eq!(route["flow"][0]["module"], "util:SetVariables");
        }
        assert_eq!(result.debug_info.source_entity_count, 5);
        assert_eq!(result.debug_info.converted_entity_count, 5);
    }

    #[test]
    fn test_unmapped_custom_type_becomes_placeholder() {
        let workflow = json!({
            "name": "Weird",
            "nodes": [{
                "id": "w", "name": "Weird", "type": "custom:Weirdo",
                "parameters": { "foo": "bar" }
            }]
        });

        let result = Converter::new(&registry()).convert(&workflow, Direction::Forward);

        let module = &result.converted_workflow["flow"][0];
        assert_eq!(module["module"], "no-op");
        assert_eq!(module["mapper"]["originalType"], "custom:Weirdo");
        assert_eq!(module["mapper"]["originalParameters"], json!({ "foo": "bar" }));
        assert_eq!(result.unmapped_entities, vec!["1".to_string()]);
        assert_eq!(count_logs(&result, LogLevel::Warning), 1);
        assert_eq!(result.parameters_needing_review.len(), 1);
        assert_eq!(result.debug_info.unmapped_count, 1);
    }

    #[test]
    fn test_three_modules_without_routes_chain_sequentially() {
        let workflow = json!({
            "name": "Chain",
            "flow": [
                { "id": 1, "module": "util:SetVariables", "mapper": { "variables": [] },
                  "metadata": { "designer": { "x": 0, "y": 0, "name": "One" } } },
                { "id": 2, "module": "util:SetVariables", "mapper": { "variables": [] },
                  "metadata": { "designer": { "x": 200, "y": 0, "name": "Two" } } },
                { "id": 3, "module": "util:SetVariables", "mapper": { "variables": [] },
                  "metadata": { "designer": { "x": 400, "y": 0, "name": "Three" } } }
            ]
        });

        let result = Converter::new(&registry()).convert(&workflow, Direction::Reverse);

        assert_eq!(
            result.converted_workflow["connections"],
            json!({
                "One": { "main": [[{ "node": "Two", "type": "main", "index": 0 }]] },
                "Two": { "main": [[{ "node": "Three", "type": "main", "index": 0 }]] }
            })
        );
    }

    #[test]
    fn test_unconnected_nodes_form_one_flow_in_order() {
        let result = Converter::new(&registry()).convert(&unconnected_node_workflow(), Direction::Forward);

        let flow = &result.converted_workflow["flow"];
        assert_eq!(flow_ids(flow), vec![1, 2, 3]);
        assert_eq!(count_logs(&result, LogLevel::Warning), 0);
        assert_eq!(
            flow[0]["mapper"],
            json!({ "variables": [{ "name": "x", "value": 1 }] })
        );
    }

    #[test]
    fn test_branching_entity_gets_one_route_per_condition() {
        let result = Converter::new(&registry()).convert(&branching_node_workflow(), Direction::Forward);
        let router = &result.converted_workflow["flow"][1];
        let routes = router["routes"].as_array().unwrap();

        assert_eq!(routes.len(), 3);
        assert_eq!(
            routes[0]["filter"],
            json!({
                "name": "Route 1",
                "conditions": [[{ "a": "<<1.status>>", "o": "text:equal", "b": "new" }]]
            })
        );
        assert_eq!(
            routes[1]["filter"]["conditions"][0][0],
            json!({ "a": "<<1.count>>", "o": "number:greater", "b": 5 })
        );
        assert!(routes[2].get("filter").is_none());
        assert_eq!(flow_ids(&routes[0]["flow"]), vec![3]);
        assert_eq!(flow_ids(&routes[1]["flow"]), vec![4]);
        assert_eq!(flow_ids(&routes[2]["flow"]), vec![5]);
        assert!(router["mapper"].get("routes").is_none());
    }

    #[test]
    fn test_router_routes_become_output_groups() {
        let result = Converter::new(&registry()).convert(&routed_module_workflow(), Direction::Reverse);
        let workflow = &result.converted_workflow;

        assert_eq!(targets_of(workflow, "Incoming", 0), vec!["Route"]);
        assert_eq!(targets_of(workflow, "Route", 0), vec!["Ship"]);
        assert_eq!(targets_of(workflow, "Route", 1), vec!["Hold"]);
        assert_eq!(workflow["connections"]["Route"]["main"].as_array().unwrap().len(), 2);

        let route = &workflow["nodes"][1];
        assert_eq!(route["type"], "if");
        assert_eq!(
            route["parameters"]["conditions"],
            json!([
                { "name": "Paid", "value1": "=<<ctx.paid>>", "operation": "equal", "value2": "yes" },
                { "operation": "always" }
            ])
        );
    }

    #[test]
    fn test_router_with_empty_route_keeps_its_output_group() {
        let mut workflow = routed_module_workflow();
        workflow["flow"][1]["routes"]
            .as_array_mut()
            .unwrap()
            .push(json!({ "filter": { "name": "Late", "conditions": [[{ "a": "<<1.late>>", "o": "text:equal", "b": "1" }]] }, "flow": [] }));

        let result = Converter::new(&registry()).convert(&workflow, Direction::Reverse);
        let main = result.converted_workflow["connections"]["Route"]["main"]
            .as_array()
            .unwrap()
            .clone();

        assert_eq!(main.len(), 3);
        assert_eq!(main[2], json!([]));
    }

    #[test]
    fn test_reverse_conversion_of_routed_workflow() {
        let result = Converter::new(&registry()).convert(&routed_module_workflow(), Direction::Reverse);
        let nodes = result.converted_workflow["nodes"].as_array().unwrap().clone();

        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0]["type"], "webhook");
        assert_eq!(
            nodes[0]["parameters"],
            json!({ "httpMethod": "POST", "path": "orders", "responseMode": "lastNode" })
        );
        assert_eq!(nodes[2]["type"], "http-request");
        assert_eq!(
            nodes[2]["parameters"],
            json!({ "url": "https://api.example.com/ship", "method": "POST" })
        );
        assert_eq!(nodes[3]["type"], "set");
        assert_eq!(
            nodes[3]["parameters"]["values"],
            json!([{ "name": "status", "value": "=<<toUpperCase(ctx.status)>>" }])
        );
        assert_eq!(nodes[2]["position"], json!([600.0, -100.0]));
        assert!(result.unmapped_entities.is_empty());
    }

    #[test]
    fn test_round_trip_keeps_structure_and_conditions() {
        let registry = registry();
        let converter = Converter::new(&registry);
        let original = branching_node_workflow();

        let forward = converter.convert(&original, Direction::Forward);
        let back = converter.convert(&forward.converted_workflow, Direction::Reverse);
        let workflow = &back.converted_workflow;

        let names: Vec<&str> = workflow["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Init", "Check", "New", "Big", "Other"]);
        assert_eq!(workflow["nodes"][1]["parameters"], original["nodes"][1]["parameters"]);
        assert_eq!(workflow["nodes"][2]["parameters"], original["nodes"][2]["parameters"]);
        assert_eq!(targets_of(workflow, "Init", 0), vec!["Check"]);
        assert_eq!(targets_of(workflow, "Check", 0), vec!["New"]);
        assert_eq!(targets_of(workflow, "Check", 1), vec!["Big"]);
        assert_eq!(targets_of(workflow, "Check", 2), vec!["Other"]);
        assert_eq!(count_logs(&back, LogLevel::Warning), 0);
    }

    #[test]
    fn test_strict_mode_aborts_on_unmapped_entity() {
        let workflow = json!({
            "name": "Strict",
            "nodes": [
                { "id": "a", "name": "Fetch", "type": "http-request", "parameters": { "url": "=<<ctx.url>>x<<" } },
                { "id": "b", "name": "Weird", "type": "custom:Weirdo" }
            ]
        });
        let registry = registry();
        let converter = Converter::new(&registry).with_options(ConversionOptions::new().strict(true));

        let result = converter.convert(&workflow, Direction::Forward);

        assert!(result.is_fatal());
        assert_eq!(
            result.converted_workflow,
            json!({ "name": "", "flow": [], "metadata": { "version": 1 } })
        );
        assert!(count_logs(&result, LogLevel::Error) >= 1);
        assert!(result.parameters_needing_review.is_empty());
        assert!(result.unmapped_entities.is_empty());
    }

    #[test]
    fn test_strict_mode_aborts_on_entity_failure() {
        let workflow = json!({
            "name": "Broken",
            "nodes": [{ "id": "a", "name": "Bad", "type": "set", "parameters": { "values": "oops" } }]
        });
        let registry = registry();
        let strict = Converter::new(&registry).with_options(ConversionOptions::new().strict(true));

        let result = strict.convert(&workflow, Direction::Forward);

        assert!(result.is_fatal());
        assert!(result.logs.last().unwrap().message.contains("Bad"));
    }

    #[test]
    fn test_entity_failure_degrades_to_placeholder() {
        let workflow = json!({
            "name": "Broken",
            "nodes": [
                { "id": "a", "name": "Bad", "type": "set", "parameters": { "values": "oops" } },
                { "id": "b", "name": "Good", "type": "set", "parameters": { "values": [] } }
            ]
        });

        let result = Converter::new(&registry()).convert(&workflow, Direction::Forward);
        let flow = &result.converted_workflow["flow"];

        assert!(!result.is_fatal());
        assert_eq!(flow[0]["module"], "no-op");
        assert_eq!(flow[0]["mapper"]["originalType"], "set");
        assert_eq!(flow[1]["module"], "util:SetVariables");
        assert_eq!(result.unmapped_entities, vec!["1".to_string()]);
        assert_eq!(count_logs(&result, LogLevel::Warning), 1);
    }

    #[test]
    fn test_invalid_document_is_fatal() {
        let registry = registry();
        let converter = Converter::new(&registry);

        let result = converter.convert(&json!({ "name": "No nodes" }), Direction::Forward);
        assert!(result.is_fatal());
        assert_eq!(result.converted_workflow["flow"], json!([]));

        let result = converter.convert(&json!([1, 2, 3]), Direction::Reverse);
        assert!(result.is_fatal());
        assert_eq!(result.converted_workflow["nodes"], json!([]));
        assert_eq!(result.converted_workflow["connections"], json!({}));

        let result = converter.convert_auto(&json!({ "something": "else" }));
        assert!(result.is_fatal());
    }

    #[test]
    fn test_legacy_shapes_are_normalized() {
        let registry = registry();
        let converter = Converter::new(&registry);

        let wrapped = json!({ "workflow": unconnected_node_workflow() });
        let result = converter.convert(&wrapped, Direction::Forward);
        assert_eq!(flow_ids(&result.converted_workflow["flow"]), vec![1, 2, 3]);
        assert!(result.logs.iter().any(|l| l.message.contains("legacy")));

        let mut legacy = routed_module_workflow();
        let flow = legacy.as_object_mut().unwrap().remove("flow").unwrap();
        legacy["modules"] = flow;
        let result = converter.convert_auto(&legacy);
        assert_eq!(result.debug_info.target_platform, Some(Platform::NodeGraph));
        assert_eq!(result.converted_workflow["nodes"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_convert_auto_picks_direction() {
        let registry = registry();
        let converter = Converter::new(&registry);

        let forward = converter.convert_auto(&unconnected_node_workflow());
        assert_eq!(forward.debug_info.source_platform, Some(Platform::NodeGraph));
        assert!(forward.converted_workflow.get("flow").is_some());

        let reverse = converter.convert_auto(&routed_module_workflow());
        assert_eq!(reverse.debug_info.source_platform, Some(Platform::ModuleGraph));
        assert!(reverse.converted_workflow.get("nodes").is_some());
    }

    #[test]
    fn test_debug_option_attaches_entity_details() {
        let registry = registry();
        let quiet = Converter::new(&registry).convert(&branching_node_workflow(), Direction::Forward);
        assert!(quiet.debug_info.details.is_none());

        let verbose = Converter::new(&registry)
            .with_options(ConversionOptions::new().debug(true))
            .convert(&branching_node_workflow(), Direction::Forward);
        let details = verbose.debug_info.details.unwrap();
        let details = details.as_array().unwrap();

        assert_eq!(details.len(), 5);
        assert_eq!(details[1]["family"], "branching");
        assert_eq!(details[1]["kind"], "mapped");
        assert_eq!(
            details[1]["expressionPaths"],
            json!(["conditions[0].value1", "conditions[1].value1"])
        );
    }

    #[test]
    fn test_result_serializes_with_camel_case_keys() {
        let result = Converter::new(&registry()).convert(&unconnected_node_workflow(), Direction::Forward);
        let value = serde_json::to_value(&result).unwrap();

        for key in [
            "convertedWorkflow",
            "logs",
            "parametersNeedingReview",
            "unmappedEntities",
            "debugInfo",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["debugInfo"]["sourcePlatform"], "nodeGraph");
    }
}
