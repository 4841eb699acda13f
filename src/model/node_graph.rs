use super::entity::{Edge, Entity, LiftedWorkflow, Position, Topology};
use super::string_or_number;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the entity list of a node-graph document.
pub const NODES_FIELD: &str = "nodes";
/// Field holding the adjacency map of a node-graph document.
pub const CONNECTIONS_FIELD: &str = "connections";
/// Wrapper key of the legacy export shape.
pub const LEGACY_WRAPPER_FIELD: &str = "workflow";
/// Connection type used for ordinary data edges.
pub const MAIN_CONNECTION: &str = "main";

/// A node-graph workflow document ("Workflow A").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeWorkflow {
    #[serde(default)]
    pub name: String,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: IndexMap<String, NodeOutputs>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub settings: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default, deserialize_with = "string_or_number::as_string")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_version: Option<f64>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Output groups of one node: `main[output_index] = [targets]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawNodeOutputs")]
pub struct NodeOutputs {
    pub main: Vec<Vec<ConnectionTarget>>,
}

/// Accepts both the wrapped `{"main": [...]}` form and a bare list of groups.
/// A `null` group is read as an empty one.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodeOutputs {
    Wrapped {
        #[serde(default)]
        main: Vec<Option<Vec<ConnectionTarget>>>,
    },
    Bare(Vec<Option<Vec<ConnectionTarget>>>),
}

impl From<RawNodeOutputs> for NodeOutputs {
    fn from(raw: RawNodeOutputs) -> Self {
        let groups = match raw {
            RawNodeOutputs::Wrapped { main } => main,
            RawNodeOutputs::Bare(groups) => groups,
        };
        Self {
            main: groups.into_iter().map(Option::unwrap_or_default).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    pub node: String,
    #[serde(rename = "type", default = "main_connection")]
    pub connection_type: String,
    #[serde(default)]
    pub index: usize,
}

fn main_connection() -> String {
    MAIN_CONNECTION.to_string()
}

impl ConnectionTarget {
    pub fn main(node: impl Into<String>, index: usize) -> Self {
        Self {
            node: node.into(),
            connection_type: main_connection(),
            index,
        }
    }
}

impl NodeWorkflow {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            connections: IndexMap::new(),
            settings: Map::new(),
        }
    }

    /// Adds an edge `source[output] -> target[input]`, growing the output
    /// group list as needed. Duplicate edges are ignored.
    pub fn connect(&mut self, source: &str, output: usize, target: &str, input: usize) {
        let outputs = self.connections.entry(source.to_string()).or_default();
        if outputs.main.len() <= output {
            outputs.main.resize_with(output + 1, Vec::new);
        }
        let group = &mut outputs.main[output];
        if !group.iter().any(|t| t.node == target && t.index == input) {
            group.push(ConnectionTarget::main(target, input));
        }
    }

    /// Makes sure `source` has at least `count` output groups, even if empty.
    pub fn ensure_outputs(&mut self, source: &str, count: usize) {
        let outputs = self.connections.entry(source.to_string()).or_default();
        if outputs.main.len() < count {
            outputs.main.resize_with(count, Vec::new);
        }
    }

    /// Converts the document into the neutral model.
    ///
    /// Connection endpoints are resolved from node names to node ids. An
    /// endpoint naming no node is kept verbatim so the graph converter can
    /// report it when resolution fails. Nodes without an id are identified
    /// by their name.
    pub fn lift(mut self) -> LiftedWorkflow {
        for node in self.nodes.iter_mut().filter(|n| n.id.is_empty()) {
            node.id = node.name.clone();
        }
        let name_to_id: IndexMap<&str, &str> = self
            .nodes
            .iter()
            .map(|n| (n.name.as_str(), n.id.as_str()))
            .collect();
        let resolve = |name: &str| -> String {
            name_to_id
                .get(name)
                .map(|id| id.to_string())
                .unwrap_or_else(|| name.to_string())
        };

        let mut edges = Vec::new();
        for (source_name, outputs) in &self.connections {
            let source = resolve(source_name);
            for (output, group) in outputs.main.iter().enumerate() {
                for target in group {
                    edges.push(Edge {
                        source: source.clone(),
                        output,
                        target: resolve(&target.node),
                        input: target.index,
                    });
                }
            }
        }
        let explicit = !self.connections.is_empty();

        let entities = self
            .nodes
            .into_iter()
            .map(|node| Entity {
                id: node.id,
                name: node.name,
                entity_type: node.node_type,
                parameters: node.parameters,
                position: node.position.map(|[x, y]| Position::new(x, y)),
                credentials: node.credentials,
                disabled: node.disabled,
                notes: node.notes,
            })
            .collect();

        LiftedWorkflow {
            name: self.name,
            entities,
            topology: Topology { edges, explicit },
        }
    }
}

impl From<Entity> for Node {
    fn from(entity: Entity) -> Self {
        Node {
            id: entity.id,
            name: entity.name,
            node_type: entity.entity_type,
            type_version: Some(1.0),
            parameters: entity.parameters,
            position: entity.position.map(|p| [p.x, p.y]),
            credentials: entity.credentials.filter(|c| !c.is_empty()),
            disabled: entity.disabled,
            notes: entity.notes,
        }
    }
}
