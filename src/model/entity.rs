use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// The two workflow platforms the engine translates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    /// Named-output adjacency graph of nodes ("Workflow A").
    NodeGraph,
    /// Numbered, nested route lists of modules ("Workflow B").
    ModuleGraph,
}

impl Platform {
    pub fn label(self) -> &'static str {
        match self {
            Platform::NodeGraph => "node-graph",
            Platform::ModuleGraph => "module-graph",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Conversion direction. Mapping records are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// NodeGraph -> ModuleGraph.
    Forward,
    /// ModuleGraph -> NodeGraph.
    Reverse,
}

impl Direction {
    pub fn source(self) -> Platform {
        match self {
            Direction::Forward => Platform::NodeGraph,
            Direction::Reverse => Platform::ModuleGraph,
        }
    }

    pub fn target(self) -> Platform {
        match self {
            Direction::Forward => Platform::ModuleGraph,
            Direction::Reverse => Platform::NodeGraph,
        }
    }

    pub fn from_source(platform: Platform) -> Self {
        match platform {
            Platform::NodeGraph => Direction::Forward,
            Platform::ModuleGraph => Direction::Reverse,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source(), self.target())
    }
}

/// Canvas coordinates of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Platform-neutral view of a node or module.
///
/// Both document shapes are lifted into this form before conversion and
/// lowered back out of it afterwards, so the converters never see raw JSON
/// layout differences.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub entity_type: String,
    pub parameters: Map<String, Value>,
    pub position: Option<Position>,
    pub credentials: Option<Map<String, Value>>,
    pub disabled: bool,
    pub notes: Option<String>,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type: entity_type.into(),
            ..Self::default()
        }
    }

    pub fn with_parameters(mut self, parameters: Map<String, Value>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    pub fn with_credentials(mut self, credentials: Map<String, Value>) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// A directed edge between two entities, identified by entity id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: String,
    pub output: usize,
    pub target: String,
    pub input: usize,
}

impl Edge {
    pub fn new(source: impl Into<String>, output: usize, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            output,
            target: target.into(),
            input: 0,
        }
    }
}

/// Connectivity of a lifted workflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
    /// Edges in document order. Empty when the source carried no explicit data.
    pub edges: Vec<Edge>,
    /// `true` when the source document carried connection or route data.
    pub explicit: bool,
}

/// A workflow lifted into the neutral model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiftedWorkflow {
    pub name: String,
    /// Entities in traversal order. Conversion order, default ids and the
    /// sequential fallback chain all follow this order.
    pub entities: Vec<Entity>,
    pub topology: Topology,
}
