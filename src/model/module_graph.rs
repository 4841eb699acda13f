use super::entity::{Edge, Entity, LiftedWorkflow, Position, Topology};
use super::string_or_number;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Field holding the entity list of a module-graph document.
pub const FLOW_FIELD: &str = "flow";
/// Entity list field of the legacy shape.
pub const LEGACY_MODULES_FIELD: &str = "modules";
/// Parameter key under which a router's route filters travel in the neutral model.
pub const ROUTES_PARAMETER: &str = "routes";

/// A module-graph workflow document ("Workflow B").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleWorkflow {
    #[serde(default)]
    pub name: String,
    pub flow: Vec<Module>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(deserialize_with = "string_or_number::as_u64")]
    pub id: u64,
    pub module: String,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub mapper: Map<String, Value>,
    #[serde(default)]
    pub metadata: ModuleMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleMetadata {
    #[serde(default)]
    pub designer: Designer,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Designer {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One branch of a router: an optional condition and the sub-flow it feeds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(default)]
    pub flow: Vec<Module>,
}

/// A route condition. `conditions` is OR-of-AND: outer list alternatives,
/// inner list conjunctions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Vec<FilterCondition>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    #[serde(default)]
    pub a: Value,
    pub o: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<Value>,
}

impl ModuleWorkflow {
    pub fn empty(name: impl Into<String>) -> Self {
        let mut metadata = Map::new();
        metadata.insert("version".to_string(), json!(1));
        Self {
            name: name.into(),
            flow: Vec::new(),
            metadata,
        }
    }

    /// Converts the document into the neutral model.
    ///
    /// Modules are flattened depth-first: a router comes before the modules
    /// of its first route, which come before those of its second route.
    /// Consecutive modules in one flow list become output-0 edges; the first
    /// module of route `i` becomes an edge on output `i` of its router.
    pub fn lift(self) -> LiftedWorkflow {
        let mut entities = Vec::new();
        let mut edges = Vec::new();
        let mut has_routes = false;
        lift_flow(self.flow, &mut entities, &mut edges, &mut has_routes);

        LiftedWorkflow {
            name: self.name,
            entities,
            topology: Topology {
                edges,
                explicit: has_routes,
            },
        }
    }
}

fn lift_flow(
    flow: Vec<Module>,
    entities: &mut Vec<Entity>,
    edges: &mut Vec<Edge>,
    has_routes: &mut bool,
) -> Option<String> {
    let mut first_id = None;
    let mut previous: Option<(String, bool)> = None;

    for module in flow {
        let id = module.id.to_string();
        if first_id.is_none() {
            first_id = Some(id.clone());
        }
        if let Some((prev_id, prev_is_router)) = &previous {
            if !prev_is_router {
                edges.push(Edge::new(prev_id.clone(), 0, id.clone()));
            }
        }

        let is_router = !module.routes.is_empty();
        let (entity, routes) = lift_module(module);
        entities.push(entity);

        if is_router {
            *has_routes = true;
            for (output, route) in routes.into_iter().enumerate() {
                if let Some(head) = lift_flow(route.flow, entities, edges, has_routes) {
                    edges.push(Edge::new(id.clone(), output, head));
                }
            }
        }
        previous = Some((id, is_router));
    }
    first_id
}

fn lift_module(module: Module) -> (Entity, Vec<Route>) {
    let mut parameters = module.mapper;
    if !module.routes.is_empty() {
        let filters = module
            .routes
            .iter()
            .map(|route| {
                route
                    .filter
                    .clone()
                    .or_else(|| route.flow.first().and_then(|m| m.filter.clone()))
                    .and_then(|f| serde_json::to_value(f).ok())
                    .unwrap_or(Value::Null)
            })
            .collect();
        parameters.insert(ROUTES_PARAMETER.to_string(), Value::Array(filters));
    }

    let mut extra = module.metadata.extra;
    let disabled = extra
        .remove("disabled")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let notes = extra
        .remove("notes")
        .and_then(|v| v.as_str().map(str::to_string));
    let designer = module.metadata.designer;

    let entity = Entity {
        id: module.id.to_string(),
        name: designer.name.unwrap_or_default(),
        entity_type: module.module,
        parameters,
        position: Some(Position::new(designer.x, designer.y)),
        credentials: (!module.parameters.is_empty()).then_some(module.parameters),
        disabled,
        notes,
    };
    (entity, module.routes)
}

impl Module {
    /// Builds a module from a converted entity. `id` must already be numeric.
    pub fn from_entity(id: u64, entity: Entity) -> Self {
        let mut extra = Map::new();
        if entity.disabled {
            extra.insert("disabled".to_string(), Value::Bool(true));
        }
        if let Some(notes) = entity.notes {
            extra.insert("notes".to_string(), Value::String(notes));
        }
        let position = entity.position.unwrap_or_default();
        Module {
            id,
            module: entity.entity_type,
            version: default_version(),
            parameters: entity.credentials.unwrap_or_default(),
            mapper: entity.parameters,
            metadata: ModuleMetadata {
                designer: Designer {
                    x: position.x,
                    y: position.y,
                    name: (!entity.name.is_empty()).then_some(entity.name),
                },
                extra,
            },
            routes: Vec::new(),
            filter: None,
        }
    }
}
