//! Rebuilds nested module-graph routes from a flat edge list.

use super::ConvertedEntity;
use crate::diagnostics::Diagnostics;
use crate::mapping::EntityFamily;
use crate::model::module_graph::ROUTES_PARAMETER;
use crate::model::{Designer, Filter, Module, ModuleMetadata, ModuleWorkflow, Route, Topology};
use ahash::AHashMap;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Type of the routers synthesized for fan-out.
pub const FAN_OUT_ROUTER: &str = "builtin:BasicRouter";

/// Builds the module-graph document for `entities` connected by `topology`.
///
/// Without explicit edges the entities form one chain in list order. A
/// branching entity gets one route per output group; a router's remaining
/// chain continues in route 0 under the sequential fallback. Fan-out from a
/// plain entity becomes a synthesized router, an entity reached twice keeps
/// its first placement, and entities no root reaches are appended at the top level.
pub fn build(name: String, topology: &Topology, entities: Vec<ConvertedEntity>, diagnostics: &mut Diagnostics) -> ModuleWorkflow {
    let mut builder = TreeBuilder::new(entities, topology, diagnostics);
    let flow = builder.build_all();
    let mut workflow = ModuleWorkflow::empty(name);
    workflow.flow = flow;
    workflow
}

struct TreeBuilder<'d> {
    entities: Vec<Option<ConvertedEntity>>,
    /// entity index -> output index -> target indices, in edge order.
    outputs: Vec<BTreeMap<usize, Vec<usize>>>,
    incoming: Vec<bool>,
    placed: Vec<bool>,
    names: Vec<String>,
    next_id: u64,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> TreeBuilder<'d> {
    fn new(entities: Vec<ConvertedEntity>, topology: &Topology, diagnostics: &'d mut Diagnostics) -> Self {
        let count = entities.len();
        let index: AHashMap<&str, usize> = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.source_id.as_str(), i))
            .collect();

        let mut outputs: Vec<BTreeMap<usize, Vec<usize>>> = vec![BTreeMap::new(); count];
        let mut incoming = vec![false; count];
        if topology.explicit {
            for edge in &topology.edges {
                match (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
                    (Some(&from), Some(&to)) => {
                        let targets = outputs[from].entry(edge.output).or_default();
                        if !targets.contains(&to) {
                            targets.push(to);
                        }
                        incoming[to] = true;
                    }
                    _ => diagnostics.warn(format!(
                        "Connection '{}' -> '{}' dropped: endpoint could not be resolved",
                        edge.source, edge.target
                    )),
                }
            }
        } else {
            for i in 1..count {
                outputs[i - 1].entry(0).or_default().push(i);
                incoming[i] = true;
            }
        }

        let names = entities.iter().map(|e| e.entity.name.clone()).collect();
        let next_id = entities
            .iter()
            .filter_map(|e| e.entity.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        Self {
            entities: entities.into_iter().map(Some).collect(),
            outputs,
            incoming,
            placed: vec![false; count],
            names,
            next_id,
            diagnostics,
        }
    }

    fn build_all(&mut self) -> Vec<Module> {
        let count = self.entities.len();
        let roots: Vec<usize> = (0..count).filter(|&i| !self.incoming[i]).collect();
        if roots.len() > 1 {
            self.diagnostics.warn(format!(
                "Workflow has {} starting entities; their chains are joined in order",
                roots.len()
            ));
        }

        let mut flow = Vec::new();
        for root in roots {
            flow.extend(self.chain(root));
        }
        for i in 0..count {
            if !self.placed[i] {
                self.diagnostics.warn(format!(
                    "Entity '{}' is not reachable from a starting entity; appended at the top level",
                    self.names[i]
                ));
                flow.extend(self.chain(i));
            }
        }
        flow
    }

    /// Places `start` and everything that follows it on one flow list.
    fn chain(&mut self, start: usize) -> Vec<Module> {
        let mut flow = Vec::new();
        let mut current = Some(start);

        while let Some(idx) = current.take() {
            let Some(converted) = self.entities[idx].take() else {
                break;
            };
            self.placed[idx] = true;
            let outputs = std::mem::take(&mut self.outputs[idx]);

            if converted.family == EntityFamily::Branching {
                flow.push(self.router(idx, converted, outputs));
                break;
            }

            let module = to_module(converted.entity);
            let mut extra_outputs = outputs.keys().filter(|&&o| o > 0).peekable();
            if extra_outputs.peek().is_some() {
                self.diagnostics.warn(format!(
                    "'{}' has connections on secondary outputs; they continue from its single output",
                    self.names[idx]
                ));
            }
            let targets: Vec<usize> = outputs.into_values().flatten().collect();
            flow.push(module);

            let targets = self.unplaced(idx, targets);
            match targets.as_slice() {
                [] => {}
                [next] => current = Some(*next),
                _ => {
                    let router = self.fan_out(idx, targets);
                    flow.push(router);
                }
            }
        }
        flow
    }

    /// A branching entity: one route per output group, filters taken from
    /// the converted entity's route list.
    fn router(&mut self, idx: usize, converted: ConvertedEntity, mut outputs: BTreeMap<usize, Vec<usize>>) -> Module {
        let mut entity = converted.entity;
        let filters: Vec<Value> = match entity.parameters.remove(ROUTES_PARAMETER) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let wired = outputs.keys().next_back().map_or(0, |&o| o + 1);
        let route_count = converted.outputs.unwrap_or_else(|| wired.max(filters.len()));

        let dropped: Vec<usize> = outputs.range(route_count..).map(|(&o, _)| o).collect();
        for output in dropped {
            self.diagnostics.warn(format!(
                "Output {} of '{}' has no matching condition; its connections were dropped",
                output, self.names[idx]
            ));
            outputs.remove(&output);
        }

        let mut routes = Vec::with_capacity(route_count);
        for i in 0..route_count {
            let filter = filters
                .get(i)
                .filter(|f| !f.is_null())
                .and_then(|f| serde_json::from_value::<Filter>(f.clone()).ok());
            let targets = outputs.remove(&i).unwrap_or_default();
            let targets = self.unplaced(idx, targets);
            let flow = self.continue_with(idx, targets);
            routes.push(Route { filter, flow });
        }

        let mut module = to_module(entity);
        module.routes = routes;
        module
    }

    /// The sub-flow following `from` into `targets`.
    fn continue_with(&mut self, from: usize, targets: Vec<usize>) -> Vec<Module> {
        match targets.as_slice() {
            [] => Vec::new(),
            [next] => self.chain(*next),
            _ => vec![self.fan_out(from, targets)],
        }
    }

    /// A synthesized router with one unconditional route per target.
    fn fan_out(&mut self, from: usize, targets: Vec<usize>) -> Module {
        let id = self.next_id;
        self.next_id += 1;
        self.diagnostics.info(format!(
            "Inserted router {} for {} parallel branches after '{}'",
            id,
            targets.len(),
            self.names[from]
        ));
        let routes = targets
            .into_iter()
            .map(|t| Route {
                filter: None,
                flow: self.chain(t),
            })
            .collect();
        Module {
            id,
            module: FAN_OUT_ROUTER.to_string(),
            version: 1,
            parameters: Map::new(),
            mapper: Map::new(),
            metadata: ModuleMetadata {
                designer: Designer {
                    x: 0.0,
                    y: 0.0,
                    name: Some(format!("Router {}", id)),
                },
                extra: Map::new(),
            },
            routes,
            filter: None,
        }
    }

    /// Drops targets already placed elsewhere, with a warning per merge.
    fn unplaced(&mut self, from: usize, targets: Vec<usize>) -> Vec<usize> {
        let mut kept = Vec::with_capacity(targets.len());
        for t in targets {
            if self.placed[t] || self.entities[t].is_none() || kept.contains(&t) {
                self.diagnostics.warn(format!(
                    "'{}' is reached from more than one entity; connection from '{}' dropped",
                    self.names[t], self.names[from]
                ));
            } else {
                kept.push(t);
            }
        }
        kept
    }
}

fn to_module(entity: crate::model::Entity) -> Module {
    let id = entity.id.parse().unwrap_or_default();
    Module::from_entity(id, entity)
}
