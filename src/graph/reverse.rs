//! Rebuilds a node-graph adjacency map from the lifted module edges.

use super::ConvertedEntity;
use crate::diagnostics::Diagnostics;
use crate::model::{Node, NodeWorkflow, Topology};
use ahash::AHashMap;

/// Builds the node-graph document for `entities` connected by `topology`.
///
/// Connections are keyed by the converted entity names. Without explicit
/// edges the entities are chained in list order on output 0.
pub fn build(name: String, topology: &Topology, entities: Vec<ConvertedEntity>, diagnostics: &mut Diagnostics) -> NodeWorkflow {
    let names: AHashMap<&str, &str> = entities
        .iter()
        .map(|e| (e.source_id.as_str(), e.entity.name.as_str()))
        .collect();

    let mut workflow = NodeWorkflow::empty(name);
    if topology.explicit {
        for edge in &topology.edges {
            match (names.get(edge.source.as_str()), names.get(edge.target.as_str())) {
                (Some(from), Some(to)) => workflow.connect(from, edge.output, to, edge.input),
                _ => diagnostics.warn(format!(
                    "Connection '{}' -> '{}' dropped: endpoint could not be resolved",
                    edge.source, edge.target
                )),
            }
        }
    } else {
        for pair in entities.windows(2) {
            workflow.connect(&pair[0].entity.name, 0, &pair[1].entity.name, 0);
        }
    }

    for converted in &entities {
        if let Some(count) = converted.outputs {
            let wired = workflow
                .connections
                .get(&converted.entity.name)
                .map_or(0, |o| o.main.len());
            if wired > count {
                diagnostics.warn(format!(
                    "'{}' has {} wired outputs but {} conditions",
                    converted.entity.name, wired, count
                ));
            }
            workflow.ensure_outputs(&converted.entity.name, count);
        }
    }

    workflow.nodes = entities.into_iter().map(|c| Node::from(c.entity)).collect();
    workflow
}
