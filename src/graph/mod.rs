//! Whole-workflow conversion.
//!
//! A conversion runs `Validate -> ConvertEntities -> ReconstructGraph ->
//! Finalize` in one synchronous pass. Entity-level problems degrade into log
//! entries and placeholders; structural problems (and, under strict mode,
//! entity-level ones) end the run with an empty target document.

mod forward;
mod reverse;
mod validate;

pub use forward::FAN_OUT_ROUTER;
pub use validate::detect_platform;

use crate::convert::defaults::{Identity, assign_identities, ensure_position};
use crate::convert::{EntityConverter, OutcomeKind, debug_detail, placeholder_outcome};
use crate::diagnostics::{DebugInfo, Diagnostics, LogEntry, LogLevel, ReviewEntry};
use crate::error::ConversionError;
use crate::expression::PositionalTable;
use crate::mapping::{EntityFamily, MappingRegistry};
use crate::model::module_graph::FLOW_FIELD;
use crate::model::node_graph::NODES_FIELD;
use crate::model::{Direction, Entity, LiftedWorkflow, ModuleWorkflow, NodeWorkflow, Platform};
use crate::options::ConversionOptions;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything one conversion call returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    /// The target document. Always of the target shape, empty after a fatal error.
    pub converted_workflow: Value,
    pub logs: Vec<LogEntry>,
    pub parameters_needing_review: Vec<ReviewEntry>,
    /// Ids (in the target document) of entities replaced by placeholders.
    pub unmapped_entities: Vec<String>,
    pub debug_info: DebugInfo,
}

impl ConversionResult {
    /// `true` when the run ended in a fatal error.
    pub fn is_fatal(&self) -> bool {
        self.logs.iter().any(|l| l.level == LogLevel::Error) && self.is_empty()
    }

    fn is_empty(&self) -> bool {
        let list = |field: &str| {
            self.converted_workflow
                .get(field)
                .and_then(Value::as_array)
                .is_none_or(|l| l.is_empty())
        };
        list(NODES_FIELD) && list(FLOW_FIELD)
    }
}

/// A converted entity waiting for graph reconstruction.
#[derive(Debug)]
pub(crate) struct ConvertedEntity {
    /// Id of the entity in the source document; edges refer to it.
    pub source_id: String,
    pub entity: Entity,
    pub family: EntityFamily,
    pub outputs: Option<usize>,
}

/// Converts whole workflows with a shared, read-only mapping registry.
///
/// ```rust
/// use flowbridge::graph::Converter;
/// use flowbridge::mapping::MappingRegistry;
/// use flowbridge::model::Direction;
/// use serde_json::json;
///
/// let registry = MappingRegistry::from_json(r#"{
///     "version": "1",
///     "mappings": [{
///         "sourceType": "http-request", "targetType": "http-module", "direction": "forward",
///         "parameterMap": { "url": "URL", "method": "method" }
///     }]
/// }"#).unwrap();
///
/// let workflow = json!({
///     "name": "demo",
///     "nodes": [{ "id": "a", "name": "Fetch", "type": "http-request",
///                 "parameters": { "url": "https://api.example.com", "method": "GET" } }]
/// });
///
/// let result = Converter::new(&registry).convert(&workflow, Direction::Forward);
/// let module = &result.converted_workflow["flow"][0];
/// assert_eq!(module["module"], "http-module");
/// assert_eq!(module["mapper"]["URL"], "https://api.example.com");
/// ```
pub struct Converter<'a> {
    registry: &'a MappingRegistry,
    options: ConversionOptions,
}

impl<'a> Converter<'a> {
    pub fn new(registry: &'a MappingRegistry) -> Self {
        Self {
            registry,
            options: ConversionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Converts `document` in `direction`. Never fails; problems are reported
    /// through the result's logs.
    pub fn convert(&self, document: &Value, direction: Direction) -> ConversionResult {
        let mut diagnostics = Diagnostics::new();
        match self.run(document, direction, &mut diagnostics) {
            Ok((converted_workflow, debug_info)) => {
                let (logs, parameters_needing_review, unmapped_entities, _) = diagnostics.into_parts();
                ConversionResult {
                    converted_workflow,
                    logs,
                    parameters_needing_review,
                    unmapped_entities,
                    debug_info,
                }
            }
            Err(e) => fatal(direction, e, diagnostics),
        }
    }

    /// Like [`convert`](Self::convert), picking the direction from the
    /// document's shape.
    pub fn convert_auto(&self, document: &Value) -> ConversionResult {
        match detect_platform(document) {
            Some(platform) => self.convert(document, Direction::from_source(platform)),
            None => {
                let error = ConversionError::InvalidInput(
                    "document is neither a node-graph nor a module-graph workflow".to_string(),
                );
                fatal(Direction::Forward, error, Diagnostics::new())
            }
        }
    }

    fn run(
        &self,
        document: &Value,
        direction: Direction,
        diagnostics: &mut Diagnostics,
    ) -> Result<(Value, DebugInfo), ConversionError> {
        tracing::debug!(target: "flowbridge", %direction, "validating workflow");
        let lifted = validate::lift(document, direction.source(), diagnostics)?;
        let source_count = lifted.entities.len();

        tracing::debug!(target: "flowbridge", entities = source_count, "converting entities");
        let (converted, details) = self.convert_entities(&lifted, direction, diagnostics)?;
        let converted_count = converted.len();

        tracing::debug!(target: "flowbridge", "reconstructing graph");
        let LiftedWorkflow { name, topology, .. } = lifted;
        let converted_workflow = match direction {
            Direction::Forward => {
                let workflow: ModuleWorkflow = forward::build(name, &topology, converted, diagnostics);
                serde_json::to_value(workflow)
            }
            Direction::Reverse => {
                let workflow: NodeWorkflow = reverse::build(name, &topology, converted, diagnostics);
                serde_json::to_value(workflow)
            }
        }
        .map_err(|e| ConversionError::InvalidInput(format!("could not serialize the converted workflow: {}", e)))?;

        let unmapped_count = diagnostics.unmapped().len();
        diagnostics.info(format!(
            "Converted {} of {} entities from {} to {} ({} replaced by placeholders)",
            converted_count - unmapped_count,
            source_count,
            direction.source(),
            direction.target(),
            unmapped_count
        ));

        let debug_info = DebugInfo {
            source_platform: Some(direction.source()),
            target_platform: Some(direction.target()),
            source_entity_count: source_count,
            converted_entity_count: converted_count,
            mapped_count: diagnostics.mapped_count(),
            unmapped_count,
            details: self.options.debug.then(|| Value::Array(details)),
        };
        Ok((converted_workflow, debug_info))
    }

    fn convert_entities(
        &self,
        lifted: &LiftedWorkflow,
        direction: Direction,
        diagnostics: &mut Diagnostics,
    ) -> Result<(Vec<ConvertedEntity>, Vec<Value>), ConversionError> {
        let identities = assign_identities(
            &lifted.entities,
            direction.target(),
            self.options.preserve_ids,
            diagnostics,
        );
        let positions = positional_table(&lifted.entities, &identities, direction);
        let converter = EntityConverter::new(self.registry, &self.options, direction).with_positions(&positions);

        let mut converted = Vec::with_capacity(lifted.entities.len());
        let mut details = Vec::new();
        for (index, (source, identity)) in lifted.entities.iter().zip(&identities).enumerate() {
            let mut outcome = match converter.convert(source, identity) {
                Ok(outcome) if self.options.strict_mode && outcome.kind == OutcomeKind::Placeholder => {
                    return Err(ConversionError::MappingNotFound {
                        entity: source.name.clone(),
                        entity_type: source.entity_type.clone(),
                    });
                }
                Ok(outcome) => outcome,
                Err(e) if self.options.strict_mode => {
                    return Err(ConversionError::EntityFailed {
                        entity: source.name.clone(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    let mut entity_diagnostics = Diagnostics::new();
                    entity_diagnostics.warn(format!(
                        "Conversion of '{}' failed, replaced by a placeholder: {}",
                        source.name, e
                    ));
                    placeholder_outcome(source, identity, e.to_string(), entity_diagnostics)
                }
            };

            ensure_position(&mut outcome.entity, index);
            if self.options.debug {
                details.push(debug_detail(source, &outcome));
            }
            diagnostics.absorb(std::mem::take(&mut outcome.diagnostics));
            converted.push(ConvertedEntity {
                source_id: source.id.clone(),
                entity: outcome.entity,
                family: outcome.family,
                outputs: outcome.outputs,
            });
        }
        Ok((converted, details))
    }
}

/// Name <-> module id pairs for rewriting references to other entities.
fn positional_table(
    sources: &[Entity],
    identities: &[Identity],
    direction: Direction,
) -> PositionalTable {
    sources
        .iter()
        .zip(identities)
        .filter_map(|(source, identity)| match direction {
            Direction::Forward => identity
                .numeric_id()
                .map(|id| (source.name.clone(), id)),
            Direction::Reverse => source
                .id
                .parse::<u64>()
                .ok()
                .map(|id| (identity.name.clone(), id)),
        })
        .collect()
}

/// The result of a run that could not finish.
fn fatal(direction: Direction, error: ConversionError, mut diagnostics: Diagnostics) -> ConversionResult {
    diagnostics.error(format!("Conversion aborted: {}", error));
    let (logs, _, _, _) = diagnostics.into_parts();

    let converted_workflow = match direction.target() {
        Platform::ModuleGraph => serde_json::to_value(ModuleWorkflow::empty("")),
        Platform::NodeGraph => serde_json::to_value(NodeWorkflow::empty("")),
    }
    .unwrap_or_default();

    ConversionResult {
        converted_workflow,
        logs,
        parameters_needing_review: Vec::new(),
        unmapped_entities: Vec::new(),
        debug_info: DebugInfo {
            source_platform: Some(direction.source()),
            target_platform: Some(direction.target()),
            ..DebugInfo::default()
        },
    }
}
