//! Single-entity conversion.
//!
//! The converter resolves a mapping for the entity's type, builds the target
//! shell, then either runs the family sub-routine or applies the mapping's
//! parameter-path rules. Entities without a mapping are recognized by type
//! name where possible and otherwise replaced by a placeholder.

pub mod defaults;
pub mod placeholder;
pub mod special;

use crate::diagnostics::Diagnostics;
use crate::error::{EntityError, TransformError};
use crate::expression::{PositionalTable, Transpiler};
use crate::mapping::{EntityFamily, Mapping, MappingRegistry};
use crate::model::{Direction, Entity};
use crate::options::ConversionOptions;
use crate::parameters::{ParameterProcessor, identify_expressions_for_review};
use defaults::Identity;
use serde_json::{Map, Value, json};
use special::flag_notes;

/// How an entity was converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// A mapping record applied.
    Mapped,
    /// No record; the type name matched a known family.
    Heuristic,
    /// Nothing applied; the entity is a placeholder.
    Placeholder,
}

/// A converted entity and what happened while converting it.
#[derive(Debug)]
pub struct EntityOutcome {
    pub entity: Entity,
    pub family: EntityFamily,
    pub kind: OutcomeKind,
    /// Output groups of a branching entity, when its conditions were stated.
    pub outputs: Option<usize>,
    pub diagnostics: Diagnostics,
}

/// Converts one entity at a time for a fixed direction.
pub struct EntityConverter<'a> {
    registry: &'a MappingRegistry,
    options: &'a ConversionOptions,
    direction: Direction,
    positions: Option<&'a PositionalTable>,
}

impl<'a> EntityConverter<'a> {
    pub fn new(registry: &'a MappingRegistry, options: &'a ConversionOptions, direction: Direction) -> Self {
        Self {
            registry,
            options,
            direction,
            positions: None,
        }
    }

    /// Lets expressions that name other entities be rewritten positionally.
    pub fn with_positions(mut self, positions: &'a PositionalTable) -> Self {
        self.positions = Some(positions);
        self
    }

    fn processor(&self) -> ParameterProcessor<'a> {
        let transpiler = match self.positions {
            Some(table) => Transpiler::with_positions(table),
            None => Transpiler::new(),
        };
        ParameterProcessor::new(self.direction, self.options).with_transpiler(transpiler)
    }

    /// Converts `source` into an entity carrying `identity`.
    ///
    /// Errors are per-entity failures; the caller decides whether they are fatal.
    pub fn convert(&self, source: &Entity, identity: &Identity) -> Result<EntityOutcome, EntityError> {
        match self.registry.lookup(&source.entity_type, self.direction) {
            Some(mapping) => self.convert_mapped(source, identity, mapping),
            None => Ok(self.convert_unmapped(source, identity)),
        }
    }

    fn convert_mapped(
        &self,
        source: &Entity,
        identity: &Identity,
        mapping: &Mapping,
    ) -> Result<EntityOutcome, EntityError> {
        let mut diagnostics = Diagnostics::new();
        let mut target = shell(source, identity, &mapping.target_type);
        let processor = self.processor();
        let family = mapping.family;

        if !special::replaces_path_mapping(family) {
            self.apply_rules(mapping, source, &mut target, &processor, &mut diagnostics)?;
        }
        let outputs = special::run(family, source, &mut target, &processor, &mut diagnostics)?;
        special::credentials::carry(family, source, &mut target, self.direction, &mut diagnostics);

        if self.options.copy_non_mapped_parameters {
            self.copy_non_mapped(mapping, source, &mut target, &mut diagnostics);
        }
        if let Some(hook) = &mapping.custom_transform {
            self.run_custom_transform(hook, source, &mut target, &mut diagnostics);
        }

        diagnostics.record_mapped();
        Ok(EntityOutcome {
            entity: target,
            family,
            kind: OutcomeKind::Mapped,
            outputs,
            diagnostics,
        })
    }

    fn apply_rules(
        &self,
        mapping: &Mapping,
        source: &Entity,
        target: &mut Entity,
        processor: &ParameterProcessor,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), EntityError> {
        let mut notes = Vec::new();
        for rule in &mapping.rules {
            let Some(raw) = rule.source.get(&source.parameters).or(rule.default.as_ref()) else {
                continue;
            };
            let mut value = processor.process_value(raw, &rule.target, &mut notes);
            if let Some(transform) = &rule.transform {
                value = transform.apply(&value).map_err(|source| EntityError::Transform {
                    path: rule.source.to_string(),
                    source,
                })?;
            }
            rule.target
                .set(&mut target.parameters, value)
                .map_err(|source| EntityError::BadPath {
                    entity_type: mapping.source_type.clone(),
                    source,
                })?;
        }
        flag_notes(diagnostics, target, notes);
        Ok(())
    }

    /// Copies top-level source parameters no rule or sub-routine read, as
    /// written. Expressions among them stay in the source dialect and are flagged.
    fn copy_non_mapped(&self, mapping: &Mapping, source: &Entity, target: &mut Entity, diagnostics: &mut Diagnostics) {
        let consumed = special::consumed_keys(mapping.family, self.direction);
        let copied: Map<String, Value> = source
            .parameters
            .iter()
            .filter(|(key, _)| {
                !(mapping.consumes(key) || consumed.contains(&key.as_str()) || target.parameters.contains_key(*key))
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        for path in identify_expressions_for_review(&copied) {
            diagnostics.flag(
                &target.id,
                &target.name,
                path,
                "Copied without conversion; the expression is still in the source dialect",
            );
        }
        target.parameters.extend(copied);
    }

    /// Merges a hook's output over `target`. Failures are logged, never raised.
    fn run_custom_transform(&self, hook: &str, source: &Entity, target: &mut Entity, diagnostics: &mut Diagnostics) {
        let result = match self.registry.hook(hook) {
            Some(h) => h.transform(source, target, self.direction),
            None => Err(TransformError::UnknownHook(hook.to_string())),
        };
        match result {
            Ok(overrides) => {
                for (key, value) in overrides {
                    target.parameters.insert(key, value);
                }
            }
            Err(e) => diagnostics.error(format!(
                "Custom transform for '{}' failed, keeping base conversion: {}",
                source.name, e
            )),
        }
    }

    fn convert_unmapped(&self, source: &Entity, identity: &Identity) -> EntityOutcome {
        let mut diagnostics = Diagnostics::new();

        let mut reason = format!("No mapping found for type '{}'", source.entity_type);
        if let Some((family, target_type)) = special::heuristics::recognize(&source.entity_type, self.direction) {
            let mut target = shell(source, identity, target_type);
            let processor = self.processor();
            match special::run(family, source, &mut target, &processor, &mut diagnostics) {
                Ok(outputs) => {
                    special::credentials::carry(family, source, &mut target, self.direction, &mut diagnostics);
                    diagnostics.warn(format!(
                        "No mapping for type '{}' of '{}'; converted as {} '{}'",
                        source.entity_type, source.name, family, target_type
                    ));
                    diagnostics.flag(
                        &target.id,
                        &target.name,
                        "",
                        format!("Converted without a mapping from type '{}'", source.entity_type),
                    );
                    diagnostics.record_mapped();
                    return EntityOutcome {
                        entity: target,
                        family,
                        kind: OutcomeKind::Heuristic,
                        outputs,
                        diagnostics,
                    };
                }
                Err(e) => {
                    diagnostics = Diagnostics::new();
                    reason = format!("{} and {} conversion failed: {}", reason, family, e);
                }
            }
        }

        diagnostics.warn(format!(
            "No mapping found for entity '{}' of type '{}'; replaced by a placeholder",
            source.name, source.entity_type
        ));
        placeholder_outcome(source, identity, reason, diagnostics)
    }
}

/// Replaces `source` by a placeholder, flags it and counts it as unmapped.
/// The warning explaining why is expected to be in `diagnostics` already.
pub fn placeholder_outcome(
    source: &Entity,
    identity: &Identity,
    reason: String,
    mut diagnostics: Diagnostics,
) -> EntityOutcome {
    let entity = placeholder::placeholder(source, identity, &reason);
    diagnostics.flag(&entity.id, &entity.name, "", reason);
    diagnostics.record_unmapped(&entity.id);
    EntityOutcome {
        entity,
        family: EntityFamily::Generic,
        kind: OutcomeKind::Placeholder,
        outputs: None,
        diagnostics,
    }
}

/// Target entity with identity, type and carried-over presentation fields,
/// but no parameters yet.
fn shell(source: &Entity, identity: &Identity, target_type: &str) -> Entity {
    Entity {
        id: identity.id.clone(),
        name: identity.name.clone(),
        entity_type: target_type.to_string(),
        parameters: Map::new(),
        position: source.position,
        credentials: None,
        disabled: source.disabled,
        notes: source.notes.clone(),
    }
}

/// Per-entity detail attached to debug info.
pub fn debug_detail(source: &Entity, outcome: &EntityOutcome) -> Value {
    json!({
        "sourceId": source.id,
        "sourceType": source.entity_type,
        "targetId": outcome.entity.id,
        "targetType": outcome.entity.entity_type,
        "family": outcome.family.as_str(),
        "kind": match outcome.kind {
            OutcomeKind::Mapped => "mapped",
            OutcomeKind::Heuristic => "heuristic",
            OutcomeKind::Placeholder => "placeholder",
        },
        "expressionPaths": identify_expressions_for_review(&source.parameters),
    })
}
