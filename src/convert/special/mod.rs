//! Dedicated conversions for entity kinds whose parameter layout differs
//! structurally between the two platforms.

pub mod branching;
pub mod credentials;
pub mod heuristics;
pub mod http_auth;
pub mod passthrough;
pub mod variables;
pub mod webhook;

use crate::diagnostics::Diagnostics;
use crate::error::EntityError;
use crate::mapping::EntityFamily;
use crate::model::{Direction, Entity};
use crate::parameters::{ParameterProcessor, ReviewNote};
use serde_json::Value;

/// Source parameter keys a family's sub-routine reads, so that copying
/// non-mapped parameters does not duplicate them.
pub fn consumed_keys(family: EntityFamily, direction: Direction) -> &'static [&'static str] {
    match (family, direction) {
        (EntityFamily::VariableAssignment, Direction::Forward) => variables::NODE_KEYS,
        (EntityFamily::VariableAssignment, Direction::Reverse) => variables::MODULE_KEYS,
        (EntityFamily::Branching, Direction::Forward) => branching::NODE_KEYS,
        (EntityFamily::Branching, Direction::Reverse) => branching::MODULE_KEYS,
        (EntityFamily::Webhook, Direction::Forward) => webhook::NODE_KEYS,
        (EntityFamily::Webhook, Direction::Reverse) => webhook::MODULE_KEYS,
        (EntityFamily::HttpRequest, _) => http_auth::KEYS,
        (EntityFamily::Code, _) => passthrough::CODE_KEYS,
        (EntityFamily::Note, _) => passthrough::NOTE_KEYS,
        (EntityFamily::Generic, _) => &[],
    }
}

/// Runs the sub-routine for `family`, writing into `target`.
///
/// Returns the number of output groups for branching entities when the
/// source states its conditions; `None` otherwise.
pub fn run(
    family: EntityFamily,
    source: &Entity,
    target: &mut Entity,
    processor: &ParameterProcessor,
    diagnostics: &mut Diagnostics,
) -> Result<Option<usize>, EntityError> {
    match family {
        EntityFamily::VariableAssignment => variables::convert(source, target, processor, diagnostics).map(|_| None),
        EntityFamily::Branching => branching::convert(source, target, processor, diagnostics),
        EntityFamily::Webhook => webhook::convert(source, target, processor, diagnostics).map(|_| None),
        EntityFamily::HttpRequest => http_auth::convert(source, target, processor.direction(), diagnostics).map(|_| None),
        EntityFamily::Code => passthrough::code(source, target, processor, diagnostics).map(|_| None),
        EntityFamily::Note => passthrough::note(source, target, processor.direction()).map(|_| None),
        EntityFamily::Generic => Ok(None),
    }
}

/// Families whose sub-routine replaces generic path mapping entirely.
pub fn replaces_path_mapping(family: EntityFamily) -> bool {
    !matches!(family, EntityFamily::Generic | EntityFamily::HttpRequest)
}

pub(crate) fn flag_notes(diagnostics: &mut Diagnostics, target: &Entity, notes: Vec<ReviewNote>) {
    for note in notes {
        diagnostics.flag(&target.id, &target.name, note.path, note.reason);
    }
}

pub(crate) fn malformed(field: &str, message: impl Into<String>) -> EntityError {
    EntityError::MalformedField {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Credential ids are strings on one side and numbers on the other.
pub(crate) fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
