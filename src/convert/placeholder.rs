use super::defaults::Identity;
use crate::model::Entity;
use serde_json::{Map, Value};

/// Type given to entities that could not be converted.
pub const PLACEHOLDER_TYPE: &str = "no-op";

pub const ORIGINAL_TYPE_FIELD: &str = "originalType";
pub const ORIGINAL_NAME_FIELD: &str = "originalName";
pub const ORIGINAL_PARAMETERS_FIELD: &str = "originalParameters";
pub const REASON_FIELD: &str = "placeholderReason";

/// Builds a neutral stand-in for `source` that keeps everything needed to
/// redo the conversion by hand.
pub fn placeholder(source: &Entity, identity: &Identity, reason: &str) -> Entity {
    let mut parameters = Map::new();
    parameters.insert(
        ORIGINAL_TYPE_FIELD.to_string(),
        Value::String(source.entity_type.clone()),
    );
    parameters.insert(
        ORIGINAL_NAME_FIELD.to_string(),
        Value::String(source.name.clone()),
    );
    parameters.insert(
        ORIGINAL_PARAMETERS_FIELD.to_string(),
        Value::Object(source.parameters.clone()),
    );
    parameters.insert(REASON_FIELD.to_string(), Value::String(reason.to_string()));

    Entity {
        id: identity.id.clone(),
        name: identity.name.clone(),
        entity_type: PLACEHOLDER_TYPE.to_string(),
        parameters,
        position: source.position,
        credentials: None,
        disabled: source.disabled,
        notes: source.notes.clone(),
    }
}

/// `true` for entities produced by [`placeholder`].
pub fn is_placeholder(entity: &Entity) -> bool {
    entity.entity_type == PLACEHOLDER_TYPE && entity.parameters.contains_key(ORIGINAL_TYPE_FIELD)
}
