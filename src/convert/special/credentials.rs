//! Credential references of entities whose family has no credential
//! conversion of its own.
//!
//! Node-graph credentials are `{ <credentialType>: { id, name } }`; the
//! module-graph bag holds `{ <key>: { credentialId, credentialName } }` or a
//! bare connection id. Only the reference travels, never a secret.

use super::{http_auth, id_text};
use crate::diagnostics::Diagnostics;
use crate::mapping::EntityFamily;
use crate::model::{Direction, Entity};
use serde_json::{Map, Value};

const BAG_ID: &str = "credentialId";
const BAG_NAME: &str = "credentialName";
const REFERENCE_ID: &str = "id";
const REFERENCE_NAME: &str = "name";

/// Carries every credential of `source` the family sub-routine left alone
/// into `target` and flags each one for re-entry.
pub fn carry(
    family: EntityFamily,
    source: &Entity,
    target: &mut Entity,
    direction: Direction,
    diagnostics: &mut Diagnostics,
) {
    let Some(credentials) = source.credentials.as_ref() else {
        return;
    };
    let handled = match family {
        EntityFamily::HttpRequest => http_auth::handled_credential(source, direction),
        _ => None,
    };

    for (key, value) in credentials {
        if handled == Some(key.as_str()) {
            continue;
        }
        let carried = match direction {
            Direction::Forward => translate(value, (REFERENCE_ID, REFERENCE_NAME), (BAG_ID, BAG_NAME)),
            Direction::Reverse => translate(value, (BAG_ID, BAG_NAME), (REFERENCE_ID, REFERENCE_NAME)),
        };
        let label = value
            .get(match direction {
                Direction::Forward => REFERENCE_NAME,
                Direction::Reverse => BAG_NAME,
            })
            .and_then(Value::as_str)
            .unwrap_or(key.as_str())
            .to_string();

        match carried {
            Some(reference) => {
                target
                    .credentials
                    .get_or_insert_with(Map::new)
                    .insert(key.clone(), reference);
            }
            None => diagnostics.warn(format!(
                "Credential '{}' on '{}' has no id or name; only a review entry is kept",
                key, source.name
            )),
        }
        diagnostics.flag(
            &target.id,
            &target.name,
            key.as_str(),
            format!("Credential '{}' must be re-entered on the target platform", label),
        );
    }
}

/// Renames the id and name fields of one reference. A bare id becomes a
/// reference holding just that id.
fn translate(value: &Value, from: (&str, &str), to: (&str, &str)) -> Option<Value> {
    let mut reference = Map::new();
    match value {
        Value::Object(fields) => {
            if let Some(id) = fields.get(from.0).and_then(id_text) {
                reference.insert(to.0.to_string(), Value::String(id));
            }
            if let Some(name) = fields.get(from.1).and_then(Value::as_str) {
                reference.insert(to.1.to_string(), Value::String(name.to_string()));
            }
        }
        other => {
            let id = id_text(other)?;
            reference.insert(to.0.to_string(), Value::String(id));
        }
    }
    (!reference.is_empty()).then_some(Value::Object(reference))
}
