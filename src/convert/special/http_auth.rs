use super::{id_text, malformed};
use crate::diagnostics::Diagnostics;
use crate::error::EntityError;
use crate::model::{Direction, Entity};
use serde_json::{Map, Value};

const AUTH_FIELD: &str = "authentication";
const NO_AUTH: &str = "none";

pub const KEYS: &[&str] = &[AUTH_FIELD];

/// One authentication scheme as both platforms spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthKind {
    /// Node-graph `authentication` token.
    pub node: &'static str,
    /// Node-graph credential type the token refers to.
    pub credential_type: &'static str,
    /// Module-graph credential bag `type`.
    pub module: &'static str,
    /// Secret slots of the module-graph bag. Always written empty.
    pub secrets: &'static [&'static str],
}

/// Known schemes. The first entry is the fallback for unknown tokens.
pub const AUTH_KINDS: &[AuthKind] = &[
    AuthKind {
        node: "basicAuth",
        credential_type: "httpBasicAuth",
        module: "basic",
        secrets: &["username", "password"],
    },
    AuthKind {
        node: "headerAuth",
        credential_type: "httpHeaderAuth",
        module: "header",
        secrets: &["headerName", "headerValue"],
    },
    AuthKind {
        node: "oAuth2",
        credential_type: "oAuth2Api",
        module: "oauth2",
        secrets: &["accessToken"],
    },
    AuthKind {
        node: "queryAuth",
        credential_type: "httpQueryAuth",
        module: "apiKey",
        secrets: &["keyName", "keyValue"],
    },
];

/// Translates the authentication token and credential reference of an
/// HTTP entity. Secrets never travel; every converted credential is flagged.
pub fn convert(
    source: &Entity,
    target: &mut Entity,
    direction: Direction,
    diagnostics: &mut Diagnostics,
) -> Result<(), EntityError> {
    match direction {
        Direction::Forward => to_credential_bag(source, target, diagnostics),
        Direction::Reverse => to_credential_reference(source, target, diagnostics),
    }
}

/// The credential key this conversion reads itself, if any.
pub fn handled_credential(source: &Entity, direction: Direction) -> Option<&'static str> {
    match direction {
        Direction::Forward => {
            let token = source.parameters.get(AUTH_FIELD).and_then(Value::as_str)?;
            AUTH_KINDS
                .iter()
                .find(|k| k.node == token)
                .map(|k| k.credential_type)
        }
        Direction::Reverse => Some(AUTH_FIELD),
    }
}

fn to_credential_bag(source: &Entity, target: &mut Entity, diagnostics: &mut Diagnostics) -> Result<(), EntityError> {
    let token = match source.parameters.get(AUTH_FIELD) {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::String(s)) if s.is_empty() || s == NO_AUTH => return Ok(()),
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(malformed(AUTH_FIELD, "expected an authentication type name")),
    };

    let (kind, known) = match AUTH_KINDS.iter().find(|k| k.node == token) {
        Some(kind) => (kind, true),
        None => {
            diagnostics.warn(format!(
                "Unknown authentication type '{}' on '{}'; using basic with empty credentials",
                token, source.name
            ));
            (&AUTH_KINDS[0], false)
        }
    };

    let mut bag = Map::new();
    bag.insert("type".to_string(), Value::String(kind.module.to_string()));
    let mut label = kind.module.to_string();
    if known {
        let reference = source
            .credentials
            .as_ref()
            .and_then(|c| c.get(kind.credential_type));
        if let Some(id) = reference.and_then(|r| r.get("id")).and_then(id_text) {
            bag.insert("credentialId".to_string(), Value::String(id));
        }
        if let Some(name) = reference.and_then(|r| r.get("name")).and_then(Value::as_str) {
            bag.insert("credentialName".to_string(), Value::String(name.to_string()));
            label = name.to_string();
        }
    }
    for slot in kind.secrets {
        bag.insert(slot.to_string(), Value::String(String::new()));
    }

    target
        .credentials
        .get_or_insert_with(Map::new)
        .insert(AUTH_FIELD.to_string(), Value::Object(bag));
    diagnostics.flag(
        &target.id,
        &target.name,
        AUTH_FIELD,
        format!("Credential '{}' must be re-entered on the target platform", label),
    );
    Ok(())
}

fn to_credential_reference(
    source: &Entity,
    target: &mut Entity,
    diagnostics: &mut Diagnostics,
) -> Result<(), EntityError> {
    let Some(bag) = source.credentials.as_ref().and_then(|c| c.get(AUTH_FIELD)) else {
        return Ok(());
    };
    let bag = bag
        .as_object()
        .ok_or_else(|| malformed(AUTH_FIELD, "expected a credential object"))?;
    let token = bag.get("type").and_then(Value::as_str).unwrap_or_default();

    let (kind, known) = match AUTH_KINDS.iter().find(|k| k.module == token) {
        Some(kind) => (kind, true),
        None => {
            diagnostics.warn(format!(
                "Unknown authentication type '{}' on '{}'; using basic with empty credentials",
                token, source.name
            ));
            (&AUTH_KINDS[0], false)
        }
    };

    target
        .parameters
        .insert(AUTH_FIELD.to_string(), Value::String(kind.node.to_string()));

    let mut reference = Map::new();
    if known {
        if let Some(id) = bag.get("credentialId").and_then(id_text) {
            reference.insert("id".to_string(), Value::String(id));
        }
        if let Some(name) = bag.get("credentialName").and_then(Value::as_str) {
            reference.insert("name".to_string(), Value::String(name.to_string()));
        }
    }
    let label = reference
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(kind.credential_type)
        .to_string();
    if !reference.is_empty() {
        target
            .credentials
            .get_or_insert_with(Map::new)
            .insert(kind.credential_type.to_string(), Value::Object(reference));
    }

    diagnostics.flag(
        &target.id,
        &target.name,
        AUTH_FIELD,
        format!("Credential '{}' must be re-entered on the target platform", label),
    );
    Ok(())
}
