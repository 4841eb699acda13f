use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural kind of an entity.
///
/// Every mapping record resolves to exactly one family when the registry is
/// built; the entity converter dispatches on it instead of on type strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityFamily {
    VariableAssignment,
    Branching,
    Webhook,
    HttpRequest,
    Code,
    Note,
    #[default]
    Generic,
}

impl EntityFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityFamily::VariableAssignment => "variableAssignment",
            EntityFamily::Branching => "branching",
            EntityFamily::Webhook => "webhook",
            EntityFamily::HttpRequest => "httpRequest",
            EntityFamily::Code => "code",
            EntityFamily::Note => "note",
            EntityFamily::Generic => "generic",
        }
    }

    /// Looks `entity_type` up in the table of well-known types of both platforms.
    pub fn of_known_type(entity_type: &str) -> Option<Self> {
        KNOWN_TYPES
            .iter()
            .find(|(name, _)| *name == entity_type)
            .map(|(_, family)| *family)
    }

    /// Guesses a family from the tokens of an unknown type name.
    ///
    /// Only used for entities without a mapping. HTTP requests and variable
    /// assignments are never guessed; they need a record to be converted.
    pub fn guess(entity_type: &str) -> Option<Self> {
        let tokens = type_tokens(entity_type);
        let has = |needles: &[&str]| tokens.iter().any(|t| needles.contains(&t.as_str()));

        if has(&["router", "switch", "if", "branch", "filter"]) {
            Some(EntityFamily::Branching)
        } else if has(&["webhook", "trigger", "hook"]) {
            Some(EntityFamily::Webhook)
        } else if has(&["code", "function", "script", "javascript", "python"]) {
            Some(EntityFamily::Code)
        } else if has(&["note", "comment", "sticky", "stickynote"]) {
            Some(EntityFamily::Note)
        } else {
            None
        }
    }
}

impl fmt::Display for EntityFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variable-assignment types of both platforms. Any member resolves to a
/// record registered for a sibling.
pub const VARIABLE_ALIASES: &[&str] = &[
    "set",
    "setVariables",
    "util:SetVariable",
    "util:SetVariable2",
    "util:SetVariables",
];

/// Webhook/trigger types of both platforms.
pub const WEBHOOK_ALIASES: &[&str] = &[
    "webhook",
    "webhookTrigger",
    "gateway:CustomWebHook",
    "gateway:CustomMailHook",
];

const KNOWN_TYPES: &[(&str, EntityFamily)] = &[
    ("set", EntityFamily::VariableAssignment),
    ("setVariables", EntityFamily::VariableAssignment),
    ("util:SetVariable", EntityFamily::VariableAssignment),
    ("util:SetVariable2", EntityFamily::VariableAssignment),
    ("util:SetVariables", EntityFamily::VariableAssignment),
    ("if", EntityFamily::Branching),
    ("switch", EntityFamily::Branching),
    ("router", EntityFamily::Branching),
    ("builtin:BasicRouter", EntityFamily::Branching),
    ("webhook", EntityFamily::Webhook),
    ("webhookTrigger", EntityFamily::Webhook),
    ("gateway:CustomWebHook", EntityFamily::Webhook),
    ("gateway:CustomMailHook", EntityFamily::Webhook),
    ("httpRequest", EntityFamily::HttpRequest),
    ("http-request", EntityFamily::HttpRequest),
    ("http-module", EntityFamily::HttpRequest),
    ("http:ActionSendData", EntityFamily::HttpRequest),
    ("http:ActionSendDataBasicAuth", EntityFamily::HttpRequest),
    ("code", EntityFamily::Code),
    ("function", EntityFamily::Code),
    ("code:ExecuteCode", EntityFamily::Code),
    ("sticky-note", EntityFamily::Note),
    ("stickyNote", EntityFamily::Note),
    ("builtin:Note", EntityFamily::Note),
];

/// Splits a type name on namespace separators and camel-case humps, lowercased.
fn type_tokens(entity_type: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for part in entity_type.split(|c: char| matches!(c, ':' | '.' | '-' | '_' | '/' | ' ')) {
        let mut current = String::new();
        for c in part.chars() {
            if c.is_uppercase() && !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            current.extend(c.to_lowercase());
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }
    tokens
}
