use crate::error::TransformError;
use crate::model::{Direction, Entity};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// A value transform registered in code. Receives the (already processed)
/// source value and returns the value to write at the target path.
pub type TransformFn = Arc<dyn Fn(&Value) -> Result<Value, TransformError> + Send + Sync>;

/// Whole-entity hook named by a mapping record's `customTransform`.
///
/// The returned map is merged over the parameters the generic conversion
/// produced. An `Err` is logged and the base result is kept.
pub trait CustomTransform: Send + Sync {
    fn name(&self) -> &str;
    fn transform(
        &self,
        source: &Entity,
        converted: &Entity,
        direction: Direction,
    ) -> Result<Map<String, Value>, TransformError>;
}

/// Built-in value transforms addressable by name from a mapping database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NamedTransform {
    ToString,
    ToNumber,
    ToBoolean,
    BoolToFlag,
    FlagToBool,
    Uppercase,
    Lowercase,
    JsonStringify,
    JsonParse,
    WrapArray,
    FirstElement,
}

impl NamedTransform {
    pub fn from_name(name: &str) -> Option<Self> {
        serde_json::from_value(Value::String(name.to_string())).ok()
    }

    pub fn name(self) -> &'static str {
        match self {
            NamedTransform::ToString => "toString",
            NamedTransform::ToNumber => "toNumber",
            NamedTransform::ToBoolean => "toBoolean",
            NamedTransform::BoolToFlag => "boolToFlag",
            NamedTransform::FlagToBool => "flagToBool",
            NamedTransform::Uppercase => "uppercase",
            NamedTransform::Lowercase => "lowercase",
            NamedTransform::JsonStringify => "jsonStringify",
            NamedTransform::JsonParse => "jsonParse",
            NamedTransform::WrapArray => "wrapArray",
            NamedTransform::FirstElement => "firstElement",
        }
    }

    pub fn apply(self, value: &Value) -> Result<Value, TransformError> {
        let incompatible = || TransformError::Incompatible {
            transform: self.name().to_string(),
            value: value.to_string(),
        };

        match self {
            NamedTransform::ToString => Ok(Value::String(match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })),
            NamedTransform::ToNumber => match value {
                Value::Number(_) => Ok(value.clone()),
                Value::Bool(b) => Ok(Value::from(u8::from(*b))),
                Value::String(s) => {
                    let trimmed = s.trim();
                    if let Ok(i) = trimmed.parse::<i64>() {
                        Ok(Value::from(i))
                    } else {
                        trimmed
                            .parse::<f64>()
                            .ok()
                            .and_then(serde_json::Number::from_f64)
                            .map(Value::Number)
                            .ok_or_else(incompatible)
                    }
                }
                _ => Err(incompatible()),
            },
            NamedTransform::ToBoolean | NamedTransform::FlagToBool => {
                truthiness(value).map(Value::Bool).ok_or_else(incompatible)
            }
            NamedTransform::BoolToFlag => truthiness(value)
                .map(|b| Value::String(if b { "1" } else { "0" }.to_string()))
                .ok_or_else(incompatible),
            NamedTransform::Uppercase => match value {
                Value::String(s) => Ok(Value::String(s.to_uppercase())),
                _ => Err(incompatible()),
            },
            NamedTransform::Lowercase => match value {
                Value::String(s) => Ok(Value::String(s.to_lowercase())),
                _ => Err(incompatible()),
            },
            NamedTransform::JsonStringify => match value {
                Value::String(_) => Ok(value.clone()),
                other => Ok(Value::String(other.to_string())),
            },
            NamedTransform::JsonParse => match value {
                Value::String(s) => serde_json::from_str(s).map_err(|_| incompatible()),
                other => Ok(other.clone()),
            },
            NamedTransform::WrapArray => match value {
                Value::Array(_) => Ok(value.clone()),
                Value::Null => Ok(Value::Array(Vec::new())),
                other => Ok(Value::Array(vec![other.clone()])),
            },
            NamedTransform::FirstElement => match value {
                Value::Array(items) => Ok(items.first().cloned().unwrap_or(Value::Null)),
                other => Ok(other.clone()),
            },
        }
    }
}

impl fmt::Display for NamedTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn truthiness(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        Value::Null => Some(false),
        _ => None,
    }
}

/// A transform attached to one parameter-path rule.
#[derive(Clone)]
pub enum ValueTransform {
    Named(NamedTransform),
    Function { name: String, f: TransformFn },
}

impl ValueTransform {
    pub fn name(&self) -> &str {
        match self {
            ValueTransform::Named(t) => t.name(),
            ValueTransform::Function { name, .. } => name,
        }
    }

    pub fn apply(&self, value: &Value) -> Result<Value, TransformError> {
        match self {
            ValueTransform::Named(t) => t.apply(value),
            ValueTransform::Function { f, .. } => f(value),
        }
    }
}

impl fmt::Debug for ValueTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueTransform::Named(t) => write!(f, "Named({})", t),
            ValueTransform::Function { name, .. } => write!(f, "Function({})", name),
        }
    }
}
