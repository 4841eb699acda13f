pub mod entity;
pub mod module_graph;
pub mod node_graph;
pub mod path;

pub use entity::*;
pub use module_graph::{Designer, Filter, FilterCondition, Module, ModuleMetadata, ModuleWorkflow, Route};
pub use node_graph::{ConnectionTarget, Node, NodeOutputs, NodeWorkflow};
pub use path::{ParameterPath, Segment};

/// Exported documents are not consistent about whether ids are strings or numbers.
pub(crate) mod string_or_number {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;
    use serde_json::Value;

    pub fn as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Null => Ok(String::new()),
            other => Err(de::Error::custom(format!(
                "expected a string or number id, found {}",
                other
            ))),
        }
    }

    pub fn as_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| de::Error::custom(format!("module id {} is not a positive integer", n))),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| de::Error::custom(format!("module id '{}' is not numeric", s))),
            other => Err(de::Error::custom(format!(
                "expected a numeric module id, found {}",
                other
            ))),
        }
    }
}
