use super::family::EntityFamily;
use super::transform::ValueTransform;
use crate::model::{Direction, ParameterPath};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A versioned collection of mapping records, as handed to the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MappingDatabase {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub mappings: Vec<MappingRecord>,
}

/// Rule set translating one entity type to its counterpart, as written in a
/// mapping database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRecord {
    pub source_type: String,
    pub target_type: String,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Overrides the family the registry would otherwise infer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<EntityFamily>,
    /// Source parameter path -> target spec, applied in document order.
    #[serde(default, alias = "parameterPathMap")]
    pub parameter_map: IndexMap<String, TargetSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_transform: Option<String>,
}

impl MappingRecord {
    pub fn new(source_type: &str, target_type: &str, direction: Direction) -> Self {
        Self {
            source_type: source_type.to_string(),
            target_type: target_type.to_string(),
            direction,
            version: None,
            family: None,
            parameter_map: IndexMap::new(),
            custom_transform: None,
        }
    }

    pub fn map(mut self, source: &str, target: &str) -> Self {
        self.parameter_map
            .insert(source.to_string(), TargetSpec::Path(target.to_string()));
        self
    }

    pub fn map_with(
        mut self,
        source: &str,
        target: &str,
        transform: Option<&str>,
        default: Option<Value>,
    ) -> Self {
        self.parameter_map.insert(
            source.to_string(),
            TargetSpec::Detailed {
                target: target.to_string(),
                transform: transform.map(str::to_string),
                default,
            },
        );
        self
    }

    pub fn family(mut self, family: EntityFamily) -> Self {
        self.family = Some(family);
        self
    }

    pub fn custom_transform(mut self, hook: &str) -> Self {
        self.custom_transform = Some(hook.to_string());
        self
    }
}

/// Where a mapped parameter goes: a bare path, or a path with a transform and default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    Path(String),
    Detailed {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transform: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
}

impl TargetSpec {
    pub fn target(&self) -> &str {
        match self {
            TargetSpec::Path(p) => p,
            TargetSpec::Detailed { target, .. } => target,
        }
    }
}

/// One compiled parameter-path rule.
#[derive(Debug, Clone)]
pub struct PathRule {
    pub source: ParameterPath,
    pub target: ParameterPath,
    pub transform: Option<ValueTransform>,
    pub default: Option<Value>,
}

/// A mapping record compiled by the registry: paths parsed, transforms
/// resolved and the entity family fixed.
#[derive(Debug, Clone)]
pub struct Mapping {
    pub source_type: String,
    pub target_type: String,
    pub direction: Direction,
    pub version: Option<String>,
    pub family: EntityFamily,
    pub rules: Vec<PathRule>,
    pub custom_transform: Option<String>,
}

impl Mapping {
    /// `true` when some rule reads from the top-level parameter `key`.
    pub fn consumes(&self, key: &str) -> bool {
        self.rules.iter().any(|r| r.source.head_key() == Some(key))
    }
}
