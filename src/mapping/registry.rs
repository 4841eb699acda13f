use super::family::{EntityFamily, VARIABLE_ALIASES, WEBHOOK_ALIASES};
use super::loader::MappingLoader;
use super::record::{Mapping, MappingDatabase, MappingRecord, PathRule, TargetSpec};
use super::transform::{CustomTransform, NamedTransform, TransformFn, ValueTransform};
use crate::error::{LoadError, MappingError, TransformError};
use crate::model::{Direction, ParameterPath};
use ahash::AHashMap;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Read-only lookup of mapping rules by entity type and direction.
///
/// Built once through [`MappingRegistryBuilder`] and immutable afterwards, so
/// a single registry can be shared by reference (or `Arc`) across threads.
pub struct MappingRegistry {
    version: String,
    mappings: Vec<Mapping>,
    index: AHashMap<(Direction, String), usize>,
    alias_families: Vec<Vec<String>>,
    hooks: AHashMap<String, Arc<dyn CustomTransform>>,
}

/// How a lookup was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Prefix,
    Alias,
}

impl MappingRegistry {
    pub fn builder() -> MappingRegistryBuilder {
        MappingRegistryBuilder::new()
    }

    /// An empty registry. Every entity falls through to heuristics or a placeholder.
    pub fn empty() -> Self {
        MappingRegistryBuilder::new().build_unchecked()
    }

    pub fn from_database(database: MappingDatabase) -> Result<Self, MappingError> {
        Self::builder().with_database(database).build()
    }

    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        let database: MappingDatabase =
            serde_json::from_str(json).map_err(|e| MappingError::JsonParseError(e.to_string()))?;
        Self::from_database(database)
    }

    pub fn from_loader(loader: &dyn MappingLoader) -> Result<Self, LoadError> {
        Ok(Self::from_database(loader.load()?)?)
    }

    /// Finds the rule set for `entity_type` in `direction`.
    ///
    /// Tries an exact match, then the namespace prefix (`prefix` or `prefix:*`
    /// for `prefix:suffix`), then the documented alias families. Returns
    /// `None` when nothing applies.
    pub fn lookup(&self, entity_type: &str, direction: Direction) -> Option<&Mapping> {
        self.resolve(entity_type, direction).map(|(m, _)| m)
    }

    /// Like [`lookup`](Self::lookup), also reporting which rule matched.
    pub fn resolve(&self, entity_type: &str, direction: Direction) -> Option<(&Mapping, MatchKind)> {
        if let Some(m) = self.get(entity_type, direction) {
            return Some((m, MatchKind::Exact));
        }

        if let Some((prefix, _)) = entity_type.split_once(':') {
            let wildcard = format!("{}:*", prefix);
            if let Some(m) = self
                .get(prefix, direction)
                .or_else(|| self.get(&wildcard, direction))
            {
                return Some((m, MatchKind::Prefix));
            }
        }

        self.alias_families
            .iter()
            .filter(|family| family.iter().any(|t| t == entity_type))
            .flat_map(|family| family.iter())
            .filter(|sibling| sibling.as_str() != entity_type)
            .find_map(|sibling| self.get(sibling, direction))
            .map(|m| (m, MatchKind::Alias))
    }

    fn get(&self, entity_type: &str, direction: Direction) -> Option<&Mapping> {
        self.index
            .get(&(direction, entity_type.to_string()))
            .map(|&i| &self.mappings[i])
    }

    pub fn hook(&self, name: &str) -> Option<&dyn CustomTransform> {
        self.hooks.get(name).map(|h| h.as_ref())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn mappings(&self) -> impl Iterator<Item = &Mapping> {
        self.mappings.iter()
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for MappingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingRegistry")
            .field("version", &self.version)
            .field("mappings", &self.mappings.len())
            .field("hooks", &self.hooks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Collects records, transforms and hooks, then compiles them into a registry.
pub struct MappingRegistryBuilder {
    version: String,
    records: Vec<MappingRecord>,
    functions: AHashMap<String, TransformFn>,
    hooks: AHashMap<String, Arc<dyn CustomTransform>>,
    alias_families: Vec<Vec<String>>,
}

impl MappingRegistryBuilder {
    pub fn new() -> Self {
        Self {
            version: String::new(),
            records: Vec::new(),
            functions: AHashMap::new(),
            hooks: AHashMap::new(),
            alias_families: vec![to_owned(VARIABLE_ALIASES), to_owned(WEBHOOK_ALIASES)],
        }
    }

    pub fn with_database(mut self, database: MappingDatabase) -> Self {
        if !database.version.is_empty() {
            self.version = database.version;
        }
        self.records.extend(database.mappings);
        self
    }

    pub fn with_record(mut self, record: MappingRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Registers a functional value transform that records can name in `transform`.
    pub fn with_transform<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Arc::new(f));
        self
    }

    /// Registers a whole-entity hook that records can name in `customTransform`.
    pub fn with_custom_transform(mut self, hook: impl CustomTransform + 'static) -> Self {
        self.hooks.insert(hook.name().to_string(), Arc::new(hook));
        self
    }

    /// Adds a group of types that stand in for each other when exact and prefix lookups fail.
    pub fn with_alias_family(mut self, types: &[&str]) -> Self {
        self.alias_families.push(to_owned(types));
        self
    }

    /// Compiles every record. Later records for the same type and direction
    /// replace earlier ones.
    pub fn build(self) -> Result<MappingRegistry, MappingError> {
        let mut mappings: Vec<Mapping> = Vec::with_capacity(self.records.len());
        let mut index: AHashMap<(Direction, String), usize> = AHashMap::new();

        for record in &self.records {
            let mapping = compile(record, &self.functions)?;
            let key = (mapping.direction, mapping.source_type.clone());
            match index.get(&key).copied() {
                Some(existing) => {
                    tracing::debug!(
                        target: "flowbridge",
                        "mapping for '{}' ({}) replaced by a later record",
                        mapping.source_type,
                        mapping.direction
                    );
                    mappings[existing] = mapping;
                }
                None => {
                    index.insert(key, mappings.len());
                    mappings.push(mapping);
                }
            }
        }

        tracing::debug!(
            target: "flowbridge",
            "mapping registry built with {} record(s), {} hook(s)",
            mappings.len(),
            self.hooks.len()
        );

        Ok(MappingRegistry {
            version: self.version,
            mappings,
            index,
            alias_families: self.alias_families,
            hooks: self.hooks,
        })
    }

    fn build_unchecked(self) -> MappingRegistry {
        MappingRegistry {
            version: self.version,
            mappings: Vec::new(),
            index: AHashMap::new(),
            alias_families: self.alias_families,
            hooks: self.hooks,
        }
    }
}

impl Default for MappingRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn to_owned(types: &[&str]) -> Vec<String> {
    types.iter().map(|t| t.to_string()).collect()
}

fn compile(
    record: &MappingRecord,
    functions: &AHashMap<String, TransformFn>,
) -> Result<Mapping, MappingError> {
    let parse = |path: &str| {
        ParameterPath::parse(path).map_err(|source| MappingError::InvalidPath {
            source_type: record.source_type.clone(),
            path: path.to_string(),
            source,
        })
    };

    let mut rules = Vec::with_capacity(record.parameter_map.len());
    for (source, spec) in &record.parameter_map {
        let (transform, default) = match spec {
            TargetSpec::Path(_) => (None, None),
            TargetSpec::Detailed {
                transform, default, ..
            } => {
                let transform = match transform {
                    Some(name) => Some(resolve_transform(name, functions).ok_or_else(|| {
                        MappingError::UnknownTransform {
                            source_type: record.source_type.clone(),
                            path: source.clone(),
                            transform: name.clone(),
                        }
                    })?),
                    None => None,
                };
                (transform, default.clone())
            }
        };
        rules.push(PathRule {
            source: parse(source)?,
            target: parse(spec.target())?,
            transform,
            default,
        });
    }

    let family = record.family.unwrap_or_else(|| infer_family(record));

    Ok(Mapping {
        source_type: record.source_type.clone(),
        target_type: record.target_type.clone(),
        direction: record.direction,
        version: record.version.clone(),
        family,
        rules,
        custom_transform: record.custom_transform.clone(),
    })
}

fn resolve_transform(name: &str, functions: &AHashMap<String, TransformFn>) -> Option<ValueTransform> {
    if let Some(f) = functions.get(name) {
        return Some(ValueTransform::Function {
            name: name.to_string(),
            f: f.clone(),
        });
    }
    NamedTransform::from_name(name).map(ValueTransform::Named)
}

/// Dispatch-table entry for a record: the family of its source type, or of
/// its target type when the source is not a well-known type.
fn infer_family(record: &MappingRecord) -> EntityFamily {
    EntityFamily::of_known_type(&record.source_type)
        .or_else(|| EntityFamily::of_known_type(&record.target_type))
        .unwrap_or_default()
}
