//! Per-type mapping rules and the registry that looks them up.

mod family;
mod loader;
mod record;
mod registry;
mod transform;

pub use family::{EntityFamily, VARIABLE_ALIASES, WEBHOOK_ALIASES};
pub use loader::{JsonMappingLoader, MappingLoader};
pub use record::{Mapping, MappingDatabase, MappingRecord, PathRule, TargetSpec};
pub use registry::{MappingRegistry, MappingRegistryBuilder, MatchKind};
pub use transform::{CustomTransform, NamedTransform, TransformFn, ValueTransform};
