use thiserror::Error;

/// Errors that abort a whole conversion call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Invalid workflow document: {0}")]
    InvalidInput(String),

    #[error("No mapping found for entity '{entity}' of type '{entity_type}'")]
    MappingNotFound { entity: String, entity_type: String },

    #[error("Entity '{entity}' could not be converted: {message}")]
    EntityFailed { entity: String, message: String },
}

/// Errors raised while converting a single entity.
///
/// These are recovered locally by the graph converter unless strict mode is on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntityError {
    #[error("Invalid parameter path in mapping for '{entity_type}': {source}")]
    BadPath {
        entity_type: String,
        #[source]
        source: PathError,
    },

    #[error("Transform on '{path}' failed: {source}")]
    Transform {
        path: String,
        #[source]
        source: TransformError,
    },

    #[error("Malformed '{field}' in entity: {message}")]
    MalformedField { field: String, message: String },
}

/// Errors produced when parsing or applying a dotted/indexed parameter path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("Path is empty")]
    Empty,

    #[error("Unexpected character '{found}' at offset {offset} in path '{path}'")]
    Syntax {
        path: String,
        offset: usize,
        found: char,
    },

    #[error("Cannot descend into a {found} at segment '{segment}' of path '{path}'")]
    NotAContainer {
        path: String,
        segment: String,
        found: &'static str,
    },
}

/// Errors produced by named, functional or custom transforms.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Transform '{transform}' cannot convert value '{value}'")]
    Incompatible { transform: String, value: String },

    #[error("Custom transform hook '{0}' is not registered")]
    UnknownHook(String),

    #[error("Custom transform '{hook}' failed: {message}")]
    HookFailed { hook: String, message: String },
}

/// Errors that can occur while building a mapping registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("Failed to parse mapping database: {0}")]
    JsonParseError(String),

    #[error("Mapping for '{source_type}' has an invalid parameter path '{path}': {source}")]
    InvalidPath {
        source_type: String,
        path: String,
        #[source]
        source: PathError,
    },

    #[error("Mapping for '{source_type}' uses unknown transform '{transform}' on '{path}'")]
    UnknownTransform {
        source_type: String,
        path: String,
        transform: String,
    },
}

/// Errors raised by a [`crate::mapping::MappingLoader`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Could not read mapping source '{path}': {message}")]
    Io { path: String, message: String },

    #[error(transparent)]
    Mapping(#[from] MappingError),
}
