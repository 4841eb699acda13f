use super::record::MappingDatabase;
use crate::error::{LoadError, MappingError};
use std::fs;
use std::path::PathBuf;

/// Supplies a mapping database to the engine.
///
/// Caching, remote fetching and any asynchronous I/O belong to implementors;
/// the registry only sees the finished [`MappingDatabase`].
pub trait MappingLoader {
    fn load(&self) -> Result<MappingDatabase, LoadError>;
}

/// Reads a mapping database from JSON text or a JSON file.
#[derive(Debug, Clone)]
pub struct JsonMappingLoader {
    source: JsonSource,
}

#[derive(Debug, Clone)]
enum JsonSource {
    Text(String),
    File(PathBuf),
}

impl JsonMappingLoader {
    pub fn from_json(json: impl Into<String>) -> Self {
        Self {
            source: JsonSource::Text(json.into()),
        }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            source: JsonSource::File(path.into()),
        }
    }
}

impl MappingLoader for JsonMappingLoader {
    fn load(&self) -> Result<MappingDatabase, LoadError> {
        let text = match &self.source {
            JsonSource::Text(text) => text.clone(),
            JsonSource::File(path) => fs::read_to_string(path).map_err(|e| LoadError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?,
        };
        let database = serde_json::from_str(&text)
            .map_err(|e| MappingError::JsonParseError(e.to_string()))?;
        Ok(database)
    }
}
