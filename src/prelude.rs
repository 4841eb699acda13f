//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! flowbridge crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowbridge::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let registry = MappingRegistry::from_loader(&JsonMappingLoader::from_file("path/to/mappings.json"))?;
//! let workflow: serde_json::Value =
//!     serde_json::from_str(&std::fs::read_to_string("path/to/workflow.json")?)?;
//!
//! let result = Converter::new(&registry).convert_auto(&workflow);
//! println!("{} entities need review", result.parameters_needing_review.len());
//! # Ok(())
//! # }
//! ```

// Whole-workflow conversion
pub use crate::graph::{ConversionResult, Converter, detect_platform};
pub use crate::options::ConversionOptions;

// Mapping registry
pub use crate::mapping::{
    CustomTransform, JsonMappingLoader, MappingDatabase, MappingLoader, MappingRecord, MappingRegistry,
};

// Neutral model
pub use crate::model::{Direction, Entity, Platform};

// Expressions
pub use crate::expression::{transpile, transpile_with_report};

// Diagnostics
pub use crate::diagnostics::{DebugInfo, LogEntry, LogLevel, ReviewEntry};

// Error types
pub use crate::error::{ConversionError, LoadError, MappingError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
