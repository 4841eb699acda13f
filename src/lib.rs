//! # Flowbridge - Workflow Conversion Engine
//!
//! **Flowbridge** converts automation workflows between two platform formats: a
//! *node graph*, where named nodes are wired together through numbered output
//! groups, and a *module graph*, where numbered modules sit in nested route
//! lists. Both directions are supported, driven by a declarative mapping
//! database.
//!
//! ## Core Workflow
//!
//! Every conversion lifts the source document into a platform-neutral model,
//! converts each entity on its own, and then rebuilds the target's topology.
//!
//! 1.  **Load Mappings**: Read a mapping database (JSON) into a `MappingRegistry`, optionally
//!     registering functional transforms and custom entity hooks through `MappingRegistry::builder`.
//! 2.  **Configure**: Build `ConversionOptions` (strict mode, id preservation, expression evaluation, ...).
//! 3.  **Convert**: Hand the source document to a `Converter`. Each entity is matched against the
//!     registry, its parameters are rewritten (expressions are transpiled between the two
//!     expression dialects) and the graph is reconstructed for the target.
//! 4.  **Inspect**: The `ConversionResult` carries the converted document together with logs,
//!     parameters needing human review, placeholder ids and summary counters.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowbridge::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let registry = MappingRegistry::from_loader(&JsonMappingLoader::from_file("mappings.json"))?;
//!     let workflow: serde_json::Value =
//!         serde_json::from_str(&std::fs::read_to_string("workflow.json")?)?;
//!
//!     let options = ConversionOptions::new().preserve_ids(true);
//!     let result = Converter::new(&registry)
//!         .with_options(options)
//!         .convert(&workflow, Direction::Forward);
//!
//!     for entry in &result.logs {
//!         println!("[{}] {}", entry.level, entry.message);
//!     }
//!     for review in &result.parameters_needing_review {
//!         println!("review {}:{} - {}", review.entity_name, review.path, review.reason);
//!     }
//!     println!("{}", serde_json::to_string_pretty(&result.converted_workflow)?);
//!     Ok(())
//! }
//! ```

pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod expression;
pub mod graph;
pub mod mapping;
pub mod model;
pub mod options;
pub mod parameters;
pub mod prelude;
