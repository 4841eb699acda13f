use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options consumed at the start of a conversion call. Read-only for its duration.
///
/// Every key is optional when read from JSON:
///
/// ```rust
/// use flowbridge::options::ConversionOptions;
///
/// let options: ConversionOptions =
///     serde_json::from_str(r#"{ "strictMode": true, "preserveIds": true }"#).unwrap();
/// assert!(options.strict_mode);
/// assert!(!options.debug);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOptions {
    /// Abort the whole conversion on an unmapped or failed entity.
    pub strict_mode: bool,
    /// Reuse source ids (coerced to the target id type) instead of assigning new ones.
    pub preserve_ids: bool,
    /// Substitute simple references from `expression_context` instead of transpiling them.
    pub evaluate_expressions: bool,
    /// Values available to `evaluate_expressions`.
    pub expression_context: Map<String, Value>,
    /// Copy source parameters that no mapping rule consumed into the target verbatim.
    pub copy_non_mapped_parameters: bool,
    /// Attach per-entity detail to the result's debug info.
    pub debug: bool,
}

impl ConversionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self, on: bool) -> Self {
        self.strict_mode = on;
        self
    }

    pub fn preserve_ids(mut self, on: bool) -> Self {
        self.preserve_ids = on;
        self
    }

    pub fn copy_non_mapped(mut self, on: bool) -> Self {
        self.copy_non_mapped_parameters = on;
        self
    }

    pub fn debug(mut self, on: bool) -> Self {
        self.debug = on;
        self
    }

    /// Turns on expression evaluation against `context`.
    pub fn evaluate_with(mut self, context: Map<String, Value>) -> Self {
        self.evaluate_expressions = true;
        self.expression_context = context;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
