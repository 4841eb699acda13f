//! The two expression micro-languages and the transpiler between them.
//!
//! Node-graph values mark an expression with a leading `=` and wrap each
//! expression in `<<` `>>`; the current record is `ctx`. Module-graph values
//! use the same delimiters without a marker and address the current record
//! as `1`.
//!
//! ```rust
//! use flowbridge::expression::transpile;
//! use flowbridge::model::Platform;
//!
//! let b = transpile("=<<toUpperCase(ctx.name)>>", Platform::NodeGraph, Platform::ModuleGraph);
//! assert_eq!(b, "<<upper(1.name)>>");
//! ```

mod dialect;
mod evaluator;
mod functions;
mod template;
mod transpiler;

pub use dialect::{DialectSyntax, MODULE_GRAPH_SYNTAX, NODE_GRAPH_SYNTAX, syntax_of};
pub use evaluator::{Evaluation, evaluate, resolve_reference};
pub use functions::{FUNCTION_TABLE, translate_function};
pub use template::{ExpressionKind, Piece, Template, classify};
pub use transpiler::{
    PositionalTable, TranspileIssue, Transpiled, Transpiler, transpile, transpile_with_report,
};
