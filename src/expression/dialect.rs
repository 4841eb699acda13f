use crate::model::Platform;

/// Surface syntax of one platform's expression micro-language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectSyntax {
    pub open: &'static str,
    pub close: &'static str,
    /// Character that must prefix the whole value for it to be read as an expression.
    pub marker: Option<char>,
    /// Root token of the current-record accessor (`ctx` / `1`).
    pub record_root: &'static str,
}

pub const NODE_GRAPH_SYNTAX: DialectSyntax = DialectSyntax {
    open: "<<",
    close: ">>",
    marker: Some('='),
    record_root: "ctx",
};

pub const MODULE_GRAPH_SYNTAX: DialectSyntax = DialectSyntax {
    open: "<<",
    close: ">>",
    marker: None,
    record_root: "1",
};

pub fn syntax_of(platform: Platform) -> &'static DialectSyntax {
    match platform {
        Platform::NodeGraph => &NODE_GRAPH_SYNTAX,
        Platform::ModuleGraph => &MODULE_GRAPH_SYNTAX,
    }
}

/// Accessor keyword naming another entity in the node-graph dialect: `node("Name")`.
pub const NODE_REFERENCE_FN: &str = "node";
