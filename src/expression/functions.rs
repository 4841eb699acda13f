use crate::model::Platform;

/// Function-name equivalents, node-graph name first.
pub const FUNCTION_TABLE: &[(&str, &str)] = &[
    ("toUpperCase", "upper"),
    ("toLowerCase", "lower"),
    ("trim", "trim"),
    ("length", "length"),
    ("join", "join"),
    ("split", "split"),
    ("first", "first"),
    ("last", "last"),
    ("formatDate", "formatDate"),
    ("parseDate", "parseDate"),
    ("now", "now"),
    ("ifThen", "if"),
    ("includes", "contains"),
    ("replaceAll", "replace"),
    ("substring", "substring"),
    ("round", "round"),
    ("toNumber", "parseNumber"),
    ("toString", "toString"),
    ("isEmpty", "isEmpty"),
    ("keys", "keys"),
];

/// Name of `function` (written in `source`'s dialect) in the other dialect.
pub fn translate_function(function: &str, source: Platform) -> Option<&'static str> {
    FUNCTION_TABLE.iter().find_map(|(a, b)| match source {
        Platform::NodeGraph if *a == function => Some(*b),
        Platform::ModuleGraph if *b == function => Some(*a),
        _ => None,
    })
}
