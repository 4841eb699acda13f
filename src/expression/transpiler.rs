use super::dialect::{NODE_REFERENCE_FN, syntax_of};
use super::functions::translate_function;
use super::template::{Piece, Template};
use crate::model::Platform;
use ahash::AHashMap;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt;

static FUNCTION_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\.?)\b([A-Za-z_][A-Za-z0-9_]*)(\s*\()").expect("Invalid function call pattern")
});

static RECORD_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^.\w$])ctx\b((?:\.[A-Za-z_$][\w$]*|\[\d+\])*)")
        .expect("Invalid record reference pattern")
});

static POSITIONAL_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^.\w$])(\d+)((?:\.[A-Za-z_$][\w$]*|\[\d+\])+)")
        .expect("Invalid positional reference pattern")
});

static NAMED_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"\bnode\(\s*(?:"([^"]*)"|'([^']*)')\s*\)(?:\.ctx\b)?((?:\.[A-Za-z_$][\w$]*|\[\d+\])*)"#,
    )
    .expect("Invalid named reference pattern")
});

/// Entity names of the source document and the ids their counterparts get in
/// the module-graph document. Needed to rewrite named entity references.
#[derive(Debug, Clone, Default)]
pub struct PositionalTable {
    by_name: AHashMap<String, u64>,
    by_position: AHashMap<u64, String>,
}

impl PositionalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, position: u64) {
        let name = name.into();
        self.by_position.insert(position, name.clone());
        self.by_name.insert(name, position);
    }

    pub fn position_of(&self, name: &str) -> Option<u64> {
        self.by_name.get(name).copied()
    }

    pub fn name_at(&self, position: u64) -> Option<&str> {
        self.by_position.get(&position).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for PositionalTable {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, position) in iter {
            table.insert(name, position);
        }
        table
    }
}

/// Something the transpiler could not translate faithfully.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TranspileIssue {
    /// A call to a function with no counterpart; left as written.
    UnknownFunction(String),
    /// A method call (`.name(`); left as written.
    MethodCall(String),
    /// A named entity reference. Rewritten when its position is known, but
    /// the translation depends on entity ordering either way.
    NamedReference { name: String, position: Option<u64> },
    /// A positional reference to an entity other than the current record.
    PositionalReference { position: u64, name: Option<String> },
    /// An opening delimiter without its closing counterpart.
    Unterminated,
}

impl fmt::Display for TranspileIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranspileIssue::UnknownFunction(name) => {
                write!(f, "function '{}' has no equivalent", name)
            }
            TranspileIssue::MethodCall(name) => write!(f, "method call '.{}()' left as written", name),
            TranspileIssue::NamedReference {
                name,
                position: Some(p),
            } => write!(f, "reference to '{}' rewritten as position {}", name, p),
            TranspileIssue::NamedReference { name, position: None } => {
                write!(f, "reference to '{}' has no known position", name)
            }
            TranspileIssue::PositionalReference {
                position,
                name: Some(n),
            } => write!(f, "positional reference {} rewritten as '{}'", position, n),
            TranspileIssue::PositionalReference { position, name: None } => {
                write!(f, "positional reference {} could not be resolved", position)
            }
            TranspileIssue::Unterminated => f.write_str("unterminated expression"),
        }
    }
}

/// Result of transpiling one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transpiled {
    pub text: String,
    pub issues: Vec<TranspileIssue>,
}

impl Transpiled {
    pub fn needs_review(&self) -> bool {
        !self.issues.is_empty()
    }

    /// All issues joined into one human-readable reason.
    pub fn reason(&self) -> String {
        self.issues.iter().map(ToString::to_string).join("; ")
    }
}

/// Rewrites expressions between the two dialects.
///
/// Only the content between delimiters is touched, and inside it only the
/// code outside string literals. Rewrites are literal substitutions applied
/// left to right; nothing is evaluated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transpiler<'a> {
    positions: Option<&'a PositionalTable>,
}

impl<'a> Transpiler<'a> {
    pub fn new() -> Self {
        Self { positions: None }
    }

    pub fn with_positions(positions: &'a PositionalTable) -> Self {
        Self {
            positions: Some(positions),
        }
    }

    pub fn transpile(&self, text: &str, source: Platform, target: Platform) -> Transpiled {
        match Template::parse(text, source) {
            Some(template) if source != target => self.transpile_template(&template, source, target),
            _ => Transpiled {
                text: text.to_string(),
                issues: Vec::new(),
            },
        }
    }

    /// Rewrites `template` into `target`'s dialect. A template that is
    /// unterminated or holds no expression is returned as written in
    /// `source`'s dialect.
    pub fn transpile_template(&self, template: &Template, source: Platform, target: Platform) -> Transpiled {
        if template.unterminated || template.expressions().next().is_none() {
            return Transpiled {
                text: template.render(source),
                issues: template
                    .unterminated
                    .then_some(TranspileIssue::Unterminated)
                    .into_iter()
                    .collect(),
            };
        }

        let mut issues = Vec::new();
        let pieces = template
            .pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(t) => Piece::Text(t.clone()),
                Piece::Expr(e) => Piece::Expr(self.rewrite_expression(e, source, &mut issues)),
            })
            .collect();

        let rewritten = Template {
            pieces,
            unterminated: false,
        };
        Transpiled {
            text: rewritten.render(target),
            issues: issues.into_iter().unique().collect(),
        }
    }

    fn rewrite_expression(&self, inner: &str, source: Platform, issues: &mut Vec<TranspileIssue>) -> String {
        // A bare `1` is the whole record only when it is the entire expression;
        // anywhere else it is a number literal.
        let root = syntax_of(source).record_root;
        if source == Platform::ModuleGraph && inner.trim() == root {
            return inner.replacen(root, syntax_of(counterpart(source)).record_root, 1);
        }

        let inner = match source {
            Platform::NodeGraph => self.rewrite_named_references(inner, issues),
            Platform::ModuleGraph => inner.to_string(),
        };

        split_literals(&inner)
            .into_iter()
            .map(|(is_literal, chunk)| {
                if is_literal {
                    chunk.to_string()
                } else {
                    let code = rewrite_functions(chunk, source, issues);
                    self.rewrite_record_references(&code, source, issues)
                }
            })
            .collect()
    }

    fn rewrite_named_references(&self, inner: &str, issues: &mut Vec<TranspileIssue>) -> String {
        NAMED_REFERENCE
            .replace_all(inner, |caps: &Captures| {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map_or("", |m| m.as_str())
                    .to_string();
                let position = self.positions.and_then(|t| t.position_of(&name));
                issues.push(TranspileIssue::NamedReference {
                    name,
                    position,
                });
                match position {
                    Some(p) => format!("{}{}", p, &caps[3]),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    fn rewrite_record_references(&self, code: &str, source: Platform, issues: &mut Vec<TranspileIssue>) -> String {
        let target_root = syntax_of(counterpart(source)).record_root;
        match source {
            Platform::NodeGraph => RECORD_REFERENCE
                .replace_all(code, |caps: &Captures| {
                    format!("{}{}{}", &caps[1], target_root, &caps[2])
                })
                .into_owned(),
            Platform::ModuleGraph => POSITIONAL_REFERENCE
                .replace_all(code, |caps: &Captures| {
                    let lead = &caps[1];
                    let tail = &caps[3];
                    let Ok(position) = caps[2].parse::<u64>() else {
                        return caps[0].to_string();
                    };
                    if caps[2] == *syntax_of(source).record_root {
                        return format!("{}{}{}", lead, target_root, tail);
                    }
                    let name = self
                        .positions
                        .and_then(|t| t.name_at(position))
                        .map(str::to_string);
                    issues.push(TranspileIssue::PositionalReference {
                        position,
                        name: name.clone(),
                    });
                    match name {
                        Some(n) => format!(
                            "{}{}(\"{}\").{}{}",
                            lead,
                            NODE_REFERENCE_FN,
                            n.replace('"', "\\\""),
                            target_root,
                            tail
                        ),
                        None => caps[0].to_string(),
                    }
                })
                .into_owned(),
        }
    }
}

fn counterpart(platform: Platform) -> Platform {
    match platform {
        Platform::NodeGraph => Platform::ModuleGraph,
        Platform::ModuleGraph => Platform::NodeGraph,
    }
}

fn rewrite_functions(code: &str, source: Platform, issues: &mut Vec<TranspileIssue>) -> String {
    FUNCTION_CALL
        .replace_all(code, |caps: &Captures| {
            let name = &caps[2];
            if !caps[1].is_empty() {
                issues.push(TranspileIssue::MethodCall(name.to_string()));
                return caps[0].to_string();
            }
            if name == NODE_REFERENCE_FN && source == Platform::NodeGraph {
                return caps[0].to_string();
            }
            match translate_function(name, source) {
                Some(translated) => format!("{}{}", translated, &caps[3]),
                None => {
                    issues.push(TranspileIssue::UnknownFunction(name.to_string()));
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

/// Splits expression code into `(is_string_literal, chunk)` runs. Quotes
/// are `"`, `'` and `` ` ``; a backslash escapes the next character.
fn split_literals(code: &str) -> Vec<(bool, &str)> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in code.char_indices() {
        match quote {
            Some(q) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    chunks.push((true, &code[start..i + c.len_utf8()]));
                    start = i + c.len_utf8();
                    quote = None;
                }
            }
            None => {
                if matches!(c, '"' | '\'' | '`') {
                    if i > start {
                        chunks.push((false, &code[start..i]));
                    }
                    start = i;
                    quote = Some(c);
                }
            }
        }
    }
    if start < code.len() {
        chunks.push((quote.is_some(), &code[start..]));
    }
    chunks
}

/// Transpiles `text` from `source`'s dialect to `target`'s.
///
/// Never fails: anything it cannot translate is left as written.
pub fn transpile(text: &str, source: Platform, target: Platform) -> String {
    Transpiler::new().transpile(text, source, target).text
}

/// Like [`transpile`], also returning what could not be translated faithfully.
pub fn transpile_with_report(text: &str, source: Platform, target: Platform) -> Transpiled {
    Transpiler::new().transpile(text, source, target)
}
