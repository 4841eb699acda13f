use super::dialect::syntax_of;
use crate::model::Platform;
use std::fmt;

/// A piece of an expression-bearing string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Literal text, copied through untouched.
    Text(String),
    /// The content between a pair of delimiters, without the delimiters.
    Expr(String),
}

/// How much of a string is expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    /// The whole value is one delimited expression.
    Pure,
    /// One or more expressions inside surrounding text.
    Embedded,
    /// Not an expression in this dialect.
    None,
}

/// A string split into literal text and delimited expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub pieces: Vec<Piece>,
    /// An opening delimiter had no matching close; the rest is kept as text.
    pub unterminated: bool,
}

impl Template {
    /// Splits `text` according to `dialect`. Returns `None` when the string is
    /// not expression-bearing in that dialect.
    pub fn parse(text: &str, dialect: Platform) -> Option<Self> {
        let syntax = syntax_of(dialect);
        let body = match syntax.marker {
            Some(marker) => text.strip_prefix(marker)?,
            None => {
                if !text.contains(syntax.open) {
                    return None;
                }
                text
            }
        };

        let mut pieces = Vec::new();
        let mut unterminated = false;
        let mut rest = body;
        while let Some(start) = rest.find(syntax.open) {
            let after_open = &rest[start + syntax.open.len()..];
            match after_open.find(syntax.close) {
                Some(end) => {
                    if start > 0 {
                        pieces.push(Piece::Text(rest[..start].to_string()));
                    }
                    pieces.push(Piece::Expr(after_open[..end].to_string()));
                    rest = &after_open[end + syntax.close.len()..];
                }
                None => {
                    unterminated = true;
                    break;
                }
            }
        }
        if !rest.is_empty() {
            pieces.push(Piece::Text(rest.to_string()));
        }

        Some(Self {
            pieces,
            unterminated,
        })
    }

    pub fn kind(&self) -> ExpressionKind {
        let expressions = self.expressions().count();
        if expressions == 0 {
            ExpressionKind::None
        } else if expressions == 1 && self.pieces.len() == 1 && !self.unterminated {
            ExpressionKind::Pure
        } else {
            ExpressionKind::Embedded
        }
    }

    pub fn expressions(&self) -> impl Iterator<Item = &str> {
        self.pieces.iter().filter_map(|p| match p {
            Piece::Expr(e) => Some(e.as_str()),
            Piece::Text(_) => None,
        })
    }

    /// Renders the template in `dialect`'s surface syntax.
    pub fn render(&self, dialect: Platform) -> String {
        let syntax = syntax_of(dialect);
        let mut out = String::new();
        if let Some(marker) = syntax.marker {
            out.push(marker);
        }
        for piece in &self.pieces {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Expr(e) => {
                    out.push_str(syntax.open);
                    out.push_str(e);
                    out.push_str(syntax.close);
                }
            }
        }
        out
    }

    /// Concatenated literal text, used when every expression was substituted away.
    pub fn literal_text(&self) -> Option<String> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Expr(_) => return None,
            }
        }
        Some(out)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for piece in &self.pieces {
            match piece {
                Piece::Text(t) => write!(f, "{}", t)?,
                Piece::Expr(e) => write!(f, "{{{}}}", e)?,
            }
        }
        Ok(())
    }
}

/// Classifies `text` in `dialect`.
pub fn classify(text: &str, dialect: Platform) -> ExpressionKind {
    Template::parse(text, dialect).map_or(ExpressionKind::None, |t| t.kind())
}
