use crate::error::PathError;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One step of a [`ParameterPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A dotted/indexed address into a parameter tree, e.g. `options.headers[0].name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterPath {
    segments: Vec<Segment>,
}

impl ParameterPath {
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.trim().is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        let mut key = String::new();
        let mut chars = raw.char_indices().peekable();
        let syntax = |offset: usize, found: char| PathError::Syntax {
            path: raw.to_string(),
            offset,
            found,
        };

        while let Some((offset, c)) = chars.next() {
            match c {
                '.' => {
                    if key.is_empty() && !matches!(segments.last(), Some(Segment::Index(_))) {
                        return Err(syntax(offset, c));
                    }
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    }
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some((_, d)) if d.is_ascii_digit() => digits.push(d),
                            Some((_, ']')) if !digits.is_empty() => break,
                            Some((at, other)) => return Err(syntax(at, other)),
                            None => return Err(syntax(raw.len(), '[')),
                        }
                    }
                    let index = digits.parse().map_err(|_| syntax(offset, c))?;
                    segments.push(Segment::Index(index));
                }
                ']' => return Err(syntax(offset, c)),
                other => key.push(other),
            }
        }

        if !key.is_empty() {
            segments.push(Segment::Key(key));
        } else if raw.ends_with('.') {
            return Err(syntax(raw.len() - 1, '.'));
        }

        Ok(Self { segments })
    }

    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The first key of the path, if the path starts with one.
    pub fn head_key(&self) -> Option<&str> {
        match self.segments.first() {
            Some(Segment::Key(k)) => Some(k),
            _ => None,
        }
    }

    pub fn child_key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.to_string()));
        Self { segments }
    }

    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }

    /// Reads the value at this path inside `tree`.
    pub fn get<'v>(&self, tree: &'v Map<String, Value>) -> Option<&'v Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = match first {
            Segment::Key(k) => tree.get(k)?,
            Segment::Index(_) => return None,
        };
        for segment in rest {
            current = match (segment, current) {
                (Segment::Key(k), Value::Object(map)) => map.get(k)?,
                (Segment::Index(i), Value::Array(items)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Writes `value` at this path, creating intermediate objects and arrays.
    ///
    /// Arrays are padded with `null` up to the requested index.
    pub fn set(&self, tree: &mut Map<String, Value>, value: Value) -> Result<(), PathError> {
        let Some((first, rest)) = self.segments.split_first() else {
            return Err(PathError::Empty);
        };
        let Segment::Key(first_key) = first else {
            return Err(self.not_a_container("0", "object root"));
        };
        if rest.is_empty() {
            tree.insert(first_key.clone(), value);
            return Ok(());
        }

        let mut current = tree
            .entry(first_key.clone())
            .or_insert_with(|| empty_container_for(&rest[0]));

        for (position, segment) in rest.iter().enumerate() {
            let is_last = position + 1 == rest.len();
            let next_template = rest.get(position + 1);
            match segment {
                Segment::Key(k) => {
                    if current.is_null() {
                        *current = Value::Object(Map::new());
                    }
                    let map = match current {
                        Value::Object(map) => map,
                        other => return Err(self.not_a_container(k, kind_of(other))),
                    };
                    if is_last {
                        map.insert(k.clone(), value);
                        return Ok(());
                    }
                    current = map
                        .entry(k.clone())
                        .or_insert_with(|| next_template.map_or(Value::Null, empty_container_for));
                }
                Segment::Index(i) => {
                    if current.is_null() {
                        *current = Value::Array(Vec::new());
                    }
                    let items = match current {
                        Value::Array(items) => items,
                        other => {
                            return Err(self.not_a_container(&i.to_string(), kind_of(other)));
                        }
                    };
                    if items.len() <= *i {
                        items.resize(*i + 1, Value::Null);
                    }
                    if is_last {
                        items[*i] = value;
                        return Ok(());
                    }
                    current = &mut items[*i];
                }
            }
        }
        Ok(())
    }

    fn not_a_container(&self, segment: &str, found: &'static str) -> PathError {
        PathError::NotAContainer {
            path: self.to_string(),
            segment: segment.to_string(),
            found,
        }
    }
}

fn empty_container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Key(_) => Value::Object(Map::new()),
        Segment::Index(_) => Value::Array(Vec::new()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for ParameterPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(k) if i == 0 => write!(f, "{}", k)?,
                Segment::Key(k) => write!(f, ".{}", k)?,
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

impl FromStr for ParameterPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
