//! Path - Addressing nodes inside a configuration tree
//!
//! Paths are rooted at `$`, use `.` for field descent and `[n]` for
//! sequence indexing:
//!
//! ```text
//! $.destinationConfig.onFailure.destination
//! $.filterCriteria.filters[0].pattern
//! $.filterCriteria.filters.0.pattern     (implicit indexing)
//! ```
//!
//! A path without the leading `$` (e.g. `description`) is treated as rooted.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::value::Value;

/// Errors for malformed path syntax
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("empty segment in path '{0}'")]
    EmptySegment(String),

    #[error("unclosed '[' in path '{0}'")]
    UnclosedBracket(String),

    #[error("invalid index '{index}' in path '{path}'")]
    InvalidIndex { path: String, index: String },

    #[error("unexpected character '{found}' in path '{path}'")]
    UnexpectedChar { path: String, found: char },
}

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Field of a map; an all-digit field also indexes a list
    Field(String),
    /// Explicit list index
    Index(usize),
}

impl Segment {
    /// Field name or index as written in a dotted path
    pub fn key(&self) -> String {
        match self {
            Segment::Field(name) => name.clone(),
            Segment::Index(i) => i.to_string(),
        }
    }

    fn matches(&self, other: &Segment) -> bool {
        self.key() == other.key()
    }

    fn step<'a>(&self, node: &'a Value) -> Option<&'a Value> {
        match (self, node) {
            (Segment::Field(name), Value::Map(fields)) => fields.get(name),
            (Segment::Field(name), Value::List(items)) => {
                name.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            (Segment::Index(i), Value::List(items)) => items.get(*i),
            _ => None,
        }
    }
}

/// A parsed path expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The root path `$`
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parse a path expression
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let body = match raw.strip_prefix('$') {
            Some("") => return Ok(Self::root()),
            Some(rest) => rest
                .strip_prefix('.')
                .or_else(|| rest.starts_with('[').then_some(rest))
                .ok_or_else(|| PathError::UnexpectedChar {
                    path: raw.to_string(),
                    found: rest.chars().next().unwrap_or('$'),
                })?,
            None => raw,
        };

        let mut segments = Vec::new();
        let mut field = String::new();
        let mut chars = body.chars().peekable();
        // Set after `]` so that `a[0].b` does not see an empty segment before `.b`
        let mut after_index = false;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if field.is_empty() && !after_index {
                        return Err(PathError::EmptySegment(raw.to_string()));
                    }
                    if !field.is_empty() {
                        segments.push(Segment::Field(std::mem::take(&mut field)));
                    }
                    after_index = false;
                }
                '[' => {
                    if !field.is_empty() {
                        segments.push(Segment::Field(std::mem::take(&mut field)));
                    }
                    let mut index = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(d) => index.push(d),
                            None => return Err(PathError::UnclosedBracket(raw.to_string())),
                        }
                    }
                    let parsed = index.parse::<usize>().map_err(|_| PathError::InvalidIndex {
                        path: raw.to_string(),
                        index: index.clone(),
                    })?;
                    segments.push(Segment::Index(parsed));
                    after_index = true;
                }
                ']' => {
                    return Err(PathError::UnexpectedChar {
                        path: raw.to_string(),
                        found: ']',
                    });
                }
                other => {
                    if after_index {
                        return Err(PathError::UnexpectedChar {
                            path: raw.to_string(),
                            found: other,
                        });
                    }
                    field.push(other);
                }
            }
        }

        if !field.is_empty() {
            segments.push(Segment::Field(field));
        } else if !after_index {
            // Trailing '.' or a body that never produced a segment
            return Err(PathError::EmptySegment(raw.to_string()));
        }

        Ok(Self { segments })
    }

    /// Parse a path literal written in source code.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is not a well-formed path. Literals are fixed at
    /// compile time and covered by tests, so a malformed one is a bug.
    pub fn literal(raw: &'static str) -> Self {
        match Self::parse(raw) {
            Ok(path) => path,
            Err(e) => panic!("invalid path literal '{}': {}", raw, e),
        }
    }

    /// Build a path from plain field names
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: fields
                .into_iter()
                .map(|f| Segment::Field(f.into()))
                .collect(),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path extended by one field
    pub fn child(&self, field: impl Into<String>) -> Path {
        let mut segments = self.segments.clone();
        segments.push(Segment::Field(field.into()));
        Self { segments }
    }

    /// First segment, i.e. the top-level field this path lives under
    pub fn head(&self) -> Option<&Segment> {
        self.segments.first()
    }

    /// Whether `prefix` addresses this path or one of its ancestors
    pub fn starts_with(&self, prefix: &Path) -> bool {
        prefix.segments.len() <= self.segments.len()
            && prefix
                .segments
                .iter()
                .zip(&self.segments)
                .all(|(a, b)| a.matches(b))
    }

    /// Whether one of the two paths contains the other
    pub fn overlaps(&self, other: &Path) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }

    /// Resolve this path against `root`.
    ///
    /// Returns `None` when any prefix is missing or has the wrong variant.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(root, |node, segment| segment.step(node))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Resolve `path` against `root`, reporting presence alongside the node
pub fn resolve<'a>(path: &Path, root: &'a Value) -> (Option<&'a Value>, bool) {
    let node = path.resolve(root);
    (node, node.is_some())
}
