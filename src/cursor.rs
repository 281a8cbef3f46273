use std::fmt;

use thiserror::Error;

use crate::value::{Value, type_name};

/// A segment in a cursor path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Map key, or the `name` of an entry in a list of maps
    ///
    /// # Examples
    /// - `jobs.web` → `[Field("jobs"), Field("web")]`
    Field(String),

    /// List position
    ///
    /// # Examples
    /// - `items[0]` → `[Field("items"), Index(0)]`
    /// - `items.-1` → `[Field("items"), Index(-1)]` (counts from the end)
    ///
    /// # Note
    /// On a map, an index is looked up as the key `"0"`, `"-1"`, etc.
    Index(i64),
}

impl PathSegment {
    /// Segments compare by key text, so `Index(0)` matches `Field("0")`.
    fn same_key(&self, other: &PathSegment) -> bool {
        match (self, other) {
            (PathSegment::Field(a), PathSegment::Field(b)) => a == b,
            (PathSegment::Index(a), PathSegment::Index(b)) => a == b,
            (PathSegment::Field(f), PathSegment::Index(i))
            | (PathSegment::Index(i), PathSegment::Field(f)) => *f == i.to_string(),
        }
    }

    fn key(&self) -> String {
        match self {
            PathSegment::Field(name) => name.clone(),
            PathSegment::Index(n) => n.to_string(),
        }
    }
}

/// Errors raised while walking a document with a [`Cursor`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    #[error("`{path}` could not be found in the datastructure")]
    NotFound { path: String },

    #[error("`{path}` is out of range (list has {len} entries)")]
    IndexOutOfRange { path: String, len: usize },

    #[error("`{path}` is a {kind}, which cannot be traversed further")]
    NotTraversable { path: String, kind: &'static str },

    #[error("invalid path `{0}`")]
    InvalidPath(String),
}

/// An addressable location in the document tree.
///
/// The empty cursor addresses the root of the document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cursor {
    pub segments: Vec<PathSegment>,
}

impl Cursor {
    pub fn root() -> Self {
        Cursor::default()
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Cursor { segments }
    }

    /// Parses `a.b.c`, `a.b[0].c`, `a.b.0` and an optional leading `$.`.
    ///
    /// Purely numeric segments become [`PathSegment::Index`].
    pub fn parse(input: &str) -> Result<Self, TreeError> {
        let invalid = || TreeError::InvalidPath(input.to_string());

        let body = input.strip_prefix('$').unwrap_or(input);
        let body = body.strip_prefix('.').unwrap_or(body);
        if body.is_empty() {
            return Ok(Cursor::root());
        }

        let mut segments = Vec::new();
        for part in body.split('.') {
            let (head, mut rest) = match part.find('[') {
                Some(at) => (&part[..at], &part[at..]),
                None => (part, ""),
            };

            if head.is_empty() && rest.is_empty() {
                return Err(invalid());
            }
            if !head.is_empty() {
                segments.push(segment_from(head));
            }

            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(invalid)?;
                let inner = &rest[1..close];
                if inner.is_empty() {
                    return Err(invalid());
                }
                segments.push(segment_from(inner));
                rest = &rest[close + 1..];
                if !rest.is_empty() && !rest.starts_with('[') {
                    return Err(invalid());
                }
            }
        }

        Ok(Cursor { segments })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new cursor one level deeper.
    pub fn push(&self, segment: PathSegment) -> Cursor {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Cursor { segments }
    }

    /// True when `self` lies strictly inside the subtree rooted at `parent`.
    ///
    /// A cursor is not under itself.
    pub fn under(&self, parent: &Cursor) -> bool {
        self.segments.len() > parent.segments.len()
            && parent
                .segments
                .iter()
                .zip(&self.segments)
                .all(|(p, c)| p.same_key(c))
    }

    /// Same location, compared by key text.
    pub fn same_as(&self, other: &Cursor) -> bool {
        self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(a, b)| a.same_key(b))
    }

    /// Looks the cursor up in `tree`.
    pub fn resolve<'a>(&self, tree: &'a Value) -> Result<&'a Value, TreeError> {
        let mut current = tree;

        for (i, segment) in self.segments.iter().enumerate() {
            current = match (current, segment) {
                (Value::Object(map), seg) => map
                    .get(&seg.key())
                    .ok_or_else(|| self.not_found(i))?,
                (Value::Array(items), PathSegment::Index(n)) => {
                    let idx = normalize_index(*n, items.len())
                        .ok_or_else(|| self.out_of_range(i, items.len()))?;
                    &items[idx]
                }
                (Value::Array(items), PathSegment::Field(name)) => items
                    .iter()
                    .find(|item| is_named(item, name))
                    .ok_or_else(|| self.not_found(i))?,
                (scalar, _) => return Err(self.not_traversable(i, scalar)),
            };
        }

        Ok(current)
    }

    /// Rewrites the cursor into the form the tree walker produces:
    /// list entries addressed by name become non-negative indices.
    pub fn canonical(&self, tree: &Value) -> Result<Cursor, TreeError> {
        let mut current = tree;
        let mut segments = Vec::with_capacity(self.segments.len());

        for (i, segment) in self.segments.iter().enumerate() {
            match (current, segment) {
                (Value::Object(map), seg) => {
                    let key = seg.key();
                    current = map.get(&key).ok_or_else(|| self.not_found(i))?;
                    segments.push(PathSegment::Field(key));
                }
                (Value::Array(items), PathSegment::Index(n)) => {
                    let idx = normalize_index(*n, items.len())
                        .ok_or_else(|| self.out_of_range(i, items.len()))?;
                    current = &items[idx];
                    segments.push(PathSegment::Index(idx as i64));
                }
                (Value::Array(items), PathSegment::Field(name)) => {
                    let idx = items
                        .iter()
                        .position(|item| is_named(item, name))
                        .ok_or_else(|| self.not_found(i))?;
                    current = &items[idx];
                    segments.push(PathSegment::Index(idx as i64));
                }
                (scalar, _) => return Err(self.not_traversable(i, scalar)),
            }
        }

        Ok(Cursor { segments })
    }

    /// Replaces the value at an existing location.
    pub fn set(&self, tree: &mut Value, value: Value) -> Result<(), TreeError> {
        let mut current = tree;

        for (i, segment) in self.segments.iter().enumerate() {
            current = match (current, segment) {
                (Value::Object(map), seg) => map
                    .get_mut(&seg.key())
                    .ok_or_else(|| self.not_found(i))?,
                (Value::Array(items), PathSegment::Index(n)) => {
                    let len = items.len();
                    let idx = normalize_index(*n, len).ok_or_else(|| self.out_of_range(i, len))?;
                    &mut items[idx]
                }
                (Value::Array(items), PathSegment::Field(name)) => items
                    .iter_mut()
                    .find(|item| is_named(item, name))
                    .ok_or_else(|| self.not_found(i))?,
                (scalar, _) => return Err(self.not_traversable(i, scalar)),
            };
        }

        *current = value;
        Ok(())
    }

    fn prefix(&self, upto: usize) -> String {
        Cursor::new(self.segments[..upto].to_vec()).to_string()
    }

    fn not_found(&self, at: usize) -> TreeError {
        TreeError::NotFound { path: self.prefix(at + 1) }
    }

    fn out_of_range(&self, at: usize, len: usize) -> TreeError {
        TreeError::IndexOutOfRange { path: self.prefix(at + 1), len }
    }

    fn not_traversable(&self, at: usize, value: &Value) -> TreeError {
        TreeError::NotTraversable {
            path: self.prefix(at),
            kind: type_name(value),
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}

fn segment_from(text: &str) -> PathSegment {
    match text.parse::<i64>() {
        Ok(n) => PathSegment::Index(n),
        Err(_) => PathSegment::Field(text.to_string()),
    }
}

// Negative indices count from the end (-1 = last).
fn normalize_index(n: i64, len: usize) -> Option<usize> {
    let idx = if n < 0 {
        let back = n.unsigned_abs() as usize;
        len.checked_sub(back)?
    } else {
        n as usize
    };
    (idx < len).then_some(idx)
}

fn is_named(item: &Value, name: &str) -> bool {
    match item {
        Value::Object(map) => map.get("name").and_then(Value::as_str) == Some(name),
        _ => false,
    }
}
