//! Validation failures.
//!
//! A [`ValidationError`] pairs an [`ErrorKind`] describing what went wrong
//! with the path of fields, positions and keys leading to the offending
//! value. Composites extend the path as a failure propagates upward, so the
//! rendered message reads from the root of the input:
//!
//! ```
//! use serde_json::json;
//! use shapecheck_core::*;
//!
//! let schema = object([("user", object([("age", integer())]))]);
//! let err = schema
//!     .validate(&Value::from(json!({"user": {"age": 3.14}})))
//!     .unwrap_err();
//! assert_eq!(err.to_string(), "field user.age: expected integer, got: 3.14");
//! ```

use std::fmt;

use thiserror::Error;

/// One step on the way from the validated root to a failing value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Declared object field.
    Field(String),
    /// 1-based array or tuple position.
    Index(usize),
    /// Table entry, holding the rendered key.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => f.write_str(name),
            PathSegment::Index(position) => write!(f, "[{position}]"),
            PathSegment::Key(key) => write!(f, "[{key}]"),
        }
    }
}

/// A union candidate's rejection, kept for the aggregate error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    /// 1-based position of the candidate in the union.
    pub index: usize,
    /// Why the candidate rejected the input.
    pub error: ValidationError,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.error)
    }
}

/// What went wrong during validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Input's runtime kind does not match a primitive schema.
    #[error("expected {expected}, got: {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: String,
    },
    /// A declared object field is absent from the input.
    #[error("missing required field: {0}")]
    MissingField(String),
    /// Tuple input is shorter than the schema.
    #[error("missing tuple element at position {0}")]
    MissingTupleElement(usize),
    /// Tuple input is longer than the schema.
    #[error("unexpected extra element at position {0}")]
    ExtraTupleElement(usize),
    /// Every union candidate rejected the input.
    #[error("no union candidate matched: {}", render_candidates(.0))]
    UnionExhausted(Vec<CandidateFailure>),
    /// Input is not the literal constant.
    #[error("expected literal {expected}, got: {actual}")]
    LiteralMismatch { expected: String, actual: String },
    /// Input is not the container an object, array, tuple or table expects.
    #[error("expected {expected}, got: {actual}")]
    NotAContainer {
        expected: &'static str,
        actual: String,
    },
    /// A table key schema produced a value that cannot key a map.
    ///
    /// The built-in schemas return key-shaped values for key-shaped input,
    /// so this only guards the conversion of a validated key back to a
    /// [`Key`](crate::Key).
    #[error("invalid map key: {0}")]
    InvalidMapKey(String),
    /// Schema nesting went deeper than the configured limit.
    #[error("maximum nesting depth of {0} exceeded")]
    DepthExceeded(usize),
}

fn render_candidates(failures: &[CandidateFailure]) -> String {
    if failures.is_empty() {
        return "no candidates".to_string();
    }
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A validation failure with its location in the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{kind}", render_location(.path))]
pub struct ValidationError {
    path: Vec<PathSegment>,
    kind: ErrorKind,
}

fn render_location(path: &[PathSegment]) -> String {
    match path.first() {
        None => String::new(),
        Some(PathSegment::Field(_)) => format!("field {}: ", render_path(path)),
        Some(_) => format!("at {}: ", render_path(path)),
    }
}

fn render_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 && matches!(segment, PathSegment::Field(_)) {
            out.push('.');
        }
        out.push_str(&segment.to_string());
    }
    out
}

impl ValidationError {
    /// Creates an error located at the root of the input.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            path: Vec::new(),
            kind,
        }
    }

    /// Returns what went wrong.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the path from the root of the input to the failing value.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Renders the path as `user.tags[2]`; empty at the root.
    pub fn path_string(&self) -> String {
        render_path(&self.path)
    }

    /// Prefixes the path with `segment`, as a parent composite does when
    /// a child failure passes through it.
    pub fn within(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// Returns the candidate failures of a [`ErrorKind::UnionExhausted`]
    /// error, or an empty slice.
    pub fn candidates(&self) -> &[CandidateFailure] {
        match &self.kind {
            ErrorKind::UnionExhausted(failures) => failures,
            _ => &[],
        }
    }
}

impl From<ErrorKind> for ValidationError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}
