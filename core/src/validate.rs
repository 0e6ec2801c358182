//! Recursive validation of values against schemas.
//!
//! Every composite validates its children fail-fast, returning the first
//! failure with its own field, position or key prefixed to the error path.
//! [`Schema::Union`] is the exception: it tries every candidate before
//! giving up and reports all of their failures.
//!
//! Validation never mutates the schema or the input. Containers in the
//! result are freshly built, so the same schema may validate concurrently
//! from any number of threads.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use shapecheck_core::*;
//!
//! let schema = tuple([string(), number(), boolean()]);
//!
//! let ok = schema.validate(&Value::from(json!(["hello", 42, true]))).unwrap();
//! assert_eq!(ok, Value::from(json!(["hello", 42, true])));
//!
//! let err = schema.validate(&Value::from(json!(["hello"]))).unwrap_err();
//! assert_eq!(err.kind(), &ErrorKind::MissingTupleElement(2));
//! ```

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};

use tracing::{debug, trace};

use crate::config::ValidateOptions;
use crate::error::{CandidateFailure, ErrorKind, PathSegment, ValidationError};
use crate::schema::{Primitive, Schema};
use crate::value::{Key, Map, Value};

impl Schema {
    /// Validates `value` with default [`ValidateOptions`].
    ///
    /// Returns the validated value, or the first failure found.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `value` does not conform; its
    /// [`kind`](ValidationError::kind) says why and its
    /// [`path`](ValidationError::path) says where.
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        self.validate_with(value, &ValidateOptions::default())
    }

    /// Validates `value` with explicit options.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn validate_with(
        &self,
        value: &Value,
        options: &ValidateOptions,
    ) -> Result<Value, ValidationError> {
        let result = Walker { options }.check(self, value, 0);
        if let Err(error) = &result {
            debug!(schema = %self, %error, "Validation failed");
        }
        result
    }

    /// Returns `true` if `value` validates with default options.
    pub fn is_valid(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }

    /// Validates a JSON document and returns the validated document.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use shapecheck_core::*;
    ///
    /// let schema = array(integer());
    /// assert_eq!(schema.validate_json(&json!([1, 2])).unwrap(), json!([1, 2]));
    /// assert!(schema.validate_json(&json!([1, 2.5])).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn validate_json(
        &self,
        value: &serde_json::Value,
    ) -> Result<serde_json::Value, ValidationError> {
        self.validate(&Value::from(value.clone())).map(Into::into)
    }
}

/// A schema bound to the options it validates with.
///
/// # Examples
///
/// ```
/// use shapecheck_core::*;
///
/// let validator = Validator::new(object([("nickname", optional(string()))]))
///     .with_options(ValidateOptions::default().with_omitted_optional(true));
///
/// let empty: Value = Vec::<(&str, Value)>::new().into_iter().collect();
/// assert!(validator.validate(&empty).is_ok());
/// assert!(object([("nickname", optional(string()))]).validate(&empty).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Schema,
    options: ValidateOptions,
}

impl Validator {
    /// Creates a validator with default options.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            options: ValidateOptions::default(),
        }
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: ValidateOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the bound schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the options used for every call.
    pub fn options(&self) -> &ValidateOptions {
        &self.options
    }

    /// Validates `value` against the bound schema.
    ///
    /// # Errors
    ///
    /// See [`Schema::validate`].
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        self.schema.validate_with(value, &self.options)
    }
}

struct Walker<'a> {
    options: &'a ValidateOptions,
}

impl Walker<'_> {
    fn check(
        &self,
        schema: &Schema,
        value: &Value,
        depth: usize,
    ) -> Result<Value, ValidationError> {
        if depth > self.options.max_depth {
            debug!(max_depth = self.options.max_depth, "Schema nesting exceeds maximum depth");
            return Err(ErrorKind::DepthExceeded(self.options.max_depth).into());
        }

        match schema {
            Schema::Primitive(primitive) => check_primitive(*primitive, value),
            Schema::Object(fields) => self.check_object(fields, value, depth),
            Schema::Array(element) => self.check_array(element, value, depth),
            Schema::Tuple(elements) => self.check_tuple(elements, value, depth),
            Schema::Union(candidates) => self.check_union(candidates, value, depth),
            Schema::Optional(inner) => {
                if value.is_nil() {
                    Ok(Value::Nil)
                } else {
                    self.check(inner, value, depth + 1)
                }
            }
            Schema::KeyedMap {
                key,
                value: value_schema,
            } => self.check_table(key.as_deref(), value_schema.as_deref(), value, depth),
            Schema::Literal(constant) => check_literal(constant, value),
        }
    }

    fn check_object(
        &self,
        fields: &BTreeMap<String, Schema>,
        value: &Value,
        depth: usize,
    ) -> Result<Value, ValidationError> {
        let Value::Map(input) = value else {
            return Err(not_a_container("map", value));
        };

        let mut output = Map::new();
        for (name, field_schema) in fields {
            let key = Key::String(name.clone());
            match input.get(&key) {
                None => {
                    if self.options.allow_omitted_optional && field_schema.is_optional() {
                        continue;
                    }
                    return Err(ErrorKind::MissingField(name.clone()).into());
                }
                // An explicit nil counts as missing unless the field schema
                // accepts it.
                Some(Value::Nil) => match self.check(field_schema, &Value::Nil, depth + 1) {
                    Ok(validated) => {
                        output.insert(key, validated);
                    }
                    Err(error) if matches!(error.kind(), ErrorKind::DepthExceeded(_)) => {
                        return Err(error.within(PathSegment::Field(name.clone())));
                    }
                    Err(_) => return Err(ErrorKind::MissingField(name.clone()).into()),
                },
                Some(field) => {
                    let validated = self
                        .check(field_schema, field, depth + 1)
                        .map_err(|e| e.within(PathSegment::Field(name.clone())))?;
                    output.insert(key, validated);
                }
            }
        }

        for (key, raw) in input {
            output.entry(key.clone()).or_insert_with(|| raw.clone());
        }

        Ok(Value::Map(output))
    }

    fn check_array(
        &self,
        element: &Schema,
        value: &Value,
        depth: usize,
    ) -> Result<Value, ValidationError> {
        let Value::Array(items) = value else {
            return Err(not_a_container("array", value));
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.check(element, item, depth + 1)
                    .map_err(|e| e.within(PathSegment::Index(i + 1)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn check_tuple(
        &self,
        elements: &[Schema],
        value: &Value,
        depth: usize,
    ) -> Result<Value, ValidationError> {
        let Value::Array(items) = value else {
            return Err(not_a_container("array", value));
        };

        let mut output = Vec::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            let validated = match items.get(i) {
                None => return Err(ErrorKind::MissingTupleElement(i + 1).into()),
                // A nil position holds no value unless the element schema
                // accepts nil.
                Some(Value::Nil) => match self.check(element, &Value::Nil, depth + 1) {
                    Ok(validated) => validated,
                    Err(error) if matches!(error.kind(), ErrorKind::DepthExceeded(_)) => {
                        return Err(error.within(PathSegment::Index(i + 1)));
                    }
                    Err(_) => return Err(ErrorKind::MissingTupleElement(i + 1).into()),
                },
                Some(item) => self
                    .check(element, item, depth + 1)
                    .map_err(|e| e.within(PathSegment::Index(i + 1)))?,
            };
            output.push(validated);
        }

        // Trailing nils are absent positions, not extra elements.
        let occupied = items
            .iter()
            .rposition(|item| !item.is_nil())
            .map_or(0, |last| last + 1);
        if occupied > elements.len() {
            return Err(ErrorKind::ExtraTupleElement(elements.len() + 1).into());
        }

        Ok(Value::Array(output))
    }

    fn check_union(
        &self,
        candidates: &[Schema],
        value: &Value,
        depth: usize,
    ) -> Result<Value, ValidationError> {
        let mut failures = Vec::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            match self.check(candidate, value, depth + 1) {
                Ok(validated) => return Ok(validated),
                Err(error) => {
                    trace!(candidate = i + 1, %error, "Union candidate rejected input");
                    failures.push(CandidateFailure {
                        index: i + 1,
                        error,
                    });
                }
            }
        }
        Err(ErrorKind::UnionExhausted(failures).into())
    }

    fn check_table(
        &self,
        key_schema: Option<&Schema>,
        value_schema: Option<&Schema>,
        value: &Value,
        depth: usize,
    ) -> Result<Value, ValidationError> {
        let Value::Map(entries) = value else {
            return Err(not_a_container("map", value));
        };
        if key_schema.is_none() && value_schema.is_none() {
            return Ok(value.clone());
        }

        let mut output = Map::new();
        for (key, item) in entries {
            let segment = || PathSegment::Key(Value::from(key.clone()).to_string());
            trace!(%key, "Checking table entry");

            let validated_key = match key_schema {
                Some(schema) => {
                    let checked = self
                        .check(schema, &Value::from(key.clone()), depth + 1)
                        .map_err(|e| e.within(segment()))?;
                    Key::try_from(checked).map_err(|rejected| {
                        ValidationError::from(ErrorKind::InvalidMapKey(render(&rejected)))
                            .within(segment())
                    })?
                }
                None => key.clone(),
            };

            let validated_item = match value_schema {
                Some(schema) => self
                    .check(schema, item, depth + 1)
                    .map_err(|e| e.within(segment()))?,
                None => item.clone(),
            };

            output.insert(validated_key, validated_item);
        }

        Ok(Value::Map(output))
    }
}

/// Longest rendering of an offending value kept in an error message.
const MAX_RENDERED_LEN: usize = 80;

/// Writer that keeps at most `MAX_RENDERED_LEN` bytes and then refuses
/// further output, so large containers are never rendered in full.
struct Truncated {
    buf: String,
    cut: bool,
}

impl fmt::Write for Truncated {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = MAX_RENDERED_LEN - self.buf.len();
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.push_str(&s[..end]);
        self.cut = true;
        Err(fmt::Error)
    }
}

/// Renders `value` for an error message, cut to `MAX_RENDERED_LEN` bytes
/// with a trailing `...`.
fn render(value: &Value) -> String {
    let mut out = Truncated {
        buf: String::new(),
        cut: false,
    };
    // An error here only means the writer is full.
    let _ = write!(out, "{value}");
    if out.cut {
        out.buf.push_str("...");
    }
    out.buf
}

fn check_primitive(primitive: Primitive, value: &Value) -> Result<Value, ValidationError> {
    if primitive.accepts(value) {
        Ok(value.clone())
    } else {
        Err(ErrorKind::KindMismatch {
            expected: primitive.name(),
            actual: render(value),
        }
        .into())
    }
}

fn check_literal(constant: &Value, value: &Value) -> Result<Value, ValidationError> {
    if value == constant {
        Ok(value.clone())
    } else {
        Err(ErrorKind::LiteralMismatch {
            expected: render(constant),
            actual: render(value),
        }
        .into())
    }
}

fn not_a_container(expected: &'static str, value: &Value) -> ValidationError {
    ErrorKind::NotAContainer {
        expected,
        actual: render(value),
    }
    .into()
}
