//! Schema definitions and constructors.
//!
//! A [`Schema`] is an immutable tree built once from the constructor
//! functions in this module and then used for any number of validations.
//! Composition happens at construction time: each composite owns its child
//! schemas and never changes afterwards.
//!
//! # Examples
//!
//! ```
//! use shapecheck_core::*;
//!
//! let schema = object([
//!     ("name", string()),
//!     ("tags", array(string())),
//!     ("status", union([literal("active"), literal("inactive")])),
//! ]);
//! assert_eq!(
//!     schema.to_string(),
//!     r#"object { name: string, status: literal "active" | literal "inactive", tags: array<string> }"#
//! );
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::value::{Value, ValueKind};

/// Leaf schema kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Numbers without a fractional part.
    Integer,
    /// Any number.
    Number,
    String,
    Boolean,
    /// Only the absence marker.
    Null,
    Function,
    /// Accepts everything; no constraint intended.
    Any,
    /// Accepts everything; not yet validated.
    Unknown,
}

impl Primitive {
    /// Returns the name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Integer => "integer",
            Primitive::Number => "number",
            Primitive::String => "string",
            Primitive::Boolean => "boolean",
            Primitive::Null => "null",
            Primitive::Function => "function",
            Primitive::Any => "any",
            Primitive::Unknown => "unknown",
        }
    }

    /// Returns `true` if `value` has the kind this primitive expects.
    ///
    /// # Examples
    ///
    /// ```
    /// use shapecheck_core::{Primitive, Value};
    ///
    /// assert!(Primitive::Integer.accepts(&Value::Float(4.0)));
    /// assert!(!Primitive::Integer.accepts(&Value::Float(4.5)));
    /// assert!(!Primitive::Integer.accepts(&Value::from("4")));
    /// assert!(!Primitive::Null.accepts(&Value::Bool(false)));
    /// ```
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Primitive::Integer => match value {
                Value::Int(_) => true,
                Value::Float(x) => x.is_finite() && x.fract() == 0.0,
                _ => false,
            },
            Primitive::Number => value.is_number(),
            Primitive::String => value.kind() == ValueKind::String,
            Primitive::Boolean => value.kind() == ValueKind::Boolean,
            Primitive::Null => value.is_nil(),
            Primitive::Function => value.kind() == ValueKind::Function,
            Primitive::Any | Primitive::Unknown => true,
        }
    }
}

/// Immutable validation rule.
///
/// Build schemas with the constructor functions ([`integer`], [`object`],
/// [`union`], ...) rather than the variants directly; validate with
/// [`Schema::validate`](crate::Schema::validate).
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Leaf check on the runtime kind.
    Primitive(Primitive),
    /// Declared fields, each validated by its own schema. Undeclared input
    /// fields pass through.
    Object(BTreeMap<String, Schema>),
    /// Every element validated by one schema.
    Array(Box<Schema>),
    /// One schema per position, exact length.
    Tuple(Vec<Schema>),
    /// Candidates tried in order; the first success wins.
    Union(Vec<Schema>),
    /// Absence marker, or whatever the inner schema accepts.
    Optional(Box<Schema>),
    /// Map whose keys and values are each validated by an optional schema.
    KeyedMap {
        key: Option<Box<Schema>>,
        value: Option<Box<Schema>>,
    },
    /// Exactly one constant.
    Literal(Value),
}

impl Schema {
    /// Returns `true` for [`Schema::Optional`].
    pub fn is_optional(&self) -> bool {
        matches!(self, Schema::Optional(_))
    }
}

impl From<Primitive> for Schema {
    fn from(primitive: Primitive) -> Self {
        Schema::Primitive(primitive)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, schemas: &[Schema], sep: &str) -> fmt::Result {
    for (i, schema) in schemas.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{schema}")?;
    }
    Ok(())
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Primitive(primitive) => f.write_str(primitive.name()),
            Schema::Object(fields) => {
                if fields.is_empty() {
                    return f.write_str("object {}");
                }
                f.write_str("object { ")?;
                for (i, (name, schema)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {schema}")?;
                }
                f.write_str(" }")
            }
            Schema::Array(element) => write!(f, "array<{element}>"),
            Schema::Tuple(elements) => {
                f.write_str("tuple<")?;
                write_list(f, elements, ", ")?;
                f.write_str(">")
            }
            Schema::Union(candidates) => {
                if candidates.is_empty() {
                    return f.write_str("never");
                }
                write_list(f, candidates, " | ")
            }
            Schema::Optional(inner) => write!(f, "optional<{inner}>"),
            Schema::KeyedMap { key, value } => match (key, value) {
                (None, None) => f.write_str("table"),
                (key, value) => {
                    let any = Schema::Primitive(Primitive::Any);
                    write!(
                        f,
                        "table<{}, {}>",
                        key.as_deref().unwrap_or(&any),
                        value.as_deref().unwrap_or(&any)
                    )
                }
            },
            Schema::Literal(constant) => write!(f, "literal {constant}"),
        }
    }
}

/// Numbers with no fractional part.
pub fn integer() -> Schema {
    Schema::Primitive(Primitive::Integer)
}

/// Any number, integer or floating point.
pub fn number() -> Schema {
    Schema::Primitive(Primitive::Number)
}

/// Text values.
pub fn string() -> Schema {
    Schema::Primitive(Primitive::String)
}

/// `true` or `false`; no truthiness.
pub fn boolean() -> Schema {
    Schema::Primitive(Primitive::Boolean)
}

/// Only [`Value::Nil`]. Falsy values such as `false`, `0` and `""` are
/// rejected.
pub fn null() -> Schema {
    Schema::Primitive(Primitive::Null)
}

/// Callable [`Function`](crate::Function) values.
pub fn function() -> Schema {
    Schema::Primitive(Primitive::Function)
}

/// Accepts every value.
pub fn any() -> Schema {
    Schema::Primitive(Primitive::Any)
}

/// Accepts every value. Behaves exactly like [`any`]; the name documents
/// that the value has not been checked yet.
pub fn unknown() -> Schema {
    Schema::Primitive(Primitive::Unknown)
}

/// Map with declared fields.
///
/// Every declared field must be present in the input. Wrap a field in
/// [`optional`] to accept an explicit `nil`; see
/// [`ValidateOptions::allow_omitted_optional`](crate::ValidateOptions::allow_omitted_optional)
/// to also accept omission. Later duplicates of a field name replace earlier
/// ones.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapecheck_core::*;
///
/// let schema = object([("name", string()), ("age", integer())]);
/// let out = schema
///     .validate(&Value::from(json!({"name": "Alice", "age": 30, "extra": "x"})))
///     .unwrap();
/// assert_eq!(out.get("extra"), Some(&Value::from("x")));
/// ```
pub fn object<I, K>(fields: I) -> Schema
where
    I: IntoIterator<Item = (K, Schema)>,
    K: Into<String>,
{
    Schema::Object(
        fields
            .into_iter()
            .map(|(name, schema)| (name.into(), schema))
            .collect(),
    )
}

/// Sequence whose every element matches `element`.
pub fn array(element: Schema) -> Schema {
    Schema::Array(Box::new(element))
}

/// Fixed-length sequence, one schema per position.
pub fn tuple(elements: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::Tuple(elements.into_iter().collect())
}

/// Ordered alternation: the first candidate that accepts the input wins.
///
/// # Examples
///
/// ```
/// use shapecheck_core::*;
///
/// let schema = union([string(), number()]);
/// assert_eq!(schema.validate(&Value::Int(42)), Ok(Value::Int(42)));
///
/// let err = schema.validate(&Value::Bool(true)).unwrap_err();
/// assert_eq!(err.candidates().len(), 2);
/// ```
pub fn union(candidates: impl IntoIterator<Item = Schema>) -> Schema {
    Schema::Union(candidates.into_iter().collect())
}

/// Accepts [`Value::Nil`] without consulting `inner`; anything else is
/// delegated to `inner`.
pub fn optional(inner: Schema) -> Schema {
    Schema::Optional(Box::new(inner))
}

/// Map with optionally validated keys and values.
///
/// With neither schema the input map is returned as is.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shapecheck_core::*;
///
/// let scores = table(Some(string()), Some(integer()));
/// assert!(scores.is_valid(&Value::from(json!({"alice": 3, "bob": 5}))));
/// assert!(!scores.is_valid(&Value::from(json!({"alice": "three"}))));
///
/// let anything = table(None, None);
/// assert!(anything.is_valid(&Value::from(json!({"k": [1, 2]}))));
/// ```
pub fn table(key: Option<Schema>, value: Option<Schema>) -> Schema {
    Schema::KeyedMap {
        key: key.map(Box::new),
        value: value.map(Box::new),
    }
}

/// Alias of [`table`].
pub fn keyed_map(key: Option<Schema>, value: Option<Schema>) -> Schema {
    table(key, value)
}

/// Exactly `constant`, compared by kind and value.
pub fn literal(constant: impl Into<Value>) -> Schema {
    Schema::Literal(constant.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names() {
        assert_eq!(integer().to_string(), "integer");
        assert_eq!(null().to_string(), "null");
        assert_eq!(unknown().to_string(), "unknown");
    }

    #[test]
    fn test_integer_rejects_non_finite() {
        assert!(!Primitive::Integer.accepts(&Value::Float(f64::INFINITY)));
        assert!(!Primitive::Integer.accepts(&Value::Float(f64::NAN)));
        assert!(Primitive::Integer.accepts(&Value::Float(-0.0)));
    }

    #[test]
    fn test_any_and_unknown_accept_everything() {
        for value in [
            Value::Nil,
            Value::Bool(false),
            Value::from("x"),
            Value::from(vec![1, 2]),
        ] {
            assert!(Primitive::Any.accepts(&value));
            assert!(Primitive::Unknown.accepts(&value));
        }
    }

    #[test]
    fn test_composite_display() {
        assert_eq!(array(union([string(), number()])).to_string(), "array<string | number>");
        assert_eq!(tuple([string(), boolean()]).to_string(), "tuple<string, boolean>");
        assert_eq!(optional(integer()).to_string(), "optional<integer>");
        assert_eq!(table(None, None).to_string(), "table");
        assert_eq!(table(None, Some(integer())).to_string(), "table<any, integer>");
        assert_eq!(literal("x").to_string(), r#"literal "x""#);
        assert_eq!(object(Vec::<(String, Schema)>::new()).to_string(), "object {}");
        assert_eq!(union(Vec::<Schema>::new()).to_string(), "never");
    }

    #[test]
    fn test_object_duplicate_field_keeps_last() {
        let schema = object([("a", string()), ("a", integer())]);
        let Schema::Object(fields) = schema else {
            panic!("expected object schema");
        };
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["a"], integer());
    }

    #[test]
    fn test_keyed_map_alias() {
        assert_eq!(keyed_map(Some(string()), None), table(Some(string()), None));
    }

    #[test]
    fn test_is_optional() {
        assert!(optional(string()).is_optional());
        assert!(!string().is_optional());
    }
}
