//! Dynamic value model validated by schemas.
//!
//! [`Value`] is the untyped input every schema accepts and the normalized
//! output every successful validation returns. Maps are keyed by [`Key`], the
//! orderable subset of values, and stored in a [`BTreeMap`] so iteration
//! order is deterministic.
//!
//! Values convert to and from [`serde_json::Value`], which is the usual way to
//! feed decoded documents into a schema.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use shapecheck_core::{Value, ValueKind};
//!
//! let value = Value::from(json!({"name": "Alice", "age": 30}));
//! assert_eq!(value.kind(), ValueKind::Map);
//! assert_eq!(value.get("age"), Some(&Value::Int(30)));
//! assert_eq!(value.to_string(), r#"{"age": 30, "name": "Alice"}"#);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Map container used by [`Value::Map`].
pub type Map = BTreeMap<Key, Value>;

/// Runtime kind of a [`Value`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// The absence-of-value marker.
    Nil,
    /// `true` or `false`.
    Boolean,
    /// Whole number stored as `i64`.
    Integer,
    /// Floating point number.
    Number,
    /// UTF-8 text.
    String,
    /// Ordered sequence.
    Array,
    /// Keyed associative container.
    Map,
    /// Callable value.
    Function,
}

impl ValueKind {
    /// Returns the lowercase name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Nil => "nil",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Map => "map",
            ValueKind::Function => "function",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map key.
///
/// Only booleans, integers and strings can key a map. Keys order as
/// booleans, then integers, then strings.
///
/// # Examples
///
/// ```
/// use shapecheck_core::{Key, Value};
///
/// assert!(Key::Bool(true) < Key::Int(-5));
/// assert!(Key::Int(100) < Key::from("a"));
/// assert_eq!(Key::try_from(Value::Int(3)), Ok(Key::Int(3)));
/// assert!(Key::try_from(Value::Float(1.5)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Boolean key.
    Bool(bool),
    /// Integer key.
    Int(i64),
    /// String key.
    String(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{b}"),
            Key::Int(i) => write!(f, "{i}"),
            Key::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::String(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::String(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<bool> for Key {
    fn from(value: bool) -> Self {
        Key::Bool(value)
    }
}

impl TryFrom<Value> for Key {
    /// The rejected value is handed back unchanged.
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(Key::Bool(b)),
            Value::Int(i) => Ok(Key::Int(i)),
            Value::String(s) => Ok(Key::String(s)),
            other => Err(other),
        }
    }
}

/// Shareable callable value.
///
/// Two functions are equal only when they are the same allocation, so a
/// cloned `Function` equals its original while two separately-built closures
/// never do.
///
/// # Examples
///
/// ```
/// use shapecheck_core::{Function, Value};
///
/// let len = Function::new(|args| Value::Int(args.len() as i64));
/// assert_eq!(len.call(&[Value::Nil, Value::Nil]), Value::Int(2));
/// assert_eq!(len.clone(), len);
/// ```
#[derive(Clone)]
pub struct Function(Arc<dyn Fn(&[Value]) -> Value + Send + Sync>);

impl Function {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invokes the function.
    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// Returns `true` if both handles point at the same function.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function(<function>)")
    }
}

/// Untyped runtime value.
///
/// Equality is exact: values of different kinds are never equal, so
/// `Value::Int(1) != Value::Float(1.0)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    String(String),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Associative container.
    Map(Map),
    /// Callable.
    Function(Function),
}

impl Value {
    /// Returns the runtime kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Int(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Map(_) => ValueKind::Map,
            Value::Function(_) => ValueKind::Function,
        }
    }

    /// Returns `true` for [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns `true` for integers and floats.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is one. Floats are not narrowed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the numeric value, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements, if this is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries, if this is a map.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the function, if this is one.
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Value::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Looks up `key` when this value is a map.
    ///
    /// Returns `None` for missing keys and for non-map values.
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(&key.into()))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {item}", Value::from(key.clone()))?;
                }
                f.write_str("}")
            }
            Value::Function(_) => f.write_str("<function>"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Nil, Into::into)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Value::Map(value)
    }
}

impl From<Function> for Value {
    fn from(value: Function) -> Self {
        Value::Function(value)
    }
}

impl From<Key> for Value {
    fn from(value: Key) -> Self {
        match value {
            Key::Bool(b) => Value::Bool(b),
            Key::Int(i) => Value::Int(i),
            Key::String(s) => Value::String(s),
        }
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<serde_json::Value> for Value {
    /// Integers representable as `i64` become [`Value::Int`]; every other
    /// number becomes [`Value::Float`].
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(key, value)| (Key::String(key), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    /// Lossy: functions and non-finite floats become `null`, non-string map
    /// keys are stringified.
    fn from(value: Value) -> Self {
        match value {
            Value::Nil | Value::Function(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Float(x) => serde_json::Number::from_f64(x)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key.to_string(), value.into()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_kind_distinguishes_integers_from_floats() {
        assert_eq!(Value::Int(3).kind(), ValueKind::Integer);
        assert_eq!(Value::Float(3.0).kind(), ValueKind::Number);
        assert_ne!(Value::Int(3), Value::Float(3.0));
    }

    #[test]
    fn test_display_renders_nested_values() {
        let value = Value::from(json!({"tags": ["a", 1, 2.5, null, true]}));
        assert_eq!(value.to_string(), r#"{"tags": ["a", 1, 2.5, nil, true]}"#);
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(
            Value::Function(Function::new(|_| Value::Nil)).to_string(),
            "<function>"
        );
    }

    #[test]
    fn test_from_json_number_split() {
        assert_eq!(Value::from(json!(42)), Value::Int(42));
        assert_eq!(Value::from(json!(3.14)), Value::Float(3.14));
        assert_eq!(Value::from(json!(u64::MAX)), Value::Float(u64::MAX as f64));
    }

    #[test]
    fn test_to_json_is_lossy_for_non_json_values() {
        let mut map = Map::new();
        map.insert(Key::Int(1), Value::Float(f64::NAN));
        map.insert(Key::from("f"), Value::Function(Function::new(|_| Value::Nil)));

        let json = serde_json::Value::from(Value::Map(map));
        assert_eq!(json, json!({"1": null, "f": null}));
    }

    #[test]
    fn test_key_order_is_bool_int_string() {
        let value: Value = vec![
            (Key::from("b"), Value::Nil),
            (Key::Int(2), Value::Nil),
            (Key::Bool(false), Value::Nil),
        ]
        .into_iter()
        .collect();
        let keys: Vec<&Key> = value.as_map().unwrap().keys().collect();
        assert_eq!(keys, vec![&Key::Bool(false), &Key::Int(2), &Key::from("b")]);
    }

    #[test]
    fn test_function_equality_is_identity() {
        let a = Function::new(|_| Value::Nil);
        let b = Function::new(|_| Value::Nil);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_get_on_non_map_is_none() {
        assert_eq!(Value::Int(1).get("a"), None);
        assert_eq!(Value::from(vec!["a"]).get("0"), None);
    }
}
