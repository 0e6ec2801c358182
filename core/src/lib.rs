//! Runtime schema combinators for untyped data.
//!
//! This crate validates dynamically-shaped values against declarative
//! schemas built from a small set of combinators:
//!
//! - Primitives: [`integer`], [`number`], [`string`], [`boolean`],
//!   [`null`], [`function`], [`any`], [`unknown`].
//! - Composites: [`object`], [`array`], [`tuple`], [`union`],
//!   [`optional`], [`table`] (a keyed map), [`literal`].
//!
//! A [`Schema`] is built once and then validates any number of [`Value`]s.
//! [`Schema::validate`] returns the validated value, with fresh containers
//! and undeclared object fields passed through, or a [`ValidationError`]
//! naming the failing field, position or union candidate.
//!
//! Validation is tuned with [`ValidateOptions`] (nesting limit, whether
//! optional object fields may be omitted), which can be loaded from YAML.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use shapecheck_core::*;
//!
//! let schema = object([
//!     ("user", object([("name", string()), ("age", integer())])),
//!     ("status", union([literal("active"), literal("inactive")])),
//!     ("tags", array(string())),
//! ]);
//!
//! let input = Value::from(json!({
//!     "user": {"name": "Alice", "age": 30},
//!     "status": "active",
//!     "tags": ["admin"],
//! }));
//! let out = schema.validate(&input).unwrap();
//! assert_eq!(out.get("status"), Some(&Value::from("active")));
//!
//! let bad = Value::from(json!({
//!     "user": {"name": "Alice", "age": 3.14},
//!     "status": "active",
//!     "tags": [],
//! }));
//! let err = schema.validate(&bad).unwrap_err();
//! assert_eq!(err.to_string(), "field user.age: expected integer, got: 3.14");
//! ```

mod config;
mod error;
mod schema;
mod validate;
mod value;

pub use config::{ConfigError, DEFAULT_MAX_DEPTH, ValidateOptions};
pub use error::{CandidateFailure, ErrorKind, PathSegment, ValidationError};
pub use schema::{
    Primitive, Schema, any, array, boolean, function, integer, keyed_map, literal, null, number,
    object, optional, string, table, tuple, union, unknown,
};
pub use validate::Validator;
pub use value::{Function, Key, Map, Value, ValueKind};
