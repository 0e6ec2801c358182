use std::sync::Arc;
use std::thread;

use serde_json::json;
use shapecheck_core::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn v(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn account_schema() -> Schema {
    object([
        ("user", object([("name", string()), ("age", integer())])),
        ("status", union([literal("active"), literal("inactive")])),
        ("tags", array(string())),
    ])
}

fn account(age: serde_json::Value, status: &str) -> Value {
    v(json!({
        "user": {"name": "Alice", "age": age},
        "status": status,
        "tags": ["admin", "ops"],
    }))
}

// ---------------------------------------------------------------------------
// Nested documents
// ---------------------------------------------------------------------------

#[test]
fn test_nested_document_validates() {
    let out = account_schema().validate(&account(json!(30), "active")).unwrap();

    let user = out.get("user").unwrap();
    assert_eq!(user.get("name"), Some(&Value::from("Alice")));
    assert_eq!(user.get("age"), Some(&Value::Int(30)));
    assert_eq!(out.get("status"), Some(&Value::from("active")));
    assert_eq!(
        out.get("tags").and_then(Value::as_array),
        Some(&[Value::from("admin"), Value::from("ops")][..])
    );
}

#[test]
fn test_nested_failure_reports_field_chain() {
    let err = account_schema()
        .validate(&account(json!(3.14), "active"))
        .unwrap_err();
    assert_eq!(
        err.path(),
        &[
            PathSegment::Field("user".into()),
            PathSegment::Field("age".into())
        ]
    );
    assert_eq!(err.to_string(), "field user.age: expected integer, got: 3.14");
}

#[test]
fn test_nested_union_of_literals() {
    let err = account_schema()
        .validate(&account(json!(30), "archived"))
        .unwrap_err();
    assert_eq!(err.path_string(), "status");
    let candidates = err.candidates();
    assert_eq!(candidates.len(), 2);
    assert!(matches!(
        candidates[0].error.kind(),
        ErrorKind::LiteralMismatch { .. }
    ));
    assert_eq!(
        err.to_string(),
        "field status: no union candidate matched: \
         [1] expected literal \"active\", got: \"archived\"; \
         [2] expected literal \"inactive\", got: \"archived\""
    );
}

#[test]
fn test_nested_missing_field_names_parent() {
    let input = v(json!({
        "user": {"name": "Alice"},
        "status": "active",
        "tags": [],
    }));
    let err = account_schema().validate(&input).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::MissingField("age".into()));
    assert_eq!(err.to_string(), "field user: missing required field: age");
}

#[test]
fn test_array_of_objects_reports_position_then_field() {
    let schema = array(object([("id", integer())]));
    let err = schema
        .validate(&v(json!([{"id": 1}, {"id": 2}, {"id": "3"}])))
        .unwrap_err();
    assert_eq!(err.path_string(), "[3].id");
    assert_eq!(err.to_string(), "at [3].id: expected integer, got: \"3\"");
}

#[test]
fn test_table_of_tuples() {
    let schema = table(Some(string()), Some(tuple([number(), number()])));
    let input = v(json!({"origin": [0, 0], "target": [1.5, -2]}));
    assert_eq!(schema.validate(&input), Ok(input.clone()));

    let err = schema
        .validate(&v(json!({"origin": [0, 0], "target": [1.5]})))
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::MissingTupleElement(2));
    assert_eq!(err.path_string(), "[\"target\"]");
}

#[test]
fn test_undeclared_fields_survive_nested_objects() {
    let input = v(json!({
        "user": {"name": "Alice", "age": 30, "email": "a@example.com"},
        "status": "active",
        "tags": [],
        "version": 2,
    }));
    let out = account_schema().validate(&input).unwrap();
    assert_eq!(out, input);
}

// ---------------------------------------------------------------------------
// Object and Optional interaction
// ---------------------------------------------------------------------------

#[test]
fn test_optional_field_semantics_are_strict_by_default() {
    let schema = object([("name", string()), ("bio", optional(string()))]);

    // Omitted key fails.
    let err = schema.validate(&v(json!({"name": "A"}))).unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::MissingField("bio".into()));

    // Present key holding nil passes.
    assert!(schema.is_valid(&v(json!({"name": "A", "bio": null}))));

    // Present key with the wrong kind fails through the inner schema.
    let err = schema.validate(&v(json!({"name": "A", "bio": 7}))).unwrap_err();
    assert_eq!(err.to_string(), "field bio: expected string, got: 7");
}

#[test]
fn test_optional_field_omission_opt_in_from_yaml() {
    let options = ValidateOptions::from_yaml_str("allow_omitted_optional: true").unwrap();
    let validator = Validator::new(object([("name", string()), ("bio", optional(string()))]))
        .with_options(options);

    let out = validator.validate(&v(json!({"name": "A"}))).unwrap();
    assert_eq!(out.get("bio"), None);
}

#[test]
fn test_nullable_via_union_accepts_explicit_nil() {
    let schema = object([("parent", union([null(), integer()]))]);
    assert!(schema.is_valid(&v(json!({"parent": null}))));
    assert!(schema.is_valid(&v(json!({"parent": 4}))));
    assert!(!schema.is_valid(&v(json!({}))));
}

// ---------------------------------------------------------------------------
// Functions and non-JSON values
// ---------------------------------------------------------------------------

#[test]
fn test_object_with_callback_field() {
    let schema = object([("on_event", function()), ("retries", integer())]);
    let callback = Function::new(|args| Value::Int(args.len() as i64));
    let input: Value = vec![
        ("on_event", Value::Function(callback.clone())),
        ("retries", Value::Int(3)),
    ]
    .into_iter()
    .collect();

    let out = schema.validate(&input).unwrap();
    let validated = out.get("on_event").and_then(Value::as_function).unwrap();
    assert!(validated.ptr_eq(&callback));
    assert_eq!(validated.call(&[Value::Nil]), Value::Int(1));
}

#[test]
fn test_table_with_integer_keys() {
    let schema = table(Some(integer()), Some(string()));
    let input: Value = vec![(Key::Int(1), "one"), (Key::Int(2), "two")]
        .into_iter()
        .collect();
    assert_eq!(schema.validate(&input), Ok(input.clone()));
}

#[test]
fn test_table_keys_restricted_by_literal_union() {
    let schema = table(Some(union([literal("read"), literal("write")])), Some(boolean()));
    assert!(schema.is_valid(&v(json!({"read": true, "write": false}))));

    let err = schema
        .validate(&v(json!({"read": true, "exec": true})))
        .unwrap_err();
    assert_eq!(err.path_string(), "[\"exec\"]");
    assert_eq!(err.candidates().len(), 2);
}

// ---------------------------------------------------------------------------
// Concurrency and determinism
// ---------------------------------------------------------------------------

#[test]
fn test_schema_shared_across_threads() {
    let schema = Arc::new(account_schema());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                let input = account(json!(20 + i), "inactive");
                schema.validate(&input).map(|_| ())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(()));
    }
}

#[test]
fn test_repeated_failures_are_identical() {
    let schema = account_schema();
    let bad = account(json!("old"), "active");
    let errors: Vec<_> = (0..3).map(|_| schema.validate(&bad).unwrap_err()).collect();
    assert!(errors.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_validate_json_passes_through_document() {
    let doc = json!({
        "user": {"name": "Alice", "age": 30},
        "status": "active",
        "tags": ["x"],
        "meta": {"source": "import"},
    });
    assert_eq!(account_schema().validate_json(&doc).unwrap(), doc);
}
