//! End-to-end tests through the loose `apply_operation` surface.

use serde_json::{Map, Value as JsonValue, json};

use tabclean::{CleaningEngine, CleaningSession, Dataset, ErrorKind, OperationRequest, Value};

/// Build a dataset from string rows, inferring cell types.
fn make_table(headers: &[&str], rows: &[&[&str]]) -> Dataset {
    Dataset::from_text_rows(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
    .expect("Failed to build dataset")
}

fn params(value: JsonValue) -> Map<String, JsonValue> {
    value.as_object().cloned().expect("params must be an object")
}

fn numbers(ds: &Dataset, column: &str) -> Vec<Option<f64>> {
    ds.column(column)
        .expect("column exists")
        .iter()
        .map(Value::as_f64)
        .collect()
}

// =============================================================================
// Outliers
// =============================================================================

#[test]
fn test_iqr_cap_on_reference_column() {
    let ds = make_table(&["x"], &[&["1"], &["2"], &["3"], &["4"], &["5"], &["100"]]);
    let outcome = CleaningEngine::new().apply_operation(
        ds,
        Some("x"),
        "outliers",
        &params(json!({"method": "iqr", "action": "cap", "threshold": 1.5})),
    );

    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(outcome.stats.count("outliers_found"), Some(1));
    assert_eq!(outcome.stats.affected_rows, vec![5]);
    assert_eq!(
        numbers(&outcome.dataset, "x"),
        vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(8.5)]
    );
}

#[test]
fn test_constant_column_outliers_and_normalize() {
    let engine = CleaningEngine::new();
    let ds = make_table(&["x"], &[&["5"], &["5"], &["5"]]);

    let outcome = engine.apply_operation(
        ds,
        Some("x"),
        "outliers",
        &params(json!({"method": "zscore", "action": "remove"})),
    );
    assert!(outcome.success);
    assert_eq!(outcome.stats.count("outliers_found"), Some(0));

    let outcome = engine.apply_operation(
        outcome.dataset,
        Some("x"),
        "normalize",
        &params(json!({"method": "min-max"})),
    );
    assert!(outcome.success);
    assert!(
        numbers(&outcome.dataset, "x")
            .into_iter()
            .all(|v| v.is_some_and(f64::is_finite))
    );
}

// =============================================================================
// Type conversion
// =============================================================================

#[test]
fn test_strict_integer_conversion_fails_at_row_two() {
    let ds = Dataset::from_columns(vec![(
        "x",
        vec![Value::from("1"), Value::from("2"), Value::from("x")],
    )])
    .expect("valid dataset");
    let before = ds.clone();

    let outcome = CleaningEngine::new().apply_operation(
        ds,
        Some("x"),
        "data-type",
        &params(json!({"target_type": "integer", "on_error": "strict"})),
    );

    assert!(!outcome.success);
    assert_eq!(outcome.error_kind, Some(ErrorKind::ConversionError));
    let error = outcome.error.expect("error message");
    assert!(error.contains("row 2"), "{}", error);
    assert_eq!(outcome.dataset, before);
}

#[test]
fn test_numeric_string_float_roundtrip() {
    let engine = CleaningEngine::new();
    let ds = make_table(&["x"], &[&["1.5"], &["-2"], &["1e3"], &[""]]);
    let before = numbers(&ds, "x");

    let outcome = engine.apply_operation(ds, Some("x"), "data-type", &params(json!({"target_type": "string"})));
    assert!(outcome.success);
    assert!(matches!(outcome.dataset.get(0, "x"), Some(Value::Text(_))));

    let outcome = engine.apply_operation(
        outcome.dataset,
        Some("x"),
        "data-type",
        &params(json!({"target_type": "float", "on_error": "coerce"})),
    );
    assert!(outcome.success);
    assert_eq!(numbers(&outcome.dataset, "x"), before);
    assert_eq!(outcome.stats.count("values_coerced_to_missing"), Some(0));
}

// =============================================================================
// Text cleaning
// =============================================================================

#[test]
fn test_text_pipeline_order() {
    let engine = CleaningEngine::new();
    let input = || Dataset::from_columns(vec![("t", vec![Value::from("  HELLO World  ")])]).expect("valid");

    let a = engine.apply_operation(input(), Some("t"), "text-cleaning", &params(json!({"actions": ["trim", "lowercase"]})));
    let b = engine.apply_operation(input(), Some("t"), "text-cleaning", &params(json!({"actions": ["lowercase", "trim"]})));
    assert_eq!(a.dataset.get(0, "t"), Some(&Value::from("hello world")));
    assert_eq!(b.dataset.get(0, "t"), Some(&Value::from("hello world")));

    let before = engine.apply_operation(
        input(),
        Some("t"),
        "text-cleaning",
        &params(json!({"actions": ["replace:HELLO=>bye", "lowercase", "trim"]})),
    );
    let after = engine.apply_operation(
        input(),
        Some("t"),
        "text-cleaning",
        &params(json!({"actions": ["lowercase", "trim"], "replacements": [["HELLO", "bye"]]})),
    );
    assert_eq!(before.dataset.get(0, "t"), Some(&Value::from("bye world")));
    assert_eq!(after.dataset.get(0, "t"), Some(&Value::from("hello world")));
}

#[test]
fn test_empty_text_pipeline_is_rejected() {
    let ds = make_table(&["t"], &[&["a"]]);
    let outcome = CleaningEngine::new().apply_operation(ds, Some("t"), "text-cleaning", &Map::new());
    assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidParameter));
}

// =============================================================================
// Missing values and duplicates
// =============================================================================

#[test]
fn test_fill_mode_uses_first_seen_on_ties() {
    let ds = make_table(&["x"], &[&["1"], &["1"], &["2"], &[""]]);
    let outcome = CleaningEngine::new().apply_operation(
        ds,
        Some("x"),
        "missing-values",
        &params(json!({"action": "fill-mode"})),
    );
    assert!(outcome.success);
    assert_eq!(
        numbers(&outcome.dataset, "x"),
        vec![Some(1.0), Some(1.0), Some(2.0), Some(1.0)]
    );
}

#[test]
fn test_fill_mean_on_text_is_type_mismatch() {
    let ds = make_table(&["name"], &[&["a"], &[""]]);
    let outcome = CleaningEngine::new().apply_operation(ds, Some("name"), "missing-values", &Map::new());
    assert_eq!(outcome.error_kind, Some(ErrorKind::TypeMismatch));
}

#[test]
fn test_dedup_remove_is_idempotent() {
    let engine = CleaningEngine::new();
    let ds = make_table(
        &["a", "b"],
        &[&["1", "x"], &["1", "x"], &["2", "y"], &["1", "x"], &["2", "z"]],
    );
    let first = engine.apply_operation(ds, None, "duplicates", &params(json!({"action": "remove-all"})));
    assert_eq!(first.stats.count("duplicates_removed"), Some(2));
    let once = first.dataset.clone();

    let second = engine.apply_operation(first.dataset, None, "duplicates", &Map::new());
    assert_eq!(second.stats.count("duplicates_removed"), Some(0));
    assert_eq!(second.dataset, once);
}

// =============================================================================
// Sessions
// =============================================================================

#[test]
fn test_session_applies_loose_requests() {
    let engine = CleaningEngine::new();
    let ds = make_table(&["x", "y"], &[&["1", "a"], &["", "b"], &["1", "a"]]);
    let mut session = CleaningSession::new(ds);

    let request = OperationRequest::from_loose(Some("x"), "missing-values", &params(json!({"action": "drop"})), engine.config())
        .expect("valid request");
    session.apply(&request).expect("drop succeeds");

    let request = OperationRequest::from_loose(None, "duplicates", &Map::new(), engine.config()).expect("valid request");
    let entry = session.apply(&request).expect("dedup succeeds");
    assert_eq!(entry.sequence, 2);

    assert_eq!(session.current().row_count(), 1);
    session.reset();
    assert_eq!(session.current().row_count(), 3);
}
