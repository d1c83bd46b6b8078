//! Fuzz target for the cleaning handlers.
//!
//! Builds a small table from arbitrary cells and runs every operation over
//! it. A handler must never panic, and a failed operation must hand back the
//! dataset unchanged.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value as JsonValue};
use tabclean::{CleaningEngine, Dataset, OperationKind};

#[derive(Debug, Arbitrary)]
struct Input {
    rows: Vec<(String, String)>,
    operation: u8,
    params: Vec<(String, String)>,
}

fuzz_target!(|input: Input| {
    if input.rows.len() > 500 {
        return;
    }

    let rows = input.rows.into_iter().map(|(a, b)| vec![a, b]).collect();
    let Ok(dataset) = Dataset::from_text_rows(vec!["a".to_string(), "b".to_string()], rows) else {
        return;
    };

    let kind = OperationKind::ALL[input.operation as usize % OperationKind::ALL.len()];
    let params: Map<String, JsonValue> = input
        .params
        .into_iter()
        .map(|(k, v)| (k, JsonValue::String(v)))
        .collect();

    let outcome = CleaningEngine::new().apply_operation(dataset.clone(), Some("a"), kind.name(), &params);
    if !outcome.success {
        assert_eq!(outcome.dataset.to_text_rows(), dataset.to_text_rows());
    }
});
