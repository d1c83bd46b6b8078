//! Fuzz target for loose parameter parsing.
//!
//! Feeds arbitrary JSON objects to the request parser. Parsing may reject the
//! input but must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value as JsonValue};
use tabclean::{EngineConfig, OperationKind, OperationRequest};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }
    let Ok(params) = serde_json::from_slice::<Map<String, JsonValue>>(data) else {
        return;
    };

    let defaults = EngineConfig::default();
    for kind in OperationKind::ALL {
        let _ = OperationRequest::from_loose(Some("column"), kind.name(), &params, &defaults);
    }
});
