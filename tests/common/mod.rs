#![allow(dead_code)]

use serde_json::{Value, json};

use nowcast::checklist::Checklist;
use nowcast::next_workers::registry::NEMO_RUN_TYPES;

pub use nowcast_test_utils::{init_tracing, with_timeout};

/// Payload with one entry keyed by `key`, carrying every field a decision
/// may read from it.
pub fn run_payload(key: &str) -> Value {
    let mut payload = serde_json::Map::new();
    payload.insert(
        key.to_string(),
        json!({"host": "west.cloud", "run date": "2018-01-20", "run id": "20jan18hindcast"}),
    );
    Value::Object(payload)
}

/// Checklist as it stands late in a day: every run has recorded its date.
pub fn full_day_checklist() -> Checklist {
    let mut checklist = Checklist::new();
    for run_type in NEMO_RUN_TYPES {
        checklist.update("NEMO run", run_payload(run_type));
    }
    checklist.update("NEMO run", json!({"hindcast": {"run id": "11mar18hindcast"}}));
    for run_type in ["nowcast", "forecast"] {
        checklist.update("FVCOM run", run_payload(run_type));
    }
    for run_type in ["forecast", "forecast2"] {
        checklist.update("WWATCH3 run", run_payload(run_type));
    }
    checklist
}
