//! # Batch Dispatcher
//!
//! Runs a predicate's callback over every row of a batch. A failing row is
//! logged and dropped; it never fails the batch.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::observability::{log_event_with_fields, ComputeMetrics, Event};

use super::errors::{PredicateError, PredicateResult};
use super::predicate::{Callback, Row};
use super::registry::PredicateRegistry;

/// A batch of input rows for one predicate (`POST /compute` body)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationBatch {
    #[serde(rename = "predicateIRI", alias = "identifier")]
    pub identifier: String,

    #[serde(rename = "computationInput", alias = "inputRows")]
    pub input_rows: Vec<Row>,
}

impl ComputationBatch {
    pub fn new(identifier: impl Into<String>, input_rows: Vec<Row>) -> Self {
        Self {
            identifier: identifier.into(),
            input_rows,
        }
    }
}

/// A row whose callback failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFailure {
    /// Position of the row in the input batch
    pub index: usize,

    /// Failure detail
    pub message: String,
}

/// Outcome of a batch computation
///
/// `result` holds only successful rows, in input order. Once a row has
/// failed, `result[i]` no longer corresponds to input row `i`; `errors`
/// carries the input positions of the dropped rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputationResult {
    pub result: Vec<Row>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RowFailure>,
}

/// Dispatches batches to registered callbacks
#[derive(Clone)]
pub struct BatchDispatcher {
    registry: Arc<PredicateRegistry>,
    metrics: Arc<ComputeMetrics>,
}

impl BatchDispatcher {
    /// Create a dispatcher over a registry
    pub fn new(registry: Arc<PredicateRegistry>) -> Self {
        Self::with_metrics(registry, Arc::new(ComputeMetrics::new()))
    }

    /// Create a dispatcher sharing an existing metrics registry
    pub fn with_metrics(registry: Arc<PredicateRegistry>, metrics: Arc<ComputeMetrics>) -> Self {
        Self { registry, metrics }
    }

    pub fn registry(&self) -> &Arc<PredicateRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &Arc<ComputeMetrics> {
        &self.metrics
    }

    /// Compute a batch
    pub fn execute(&self, batch: &ComputationBatch) -> PredicateResult<ComputationResult> {
        self.compute(&batch.identifier, &batch.input_rows)
    }

    /// Compute `rows` against the predicate registered as `identifier`
    ///
    /// Fails only when the identifier is unknown; per-row failures end up in
    /// `ComputationResult::errors`.
    pub fn compute(&self, identifier: &str, rows: &[Row]) -> PredicateResult<ComputationResult> {
        let callback = match self.registry.resolve(identifier) {
            Ok(callback) => callback,
            Err(e) => {
                self.metrics.increment_batches_rejected();
                log_event_with_fields(
                    Event::BatchRejected,
                    &[("predicate", identifier), ("reason", &e.to_string())],
                );
                return Err(e);
            }
        };

        let batch_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let mut outcome = ComputationResult::default();

        for (index, row) in rows.iter().enumerate() {
            match invoke(&callback, row) {
                Ok(output) => outcome.result.push(output),
                Err(e) => {
                    let message = match e {
                        PredicateError::CallbackFailed(detail) => detail,
                        other => other.to_string(),
                    };
                    let row_json = serde_json::to_string(row).unwrap_or_default();
                    log_event_with_fields(
                        Event::RowComputeFailed,
                        &[
                            ("batch_id", &batch_id),
                            ("index", &index.to_string()),
                            ("predicate", identifier),
                            ("reason", &message),
                            ("row", &row_json),
                        ],
                    );
                    outcome.errors.push(RowFailure { index, message });
                }
            }
        }

        self.metrics.record_batch(outcome.result.len() as u64, outcome.errors.len() as u64);
        log_event_with_fields(
            Event::BatchComplete,
            &[
                ("batch_id", &batch_id),
                ("duration_ms", &started.elapsed().as_millis().to_string()),
                ("predicate", identifier),
                ("rows_failed", &outcome.errors.len().to_string()),
                ("rows_in", &rows.len().to_string()),
                ("rows_out", &outcome.result.len().to_string()),
            ],
        );

        Ok(outcome)
    }
}

thread_local! {
    /// Set while a callback runs on this thread
    static IN_CALLBACK: Cell<bool> = const { Cell::new(false) };
}

static PANIC_HOOK: Once = Once::new();

/// Silence the default panic report for callback panics
///
/// The panic is reported once as `ROW_COMPUTE_FAILED`. Panics anywhere else
/// still reach the previous hook.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !IN_CALLBACK.with(Cell::get) {
                previous(info);
            }
        }));
    });
}

/// Invoke a callback on one row, turning a panic into a row failure
fn invoke(callback: &Callback, row: &Row) -> PredicateResult<Row> {
    install_panic_hook();
    let outer = IN_CALLBACK.with(|flag| flag.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| callback(row)));
    IN_CALLBACK.with(|flag| flag.set(outer));

    match outcome {
        Ok(result) => result,
        Err(payload) => Err(PredicateError::CallbackFailed(format!(
            "callback panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn dispatcher() -> BatchDispatcher {
        let registry = Arc::new(PredicateRegistry::new());
        registry
            .register_compute("p1", "select ?a ?x ?y", "a", |r| {
                let x = r.get("x").and_then(Value::as_i64).unwrap_or(0);
                let y = r.get("y").and_then(Value::as_i64).unwrap_or(0);
                Ok(row(json!({"key": r["a"], "value": x + y})))
            })
            .unwrap();
        registry
            .register_compute("p2", "select ?x ?y", "x", |r| {
                let x = r.get("x").and_then(Value::as_i64).unwrap_or(0);
                let y = r.get("y").and_then(Value::as_i64).unwrap_or(0);
                if y == 0 {
                    return Err(PredicateError::callback("division by zero"));
                }
                Ok(row(json!({"key": x, "value": x / y})))
            })
            .unwrap();
        BatchDispatcher::new(registry)
    }

    #[test]
    fn test_all_rows_succeed() {
        let dispatcher = dispatcher();
        let rows = vec![
            row(json!({"a": 1, "x": 2, "y": 3})),
            row(json!({"a": 2, "x": 10, "y": -10})),
        ];

        let outcome = dispatcher.compute("p1", &rows).unwrap();

        assert!(outcome.errors.is_empty());
        assert_eq!(
            outcome.result,
            vec![row(json!({"key": 1, "value": 5})), row(json!({"key": 2, "value": 0}))]
        );
    }

    #[test]
    fn test_failing_row_is_dropped() {
        let dispatcher = dispatcher();
        let rows = vec![row(json!({"x": 1, "y": 0})), row(json!({"x": 4, "y": 2}))];

        let outcome = dispatcher.compute("p2", &rows).unwrap();

        assert_eq!(outcome.result, vec![row(json!({"key": 4, "value": 2}))]);
        assert_eq!(
            outcome.errors,
            vec![RowFailure { index: 0, message: "division by zero".into() }]
        );
    }

    #[test]
    fn test_relative_order_preserved() {
        let dispatcher = dispatcher();
        let rows = vec![
            row(json!({"x": 2, "y": 1})),
            row(json!({"x": 6, "y": 3})),
            row(json!({"x": 9, "y": 0})),
            row(json!({"x": 8, "y": 4})),
        ];

        let outcome = dispatcher.compute("p2", &rows).unwrap();

        let keys: Vec<_> = outcome.result.iter().map(|r| r["key"].clone()).collect();
        assert_eq!(keys, vec![json!(2), json!(6), json!(8)]);
        assert_eq!(outcome.errors[0].index, 2);
    }

    #[test]
    fn test_unknown_predicate() {
        let dispatcher = dispatcher();
        let err = dispatcher.compute("unknown", &[Row::new()]).err().unwrap();

        assert!(matches!(err, PredicateError::NotFound(_)));
        assert_eq!(dispatcher.metrics().snapshot().batches_rejected, 1);
    }

    #[test]
    fn test_panicking_callback_is_contained() {
        let registry = Arc::new(PredicateRegistry::new());
        registry
            .register_compute("boom", "q", "s", |r| {
                if r.contains_key("explode") {
                    panic!("kaboom");
                }
                Ok(r.clone())
            })
            .unwrap();
        let dispatcher = BatchDispatcher::new(registry);

        let rows = vec![row(json!({"explode": true})), row(json!({"ok": 1}))];
        let outcome = dispatcher.compute("boom", &rows).unwrap();

        assert_eq!(outcome.result, vec![row(json!({"ok": 1}))]);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].message.contains("kaboom"));
    }

    #[test]
    fn test_callback_flag_cleared_after_panic() {
        let callback: Callback = Arc::new(|_row: &Row| -> PredicateResult<Row> {
            assert!(IN_CALLBACK.with(Cell::get));
            panic!("inside callback")
        });

        let err = invoke(&callback, &Row::new()).err().unwrap();

        assert!(matches!(err, PredicateError::CallbackFailed(m) if m.contains("inside callback")));
        assert!(!IN_CALLBACK.with(Cell::get));
    }

    #[test]
    fn test_empty_batch() {
        let outcome = dispatcher().compute("p1", &[]).unwrap();
        assert!(outcome.result.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_metrics_recorded() {
        let dispatcher = dispatcher();
        let rows = vec![row(json!({"x": 1, "y": 0})), row(json!({"x": 4, "y": 2}))];
        dispatcher.compute("p2", &rows).unwrap();

        let snapshot = dispatcher.metrics().snapshot();
        assert_eq!(snapshot.batches_computed, 1);
        assert_eq!(snapshot.rows_computed, 1);
        assert_eq!(snapshot.rows_failed, 1);
    }

    #[test]
    fn test_batch_wire_format() {
        let batch: ComputationBatch = serde_json::from_value(json!({
            "predicateIRI": "p1",
            "computationInput": [{"a": 1, "x": 2, "y": 3}]
        }))
        .unwrap();
        assert_eq!(batch.identifier, "p1");

        let outcome = dispatcher().execute(&batch).unwrap();
        let wire = serde_json::to_value(&outcome).unwrap();
        assert_eq!(wire, json!({"result": [{"key": 1, "value": 5}]}));
    }
}
