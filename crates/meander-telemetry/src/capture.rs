//! In-memory record capture for tests.
//!
//! A [`MemorySink`] receives a copy of every record any [`Logger`]
//! emits while the sink is alive. Tests install one, drive the code
//! under test, then assert on the captured records. Filtering by
//! correlation ID keeps parallel tests from observing each other.
//!
//! [`Logger`]: crate::Logger

use crate::logger::Severity;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Weak};

static ACTIVE: RwLock<Vec<Weak<MemorySink>>> = RwLock::new(Vec::new());

/// Hands an emitted record to every live sink. Called by the logger
/// after floor filtering, so sinks see exactly what was emitted.
pub(crate) fn push(severity: Severity, bindings: &Map<String, Value>, record: &Map<String, Value>) {
    let sinks = ACTIVE.read();
    if sinks.is_empty() {
        return;
    }
    for weak in sinks.iter() {
        if let Some(sink) = weak.upgrade() {
            sink.records.lock().push(CapturedRecord {
                severity,
                bindings: bindings.clone(),
                record: record.clone(),
            });
        }
    }
}

/// One emitted record together with the bindings active at emission.
#[derive(Debug, Clone, Serialize)]
pub struct CapturedRecord {
    /// Severity the record was emitted at.
    pub severity: Severity,
    /// Binding snapshot, including the `context` object.
    pub bindings: Map<String, Value>,
    /// The record fields themselves.
    pub record: Map<String, Value>,
}

impl CapturedRecord {
    /// Returns a record field by key.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    /// Returns a field of the bound `context` object by key.
    #[must_use]
    pub fn context_field(&self, key: &str) -> Option<&Value> {
        self.bindings.get("context")?.get(key)
    }

    /// Returns the bound correlation ID as a string.
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.context_field("correlation_id")?.as_str()
    }
}

/// Collects emitted records for assertion.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<CapturedRecord>>,
}

impl MemorySink {
    /// Creates a sink and registers it to receive all emitted records.
    ///
    /// Registration lasts as long as the returned `Arc` does; dropping
    /// it detaches the sink.
    #[must_use]
    pub fn install() -> Arc<Self> {
        let sink = Arc::new(Self::default());
        let mut sinks = ACTIVE.write();
        sinks.retain(|weak| weak.strong_count() > 0);
        sinks.push(Arc::downgrade(&sink));
        sink
    }

    /// Returns all captured records.
    #[must_use]
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records.lock().clone()
    }

    /// Returns the records bound to one correlation ID.
    #[must_use]
    pub fn records_for(&self, correlation_id: &str) -> Vec<CapturedRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.correlation_id() == Some(correlation_id))
            .cloned()
            .collect()
    }

    /// Returns the error-severity records bound to one correlation ID.
    #[must_use]
    pub fn errors_for(&self, correlation_id: &str) -> Vec<CapturedRecord> {
        self.records_for(correlation_id)
            .into_iter()
            .filter(|r| r.severity == Severity::Error)
            .collect()
    }

    /// Number of captured records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Discards all captured records.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}
