//! Request-scoped structured logger.
//!
//! A [`Logger`] owns the binding set for one request: a `context` object
//! (correlation id, operation, user id, ...) plus any sibling top-level
//! bindings. Records are emitted as single JSON payloads through
//! [`tracing`], enriched with the bindings active at emission time.
//!
//! Clones share the binding set. The logging stage hands the same logger
//! to every stage of a request, so a context merge made by one stage is
//! visible in every later record.

use crate::{capture, config};
use meander_core::{CorrelationId, ErrorDetails, LogContext};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Record severities, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Developer-facing noise, suppressed outside development.
    Debug,
    /// Informational events.
    Info,
    /// Unexpected but recoverable conditions.
    Warn,
    /// Failures. Never suppressed by the severity floor.
    Error,
}

impl Severity {
    /// Returns the lowercase name used for filter configuration.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = crate::TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(crate::TelemetryError::InvalidConfig(format!(
                "unknown severity '{other}'"
            ))),
        }
    }
}

/// A structured logger bound to one request.
///
/// # Example
///
/// ```
/// use meander_core::LogContext;
/// use meander_telemetry::Logger;
///
/// let logger = Logger::request(LogContext::for_action());
/// logger.set_context(LogContext::operation("sync_notes"));
/// logger.info("sync_started", serde_json::json!({ "batch": 4 }), None);
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    bindings: RwLock<Map<String, Value>>,
    floor: Severity,
}

impl Logger {
    /// Creates a logger with the given initial context as its `context`
    /// binding.
    ///
    /// The severity floor is taken from the process-wide telemetry
    /// configuration.
    #[must_use]
    pub fn new(context: LogContext) -> Self {
        let mut bindings = Map::new();
        bindings.insert(
            "context".to_owned(),
            serde_json::to_value(&context).unwrap_or(Value::Object(Map::new())),
        );
        Self {
            inner: Arc::new(LoggerInner {
                bindings: RwLock::new(bindings),
                floor: config::severity_floor(),
            }),
        }
    }

    /// Creates a request logger, assigning a fresh correlation ID when the
    /// context does not already carry one.
    #[must_use]
    pub fn request(mut context: LogContext) -> Self {
        if context.correlation_id.is_none() {
            context.correlation_id = Some(CorrelationId::new());
        }
        Self::new(context)
    }

    /// Returns a logger with the same bindings and an explicit severity
    /// floor, ignoring the process-wide configuration.
    #[must_use]
    pub fn with_severity_floor(self, floor: Severity) -> Self {
        let bindings = self.inner.bindings.read().clone();
        Self {
            inner: Arc::new(LoggerInner {
                bindings: RwLock::new(bindings),
                floor,
            }),
        }
    }

    /// Merges partial context into the `context` binding, key-wise.
    ///
    /// Only fields present on `partial` overwrite; everything else in the
    /// current context survives.
    pub fn set_context(&self, partial: LogContext) {
        let Ok(Value::Object(incoming)) = serde_json::to_value(&partial) else {
            return;
        };
        let mut bindings = self.inner.bindings.write();
        let merged = match bindings.remove("context") {
            Some(Value::Object(mut existing)) => {
                existing.extend(incoming);
                Value::Object(existing)
            }
            _ => Value::Object(incoming),
        };
        bindings.insert("context".to_owned(), merged);
    }

    /// Merges partial bindings into the full binding set.
    ///
    /// Top-level keys merge key-wise; a supplied `context` key merges into
    /// the existing context one level deep instead of replacing it.
    pub fn set_bindings(&self, partial: Map<String, Value>) {
        let mut bindings = self.inner.bindings.write();
        for (key, value) in partial {
            if key == "context" {
                let merged = match (bindings.remove("context"), value) {
                    (Some(Value::Object(mut existing)), Value::Object(incoming)) => {
                        existing.extend(incoming);
                        Value::Object(existing)
                    }
                    (_, incoming) => incoming,
                };
                bindings.insert(key, merged);
            } else {
                bindings.insert(key, value);
            }
        }
    }

    /// Emits an informational record: `{ event, ...data, details? }`.
    ///
    /// Object `data` spreads into the record; any other non-null value
    /// lands under a `data` key. Suppressed below the severity floor.
    pub fn info(&self, event: &str, data: Value, details: Option<Value>) {
        let mut record = Map::new();
        record.insert("event".to_owned(), Value::String(event.to_owned()));
        match data {
            Value::Object(fields) => record.extend(fields),
            Value::Null => {}
            other => {
                record.insert("data".to_owned(), other);
            }
        }
        if let Some(details) = details {
            record.insert("details".to_owned(), details);
        }
        self.emit(Severity::Info, record);
    }

    /// Emits an error record:
    /// `{ message, status, error: { name, message, code, stack? }, details? }`.
    ///
    /// The embedded `error.message` is the internal diagnostic message,
    /// not the public one. Error records bypass the severity floor.
    pub fn error(&self, message: &str, error: &ErrorDetails, details: Option<Value>) {
        let mut error_field = Map::new();
        error_field.insert(
            "name".to_owned(),
            Value::String(error.family.wire_name().to_owned()),
        );
        error_field.insert("message".to_owned(), error.message.clone());
        error_field.insert("code".to_owned(), Value::String(error.code.to_owned()));
        if let Some(stack) = &error.stack {
            error_field.insert("stack".to_owned(), Value::String(stack.clone()));
        }

        let mut record = Map::new();
        record.insert("message".to_owned(), Value::String(message.to_owned()));
        record.insert("status".to_owned(), Value::from(error.status));
        record.insert("error".to_owned(), Value::Object(error_field));
        if let Some(details) = details {
            record.insert("details".to_owned(), details);
        }
        self.emit(Severity::Error, record);
    }

    /// Returns a snapshot of the current binding set.
    #[must_use]
    pub fn bindings(&self) -> Map<String, Value> {
        self.inner.bindings.read().clone()
    }

    /// Returns the correlation ID bound in the context, when present.
    #[must_use]
    pub fn correlation_id(&self) -> Option<CorrelationId> {
        let bindings = self.inner.bindings.read();
        let id = bindings.get("context")?.get("correlation_id")?;
        serde_json::from_value(id.clone()).ok()
    }

    /// Returns this logger's severity floor.
    #[must_use]
    pub fn severity_floor(&self) -> Severity {
        self.inner.floor
    }

    fn emit(&self, severity: Severity, record: Map<String, Value>) {
        if severity != Severity::Error && severity < self.inner.floor {
            return;
        }
        let bindings = self.inner.bindings.read().clone();
        capture::push(severity, &bindings, &record);

        let mut full = bindings;
        full.extend(record);
        let payload = Value::Object(full).to_string();
        match severity {
            Severity::Debug => tracing::debug!(target: "meander", record = %payload),
            Severity::Info => tracing::info!(target: "meander", record = %payload),
            Severity::Warn => tracing::warn!(target: "meander", record = %payload),
            Severity::Error => tracing::error!(target: "meander", record = %payload),
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("bindings", &*self.inner.bindings.read())
            .field("floor", &self.inner.floor)
            .finish()
    }
}
