//! Route ID canonicalization stage.
//!
//! Resource routes accept UUIDs in any textual form a client might send:
//! hyphenated, bare hex, braced, or URN, in either case. This stage
//! rewrites the route ID parameter to the canonical lowercase hyphenated
//! form before the handler sees it, so lookups and comparisons work on
//! one spelling.
//!
//! A missing or malformed ID short-circuits with the not-found envelope.
//! To a caller, a route ID that cannot name a resource looks exactly
//! like a resource that does not exist.

use crate::exchange::Exchange;
use crate::stage::{BoxFuture, Next, Stage, StageResult};
use meander_core::{catalog, format_error, ErrorContext, Fault, Reply};
use meander_telemetry::report;
use serde_json::Value;
use uuid::Uuid;

/// Stage that rewrites a route ID parameter to canonical UUID form.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalIdStage {
    key: &'static str,
}

impl CanonicalIdStage {
    /// Creates a stage canonicalizing the `id` route parameter.
    #[must_use]
    pub const fn new() -> Self {
        Self { key: "id" }
    }

    /// Creates a stage canonicalizing a differently named parameter.
    #[must_use]
    pub const fn for_key(key: &'static str) -> Self {
        Self { key }
    }
}

impl Default for CanonicalIdStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for CanonicalIdStage {
    fn name(&self) -> &'static str {
        "canonical_id"
    }

    fn handle<'a>(&'a self, mut exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult> {
        Box::pin(async move {
            let raw = exchange
                .params()
                .and_then(|params| params.get(self.key))
                .and_then(Value::as_str);

            let parsed = raw.map(Uuid::parse_str);
            match parsed {
                Some(Ok(uuid)) => {
                    exchange.set_param(self.key, Value::String(uuid.as_hyphenated().to_string()));
                    next.run(exchange).await
                }
                _ => {
                    let message = match raw {
                        Some(value) => {
                            format!("route parameter '{}' is not a UUID: '{value}'", self.key)
                        }
                        None => format!("route parameter '{}' is missing", self.key),
                    };
                    let details =
                        format_error(Fault::text(message), Some(&catalog::resource::NOT_FOUND));
                    let context = ErrorContext {
                        params: exchange.params().cloned(),
                        ..ErrorContext::default()
                    };
                    Ok(Reply::Failure(report::service_error(details, context)))
                }
            }
        })
    }
}
