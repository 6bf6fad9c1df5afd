//! Fault containment stage.
//!
//! The innermost stage, wrapped directly around the handler. Any fault
//! the handler raises instead of returning an envelope is normalized,
//! reported through the ambient logger, and converted into a failure
//! reply here, so faults do not travel past the pipeline boundary.
//!
//! Whatever the fault carried, the resulting envelope is the unhandled
//! failure definition. An escaped schema fault keeps the generic
//! validation text as its public message but is still coded as
//! unhandled; callers cannot tell what the handler tripped over.

use crate::exchange::Exchange;
use crate::stage::{BoxFuture, Next, Stage, StageResult};
use meander_core::{catalog, format_error, ErrorContext, Reply};
use meander_telemetry::report;

/// Stage that converts handler faults into failure replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainmentStage;

impl ContainmentStage {
    /// Creates the containment stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Stage for ContainmentStage {
    fn name(&self) -> &'static str {
        "containment"
    }

    fn handle<'a>(&'a self, exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult> {
        Box::pin(async move {
            // Snapshot the request slices before the exchange moves on;
            // they are the diagnostics if the handler faults.
            let context = ErrorContext {
                request_params: exchange.params().cloned(),
                request_query: exchange.query().cloned(),
                request_data: exchange.data().cloned(),
                ..ErrorContext::default()
            };

            match next.run(exchange).await {
                Ok(reply) => Ok(reply),
                Err(fault) => {
                    let details = format_error(fault, Some(&catalog::internal::UNHANDLED));
                    Ok(Reply::Failure(report::service_error(details, context)))
                }
            }
        })
    }
}
