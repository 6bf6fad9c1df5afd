//! Logging scope stage.
//!
//! The outermost stage of every pipeline. It builds a request logger
//! from the exchange's routing metadata and installs it as the ambient
//! logger for everything downstream: later stages, the handler, and any
//! service code they call reach it through
//! [`current_logger`](meander_telemetry::current_logger).
//!
//! Because the scope is bound to the request's future, concurrent
//! requests each see their own logger, and a pipeline dispatched from
//! inside another request shadows the outer scope until it completes.

use crate::exchange::Exchange;
use crate::stage::{BoxFuture, Next, Stage, StageResult};
use meander_telemetry::{run_scoped, Logger};

/// Stage that opens the ambient logging scope for one request.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingStage;

impl LoggingStage {
    /// Creates the logging stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Stage for LoggingStage {
    fn name(&self) -> &'static str {
        "logging"
    }

    fn handle<'a>(&'a self, exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult> {
        Box::pin(async move {
            let logger = Logger::request(exchange.log_context());
            run_scoped(logger, next.run(exchange)).await
        })
    }
}
