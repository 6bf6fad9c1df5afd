//! Ambient logger propagation across await points.
//!
//! The active [`Logger`] rides a task-local cell. [`run_scoped`] installs
//! a logger for the duration of one future; [`current_logger`] reads it
//! from anywhere underneath without threading it through arguments.
//! Scopes nest: an inner [`run_scoped`] shadows the outer logger until
//! its future completes.

use crate::logger::Logger;
use std::future::Future;

tokio::task_local! {
    static ACTIVE_LOGGER: Logger;
}

/// Runs `future` with `logger` installed as the ambient logger.
///
/// Every [`current_logger`] call made while `future` is polled, at any
/// depth, observes this logger. Concurrent tasks are isolated: each sees
/// only the logger its own scope installed.
pub async fn run_scoped<F>(logger: Logger, future: F) -> F::Output
where
    F: Future,
{
    ACTIVE_LOGGER.scope(logger, future).await
}

/// Returns the ambient logger, or `None` outside any scope.
#[must_use]
pub fn try_current_logger() -> Option<Logger> {
    ACTIVE_LOGGER.try_with(Logger::clone).ok()
}

/// Returns the ambient logger.
///
/// # Panics
///
/// Panics when called outside a [`run_scoped`] scope. A missing scope is
/// a wiring bug in the caller, not a request failure, so it aborts the
/// task instead of surfacing as an error reply.
#[must_use]
pub fn current_logger() -> Logger {
    try_current_logger().unwrap_or_else(|| {
        panic!(
            "logger not available in the current context; \
             make sure the call runs within a request scope installed by the logging stage"
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use meander_core::LogContext;

    fn request_logger() -> Logger {
        Logger::request(LogContext::new())
    }

    #[tokio::test]
    async fn test_current_logger_inside_scope() {
        let logger = request_logger();
        let expected = logger.correlation_id();

        let observed = run_scoped(logger, async { current_logger().correlation_id() }).await;

        assert_eq!(observed, expected);
    }

    #[tokio::test]
    async fn test_nested_scope_shadows_then_reverts() {
        let outer = request_logger();
        let inner = request_logger();
        let outer_id = outer.correlation_id();
        let inner_id = inner.correlation_id();
        assert_ne!(outer_id, inner_id);

        let (shadowed, restored) = run_scoped(outer, async {
            let shadowed =
                run_scoped(inner, async { current_logger().correlation_id() }).await;
            (shadowed, current_logger().correlation_id())
        })
        .await;

        assert_eq!(shadowed, inner_id);
        assert_eq!(restored, outer_id);
    }

    #[tokio::test]
    async fn test_concurrent_scopes_stay_isolated() {
        let a = request_logger();
        let b = request_logger();
        let a_id = a.correlation_id();
        let b_id = b.correlation_id();

        let observe = |logger: Logger| {
            run_scoped(logger, async {
                tokio::task::yield_now().await;
                let id = current_logger().correlation_id();
                tokio::task::yield_now().await;
                id
            })
        };

        let (seen_a, seen_b) = tokio::join!(observe(a), observe(b));

        assert_eq!(seen_a, a_id);
        assert_eq!(seen_b, b_id);
    }

    #[test]
    fn test_try_current_logger_outside_scope() {
        assert!(try_current_logger().is_none());
    }

    #[test]
    #[should_panic(expected = "logger not available")]
    fn test_current_logger_panics_outside_scope() {
        let _ = current_logger();
    }

    #[test]
    fn test_scope_works_on_block_on_runtime() {
        let logger = request_logger();
        let expected = logger.correlation_id();

        let observed = tokio_test::block_on(run_scoped(logger, async {
            current_logger().correlation_id()
        }));

        assert_eq!(observed, expected);
    }
}
