//! Authentication stage.
//!
//! Resolves the caller's session through a [`SessionResolver`] and makes
//! the authenticated user available to the rest of the request: the user
//! ID is merged into the ambient log context, and the user itself is
//! stored on the exchange as a [`CurrentUser`] slot.
//!
//! A request without a session short-circuits with the unauthenticated
//! envelope. A resolver failure short-circuits with the generic
//! unexpected envelope; the resolver's diagnostic text goes to the log,
//! not to the caller.

use crate::exchange::Exchange;
use crate::stage::{BoxFuture, Next, Stage, StageResult};
use meander_core::{catalog, format_error, AuthenticatedUser, ErrorContext, Fault, LogContext, Reply, Session};
use meander_telemetry::{current_logger, report};

/// Resolves the session behind a request, if any.
///
/// Implementations look wherever their platform keeps sessions: a cookie
/// store, a token introspection endpoint, a header forwarded by an edge
/// proxy. `Ok(None)` means the request is anonymous; `Err` means the
/// lookup itself failed.
pub trait SessionResolver: Send + Sync + 'static {
    /// Resolves the session for the exchange.
    fn resolve<'a>(
        &'a self,
        exchange: &'a Exchange,
    ) -> BoxFuture<'a, Result<Option<Session>, Fault>>;
}

/// The authenticated user, stored on the exchange by [`AuthStage`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

/// Stage that requires an authenticated session.
pub struct AuthStage<R> {
    resolver: R,
}

impl<R: SessionResolver> AuthStage<R> {
    /// Creates an auth stage backed by the given resolver.
    pub const fn new(resolver: R) -> Self {
        Self { resolver }
    }
}

impl<R: SessionResolver> Stage for AuthStage<R> {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn handle<'a>(&'a self, mut exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult> {
        Box::pin(async move {
            match self.resolver.resolve(&exchange).await {
                Ok(Some(session)) => {
                    current_logger().set_context(LogContext::user(session.user.id.clone()));
                    exchange.set_slot(CurrentUser(session.user));
                    next.run(exchange).await
                }
                Ok(None) => {
                    let details = format_error(
                        Fault::text("session resolver returned no session"),
                        Some(&catalog::auth::UNAUTHENTICATED),
                    );
                    Ok(Reply::Failure(report::service_error(details, ErrorContext::new())))
                }
                Err(fault) => {
                    let details = format_error(fault, Some(&catalog::internal::UNEXPECTED));
                    Ok(Reply::Failure(report::service_error(details, ErrorContext::new())))
                }
            }
        })
    }
}
