//! Core stage trait and chain types.
//!
//! This module defines the [`Stage`] trait that all pipeline stages
//! implement. A stage receives the exchange and a [`Next`] continuation;
//! it either forwards the exchange by calling `next.run()` or
//! short-circuits by returning a reply itself.
//!
//! # Design Philosophy
//!
//! The pipeline composes stages around a terminal [`ServiceHandler`] in a
//! fixed shape: logging outermost, then the caller's stages in
//! registration order, then fault containment, then the handler. Stages
//! cannot reorder or remove the fixed wrapping.
//!
//! # Example
//!
//! ```
//! use meander_pipeline::{BoxFuture, Exchange, Next, Stage, StageResult};
//!
//! struct TagStage;
//!
//! impl Stage for TagStage {
//!     fn name(&self) -> &'static str {
//!         "tag"
//!     }
//!
//!     fn handle<'a>(&'a self, mut exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult> {
//!         Box::pin(async move {
//!             exchange.set_slot("tagged");
//!             next.run(exchange).await
//!         })
//!     }
//! }
//! ```

use crate::exchange::Exchange;
use meander_core::{Fault, Reply};
use std::future::Future;
use std::pin::Pin;

/// A boxed future, the return type of stage and handler calls.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a stage or handler produces: a reply envelope, or a raw fault
/// that has not been normalized yet.
///
/// `Ok(Reply::Failure(..))` is a handled failure already turned into an
/// envelope. `Err(Fault)` is an escape; the containment stage is the
/// normal place where escapes become envelopes.
pub type StageResult = Result<Reply, Fault>;

/// The core pipeline stage trait.
///
/// Stages receive the exchange by value and a [`Next`] continuation.
/// Whatever a stage adds to the exchange before forwarding is visible to
/// every later stage and the handler.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once; not calling it
///   short-circuits the rest of the pipeline.
/// - A stage must not swallow a downstream failure reply.
pub trait Stage: Send + Sync + 'static {
    /// Returns the unique name of this stage, used in logging and
    /// pipeline introspection.
    fn name(&self) -> &'static str;

    /// Processes the exchange through this stage.
    fn handle<'a>(&'a self, exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult>;
}

/// The terminal unit of work at the end of the chain.
///
/// Implemented for any `Fn(Exchange) -> Future` closure or async
/// function, so handlers are written as plain functions.
pub trait ServiceHandler: Send + Sync + 'static {
    /// Runs the handler on the exchange.
    fn call(&self, exchange: Exchange) -> BoxFuture<'static, StageResult>;
}

impl<F, Fut> ServiceHandler for F
where
    F: Fn(Exchange) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StageResult> + Send + 'static,
{
    fn call(&self, exchange: Exchange) -> BoxFuture<'static, StageResult> {
        Box::pin(self(exchange))
    }
}

/// Continuation invoking the rest of the chain.
///
/// Passed to each stage; consumed on use so it can only advance once.
/// A stage that drops it without calling [`Next::run`] short-circuits
/// the pipeline with its own result.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More stages to process.
    Chain {
        stage: &'a dyn Stage,
        next: Box<Next<'a>>,
    },
    /// End of chain, invoke the handler.
    Handler(&'a dyn ServiceHandler),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that will invoke the given stage.
    pub(crate) fn new(stage: &'a dyn Stage, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                stage,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal `Next` that invokes the handler.
    pub(crate) fn handler(handler: &'a dyn ServiceHandler) -> Self {
        Self {
            inner: NextInner::Handler(handler),
        }
    }

    /// Invokes the next stage or the handler.
    ///
    /// Consumes `self`, so advancing past this point can happen at most
    /// once per stage.
    pub async fn run(self, exchange: Exchange) -> StageResult {
        match self.inner {
            NextInner::Chain { stage, next } => stage.handle(exchange, *next).await,
            NextInner::Handler(handler) => handler.call(exchange).await,
        }
    }
}

/// A stage built from a function, for one-off stages that do not warrant
/// a named type.
///
/// # Example
///
/// ```
/// use meander_pipeline::{BoxFuture, Exchange, FnStage, Next, StageResult};
///
/// fn touch<'a>(mut exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult> {
///     Box::pin(async move {
///         exchange.set_slot(true);
///         next.run(exchange).await
///     })
/// }
///
/// let stage = FnStage::new("touch", touch);
/// ```
pub struct FnStage<F> {
    name: &'static str,
    func: F,
}

impl<F> FnStage<F> {
    /// Creates a named function stage.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Stage for FnStage<F>
where
    F: for<'a> Fn(Exchange, Next<'a>) -> BoxFuture<'a, StageResult> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(&'a self, exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult> {
        (self.func)(exchange, next)
    }
}
