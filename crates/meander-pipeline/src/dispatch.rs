//! Fixed-shape pipeline assembly and dispatch.
//!
//! A [`Pipeline`] composes stages around a handler in one immutable
//! shape:
//!
//! ```text
//! logging → [caller stages, registration order] → containment → handler
//! ```
//!
//! The logging and containment stages are part of the pipeline itself,
//! not registrable: every request runs inside an ambient logging scope,
//! and every handler fault is contained into a failure reply. Caller
//! stages can neither remove that wrapping nor reorder around it.

use crate::exchange::Exchange;
use crate::stage::{Next, ServiceHandler, Stage, StageResult};
use crate::stages::{ContainmentStage, LoggingStage};
use std::sync::Arc;

/// A type-erased stage stored in the pipeline.
pub type BoxedStage = Arc<dyn Stage>;

/// The fixed-shape stage pipeline.
///
/// # Example
///
/// ```
/// use meander_core::Reply;
/// use meander_pipeline::{Exchange, Pipeline, StageResult};
///
/// async fn list_notes(_exchange: Exchange) -> StageResult {
///     Ok(Reply::ok(serde_json::json!({ "notes": [] })))
/// }
///
/// # tokio_test::block_on(async {
/// let pipeline = Pipeline::builder().build();
/// let reply = pipeline
///     .dispatch(Exchange::for_action(), &list_notes)
///     .await
///     .unwrap();
/// assert!(reply.is_success());
/// # });
/// ```
pub struct Pipeline {
    logging: LoggingStage,
    stages: Vec<BoxedStage>,
    containment: ContainmentStage,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Runs one exchange through the pipeline to the handler.
    ///
    /// Returns the reply envelope. An `Err` means a fault escaped the
    /// containment wrapping, which only caller stages above it can
    /// cause; route adapters turn that case into the generic API
    /// exception envelope and log it there, keeping one log record per
    /// failure.
    pub async fn dispatch<H>(&self, exchange: Exchange, handler: &H) -> StageResult
    where
        H: ServiceHandler,
    {
        self.build_chain(handler).run(exchange).await
    }

    /// Builds the stage chain from back to front.
    fn build_chain<'a>(&'a self, handler: &'a dyn ServiceHandler) -> Next<'a> {
        let mut next = Next::handler(handler);
        next = Next::new(&self.containment, next);
        for stage in self.stages.iter().rev() {
            next = Next::new(stage.as_ref(), next);
        }
        Next::new(&self.logging, next)
    }

    /// Returns the names of all stages in execution order, the fixed
    /// wrapping included.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        let mut names = vec![self.logging.name()];
        for stage in &self.stages {
            names.push(stage.name());
        }
        names.push(self.containment.name());
        names
    }

    /// Returns the number of stages, the fixed wrapping included.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len() + 2
    }
}

/// Builder for constructing a [`Pipeline`].
///
/// Only the caller stages between logging and containment are
/// registrable; the wrapping itself is fixed.
pub struct PipelineBuilder {
    stages: Vec<BoxedStage>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Appends a caller stage. Stages run in registration order.
    #[must_use]
    pub fn stage<S: Stage>(mut self, stage: S) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            logging: LoggingStage::new(),
            stages: self.stages,
            containment: ContainmentStage::new(),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::BoxFuture;
    use meander_core::{Fault, Reply};
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingStage {
        name: &'static str,
        seen: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Stage for RecordingStage {
        fn name(&self) -> &'static str {
            self.name
        }

        fn handle<'a>(&'a self, exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult> {
            let seen = self.seen.clone();
            let name = self.name;
            Box::pin(async move {
                seen.lock().unwrap().push(name);
                next.run(exchange).await
            })
        }
    }

    async fn ok_handler(_exchange: Exchange) -> StageResult {
        Ok(Reply::ok(json!({ "done": true })))
    }

    #[tokio::test]
    async fn test_stages_run_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::builder()
            .stage(RecordingStage { name: "first", seen: seen.clone() })
            .stage(RecordingStage { name: "second", seen: seen.clone() })
            .stage(RecordingStage { name: "third", seen: seen.clone() })
            .build();

        let handler = ok_handler;
        let reply = pipeline
            .dispatch(Exchange::for_action(), &handler)
            .await
            .unwrap();

        assert!(reply.is_success());
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_empty_pipeline_still_wraps_handler() {
        let pipeline = Pipeline::builder().build();
        let handler = ok_handler;

        let reply = pipeline
            .dispatch(Exchange::for_action(), &handler)
            .await
            .unwrap();

        assert_eq!(reply.data(), Some(&json!({ "done": true })));
    }

    #[tokio::test]
    async fn test_handler_fault_is_contained() {
        async fn faulty(_exchange: Exchange) -> StageResult {
            Err(Fault::text("boom"))
        }

        let pipeline = Pipeline::builder().build();
        let handler = faulty;

        let reply = pipeline
            .dispatch(Exchange::for_action(), &handler)
            .await
            .unwrap();

        assert_eq!(reply.error().unwrap().code, "INT_005");
    }

    #[tokio::test]
    async fn test_stage_fault_escapes_dispatch() {
        struct FaultingStage;

        impl Stage for FaultingStage {
            fn name(&self) -> &'static str {
                "faulting"
            }

            fn handle<'a>(&'a self, _exchange: Exchange, _next: Next<'a>) -> BoxFuture<'a, StageResult> {
                Box::pin(async move { Err(Fault::text("stage wiring broke")) })
            }
        }

        let pipeline = Pipeline::builder().stage(FaultingStage).build();
        let handler = ok_handler;

        let fault = pipeline
            .dispatch(Exchange::for_action(), &handler)
            .await
            .unwrap_err();

        assert_eq!(fault.to_string(), "stage wiring broke");
    }

    #[test]
    fn test_stage_names_include_fixed_wrapping() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::builder()
            .stage(RecordingStage { name: "auth", seen })
            .build();

        assert_eq!(pipeline.stage_names(), vec!["logging", "auth", "containment"]);
        assert_eq!(pipeline.stage_count(), 3);
    }
}
