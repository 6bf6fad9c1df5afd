//! # Meander
//!
//! **Request pipeline and error model for the Meander platform**
//!
//! Meander gives every service the same request spine:
//!
//! - 🧱 **Fixed Pipeline Wrapping** – Logging and fault containment cannot be dropped or reordered
//! - 🧭 **Ambient Request Context** – A per-request logger follows the task, no parameter threading
//! - 📦 **Uniform Envelopes** – Every outcome is `{ success, data }` or `{ success, error }`
//! - 🔇 **Sanitized Failures** – Callers see catalog text; internals go to the log, exactly once
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use meander::prelude::*;
//!
//! async fn create_note(exchange: Exchange) -> StageResult {
//!     let payload = exchange
//!         .get_slot::<ValidData<serde_json::Value>>()
//!         .expect("validation stage ran");
//!     current_logger().info("note_created", payload.0.clone(), None);
//!     Ok(Reply::ok(serde_json::json!({ "id": "note-1" })))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     init_telemetry(&TelemetryConfig::from_env().unwrap()).unwrap();
//!
//!     let pipeline = Pipeline::builder()
//!         .stage(AuthStage::new(sessions))
//!         .stage(ValidateDataStage::new(note_schema()))
//!         .build();
//!
//!     let exchange = Exchange::for_api("/api/notes", http::Method::POST)
//!         .with_data(serde_json::json!({ "title": "standup summary" }));
//!     let reply = pipeline.dispatch(exchange, &create_note).await;
//! }
//! ```
//!
//! ## Architecture
//!
//! The pipeline wraps every handler in the same fixed order:
//!
//! ```text
//! Exchange → Logging → [caller stages...] → Containment → Handler
//!                                                            ↓
//! Reply ←────────────────────────────────────────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/meander/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use meander_core as core;

// Re-export telemetry types
pub use meander_telemetry as telemetry;

// Re-export pipeline types
pub use meander_pipeline as pipeline;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust,ignore
/// use meander::prelude::*;
/// ```
pub mod prelude {
    pub use meander_core::{
        format_error, ApiError, AuthenticatedUser, CorrelationId, ErrorBody, ErrorContext,
        ErrorDefinition, ErrorDetails, ErrorFamily, Fault, FieldSchema, LogContext, Reply,
        RequestSource, Schema, SchemaIssue, SchemaIssues, ServiceError, ServiceResult,
        ServiceSuccess, Session, TypedSchema,
    };

    // Re-export the failure catalog
    pub use meander_core::catalog;

    // Re-export the logging surface
    pub use meander_telemetry::{
        current_logger, init_telemetry, run_scoped, try_current_logger, Logger, Severity,
        TelemetryConfig,
    };

    // Re-export the reporting boundary
    pub use meander_telemetry::report;

    // Re-export the pipeline surface
    pub use meander_pipeline::{
        BoxFuture, Exchange, FnStage, Next, Pipeline, PipelineBuilder, ServiceHandler, Stage,
        StageResult,
    };

    // Re-export the built-in stages
    pub use meander_pipeline::stages::{
        AuthStage, CanonicalIdStage, CurrentUser, SessionResolver, ValidData, ValidParams,
        ValidQuery, ValidateDataStage, ValidateParamsStage, ValidateQueryStage,
    };
}
