//! # Meander Telemetry
//!
//! Ambient request-scoped structured logging for the Meander pipeline.
//!
//! Every request gets one [`Logger`] holding its binding set (correlation
//! id, operation, user id, free-form context). The logging stage installs
//! that logger into a task-local scope via [`run_scoped`]; anything
//! running inside the request, however deep the call tree, reaches it
//! with [`current_logger`] instead of threading it through signatures.
//!
//! The [`report`] module is where normalized failures are logged (exactly
//! once) and turned into caller envelopes. The [`capture`] module provides
//! an in-memory sink for asserting on emitted records in tests.
//!
//! # Example
//!
//! ```
//! use meander_core::LogContext;
//! use meander_telemetry::{current_logger, run_scoped, Logger};
//!
//! # tokio_test::block_on(async {
//! let logger = Logger::request(LogContext::for_action());
//! run_scoped(logger, async {
//!     current_logger().info("note_synced", serde_json::json!({ "count": 3 }), None);
//! })
//! .await;
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/meander-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod capture;
mod config;
mod error;
mod logger;
pub mod report;
mod scope;

pub use config::{init_telemetry, TelemetryConfig};
pub use error::TelemetryError;
pub use logger::{Logger, Severity};
pub use scope::{current_logger, run_scoped, try_current_logger};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
