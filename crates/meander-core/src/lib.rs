//! # Meander Core
//!
//! Error model and shared request types for the Meander pipeline.
//!
//! This crate provides the foundational types used throughout Meander:
//!
//! - [`ErrorDefinition`] and the [`catalog`] of static failure definitions
//! - [`Fault`] - the raw failure value carried through a request
//! - [`format_error`] - normalization of any fault into [`ErrorDetails`]
//! - [`Reply`], [`ServiceError`], and [`ApiError`] - uniform result envelopes
//! - [`CorrelationId`] and [`LogContext`] - per-request metadata
//! - [`Schema`] - the validation boundary with [`FieldSchema`] and [`TypedSchema`]

#![doc(html_root_url = "https://docs.rs/meander-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod catalog;
mod context;
mod fault;
mod format;
mod identity;
pub mod schema;

mod result;

pub use catalog::{ErrorDefinition, ErrorFamily};
pub use context::{CorrelationId, ErrorSource, LogContext, RequestSource};
pub use fault::Fault;
pub use format::{format_error, ErrorContext, ErrorDetails};
pub use identity::{AuthenticatedUser, Session};
pub use result::{ApiError, ErrorBody, Reply, ServiceError, ServiceResult, ServiceSuccess};
pub use schema::{FieldSchema, Schema, SchemaIssue, SchemaIssues, TypedSchema};
