//! Pipeline stages.
//!
//! Two stages are part of every pipeline's fixed wrapping and are added
//! by [`Pipeline::builder`](crate::Pipeline::builder) itself:
//!
//! - [`logging`] - opens the ambient logging scope (outermost)
//! - [`containment`] - turns handler faults into failure replies
//!   (innermost, directly around the handler)
//!
//! The rest are caller stages, registered in the order they should run
//! between logging and containment:
//!
//! - [`auth`] - resolves the session and stores the current user
//! - [`validation`] - checks payload, query, or route parameters against
//!   a schema and stores the typed result
//! - [`canonical_id`] - rewrites a route ID parameter to canonical UUID
//!   form, masking malformed IDs as not-found

pub mod auth;
pub mod canonical_id;
pub mod containment;
pub mod logging;
pub mod validation;

pub use auth::{AuthStage, CurrentUser, SessionResolver};
pub use canonical_id::CanonicalIdStage;
pub use containment::ContainmentStage;
pub use logging::LoggingStage;
pub use validation::{
    ValidData, ValidParams, ValidQuery, ValidateDataStage, ValidateParamsStage,
    ValidateQueryStage,
};
