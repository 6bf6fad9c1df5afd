//! Raw failure values carried through a request.
//!
//! Collaborators and stages do not hand loose values to the error model;
//! every failure travels as a [`Fault`] that says up front which shape it
//! is. Normalization into an [`ErrorDetails`](crate::ErrorDetails) record
//! happens in [`format_error`](crate::format_error) and dispatches on the
//! variant alone.

use crate::schema::SchemaIssues;

/// A raw failure value, tagged with its shape.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    /// A plain human-readable message.
    #[error("{0}")]
    Text(String),
    /// A structured issue list produced at a schema boundary.
    #[error("{0}")]
    Schema(SchemaIssues),
    /// An exception-like error with a cause chain.
    #[error(transparent)]
    Exception(#[from] anyhow::Error),
    /// Any other value a collaborator surfaced as a failure.
    #[error("{0}")]
    Value(serde_json::Value),
}

impl Fault {
    /// Creates a text fault.
    pub fn text(message: impl Into<String>) -> Self {
        Self::Text(message.into())
    }

    /// Creates a schema fault from a validation issue list.
    #[must_use]
    pub fn schema(issues: SchemaIssues) -> Self {
        Self::Schema(issues)
    }

    /// Creates an exception fault from any error type.
    pub fn exception(source: impl Into<anyhow::Error>) -> Self {
        Self::Exception(source.into())
    }

    /// Creates a fault from an arbitrary JSON-representable value.
    pub fn value(value: impl Into<serde_json::Value>) -> Self {
        Self::Value(value.into())
    }
}

impl From<String> for Fault {
    fn from(message: String) -> Self {
        Self::Text(message)
    }
}

impl From<&str> for Fault {
    fn from(message: &str) -> Self {
        Self::Text(message.to_owned())
    }
}

impl From<SchemaIssues> for Fault {
    fn from(issues: SchemaIssues) -> Self {
        Self::Schema(issues)
    }
}

impl From<serde_json::Value> for Fault {
    fn from(value: serde_json::Value) -> Self {
        Self::Value(value)
    }
}
