//! Failure normalization.
//!
//! [`format_error`] is the single point where a raw [`Fault`] becomes an
//! [`ErrorDetails`] record. It is also the sanitization boundary: the
//! internal `message` and `stack` captured here are only ever written to
//! logs, while `public_message` is the only text allowed into a caller
//! envelope.

use crate::catalog::{self, ErrorDefinition, ErrorFamily};
use crate::fault::Fault;
use crate::result::{ErrorBody, ServiceError};
use serde::Serialize;

/// A normalized failure record.
///
/// Produced by [`format_error`], consumed by the reporting layer. The
/// `message`/`stack` pair is internal diagnostic detail; `public_message`,
/// `code`, and `status` are the caller-facing triple.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetails {
    /// Taxonomy family, used as the error `name` in log records.
    pub family: ErrorFamily,
    /// Internal message: verbatim text, exception text, or a serialized
    /// issue list. Never returned to callers.
    pub message: serde_json::Value,
    /// Stable catalog code.
    pub code: &'static str,
    /// Cause chain rendering, when the raw failure carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Caller-safe text from the resolved catalog definition.
    pub public_message: &'static str,
    /// HTTP status from the resolved catalog definition.
    pub status: u16,
}

impl ErrorDetails {
    /// Builds the caller-facing envelope for this failure.
    ///
    /// Only `public_message`, `code`, and `status` cross this boundary;
    /// the internal `message` and `stack` stay behind.
    #[must_use]
    pub fn to_envelope(&self) -> ServiceError {
        ServiceError::new(ErrorBody {
            code: self.code.to_owned(),
            message: self.public_message.to_owned(),
            status: self.status,
        })
    }
}

/// Diagnostic request slices attached to a failure report.
///
/// Everything here is log-only context: which route parameters, query
/// values, or payload the request carried when it failed. None of it
/// reaches the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorContext {
    /// Route parameters as the handler saw them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Route parameters as they arrived, before any rewriting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_params: Option<serde_json::Value>,
    /// Query string values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_query: Option<serde_json::Value>,
    /// The payload slice a validation stage rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_data: Option<serde_json::Value>,
    /// The raw request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<serde_json::Value>,
    /// Free-form keys merged into the log record alongside the slices.
    #[serde(flatten)]
    pub additional: serde_json::Map<String, serde_json::Value>,
}

impl ErrorContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the usual context for an HTTP request: query, body, and the
    /// raw route parameters.
    #[must_use]
    pub fn for_request(
        query: Option<serde_json::Value>,
        body: Option<serde_json::Value>,
        params: Option<serde_json::Value>,
    ) -> Self {
        Self {
            request_query: query,
            request_body: body,
            request_params: params,
            ..Self::default()
        }
    }

    /// Returns a new context with the handler-visible route parameters.
    #[must_use]
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Returns a new context with the raw route parameters.
    #[must_use]
    pub fn with_request_params(mut self, params: serde_json::Value) -> Self {
        self.request_params = Some(params);
        self
    }

    /// Returns a new context with the query values.
    #[must_use]
    pub fn with_request_query(mut self, query: serde_json::Value) -> Self {
        self.request_query = Some(query);
        self
    }

    /// Returns a new context with the rejected payload slice.
    #[must_use]
    pub fn with_request_data(mut self, data: serde_json::Value) -> Self {
        self.request_data = Some(data);
        self
    }

    /// Returns a new context with the raw request body.
    #[must_use]
    pub fn with_request_body(mut self, body: serde_json::Value) -> Self {
        self.request_body = Some(body);
        self
    }

    /// Returns a new context with an additional free-form key.
    #[must_use]
    pub fn with_additional(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.additional.insert(key.into(), value);
        self
    }
}

/// Normalizes a raw fault into an [`ErrorDetails`] record.
///
/// Dispatch is by fault variant, in this order:
///
/// 1. [`Fault::Text`]: the text becomes the internal `message` verbatim;
///    `fallback` (or [`catalog::internal::UNEXPECTED`]) supplies the
///    taxonomy fields.
/// 2. [`Fault::Schema`]: the issue list is serialized into `message`.
///    Taxonomy fields come from `fallback` when one was supplied, else
///    from [`catalog::validation::SCHEMA_VALIDATION`]. The public message
///    is always the generic schema text, so field-level detail never
///    leaks regardless of the fallback.
/// 3. [`Fault::Exception`]: `message` is the error's display text and
///    `stack` renders the cause chain; taxonomy fields as in case 1.
/// 4. [`Fault::Value`]: the value is stringified into `message` with no
///    `stack`; taxonomy fields as in case 1.
///
/// `public_message` always comes from a catalog definition, never from
/// the raw failure.
///
/// # Example
///
/// ```
/// use meander_core::{catalog, format_error, Fault};
///
/// let details = format_error(
///     Fault::text("row not found for tenant 42"),
///     Some(&catalog::resource::NOT_FOUND),
/// );
/// assert_eq!(details.code, "RES_001");
/// assert_eq!(details.public_message, "Requested resource not found");
/// assert_eq!(details.message, serde_json::json!("row not found for tenant 42"));
/// ```
#[must_use]
pub fn format_error(raw: impl Into<Fault>, fallback: Option<&'static ErrorDefinition>) -> ErrorDetails {
    match raw.into() {
        Fault::Text(message) => {
            let def = fallback.unwrap_or(&catalog::internal::UNEXPECTED);
            ErrorDetails {
                family: def.family,
                message: serde_json::Value::String(message),
                code: def.code,
                stack: None,
                public_message: def.message,
                status: def.status,
            }
        }
        Fault::Schema(issues) => {
            let def = fallback.unwrap_or(&catalog::validation::SCHEMA_VALIDATION);
            ErrorDetails {
                family: def.family,
                message: issues.to_value(),
                code: def.code,
                stack: None,
                // Field-level issue detail stays internal even when a
                // fallback overrides code and status.
                public_message: catalog::validation::SCHEMA_VALIDATION.message,
                status: def.status,
            }
        }
        Fault::Exception(error) => {
            let def = fallback.unwrap_or(&catalog::internal::UNEXPECTED);
            ErrorDetails {
                family: def.family,
                message: serde_json::Value::String(error.to_string()),
                code: def.code,
                stack: Some(format!("{error:?}")),
                public_message: def.message,
                status: def.status,
            }
        }
        Fault::Value(value) => {
            let def = fallback.unwrap_or(&catalog::internal::UNEXPECTED);
            let text = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            ErrorDetails {
                family: def.family,
                message: serde_json::Value::String(text),
                code: def.code,
                stack: None,
                public_message: def.message,
                status: def.status,
            }
        }
    }
}
