//! Per-request metadata types.
//!
//! [`LogContext`] is the structured metadata attached to every log record
//! for one request. It is created at the pipeline entry point, enriched by
//! stages as they learn things (operation, user), and travels with the
//! ambient logger rather than with function arguments.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier correlating every log record of one request, using
/// UUID v7.
///
/// UUID v7 is time-ordered, which keeps correlated records sortable in
/// log storage.
///
/// # Example
///
/// ```
/// use meander_core::CorrelationId;
///
/// let id = CorrelationId::new();
/// println!("Correlation ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Creates a new unique correlation ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `CorrelationId` from an existing UUID.
    ///
    /// Useful when honoring an ID handed in by an upstream system.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CorrelationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<CorrelationId> for Uuid {
    fn from(id: CorrelationId) -> Self {
        id.0
    }
}

/// Where a request entered the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestSource {
    /// Interactive application traffic.
    App,
    /// A server-side action invoked outside the HTTP surface.
    ServerAction,
    /// An inbound webhook delivery.
    Webhook,
    /// The public API surface.
    Api,
    /// The authentication subsystem.
    Auth,
    /// The content generation subsystem.
    Generation,
    /// Anything that does not fit the other sources.
    Others,
}

impl RequestSource {
    /// Returns the wire name used in log records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::ServerAction => "server-action",
            Self::Webhook => "webhook",
            Self::Api => "api",
            Self::Auth => "auth",
            Self::Generation => "generation",
            Self::Others => "others",
        }
    }
}

impl std::fmt::Display for RequestSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which layer reported a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorSource {
    /// Interactive application code.
    App,
    /// A server-side action.
    ServerAction,
    /// Webhook processing.
    Webhook,
    /// An API route.
    Api,
    /// A shared service collaborator.
    Service,
}

impl ErrorSource {
    /// Returns the wire name used in log records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::ServerAction => "server-action",
            Self::Webhook => "webhook",
            Self::Api => "api",
            Self::Service => "service",
        }
    }
}

impl std::fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured metadata attached to every log record of one request.
///
/// All fields are optional; partial contexts are merged into the ambient
/// logger as stages learn more about the request.
///
/// # Example
///
/// ```
/// use meander_core::LogContext;
///
/// let ctx = LogContext::for_api("/notes/{id}", http::Method::GET)
///     .with_tag("notes");
/// assert!(ctx.correlation_id.is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogContext {
    /// Correlates every record of one request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<CorrelationId>,
    /// Authenticated user, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Where the request entered the platform.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_source: Option<RequestSource>,
    /// The stage or unit of work currently processing the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Endpoint template the request was routed to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// HTTP method, when the request came over HTTP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Free-form labels for grouping records.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Any additional keys callers want on every record.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LogContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the initial context for an API request.
    ///
    /// Assigns a fresh correlation ID and records the routing metadata.
    #[must_use]
    pub fn for_api(endpoint: impl Into<String>, method: http::Method) -> Self {
        Self {
            correlation_id: Some(CorrelationId::new()),
            request_source: Some(RequestSource::Api),
            endpoint: Some(endpoint.into()),
            method: Some(method.as_str().to_owned()),
            ..Self::default()
        }
    }

    /// Creates the initial context for a server-side action.
    #[must_use]
    pub fn for_action() -> Self {
        Self {
            correlation_id: Some(CorrelationId::new()),
            request_source: Some(RequestSource::ServerAction),
            ..Self::default()
        }
    }

    /// Creates the initial context for an inbound webhook delivery.
    #[must_use]
    pub fn for_webhook(endpoint: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(CorrelationId::new()),
            request_source: Some(RequestSource::Webhook),
            endpoint: Some(endpoint.into()),
            ..Self::default()
        }
    }

    /// Creates a partial context that only names the current operation.
    #[must_use]
    pub fn operation(name: impl Into<String>) -> Self {
        Self {
            operation: Some(name.into()),
            ..Self::default()
        }
    }

    /// Creates a partial context that only names the authenticated user.
    #[must_use]
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// Returns a new context with the specified correlation ID.
    #[must_use]
    pub fn with_correlation_id(mut self, id: CorrelationId) -> Self {
        self.correlation_id = Some(id);
        self
    }

    /// Returns a new context with the specified request source.
    #[must_use]
    pub const fn with_request_source(mut self, source: RequestSource) -> Self {
        self.request_source = Some(source);
        self
    }

    /// Returns a new context with the specified operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Returns a new context with the given tag appended.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Returns a new context with an additional free-form key.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_id_new_generates_unique_ids() {
        let id1 = CorrelationId::new();
        let id2 = CorrelationId::new();
        assert_ne!(id1, id2, "Each CorrelationId should be unique");
    }

    #[test]
    fn test_correlation_id_display() {
        let id = CorrelationId::new();
        let display = id.to_string();
        assert_eq!(display.len(), 36, "UUID string should be 36 characters");
        assert!(display.contains('-'), "UUID should contain hyphens");
    }

    #[test]
    fn test_correlation_id_from_uuid() {
        let uuid = Uuid::now_v7();
        let id = CorrelationId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn test_correlation_id_serializes_as_plain_string() {
        let id = CorrelationId::new();
        let json = serde_json::to_value(id).expect("serialization should work");
        assert_eq!(json, serde_json::json!(id.to_string()));
        let parsed: CorrelationId =
            serde_json::from_value(json).expect("deserialization should work");
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_request_source_wire_names() {
        assert_eq!(RequestSource::ServerAction.as_str(), "server-action");
        assert_eq!(
            serde_json::to_value(RequestSource::ServerAction).unwrap(),
            serde_json::json!("server-action")
        );
    }

    #[test]
    fn test_api_context_assigns_correlation_id() {
        let ctx = LogContext::for_api("/notes/{id}", http::Method::GET);
        assert!(ctx.correlation_id.is_some());
        assert_eq!(ctx.request_source, Some(RequestSource::Api));
        assert_eq!(ctx.endpoint.as_deref(), Some("/notes/{id}"));
        assert_eq!(ctx.method.as_deref(), Some("GET"));
    }

    #[test]
    fn test_action_context_has_no_endpoint() {
        let ctx = LogContext::for_action();
        assert!(ctx.correlation_id.is_some());
        assert_eq!(ctx.request_source, Some(RequestSource::ServerAction));
        assert!(ctx.endpoint.is_none());
        assert!(ctx.method.is_none());
    }

    #[test]
    fn test_partial_context_serializes_only_present_fields() {
        let ctx = LogContext::operation("validate_data");
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json, serde_json::json!({ "operation": "validate_data" }));
    }

    #[test]
    fn test_context_builder_pattern() {
        let ctx = LogContext::new()
            .with_operation("sync_notes")
            .with_tag("notes")
            .with_extra("attempt", serde_json::json!(2));

        assert_eq!(ctx.operation.as_deref(), Some("sync_notes"));
        assert_eq!(ctx.tags, vec!["notes".to_owned()]);
        assert_eq!(ctx.extra.get("attempt"), Some(&serde_json::json!(2)));
    }
}
