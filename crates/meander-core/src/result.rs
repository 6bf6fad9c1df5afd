//! Uniform result envelopes.
//!
//! Every operation in the platform resolves to one of two wire shapes:
//! `{ "success": true, "data": ..., ...extra }` or
//! `{ "success": false, "error": { "code", "message", "status" } }`.
//! [`Reply`] is the union of the two and is what pipelines, stages, and
//! handlers trade in. Nothing else crosses a public boundary.

use serde::{Deserialize, Serialize};

/// The caller-facing error triple.
///
/// `message` is always a catalog public message; internal diagnostics
/// never reach this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable catalog code (`AUTH_001`, `VAL_002`, ...).
    pub code: String,
    /// Public message from the catalog definition.
    pub message: String,
    /// HTTP status from the catalog definition.
    pub status: u16,
}

impl From<&crate::catalog::ErrorDefinition> for ErrorBody {
    fn from(definition: &crate::catalog::ErrorDefinition) -> Self {
        Self {
            code: definition.code.to_owned(),
            message: definition.message.to_owned(),
            status: definition.status,
        }
    }
}

/// Failure envelope returned by services and stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Always `false`.
    pub success: bool,
    /// The caller-facing error triple.
    pub error: ErrorBody,
}

impl ServiceError {
    /// Creates a failure envelope.
    #[must_use]
    pub const fn new(error: ErrorBody) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

/// Success envelope returned by services and handlers.
///
/// `extra` keys are flattened alongside `success` and `data`, which is how
/// list endpoints carry fields like `total_records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSuccess {
    /// Always `true`.
    pub success: bool,
    /// The operation's payload.
    pub data: serde_json::Value,
    /// Additional top-level envelope fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServiceSuccess {
    /// Creates a success envelope.
    pub fn new(data: impl Into<serde_json::Value>) -> Self {
        Self {
            success: true,
            data: data.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// A failure envelope for the outermost API boundary.
///
/// Same shape as [`ServiceError`] plus an optional `details` payload for
/// surfaces that return field-level hints to their own frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Always `false`.
    pub success: bool,
    /// The caller-facing error triple.
    pub error: ErrorBody,
    /// Optional payload for the caller's own error rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Creates an API failure envelope without details.
    #[must_use]
    pub const fn new(error: ErrorBody) -> Self {
        Self {
            success: false,
            error,
            details: None,
        }
    }

    /// Returns a new envelope with the given details payload.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        Self::new(error.error)
    }
}

/// Result alias for collaborators that return typed data.
///
/// The failure side is already a complete caller-facing envelope, so
/// propagating it upward needs no further mapping.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// The union of the two envelope shapes.
///
/// This is the value a pipeline invocation resolves to, whether the
/// handler ran or a stage short-circuited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    /// `{ "success": true, ... }`
    Success(ServiceSuccess),
    /// `{ "success": false, "error": ... }`
    Failure(ServiceError),
}

impl Reply {
    /// Creates a success reply carrying `data`.
    pub fn ok(data: impl Into<serde_json::Value>) -> Self {
        Self::Success(ServiceSuccess::new(data))
    }

    /// Creates a success reply with additional top-level envelope fields.
    pub fn ok_with(
        data: impl Into<serde_json::Value>,
        extra: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        let mut success = ServiceSuccess::new(data);
        success.extra = extra;
        Self::Success(success)
    }

    /// Converts a typed service result into a reply.
    pub fn from_result<T: Into<serde_json::Value>>(result: ServiceResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(error) => Self::Failure(error),
        }
    }

    /// Returns `true` for the success shape.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for the failure shape.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns the payload when this is a success reply.
    #[must_use]
    pub const fn data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Success(success) => Some(&success.data),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error triple when this is a failure reply.
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorBody> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(&failure.error),
        }
    }
}

impl From<ServiceError> for Reply {
    fn from(error: ServiceError) -> Self {
        Self::Failure(error)
    }
}

impl From<ServiceSuccess> for Reply {
    fn from(success: ServiceSuccess) -> Self {
        Self::Success(success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_shape() {
        let reply = Reply::ok(json!({ "id": "abc" }));
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json, json!({ "success": true, "data": { "id": "abc" } }));
    }

    #[test]
    fn test_success_extra_fields_flatten_to_top_level() {
        let mut extra = serde_json::Map::new();
        extra.insert("total_records".to_owned(), json!(42));
        let reply = Reply::ok_with(json!([]), extra);

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            json,
            json!({ "success": true, "data": [], "total_records": 42 })
        );
    }

    #[test]
    fn test_failure_envelope_shape() {
        let reply = Reply::Failure(ServiceError::new(ErrorBody {
            code: "RES_001".to_owned(),
            message: "Requested resource not found".to_owned(),
            status: 404,
        }));

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            json,
            json!({
                "success": false,
                "error": {
                    "code": "RES_001",
                    "message": "Requested resource not found",
                    "status": 404
                }
            })
        );
    }

    #[test]
    fn test_reply_deserializes_both_shapes() {
        let success: Reply =
            serde_json::from_value(json!({ "success": true, "data": 7 })).unwrap();
        assert!(success.is_success());
        assert_eq!(success.data(), Some(&json!(7)));

        let failure: Reply = serde_json::from_value(json!({
            "success": false,
            "error": { "code": "AUTH_001", "message": "Authentication required", "status": 401 }
        }))
        .unwrap();
        assert!(failure.is_failure());
        assert_eq!(failure.error().map(|e| e.status), Some(401));
    }

    #[test]
    fn test_from_result_maps_both_sides() {
        let ok: ServiceResult<serde_json::Value> = Ok(json!({ "id": 1 }));
        assert!(Reply::from_result(ok).is_success());

        let err: ServiceResult<serde_json::Value> = Err(ServiceError::new(ErrorBody {
            code: "SUB_002".to_owned(),
            message: "Insufficient credits".to_owned(),
            status: 402,
        }));
        let reply = Reply::from_result(err);
        assert_eq!(reply.error().map(|e| e.code.as_str()), Some("SUB_002"));
    }

    #[test]
    fn test_error_body_from_definition() {
        let body = ErrorBody::from(&crate::catalog::subscription::PLAN_EXPIRED);
        assert_eq!(body.code, "SUB_004");
        assert_eq!(body.message, "Subscription plan has expired");
        assert_eq!(body.status, 402);
    }

    #[test]
    fn test_api_error_omits_absent_details() {
        let api = ApiError::new(ErrorBody {
            code: "INT_003".to_owned(),
            message: "An unexpected error occurred".to_owned(),
            status: 500,
        });

        let json = serde_json::to_value(&api).unwrap();
        assert!(json.get("details").is_none());

        let with_details = serde_json::to_value(
            ApiError::new(ErrorBody {
                code: "VAL_002".to_owned(),
                message: "Request payload validation failed".to_owned(),
                status: 400,
            })
            .with_details(json!([{ "path": "$.id" }])),
        )
        .unwrap();
        assert_eq!(with_details["details"][0]["path"], "$.id");
    }
}
