//! Failure reporting.
//!
//! Every failure is logged here, at the moment it is turned into a
//! caller-facing envelope, and nowhere else. Layers above relay the
//! envelope as a value instead of re-reporting it, so one failure
//! produces exactly one error record.
//!
//! [`service_error`] is the in-request path: it logs through the ambient
//! logger and so inherits the request's full context. [`api_exception`]
//! is the outermost catch: it builds a fresh request logger from the
//! metadata it is handed, because a failure that escapes this far may
//! have escaped the logging scope too.

use crate::logger::Logger;
use crate::scope;
use meander_core::{catalog, ApiError, ErrorBody, ErrorContext, ErrorDetails, Fault, LogContext, ServiceError};
use serde_json::{Map, Value};

/// Reports a normalized failure from inside a request scope.
///
/// Logs one error record through the ambient logger, attaching the
/// diagnostic request slices from `context`, then returns the envelope
/// for the caller. The raw request body never goes into the record on
/// this path; the slices a stage actually inspected are enough.
///
/// # Panics
///
/// Panics outside a request scope, like any ambient logger use.
pub fn service_error(details: ErrorDetails, context: ErrorContext) -> ServiceError {
    let logger = scope::current_logger();
    logger.error(details.public_message, &details, service_fields(context));
    details.to_envelope()
}

/// Converts a relayed error body into the API envelope shape.
///
/// The body was already logged when it was first reported, so this
/// conversion does not log. `None` means an upstream handed back a
/// failure with no body at all; that degrades to the unhandled-failure
/// definition.
#[must_use]
pub fn api_error(error: Option<ErrorBody>) -> ApiError {
    match error {
        Some(body) => ApiError::new(body),
        None => ApiError::new(ErrorBody::from(&catalog::internal::UNHANDLED)),
    }
}

/// Reports a fault that escaped every handler on an API route.
///
/// Whatever the fault carried, callers see the generic unexpected-error
/// envelope. The record is written through a fresh request logger built
/// from `request_context`, so this works even when the ambient scope is
/// gone, and it carries the raw request slices from `error_context`,
/// body included, since no stage-level slice exists for an escape.
#[must_use]
pub fn api_exception(
    fault: Fault,
    request_context: LogContext,
    error_context: ErrorContext,
) -> ApiError {
    let (message, stack) = match fault {
        Fault::Text(text) => (Value::String(text), None),
        Fault::Schema(issues) => (issues.to_value(), None),
        Fault::Exception(error) => (
            Value::String(error.to_string()),
            Some(format!("{error:?}")),
        ),
        Fault::Value(value) => {
            let text = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (Value::String(text), None)
        }
    };

    let def = &catalog::internal::UNEXPECTED;
    let details = ErrorDetails {
        family: def.family,
        message,
        code: def.code,
        stack,
        public_message: def.message,
        status: def.status,
    };

    let logger = Logger::request(request_context);
    logger.error(details.public_message, &details, exception_fields(error_context));

    ApiError::new(ErrorBody::from(def))
}

fn service_fields(context: ErrorContext) -> Option<Value> {
    let mut fields = Map::new();
    if let Some(params) = context.params {
        fields.insert("params".to_owned(), params);
    }
    if let Some(params) = context.request_params {
        fields.insert("request_params".to_owned(), params);
    }
    if let Some(query) = context.request_query {
        fields.insert("request_query".to_owned(), query);
    }
    if let Some(data) = context.request_data {
        fields.insert("request_data".to_owned(), data);
    }
    fields.extend(context.additional);
    if fields.is_empty() {
        None
    } else {
        Some(Value::Object(fields))
    }
}

fn exception_fields(context: ErrorContext) -> Option<Value> {
    let mut fields = Map::new();
    if let Some(params) = context.request_params {
        fields.insert("request_params".to_owned(), params);
    }
    if let Some(query) = context.request_query {
        fields.insert("request_query".to_owned(), query);
    }
    if let Some(body) = context.request_body {
        fields.insert("request_body".to_owned(), body);
    }
    if fields.is_empty() {
        None
    } else {
        Some(Value::Object(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MemorySink;
    use crate::{run_scoped, Logger};
    use meander_core::{format_error, CorrelationId};
    use serde_json::json;

    #[tokio::test]
    async fn test_service_error_logs_once_and_returns_envelope() {
        let sink = MemorySink::install();
        let logger = Logger::request(LogContext::for_action());
        let id = logger.correlation_id().unwrap().to_string();

        let envelope = run_scoped(logger, async {
            let details = format_error(
                Fault::text("note 12 belongs to another tenant"),
                Some(&catalog::resource::NOT_ALLOWED),
            );
            let context = ErrorContext::new()
                .with_request_query(json!({ "include": "body" }))
                .with_request_body(json!({ "secret": "s3cr3t" }));
            service_error(details, context)
        })
        .await;

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "success": false,
                "error": {
                    "code": "RES_003",
                    "message": "Requested resource not found",
                    "status": 404
                }
            })
        );

        let errors = sink.errors_for(&id);
        assert_eq!(errors.len(), 1, "one failure, one record");
        let record = &errors[0];
        assert_eq!(record.field("message"), Some(&json!("Requested resource not found")));
        let error = record.field("error").unwrap();
        assert_eq!(error["message"], json!("note 12 belongs to another tenant"));
        let details = record.field("details").unwrap();
        assert_eq!(details["request_query"], json!({ "include": "body" }));
        assert!(
            details.get("request_body").is_none(),
            "raw body stays out of service error records"
        );
    }

    #[tokio::test]
    async fn test_service_error_merges_additional_keys() {
        let sink = MemorySink::install();
        let logger = Logger::request(LogContext::for_action());
        let id = logger.correlation_id().unwrap().to_string();

        run_scoped(logger, async {
            let details = format_error(Fault::text("no credits left"), Some(&catalog::subscription::INSUFFICIENT_CREDITS));
            let context = ErrorContext::new()
                .with_params(json!({ "id": "note-4" }))
                .with_additional("plan", json!("starter"));
            let _ = service_error(details, context);
        })
        .await;

        let details = sink.errors_for(&id)[0].field("details").unwrap().clone();
        assert_eq!(details["params"], json!({ "id": "note-4" }));
        assert_eq!(details["plan"], json!("starter"));
    }

    #[tokio::test]
    async fn test_service_error_empty_context_omits_details() {
        let sink = MemorySink::install();
        let logger = Logger::request(LogContext::for_action());
        let id = logger.correlation_id().unwrap().to_string();

        run_scoped(logger, async {
            let details = format_error(Fault::text("cache miss cascade"), Some(&catalog::internal::CACHE));
            let _ = service_error(details, ErrorContext::new());
        })
        .await;

        assert!(sink.errors_for(&id)[0].field("details").is_none());
    }

    #[test]
    fn test_api_error_passes_body_through() {
        let body = ErrorBody::from(&catalog::subscription::PLAN_EXPIRED);
        let api = api_error(Some(body));

        assert_eq!(
            serde_json::to_value(&api).unwrap(),
            json!({
                "success": false,
                "error": {
                    "code": "SUB_004",
                    "message": "Subscription plan has expired",
                    "status": 402
                }
            })
        );
    }

    #[test]
    fn test_api_error_without_body_degrades_to_unhandled() {
        let api = api_error(None);
        assert_eq!(api.error.code, "INT_005");
        assert_eq!(api.error.status, 500);
        assert_eq!(api.error.message, "An unexpected error occurred");
    }

    #[test]
    fn test_api_exception_masks_fault_and_logs_body() {
        let sink = MemorySink::install();
        let id = CorrelationId::new();
        let request_context = LogContext::for_webhook("/webhooks/payments").with_correlation_id(id);
        let error_context = ErrorContext::for_request(
            Some(json!({ "retry": true })),
            Some(json!({ "event": "invoice.paid" })),
            None,
        );
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe");

        let api = api_exception(Fault::exception(io), request_context, error_context);

        assert_eq!(api.error.code, "INT_003");
        assert_eq!(api.error.message, "An unexpected error occurred");
        assert_eq!(api.error.status, 500);

        let errors = sink.errors_for(&id.to_string());
        assert_eq!(errors.len(), 1);
        let record = &errors[0];
        assert_eq!(record.context_field("request_source"), Some(&json!("webhook")));
        let error = record.field("error").unwrap();
        assert_eq!(error["message"], json!("broken pipe"));
        assert!(error["stack"].as_str().unwrap().contains("broken pipe"));
        let details = record.field("details").unwrap();
        assert_eq!(details["request_query"], json!({ "retry": true }));
        assert_eq!(details["request_body"], json!({ "event": "invoice.paid" }));
    }

    #[test]
    fn test_api_exception_works_without_ambient_scope() {
        let id = CorrelationId::new();
        let api = api_exception(
            Fault::text("wiring escaped"),
            LogContext::new().with_correlation_id(id),
            ErrorContext::new(),
        );
        assert_eq!(api.error.code, "INT_003");
    }

    #[test]
    fn test_api_exception_keeps_schema_shape_internal_only() {
        let sink = MemorySink::install();
        let id = CorrelationId::new();
        let mut issues = meander_core::SchemaIssues::new();
        issues.push(meander_core::SchemaIssue::new("$.amount", "expected integer, found string"));

        let api = api_exception(
            Fault::schema(issues),
            LogContext::for_action().with_correlation_id(id),
            ErrorContext::new(),
        );

        // An escaped schema fault is still an unexpected failure to callers.
        assert_eq!(api.error.code, "INT_003");

        let error = sink.errors_for(&id.to_string())[0].field("error").unwrap().clone();
        assert_eq!(error["message"][0]["path"], json!("$.amount"));
    }
}
