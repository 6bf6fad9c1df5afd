//! Schema validation stages.
//!
//! Three stages check one slice of the exchange each: the request
//! payload, the query values, or the route parameters. On success the
//! parsed output is stored on the exchange as a typed slot
//! ([`ValidData`], [`ValidQuery`], [`ValidParams`]) so the handler works
//! with checked values instead of raw JSON. On failure the request
//! short-circuits with the schema validation envelope; the field-level
//! issues go to the log record, never to the caller.

use crate::exchange::Exchange;
use crate::stage::{BoxFuture, Next, Stage, StageResult};
use meander_core::{catalog, format_error, ErrorContext, LogContext, Reply, Schema};
use meander_telemetry::{current_logger, report};
use serde_json::Value;

/// Payload validated by [`ValidateDataStage`], stored on the exchange.
#[derive(Debug, Clone)]
pub struct ValidData<T>(pub T);

/// Query validated by [`ValidateQueryStage`], stored on the exchange.
#[derive(Debug, Clone)]
pub struct ValidQuery<T>(pub T);

/// Route parameters validated by [`ValidateParamsStage`], stored on the
/// exchange.
#[derive(Debug, Clone)]
pub struct ValidParams<T>(pub T);

/// Stage that validates the request payload against a schema.
///
/// A missing payload is checked as JSON `null`, so schemas with required
/// fields reject bodyless requests with the same envelope as malformed
/// ones.
///
/// # Example
///
/// ```
/// use meander_core::FieldSchema;
/// use meander_pipeline::stages::ValidateDataStage;
///
/// let schema = FieldSchema::object(vec![
///     ("title", FieldSchema::string().required().min_length(1)),
/// ])
/// .required();
/// let stage = ValidateDataStage::new(schema);
/// ```
pub struct ValidateDataStage<S> {
    schema: S,
}

impl<S> ValidateDataStage<S> {
    /// Creates a payload validation stage.
    pub const fn new(schema: S) -> Self {
        Self { schema }
    }
}

impl<S> Stage for ValidateDataStage<S>
where
    S: Schema + Send + Sync + 'static,
    S::Output: Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "validate_data"
    }

    fn handle<'a>(&'a self, mut exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult> {
        Box::pin(async move {
            current_logger().set_context(LogContext::operation("validate_data"));
            let candidate = exchange.data().cloned().unwrap_or(Value::Null);
            match self.schema.parse(&candidate) {
                Ok(output) => {
                    exchange.set_slot(ValidData(output));
                    next.run(exchange).await
                }
                Err(issues) => {
                    let details =
                        format_error(issues, Some(&catalog::validation::SCHEMA_VALIDATION));
                    let context = ErrorContext {
                        request_data: Some(candidate),
                        ..ErrorContext::default()
                    };
                    Ok(Reply::Failure(report::service_error(details, context)))
                }
            }
        })
    }
}

/// Stage that validates the query values against a schema.
pub struct ValidateQueryStage<S> {
    schema: S,
}

impl<S> ValidateQueryStage<S> {
    /// Creates a query validation stage.
    pub const fn new(schema: S) -> Self {
        Self { schema }
    }
}

impl<S> Stage for ValidateQueryStage<S>
where
    S: Schema + Send + Sync + 'static,
    S::Output: Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "validate_query"
    }

    fn handle<'a>(&'a self, mut exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult> {
        Box::pin(async move {
            current_logger().set_context(LogContext::operation("validate_query"));
            let candidate = exchange.query().cloned().unwrap_or(Value::Null);
            match self.schema.parse(&candidate) {
                Ok(output) => {
                    exchange.set_slot(ValidQuery(output));
                    next.run(exchange).await
                }
                Err(issues) => {
                    let details =
                        format_error(issues, Some(&catalog::validation::SCHEMA_VALIDATION));
                    let context = ErrorContext {
                        request_query: Some(candidate),
                        ..ErrorContext::default()
                    };
                    Ok(Reply::Failure(report::service_error(details, context)))
                }
            }
        })
    }
}

/// Stage that validates the route parameters against a schema.
pub struct ValidateParamsStage<S> {
    schema: S,
}

impl<S> ValidateParamsStage<S> {
    /// Creates a route parameter validation stage.
    pub const fn new(schema: S) -> Self {
        Self { schema }
    }
}

impl<S> Stage for ValidateParamsStage<S>
where
    S: Schema + Send + Sync + 'static,
    S::Output: Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "validate_params"
    }

    fn handle<'a>(&'a self, mut exchange: Exchange, next: Next<'a>) -> BoxFuture<'a, StageResult> {
        Box::pin(async move {
            current_logger().set_context(LogContext::operation("validate_params"));
            let candidate = exchange.params().cloned().unwrap_or(Value::Null);
            match self.schema.parse(&candidate) {
                Ok(output) => {
                    exchange.set_slot(ValidParams(output));
                    next.run(exchange).await
                }
                Err(issues) => {
                    let details =
                        format_error(issues, Some(&catalog::validation::SCHEMA_VALIDATION));
                    let context = ErrorContext {
                        request_params: Some(candidate),
                        ..ErrorContext::default()
                    };
                    Ok(Reply::Failure(report::service_error(details, context)))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meander_core::{FieldSchema, TypedSchema};
    use meander_telemetry::{capture::MemorySink, run_scoped, Logger};
    use serde::Deserialize;
    use serde_json::json;

    fn note_schema() -> FieldSchema {
        FieldSchema::object(vec![
            ("title", FieldSchema::string().required().min_length(1)),
            ("pinned", FieldSchema::boolean()),
        ])
        .required()
    }

    async fn echo_data(exchange: Exchange) -> StageResult {
        let data = exchange
            .get_slot::<ValidData<Value>>()
            .map(|v| v.0.clone())
            .unwrap_or(Value::Null);
        Ok(Reply::ok(json!({ "validated": data })))
    }

    async fn run_stage<St: Stage>(stage: St, exchange: Exchange) -> (Reply, String) {
        let logger = Logger::request(LogContext::for_action());
        let id = logger.correlation_id().unwrap().to_string();
        let handler = echo_data;
        let reply = run_scoped(logger, stage.handle(exchange, Next::handler(&handler)))
            .await
            .unwrap();
        (reply, id)
    }

    #[tokio::test]
    async fn test_valid_payload_reaches_handler_as_slot() {
        let exchange = Exchange::for_action().with_data(json!({ "title": "groceries" }));
        let (reply, _) = run_stage(ValidateDataStage::new(note_schema()), exchange).await;

        assert_eq!(
            reply.data(),
            Some(&json!({ "validated": { "title": "groceries" } }))
        );
    }

    #[tokio::test]
    async fn test_invalid_payload_short_circuits_with_schema_envelope() {
        let sink = MemorySink::install();
        let exchange = Exchange::for_action().with_data(json!({ "title": "" }));
        let (reply, id) = run_stage(ValidateDataStage::new(note_schema()), exchange).await;

        let error = reply.error().expect("failure reply");
        assert_eq!(error.code, "VAL_002");
        assert_eq!(error.message, "Request payload validation failed");
        assert_eq!(error.status, 400);

        let errors = sink.errors_for(&id);
        assert_eq!(errors.len(), 1);
        let record = &errors[0];
        // Field-level issues are in the log, not the envelope.
        let issues = record.field("error").unwrap()["message"].as_array().unwrap().clone();
        assert_eq!(issues[0]["path"], json!("$.title"));
        assert_eq!(
            record.field("details").unwrap()["request_data"],
            json!({ "title": "" })
        );
        assert_eq!(record.context_field("operation"), Some(&json!("validate_data")));
    }

    #[tokio::test]
    async fn test_missing_payload_fails_required_schema() {
        let (reply, _) =
            run_stage(ValidateDataStage::new(note_schema()), Exchange::for_action()).await;

        let error = reply.error().expect("failure reply");
        assert_eq!(error.code, "VAL_002");
    }

    #[tokio::test]
    async fn test_typed_schema_stores_deserialized_slot() {
        #[derive(Debug, Clone, PartialEq, Deserialize)]
        struct CreateNote {
            title: String,
        }

        async fn typed_handler(exchange: Exchange) -> StageResult {
            let note = &exchange.get_slot::<ValidData<CreateNote>>().unwrap().0;
            Ok(Reply::ok(json!({ "title": note.title })))
        }

        let logger = Logger::request(LogContext::for_action());
        let stage = ValidateDataStage::new(TypedSchema::<CreateNote>::new());
        let exchange = Exchange::for_action().with_data(json!({ "title": "typed" }));
        let handler = typed_handler;

        let reply = run_scoped(logger, stage.handle(exchange, Next::handler(&handler)))
            .await
            .unwrap();

        assert_eq!(reply.data(), Some(&json!({ "title": "typed" })));
    }

    #[tokio::test]
    async fn test_query_stage_checks_query_slice() {
        let sink = MemorySink::install();
        let schema = FieldSchema::object(vec![(
            "page",
            FieldSchema::integer().required().minimum(1),
        )])
        .required();
        let exchange = Exchange::for_action().with_query(json!({ "page": 0 }));
        let (reply, id) = run_stage(ValidateQueryStage::new(schema), exchange).await;

        assert_eq!(reply.error().unwrap().code, "VAL_002");
        let record = &sink.errors_for(&id)[0];
        assert_eq!(
            record.field("details").unwrap()["request_query"],
            json!({ "page": 0 })
        );
        assert_eq!(record.context_field("operation"), Some(&json!("validate_query")));
    }

    #[tokio::test]
    async fn test_params_stage_checks_params_slice() {
        let schema = FieldSchema::object(vec![("id", FieldSchema::uuid().required())]).required();
        let exchange = Exchange::for_action().with_params(json!({ "id": "not-a-uuid" }));
        let (reply, _) = run_stage(ValidateParamsStage::new(schema), exchange).await;

        assert_eq!(reply.error().unwrap().code, "VAL_002");
        assert_eq!(reply.error().unwrap().status, 400);
    }

    #[tokio::test]
    async fn test_valid_query_stored_as_valid_query_slot() {
        async fn query_handler(exchange: Exchange) -> StageResult {
            let query = &exchange.get_slot::<ValidQuery<Value>>().unwrap().0;
            Ok(Reply::ok(json!({ "page": query["page"] })))
        }

        let logger = Logger::request(LogContext::for_action());
        let schema =
            FieldSchema::object(vec![("page", FieldSchema::integer().required())]).required();
        let stage = ValidateQueryStage::new(schema);
        let exchange = Exchange::for_action().with_query(json!({ "page": 3 }));
        let handler = query_handler;

        let reply = run_scoped(logger, stage.handle(exchange, Next::handler(&handler)))
            .await
            .unwrap();

        assert_eq!(reply.data(), Some(&json!({ "page": 3 })));
    }
}
