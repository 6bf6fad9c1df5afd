//! The unit of work flowing through the pipeline.
//!
//! An [`Exchange`] carries one request: its routing metadata, the raw
//! `params`/`query`/`data` values as they arrived, and a typed slot map
//! that stages fill as they establish facts about the request (the
//! authenticated user, a validated payload). Stages own the exchange
//! while they run and pass it forward by value, so anything a stage adds
//! is visible to everything after it.

use meander_core::{CorrelationId, LogContext, RequestSource};
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// One request traveling through the pipeline.
///
/// # Example
///
/// ```
/// use meander_pipeline::Exchange;
///
/// let exchange = Exchange::for_api("/notes/{id}", http::Method::GET)
///     .with_params(serde_json::json!({ "id": "0193aef2-5b6c-7000-8000-22f1c60a86cd" }));
///
/// assert_eq!(exchange.endpoint(), Some("/notes/{id}"));
/// assert!(exchange.params().is_some());
/// ```
#[derive(Debug)]
pub struct Exchange {
    /// Correlates every log record of this request.
    correlation_id: CorrelationId,

    /// Where the request entered the platform.
    source: RequestSource,

    /// Endpoint template the request was routed to.
    endpoint: Option<String>,

    /// HTTP method, when the request came over HTTP.
    method: Option<http::Method>,

    /// Free-form labels carried into the log context.
    tags: Vec<String>,

    /// Route parameters as they arrived.
    params: Option<Value>,

    /// Query values as they arrived.
    query: Option<Value>,

    /// Request payload as it arrived.
    data: Option<Value>,

    /// Type-keyed facts established by stages.
    slots: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Exchange {
    fn new(source: RequestSource) -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            source,
            endpoint: None,
            method: None,
            tags: Vec::new(),
            params: None,
            query: None,
            data: None,
            slots: HashMap::new(),
        }
    }

    /// Creates an exchange for an API request with a fresh correlation ID.
    #[must_use]
    pub fn for_api(endpoint: impl Into<String>, method: http::Method) -> Self {
        let mut exchange = Self::new(RequestSource::Api);
        exchange.endpoint = Some(endpoint.into());
        exchange.method = Some(method);
        exchange
    }

    /// Creates an exchange for a server-side action.
    #[must_use]
    pub fn for_action() -> Self {
        Self::new(RequestSource::ServerAction)
    }

    /// Creates an exchange for an inbound webhook delivery.
    #[must_use]
    pub fn for_webhook(endpoint: impl Into<String>) -> Self {
        let mut exchange = Self::new(RequestSource::Webhook);
        exchange.endpoint = Some(endpoint.into());
        exchange
    }

    /// Replaces the generated correlation ID, honoring one handed in by
    /// an upstream system.
    #[must_use]
    pub fn with_correlation_id(mut self, id: CorrelationId) -> Self {
        self.correlation_id = id;
        self
    }

    /// Appends a tag carried into the log context.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets the raw route parameters.
    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Sets the raw query values.
    #[must_use]
    pub fn with_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    /// Sets the raw request payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns the correlation ID.
    #[must_use]
    pub const fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// Returns where the request entered the platform.
    #[must_use]
    pub const fn source(&self) -> RequestSource {
        self.source
    }

    /// Returns the endpoint template, when routed.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Returns the HTTP method, when the request came over HTTP.
    #[must_use]
    pub const fn method(&self) -> Option<&http::Method> {
        self.method.as_ref()
    }

    /// Returns the tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns the raw route parameters.
    #[must_use]
    pub const fn params(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    /// Returns the raw query values.
    #[must_use]
    pub const fn query(&self) -> Option<&Value> {
        self.query.as_ref()
    }

    /// Returns the raw request payload.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Writes one route parameter, creating the parameter object when the
    /// exchange arrived without one.
    pub fn set_param(&mut self, key: impl Into<String>, value: Value) {
        match &mut self.params {
            Some(Value::Object(map)) => {
                map.insert(key.into(), value);
            }
            _ => {
                let mut map = serde_json::Map::new();
                map.insert(key.into(), value);
                self.params = Some(Value::Object(map));
            }
        }
    }

    /// Stores a typed fact about this request.
    ///
    /// Slots let stages hand strongly typed values to later stages and
    /// the handler without widening the exchange itself.
    ///
    /// # Example
    ///
    /// ```
    /// use meander_pipeline::Exchange;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct TenantId(String);
    ///
    /// let mut exchange = Exchange::for_action();
    /// exchange.set_slot(TenantId("t-9".to_owned()));
    ///
    /// assert_eq!(exchange.get_slot::<TenantId>(), Some(&TenantId("t-9".to_owned())));
    /// ```
    pub fn set_slot<T: Send + Sync + 'static>(&mut self, value: T) {
        self.slots.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed fact, or `None` if no stage stored one.
    #[must_use]
    pub fn get_slot<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed fact.
    pub fn remove_slot<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.slots
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks whether a fact of the given type was stored.
    #[must_use]
    pub fn has_slot<T: Send + Sync + 'static>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }

    /// Builds the initial log context for this request from its routing
    /// metadata. Called by the logging stage when it opens the scope.
    #[must_use]
    pub fn log_context(&self) -> LogContext {
        let mut context = LogContext::new()
            .with_correlation_id(self.correlation_id)
            .with_request_source(self.source);
        if let Some(endpoint) = &self.endpoint {
            context.endpoint = Some(endpoint.clone());
        }
        if let Some(method) = &self.method {
            context.method = Some(method.as_str().to_owned());
        }
        context.tags = self.tags.clone();
        context
    }
}

impl Clone for Exchange {
    fn clone(&self) -> Self {
        // Slots are type-erased and cannot be cloned; a clone starts with
        // an empty slot map.
        Self {
            correlation_id: self.correlation_id,
            source: self.source,
            endpoint: self.endpoint.clone(),
            method: self.method.clone(),
            tags: self.tags.clone(),
            params: self.params.clone(),
            query: self.query.clone(),
            data: self.data.clone(),
            slots: HashMap::new(),
        }
    }
}
