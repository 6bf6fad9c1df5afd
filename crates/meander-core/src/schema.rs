//! Schema boundary for request slices.
//!
//! Validation stages hand an untyped candidate value to a [`Schema`] and
//! get back either typed output or a [`SchemaIssues`] list describing every
//! problem found. Issue paths are rooted at `$` and follow the candidate's
//! structure (`$.users[1].name`).
//!
//! Two engines are provided:
//!
//! - [`FieldSchema`] - declarative field rules built up with combinators
//! - [`TypedSchema`] - deserialization into any [`serde::Deserialize`] type
//!
//! # Example
//!
//! ```
//! use meander_core::schema::{FieldSchema, Schema};
//!
//! let schema = FieldSchema::object(vec![
//!     ("name", FieldSchema::string().required()),
//!     ("age", FieldSchema::integer().minimum(0)),
//! ]);
//!
//! let candidate = serde_json::json!({ "name": "Alice", "age": 30 });
//! assert!(schema.parse(&candidate).is_ok());
//!
//! let bad = serde_json::json!({ "age": -1 });
//! let issues = schema.parse(&bad).unwrap_err();
//! assert_eq!(issues.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// A validation boundary that turns untyped candidates into typed output.
pub trait Schema {
    /// The typed value produced on success.
    type Output;

    /// Parses a candidate value, reporting every issue found on failure.
    ///
    /// # Errors
    ///
    /// Returns the full list of validation issues when the candidate does
    /// not conform.
    fn parse(&self, candidate: &serde_json::Value) -> Result<Self::Output, SchemaIssues>;
}

/// A single validation issue at a path within the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    /// JSON path where the issue occurred, rooted at `$`.
    pub path: String,
    /// Human-readable description of the issue.
    pub message: String,
}

impl SchemaIssue {
    /// Creates an issue at the given path.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "validation error at '{}': {}", self.path, self.message)
    }
}

/// Every issue a schema found in one candidate, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaIssues(Vec<SchemaIssue>);

impl SchemaIssues {
    /// Creates an empty issue list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates a list holding a single issue.
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![SchemaIssue::new(path, message)])
    }

    /// Appends an issue.
    pub fn push(&mut self, issue: SchemaIssue) {
        self.0.push(issue);
    }

    /// Returns the number of issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no issues were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the issues.
    pub fn iter(&self) -> std::slice::Iter<'_, SchemaIssue> {
        self.0.iter()
    }

    /// Returns the issues as a JSON array for structured logging.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl std::fmt::Display for SchemaIssues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "no validation issues");
        }
        for (idx, issue) in self.0.iter().enumerate() {
            if idx > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl IntoIterator for SchemaIssues {
    type Item = SchemaIssue;
    type IntoIter = std::vec::IntoIter<SchemaIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SchemaIssues {
    type Item = &'a SchemaIssue;
    type IntoIter = std::slice::Iter<'a, SchemaIssue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<SchemaIssue> for SchemaIssues {
    fn from_iter<I: IntoIterator<Item = SchemaIssue>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Declarative field rules over JSON values.
///
/// Rules are composed with builder combinators and collect every issue in
/// one pass rather than stopping at the first.
///
/// # Example
///
/// ```
/// use meander_core::schema::{FieldSchema, Schema};
///
/// let schema = FieldSchema::object(vec![
///     ("id", FieldSchema::uuid().required()),
///     ("tags", FieldSchema::array(FieldSchema::string())),
/// ]);
///
/// let candidate = serde_json::json!({
///     "id": "0193e0a8-3c41-7d10-b7a4-d8f2e1c90a11",
///     "tags": ["draft"],
/// });
/// assert!(schema.parse(&candidate).is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldSchema {
    /// UTF-8 string with optional length bounds.
    String {
        /// Whether a null or missing value is an issue.
        #[serde(default)]
        required: bool,
        /// Minimum length in bytes.
        min_length: Option<usize>,
        /// Maximum length in bytes.
        max_length: Option<usize>,
    },
    /// String that must parse as a UUID.
    Uuid {
        /// Whether a null or missing value is an issue.
        #[serde(default)]
        required: bool,
    },
    /// 64-bit integer with optional bounds.
    Integer {
        /// Whether a null or missing value is an issue.
        #[serde(default)]
        required: bool,
        /// Minimum value.
        minimum: Option<i64>,
        /// Maximum value.
        maximum: Option<i64>,
    },
    /// Boolean.
    Boolean {
        /// Whether a null or missing value is an issue.
        #[serde(default)]
        required: bool,
    },
    /// Array with a uniform item schema and optional length bounds.
    Array {
        /// Whether a null or missing value is an issue.
        #[serde(default)]
        required: bool,
        /// Schema applied to every item.
        items: Box<FieldSchema>,
        /// Minimum number of items.
        min_items: Option<usize>,
        /// Maximum number of items.
        max_items: Option<usize>,
    },
    /// Object with named properties, checked in declaration order.
    Object {
        /// Whether a null or missing value is an issue.
        #[serde(default)]
        required: bool,
        /// Property schemas in declaration order.
        properties: Vec<(String, FieldSchema)>,
        /// Property names that must be present.
        #[serde(default)]
        required_properties: Vec<String>,
    },
    /// Accepts any value.
    Any {
        /// Whether a null or missing value is an issue.
        #[serde(default)]
        required: bool,
    },
}

impl FieldSchema {
    /// Creates a string rule.
    #[must_use]
    pub const fn string() -> Self {
        Self::String {
            required: false,
            min_length: None,
            max_length: None,
        }
    }

    /// Creates a UUID rule.
    #[must_use]
    pub const fn uuid() -> Self {
        Self::Uuid { required: false }
    }

    /// Creates an integer rule.
    #[must_use]
    pub const fn integer() -> Self {
        Self::Integer {
            required: false,
            minimum: None,
            maximum: None,
        }
    }

    /// Creates a boolean rule.
    #[must_use]
    pub const fn boolean() -> Self {
        Self::Boolean { required: false }
    }

    /// Creates an array rule with the given item schema.
    #[must_use]
    pub fn array(items: FieldSchema) -> Self {
        Self::Array {
            required: false,
            items: Box::new(items),
            min_items: None,
            max_items: None,
        }
    }

    /// Creates an object rule from `(name, schema)` pairs.
    ///
    /// Properties whose schema is marked required are also recorded as
    /// required property names.
    #[must_use]
    pub fn object(properties: Vec<(&str, FieldSchema)>) -> Self {
        let required_properties: Vec<String> = properties
            .iter()
            .filter(|(_, schema)| schema.is_required())
            .map(|(name, _)| (*name).to_string())
            .collect();

        Self::Object {
            required: false,
            properties: properties
                .into_iter()
                .map(|(name, schema)| (name.to_string(), schema))
                .collect(),
            required_properties,
        }
    }

    /// Creates a rule that accepts any value.
    #[must_use]
    pub const fn any() -> Self {
        Self::Any { required: false }
    }

    /// Marks this rule as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        *self.required_flag_mut() = true;
        self
    }

    /// Returns whether this rule rejects null and missing values.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        match self {
            Self::String { required, .. }
            | Self::Uuid { required, .. }
            | Self::Integer { required, .. }
            | Self::Boolean { required, .. }
            | Self::Array { required, .. }
            | Self::Object { required, .. }
            | Self::Any { required } => *required,
        }
    }

    /// Sets the minimum length for string rules.
    #[must_use]
    pub fn min_length(mut self, len: usize) -> Self {
        if let Self::String { min_length, .. } = &mut self {
            *min_length = Some(len);
        }
        self
    }

    /// Sets the maximum length for string rules.
    #[must_use]
    pub fn max_length(mut self, len: usize) -> Self {
        if let Self::String { max_length, .. } = &mut self {
            *max_length = Some(len);
        }
        self
    }

    /// Sets the minimum value for integer rules.
    #[must_use]
    pub fn minimum(mut self, min: i64) -> Self {
        if let Self::Integer { minimum, .. } = &mut self {
            *minimum = Some(min);
        }
        self
    }

    /// Sets the maximum value for integer rules.
    #[must_use]
    pub fn maximum(mut self, max: i64) -> Self {
        if let Self::Integer { maximum, .. } = &mut self {
            *maximum = Some(max);
        }
        self
    }

    /// Sets the minimum item count for array rules.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        if let Self::Array { min_items, .. } = &mut self {
            *min_items = Some(min);
        }
        self
    }

    /// Sets the maximum item count for array rules.
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        if let Self::Array { max_items, .. } = &mut self {
            *max_items = Some(max);
        }
        self
    }

    fn required_flag_mut(&mut self) -> &mut bool {
        match self {
            Self::String { required, .. }
            | Self::Uuid { required, .. }
            | Self::Integer { required, .. }
            | Self::Boolean { required, .. }
            | Self::Array { required, .. }
            | Self::Object { required, .. }
            | Self::Any { required } => required,
        }
    }

    fn check_at_path(&self, value: &serde_json::Value, path: &str, issues: &mut SchemaIssues) {
        // Null is only an issue for required rules.
        if value.is_null() {
            if self.is_required() {
                issues.push(SchemaIssue::new(path, "required field is null"));
            }
            return;
        }

        match self {
            Self::String {
                min_length,
                max_length,
                ..
            } => {
                let Some(s) = value.as_str() else {
                    issues.push(SchemaIssue::new(
                        path,
                        format!("expected string, got {}", value_type_name(value)),
                    ));
                    return;
                };
                if let Some(min) = min_length {
                    if s.len() < *min {
                        issues.push(SchemaIssue::new(
                            path,
                            format!("string length {} is less than minimum {min}", s.len()),
                        ));
                    }
                }
                if let Some(max) = max_length {
                    if s.len() > *max {
                        issues.push(SchemaIssue::new(
                            path,
                            format!("string length {} is greater than maximum {max}", s.len()),
                        ));
                    }
                }
            }

            Self::Uuid { .. } => {
                let Some(s) = value.as_str() else {
                    issues.push(SchemaIssue::new(
                        path,
                        format!("expected UUID string, got {}", value_type_name(value)),
                    ));
                    return;
                };
                if uuid::Uuid::parse_str(s).is_err() {
                    issues.push(SchemaIssue::new(path, format!("'{s}' is not a valid UUID")));
                }
            }

            Self::Integer {
                minimum, maximum, ..
            } => {
                let Some(n) = value.as_i64() else {
                    issues.push(SchemaIssue::new(
                        path,
                        format!("expected integer, got {}", value_type_name(value)),
                    ));
                    return;
                };
                if let Some(min) = minimum {
                    if n < *min {
                        issues.push(SchemaIssue::new(
                            path,
                            format!("value {n} is less than minimum {min}"),
                        ));
                    }
                }
                if let Some(max) = maximum {
                    if n > *max {
                        issues.push(SchemaIssue::new(
                            path,
                            format!("value {n} is greater than maximum {max}"),
                        ));
                    }
                }
            }

            Self::Boolean { .. } => {
                if !value.is_boolean() {
                    issues.push(SchemaIssue::new(
                        path,
                        format!("expected boolean, got {}", value_type_name(value)),
                    ));
                }
            }

            Self::Array {
                items,
                min_items,
                max_items,
                ..
            } => {
                let Some(arr) = value.as_array() else {
                    issues.push(SchemaIssue::new(
                        path,
                        format!("expected array, got {}", value_type_name(value)),
                    ));
                    return;
                };
                if let Some(min) = min_items {
                    if arr.len() < *min {
                        issues.push(SchemaIssue::new(
                            path,
                            format!("array length {} is less than minimum {min}", arr.len()),
                        ));
                    }
                }
                if let Some(max) = max_items {
                    if arr.len() > *max {
                        issues.push(SchemaIssue::new(
                            path,
                            format!("array length {} is greater than maximum {max}", arr.len()),
                        ));
                    }
                }
                for (idx, item) in arr.iter().enumerate() {
                    items.check_at_path(item, &format!("{path}[{idx}]"), issues);
                }
            }

            Self::Object {
                properties,
                required_properties,
                ..
            } => {
                let Some(obj) = value.as_object() else {
                    issues.push(SchemaIssue::new(
                        path,
                        format!("expected object, got {}", value_type_name(value)),
                    ));
                    return;
                };
                for required in required_properties {
                    if !obj.contains_key(required) {
                        issues.push(SchemaIssue::new(
                            format!("{path}.{required}"),
                            format!("missing required property '{required}'"),
                        ));
                    }
                }
                for (key, prop_schema) in properties {
                    if let Some(prop_value) = obj.get(key) {
                        prop_schema.check_at_path(prop_value, &format!("{path}.{key}"), issues);
                    }
                }
            }

            Self::Any { .. } => {}
        }
    }
}

impl Schema for FieldSchema {
    type Output = serde_json::Value;

    fn parse(&self, candidate: &serde_json::Value) -> Result<Self::Output, SchemaIssues> {
        let mut issues = SchemaIssues::new();
        self.check_at_path(candidate, "$", &mut issues);
        if issues.is_empty() {
            Ok(candidate.clone())
        } else {
            Err(issues)
        }
    }
}

/// Returns a human-readable name for a JSON value type.
fn value_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Schema that deserializes candidates into `T`.
///
/// Deserialization failures surface as a single issue at the root path
/// carrying serde's description of the mismatch.
pub struct TypedSchema<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    /// Creates a typed schema for `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypedSchema<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for TypedSchema<T> {}

impl<T> std::fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TypedSchema")
    }
}

impl<T> Schema for TypedSchema<T>
where
    T: serde::de::DeserializeOwned,
{
    type Output = T;

    fn parse(&self, candidate: &serde_json::Value) -> Result<Self::Output, SchemaIssues> {
        serde_json::from_value(candidate.clone())
            .map_err(|err| SchemaIssues::single("$", err.to_string()))
    }
}
