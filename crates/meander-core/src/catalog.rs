//! Static catalog of failure definitions.
//!
//! Every failure surfaced by the platform is described by an
//! [`ErrorDefinition`]: a stable code, an HTTP status, and the public
//! message callers are allowed to see. Definitions are grouped by
//! [`ErrorFamily`] and referenced by the normalization and reporting
//! layers; nothing constructs ad-hoc codes at runtime.
//!
//! Codes are globally unique across families and form part of the
//! external contract together with the status mapping, so existing
//! entries must never be renumbered.

use serde::{Deserialize, Serialize};

/// Taxonomy family a failure definition belongs to.
///
/// The wire name (`AUTH_ERROR`, `VALIDATION_ERROR`, ...) is what shows up
/// in log records as the error `name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorFamily {
    /// Authentication and authorization failures.
    #[serde(rename = "AUTH_ERROR")]
    Auth,
    /// Input and payload validation failures.
    #[serde(rename = "VALIDATION_ERROR")]
    Validation,
    /// Plan, credit, and entitlement failures.
    #[serde(rename = "SUBSCRIPTION_ERROR")]
    Subscription,
    /// Missing, conflicting, or disallowed resources.
    #[serde(rename = "RESOURCE_ERROR")]
    Resource,
    /// Content generation backend failures.
    #[serde(rename = "GENERATION_ERROR")]
    Generation,
    /// Payment provider and webhook failures.
    #[serde(rename = "PAYMENT_ERROR")]
    Payment,
    /// Request throttling.
    #[serde(rename = "RATE_LIMIT_ERROR")]
    RateLimit,
    /// Infrastructure and unclassified failures.
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorFamily {
    /// Returns the wire name used in log records and diagnostics.
    #[must_use]
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::Auth => "AUTH_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::Subscription => "SUBSCRIPTION_ERROR",
            Self::Resource => "RESOURCE_ERROR",
            Self::Generation => "GENERATION_ERROR",
            Self::Payment => "PAYMENT_ERROR",
            Self::RateLimit => "RATE_LIMIT_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Returns all families, for exhaustiveness checks.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Auth,
            Self::Validation,
            Self::Subscription,
            Self::Resource,
            Self::Generation,
            Self::Payment,
            Self::RateLimit,
            Self::Internal,
        ]
    }
}

impl std::fmt::Display for ErrorFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// A static failure definition.
///
/// `message` is the public text: it is safe to return to callers verbatim
/// and is the only message that ever leaves the process in an error
/// envelope. Internal failure detail travels separately through
/// [`ErrorDetails`](crate::ErrorDetails) and is confined to logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ErrorDefinition {
    /// Family this definition belongs to.
    pub family: ErrorFamily,
    /// Stable machine-readable code, unique across the whole catalog.
    pub code: &'static str,
    /// HTTP status conveyed alongside the code.
    pub status: u16,
    /// Public, caller-safe message.
    pub message: &'static str,
}

impl ErrorDefinition {
    /// Returns the status as a typed [`http::StatusCode`].
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(self.status).unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Authentication and authorization.
pub mod auth {
    use super::{ErrorDefinition, ErrorFamily};

    /// No authenticated session was present on the request.
    pub const UNAUTHENTICATED: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Auth,
        code: "AUTH_001",
        status: 401,
        message: "Authentication required",
    };

    /// The caller is authenticated but lacks permission.
    pub const UNAUTHORIZED: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Auth,
        code: "AUTH_002",
        status: 403,
        message: "Not authorized to perform this action",
    };
}

/// Input validation.
pub mod validation {
    use super::{ErrorDefinition, ErrorFamily};

    /// A value failed a domain-level check outside schema parsing.
    pub const INVALID_INPUT: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Validation,
        code: "VAL_001",
        status: 400,
        message: "Invalid input provided",
    };

    /// A request slice was rejected by its schema.
    pub const SCHEMA_VALIDATION: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Validation,
        code: "VAL_002",
        status: 400,
        message: "Request payload validation failed",
    };
}

/// Plans, credits, and entitlements.
pub mod subscription {
    use super::{ErrorDefinition, ErrorFamily};

    /// The account has no payment details on file.
    pub const MISSING_PAYMENT_DETAILS: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Subscription,
        code: "SUB_001",
        status: 402,
        message: "Missing payment details",
    };

    /// The account balance cannot cover the operation.
    pub const INSUFFICIENT_CREDITS: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Subscription,
        code: "SUB_002",
        status: 402,
        message: "Insufficient credits",
    };

    /// The operation needs a higher plan tier.
    pub const PLAN_REQUIRED: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Subscription,
        code: "SUB_003",
        status: 402,
        message: "This feature requires an upgraded plan",
    };

    /// The plan lapsed and was not renewed.
    pub const PLAN_EXPIRED: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Subscription,
        code: "SUB_004",
        status: 402,
        message: "Subscription plan has expired",
    };
}

/// Resource lookup and lifecycle.
pub mod resource {
    use super::{ErrorDefinition, ErrorFamily};

    /// The addressed resource does not exist.
    pub const NOT_FOUND: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Resource,
        code: "RES_001",
        status: 404,
        message: "Requested resource not found",
    };

    /// The operation conflicts with existing state.
    pub const CONFLICT: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Resource,
        code: "RES_002",
        status: 409,
        message: "Resource conflict",
    };

    /// The resource exists but access is denied.
    ///
    /// Carries the same public text and status as [`NOT_FOUND`] so a denied
    /// resource reads like a missing one; only the code names the real
    /// cause.
    pub const NOT_ALLOWED: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Resource,
        code: "RES_003",
        status: 404,
        message: "Requested resource not found",
    };
}

/// Content generation backends.
pub mod generation {
    use super::{ErrorDefinition, ErrorFamily};

    /// The generation run produced no usable output.
    pub const FAILED: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Generation,
        code: "GEN_001",
        status: 500,
        message: "Content generation failed",
    };

    /// The caller supplied parameters the generator rejects.
    pub const INVALID_PARAMETERS: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Generation,
        code: "GEN_002",
        status: 400,
        message: "Invalid generation parameters",
    };

    /// The upstream model is unreachable or overloaded.
    pub const MODEL_UNAVAILABLE: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Generation,
        code: "GEN_003",
        status: 503,
        message: "Generation model temporarily unavailable",
    };

    /// A tool invoked during generation is unavailable.
    pub const TOOL_UNAVAILABLE: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Generation,
        code: "GEN_004",
        status: 503,
        message: "Generation tool temporarily unavailable",
    };
}

/// Payment provider integration.
pub mod payment {
    use super::{ErrorDefinition, ErrorFamily};

    /// A webhook arrived with a signature that does not verify.
    pub const WEBHOOK_SIGNATURE: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Payment,
        code: "PAY_001",
        status: 400,
        message: "Invalid payment webhook signature",
    };

    /// The provider declined or failed the payment.
    pub const PROCESSING_FAILED: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Payment,
        code: "PAY_002",
        status: 402,
        message: "Payment processing failed",
    };

    /// A verified webhook could not be applied.
    pub const WEBHOOK_PROCESSING: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Payment,
        code: "PAY_003",
        status: 500,
        message: "Payment webhook processing error",
    };
}

/// Request throttling.
pub mod rate_limit {
    use super::{ErrorDefinition, ErrorFamily};

    /// The caller exceeded its request budget.
    pub const TOO_MANY_REQUESTS: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::RateLimit,
        code: "RAT_001",
        status: 429,
        message: "Too many requests",
    };
}

/// Infrastructure and unclassified failures.
pub mod internal {
    use super::{ErrorDefinition, ErrorFamily};

    /// A storage operation failed.
    pub const STORAGE: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Internal,
        code: "INT_001",
        status: 500,
        message: "Storage operation failed",
    };

    /// A cache operation failed.
    pub const CACHE: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Internal,
        code: "INT_002",
        status: 500,
        message: "Cache operation failed",
    };

    /// Fallback for failures formatted without a more specific definition.
    pub const UNEXPECTED: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Internal,
        code: "INT_003",
        status: 500,
        message: "An unexpected error occurred",
    };

    /// An outbound message or notification could not be delivered.
    pub const MESSAGING: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Internal,
        code: "INT_004",
        status: 500,
        message: "Message delivery failed",
    };

    /// A fault escaped every stage and was caught by error containment.
    ///
    /// Same public text as [`UNEXPECTED`]; the code tells the two capture
    /// points apart in logs.
    pub const UNHANDLED: ErrorDefinition = ErrorDefinition {
        family: ErrorFamily::Internal,
        code: "INT_005",
        status: 500,
        message: "An unexpected error occurred",
    };
}

/// Every definition in the catalog, for governance checks.
pub const ALL: &[&ErrorDefinition] = &[
    &auth::UNAUTHENTICATED,
    &auth::UNAUTHORIZED,
    &validation::INVALID_INPUT,
    &validation::SCHEMA_VALIDATION,
    &subscription::MISSING_PAYMENT_DETAILS,
    &subscription::INSUFFICIENT_CREDITS,
    &subscription::PLAN_REQUIRED,
    &subscription::PLAN_EXPIRED,
    &resource::NOT_FOUND,
    &resource::CONFLICT,
    &resource::NOT_ALLOWED,
    &generation::FAILED,
    &generation::INVALID_PARAMETERS,
    &generation::MODEL_UNAVAILABLE,
    &generation::TOOL_UNAVAILABLE,
    &payment::WEBHOOK_SIGNATURE,
    &payment::PROCESSING_FAILED,
    &payment::WEBHOOK_PROCESSING,
    &rate_limit::TOO_MANY_REQUESTS,
    &internal::STORAGE,
    &internal::CACHE,
    &internal::UNEXPECTED,
    &internal::MESSAGING,
    &internal::UNHANDLED,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_globally_unique() {
        let mut seen = HashSet::new();
        for def in ALL {
            assert!(
                seen.insert(def.code),
                "duplicate catalog code: {}",
                def.code
            );
        }
    }

    #[test]
    fn test_all_statuses_are_valid_http() {
        for def in ALL {
            assert!(
                http::StatusCode::from_u16(def.status).is_ok(),
                "{} carries invalid status {}",
                def.code,
                def.status
            );
        }
    }

    #[test]
    fn test_family_status_conventions() {
        for def in ALL {
            let allowed: &[u16] = match def.family {
                ErrorFamily::Auth => &[401, 403],
                ErrorFamily::Validation => &[400],
                ErrorFamily::Subscription => &[402],
                ErrorFamily::Resource => &[404, 409],
                ErrorFamily::Generation => &[400, 500, 503],
                ErrorFamily::Payment => &[400, 402, 500],
                ErrorFamily::RateLimit => &[429],
                ErrorFamily::Internal => &[500, 503],
            };
            assert!(
                allowed.contains(&def.status),
                "{} carries status {} outside its family convention",
                def.code,
                def.status
            );
        }
    }

    #[test]
    fn test_code_prefix_matches_family() {
        for def in ALL {
            let prefix = match def.family {
                ErrorFamily::Auth => "AUTH_",
                ErrorFamily::Validation => "VAL_",
                ErrorFamily::Subscription => "SUB_",
                ErrorFamily::Resource => "RES_",
                ErrorFamily::Generation => "GEN_",
                ErrorFamily::Payment => "PAY_",
                ErrorFamily::RateLimit => "RAT_",
                ErrorFamily::Internal => "INT_",
            };
            assert!(
                def.code.starts_with(prefix),
                "{} does not match its family prefix {}",
                def.code,
                prefix
            );
        }
    }

    #[test]
    fn test_wire_names_follow_error_suffix() {
        for family in ErrorFamily::all() {
            assert!(family.wire_name().ends_with("_ERROR"));
        }
    }

    #[test]
    fn test_family_serializes_to_wire_name() {
        for family in ErrorFamily::all() {
            let json = serde_json::to_value(family).unwrap();
            assert_eq!(json, serde_json::json!(family.wire_name()));
        }
    }

    #[test]
    fn test_not_allowed_renders_as_not_found() {
        assert_eq!(resource::NOT_ALLOWED.message, resource::NOT_FOUND.message);
        assert_eq!(resource::NOT_ALLOWED.status, resource::NOT_FOUND.status);
        assert_ne!(resource::NOT_ALLOWED.code, resource::NOT_FOUND.code);
    }

    #[test]
    fn test_unhandled_shares_public_text_with_unexpected() {
        assert_eq!(internal::UNHANDLED.message, internal::UNEXPECTED.message);
        assert_ne!(internal::UNHANDLED.code, internal::UNEXPECTED.code);
    }

    #[test]
    fn test_status_code_helper_round_trips() {
        assert_eq!(
            auth::UNAUTHENTICATED.status_code(),
            http::StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            rate_limit::TOO_MANY_REQUESTS.status_code(),
            http::StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_catalog_inventory_is_complete() {
        // One entry per family at minimum, 24 definitions total.
        assert_eq!(ALL.len(), 24);
        let families: HashSet<_> = ALL.iter().map(|d| d.family).collect();
        assert_eq!(families.len(), ErrorFamily::all().len());
    }
}
