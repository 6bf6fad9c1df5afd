//! Caller identity types.
//!
//! The authentication stage resolves a [`Session`] through an external
//! collaborator and forwards the contained [`AuthenticatedUser`] to later
//! stages and the handler.

use serde::{Deserialize, Serialize};

/// The user an authenticated session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    /// Stable user identifier.
    pub id: String,
    /// Primary email, when the identity provider shares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name, when the identity provider shares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AuthenticatedUser {
    /// Creates a user with only an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }

    /// Returns a new user with the given email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns a new user with the given display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A resolved authentication session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The user the session was issued to.
    pub user: AuthenticatedUser,
}

impl Session {
    /// Creates a session for the given user.
    #[must_use]
    pub const fn new(user: AuthenticatedUser) -> Self {
        Self { user }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_builder() {
        let user = AuthenticatedUser::new("user-7")
            .with_email("a@example.com")
            .with_name("Alice");

        assert_eq!(user.id, "user-7");
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
        assert_eq!(user.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_user_serialization_omits_absent_fields() {
        let user = AuthenticatedUser::new("user-7");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, serde_json::json!({ "id": "user-7" }));
    }

    #[test]
    fn test_session_wraps_user() {
        let session = Session::new(AuthenticatedUser::new("user-7"));
        assert_eq!(session.user.id, "user-7");
    }
}
