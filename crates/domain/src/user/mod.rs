//! User entity and service.

mod service;

pub use service::UserService;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use common::UserId;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_.+-]+@[A-Za-z0-9-]+\.[A-Za-z0-9-.]+$")
        .expect("email pattern must compile")
});

/// Errors that can occur during user construction.
#[derive(Debug, Error)]
pub enum UserError {
    /// Email is empty or does not match the expected pattern.
    #[error("Invalid email: {email:?}")]
    InvalidEmail { email: String },
}

/// A registered user.
///
/// Immutable after registration; no update operations exist in this
/// core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,

    /// Email address, validated at construction. Uniqueness is
    /// enforced by the service via a repository lookup.
    pub email: String,

    /// Display name, may be empty.
    pub name: String,

    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user, validating the email format.
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Result<Self, UserError> {
        let email = email.into();
        if email.is_empty() || !EMAIL_PATTERN.is_match(&email) {
            return Err(UserError::InvalidEmail { email });
        }

        Ok(Self {
            id: UserId::new(),
            email,
            name: name.into(),
            created_at: Utc::now(),
        })
    }

    /// Reconstructs a user from stored state without validation.
    ///
    /// Only for storage adapters; stored rows were valid when written.
    pub fn from_parts(
        id: UserId,
        email: String,
        name: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            name,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_with_valid_email() {
        let user = User::new("alice@example.com", "Alice").unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn test_empty_name_is_allowed() {
        let user = User::new("bob@example.com", "").unwrap();
        assert_eq!(user.name, "");
    }

    #[test]
    fn test_empty_email_fails() {
        assert!(matches!(
            User::new("", "Alice"),
            Err(UserError::InvalidEmail { .. })
        ));
    }

    #[test]
    fn test_malformed_emails_fail() {
        for email in ["no-at-sign", "missing@tld", "@example.com", "a b@example.com"] {
            assert!(
                matches!(User::new(email, ""), Err(UserError::InvalidEmail { .. })),
                "expected {email:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_plus_and_dots_are_accepted() {
        for email in ["a.b+tag@example.com", "user_name@sub.example.co.uk"] {
            assert!(User::new(email, "").is_ok(), "expected {email:?} to pass");
        }
    }

    #[test]
    fn test_from_parts_skips_validation() {
        // A row stored under laxer rules must still load.
        let user = User::from_parts(
            UserId::new(),
            "not-an-email".to_string(),
            String::new(),
            Utc::now(),
        );
        assert_eq!(user.email, "not-an-email");
    }
}
