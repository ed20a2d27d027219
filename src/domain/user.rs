//! User entity and validation.
//!
//! The password travels as a bcrypt hash from the moment registration input
//! is validated; only [`StoredUser`] ever carries it, and it never appears in
//! an API response.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Minimum username length accepted at registration.
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum raw password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// A user as persisted by a storage backend.
///
/// The only type allowed to carry the password hash; it feeds credential
/// verification and nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: String,
    pub username: String,
    /// bcrypt hash, never the raw password.
    pub password: String,
    pub created_at: String,
}

impl StoredUser {
    /// Public form: what API responses carry. No password field.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// A user record with sensitive fields stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

/// Validated registration input, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// bcrypt hash of the raw password.
    pub password_hash: String,
    pub created_at: String,
}

impl NewUser {
    pub fn new(username: &str, password_hash: String) -> Self {
        Self {
            username: username.to_string(),
            password_hash,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Validate raw registration input, collecting every violated rule.
pub fn validate_credentials(username: &str, password: &str) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if username.trim().is_empty() {
        errors.push("field \"username\" is required and cannot be empty".to_string());
    } else if username.chars().count() < MIN_USERNAME_LEN {
        errors.push(format!(
            "field \"username\" must be at least {MIN_USERNAME_LEN} characters"
        ));
    }

    if password.trim().is_empty() {
        errors.push("field \"password\" is required and cannot be empty".to_string());
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!(
            "field \"password\" must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_credentials_pass() {
        assert!(validate_credentials("ana", "secret1").is_ok());
    }

    #[test]
    fn short_values_collected_together() {
        let errors = validate_credentials("ab", "12345").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("at least 3"));
        assert!(errors[1].contains("at least 6"));
    }

    #[test]
    fn blank_values_reported_as_required() {
        let errors = validate_credentials("  ", "").unwrap_err();
        assert!(errors.iter().all(|e| e.contains("required")));
    }

    #[test]
    fn public_form_has_no_password() {
        let stored = StoredUser {
            id: "u1".into(),
            username: "ana".into(),
            password: "$2b$10$hash".into(),
            created_at: "2024-01-01T00:00:00Z".into(),
        };

        let value = serde_json::to_value(stored.public()).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value.get("username"), Some(&serde_json::json!("ana")));
        assert!(value.get("createdAt").is_some());
    }
}
