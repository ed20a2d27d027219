//! Shared-secret API key verification.

use super::AuthError;

/// Verifies presented API keys against the single configured shared secret.
#[derive(Debug, Clone)]
pub struct ApiKeyVerifier {
    secret: String,
}

impl ApiKeyVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Check a presented key against the configured secret.
    pub fn verify(&self, presented: &str) -> Result<(), AuthError> {
        if !self.secret.is_empty() && presented == self.secret {
            Ok(())
        } else {
            Err(AuthError::InvalidApiKey)
        }
    }
}
