//! Authentication for producto-api
//!
//! Three strategies gate the mutating product routes, selected once at
//! startup:
//!
//! - **api-key**: a shared secret in the `x-api-key` header
//! - **jwt**: `Authorization: Bearer <token>` signed at login
//! - **both**: either of the above, API key checked first
//!
//! Each strategy is a pure function over the request headers (see
//! [`middleware`]), so they stay unit-testable in isolation.

mod api_key;
mod jwt;
mod middleware;
mod password;

pub use api_key::ApiKeyVerifier;
pub use jwt::{Claims, JwtVerifier};
pub use middleware::{auth_middleware, authenticate, AuthMethod, AuthState, API_KEY_HEADER};
pub use password::{hash_password, verify_password};

use axum::http::StatusCode;
use thiserror::Error;

/// Resolved, request-scoped identity.
///
/// Lives in the request extensions for the duration of one request; never
/// persisted.
#[derive(Debug, Clone)]
pub enum Identity {
    ApiKey { key: String },
    Jwt { user_id: String, username: String },
}

/// Authentication failures and their HTTP mapping.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("the x-api-key header is required")]
    MissingApiKey,

    #[error("invalid API key")]
    InvalidApiKey,

    #[error("the Authorization header is required")]
    MissingAuthorization,

    #[error("invalid Authorization format, expected: Bearer <token>")]
    MalformedAuthorization,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("authentication required: provide x-api-key or Authorization: Bearer <token>")]
    MissingCredentials,
}

impl AuthError {
    /// A present-but-wrong secret is forbidden; everything else is
    /// unauthorized.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidApiKey => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}
