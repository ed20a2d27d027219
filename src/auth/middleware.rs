//! Flexible per-request authentication gate.
//!
//! The strategy is fixed for the process lifetime (parsed once from
//! configuration); each request is resolved by a pure function over its
//! headers so every strategy can be tested in isolation. On success the
//! resolved [`Identity`] is attached to the request extensions.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::ApiError;

use super::{ApiKeyVerifier, AuthError, Claims, Identity, JwtVerifier};

/// Header carrying the shared API key secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authentication strategy, selected once at startup.
///
/// Any other configured value is a fatal startup error, not a per-request
/// condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    ApiKey,
    Jwt,
    Both,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::ApiKey => "api-key",
            AuthMethod::Jwt => "jwt",
            AuthMethod::Both => "both",
        }
    }
}

impl FromStr for AuthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api-key" => Ok(AuthMethod::ApiKey),
            "jwt" => Ok(AuthMethod::Jwt),
            "both" | "either" => Ok(AuthMethod::Both),
            other => Err(format!(
                "invalid AUTH_METHOD {other:?}: must be 'api-key', 'jwt' or 'both'"
            )),
        }
    }
}

/// State shared by the auth middleware across requests.
#[derive(Clone)]
pub struct AuthState {
    pub method: AuthMethod,
    pub api_key: Arc<ApiKeyVerifier>,
    pub jwt: Arc<JwtVerifier>,
}

/// Axum middleware applied to the mutating product routes.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(state.method, &state.api_key, &state.jwt, request.headers()) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Resolve an identity from request headers under the configured strategy.
pub fn authenticate(
    method: AuthMethod,
    api_key: &ApiKeyVerifier,
    jwt: &JwtVerifier,
    headers: &HeaderMap,
) -> Result<Identity, AuthError> {
    match method {
        AuthMethod::ApiKey => authenticate_api_key(api_key, headers),
        AuthMethod::Jwt => authenticate_jwt(jwt, headers),
        AuthMethod::Both => authenticate_either(api_key, jwt, headers),
    }
}

fn api_key_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
}

fn authenticate_api_key(
    verifier: &ApiKeyVerifier,
    headers: &HeaderMap,
) -> Result<Identity, AuthError> {
    let key = api_key_header(headers).ok_or(AuthError::MissingApiKey)?;
    verifier.verify(key)?;
    Ok(Identity::ApiKey {
        key: key.to_string(),
    })
}

fn authenticate_jwt(verifier: &JwtVerifier, headers: &HeaderMap) -> Result<Identity, AuthError> {
    let header = authorization_header(headers).ok_or(AuthError::MissingAuthorization)?;
    let claims = verify_bearer(verifier, header)?;
    Ok(Identity::Jwt {
        user_id: claims.sub,
        username: claims.username,
    })
}

/// `Bearer <token>`: exactly two space-separated parts with the Bearer
/// scheme.
fn verify_bearer(verifier: &JwtVerifier, header: &str) -> Result<Claims, AuthError> {
    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] => verifier.validate(token),
        _ => Err(AuthError::MalformedAuthorization),
    }
}

fn authenticate_either(
    api_key: &ApiKeyVerifier,
    jwt: &JwtVerifier,
    headers: &HeaderMap,
) -> Result<Identity, AuthError> {
    // A present API key wins even when invalid: no fallthrough to JWT.
    if let Some(key) = api_key_header(headers) {
        api_key.verify(key)?;
        return Ok(Identity::ApiKey {
            key: key.to_string(),
        });
    }

    if authorization_header(headers).is_some() {
        return authenticate_jwt(jwt, headers);
    }

    Err(AuthError::MissingCredentials)
}
