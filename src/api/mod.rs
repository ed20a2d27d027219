//! REST surface for producto-api
//!
//! Routes under `/api/v1`, the root health check, and the uniform
//! `{statusCode, error}` error shape.

mod error;
mod rest;
mod types;

pub use error::ApiError;
pub use rest::{fallback, health, router};
pub use types::{
    CredentialsRequest, HealthResponse, LoginResponse, MessageResponse, RegisterResponse,
};
