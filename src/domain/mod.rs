//! Core domain types for producto-api
//!
//! Products and users, together with the field validation the controllers
//! run before anything reaches a storage backend.

mod product;
mod user;

pub use product::{sanitize_patch, validate_patch, Product, ProductDraft};
pub use user::{
    validate_credentials, NewUser, PublicUser, StoredUser, MIN_PASSWORD_LEN, MIN_USERNAME_LEN,
};
