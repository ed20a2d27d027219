//! Producto API
//!
//! Small REST backend exposing product CRUD, user registration/login, and a
//! CSV export of third-party album data.
//!
//! ## Modules
//!
//! - [`domain`] - Product and user entities with field validation
//! - [`infra`] - Storage backends (MongoDB, flat JSON file) behind one contract
//! - [`auth`] - Flexible authentication (API key, JWT, or either)
//! - [`albums`] - External album fetch and CSV rendering
//! - [`api`] - REST routes and error shaping
//! - [`server`] - Configuration, bootstrap, and graceful shutdown

pub mod albums;
pub mod api;
pub mod auth;
pub mod domain;
pub mod infra;
pub mod server;

// Re-export commonly used types
pub use domain::{NewUser, Product, ProductDraft, PublicUser, StoredUser};
pub use infra::{
    Backend, DbProvider, ProductRepository, RepositoryError, Result, UserRepository,
};
