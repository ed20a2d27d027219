//! Storage backends for producto-api
//!
//! Two interchangeable variants satisfy the same repository contract:
//!
//! - [`mongo`] - MongoDB document store (native ObjectId identifiers)
//! - [`jsonfile`] - one flat JSON file mirrored to disk on every mutation
//!
//! The factory selects a variant once at startup; both repositories always
//! come from the same variant.

mod error;
mod factory;
pub mod jsonfile;
pub mod mongo;
mod traits;

pub use error::{RepositoryError, Result};
pub use factory::{Backend, DbProvider};
pub use jsonfile::{JsonFileProductRepository, JsonFileUserRepository, JsonStore};
pub use mongo::{MongoProductRepository, MongoUserRepository};
pub use traits::{ProductRepository, UserRepository};

#[cfg(test)]
pub use traits::{MockProductRepository, MockUserRepository};
