//! Repository contracts shared by both storage variants.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde_json::{Map, Value};

use crate::domain::{NewUser, Product, ProductDraft, PublicUser, StoredUser};

use super::Result;

/// Product persistence. Both variants behave identically to callers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a validated product and assign its identifier.
    async fn create(&self, draft: ProductDraft) -> Result<Product>;

    /// All products, in an order stable within one backend instance.
    async fn find_all(&self) -> Result<Vec<Product>>;

    /// Look up by identifier. A malformed id is "not found", never an error.
    async fn find_by_id(&self, id: &str) -> Result<Option<Product>>;

    /// Apply a patch and return the updated product. Identifier keys in the
    /// patch are ignored.
    async fn update(&self, id: &str, patch: Map<String, Value>) -> Result<Option<Product>>;

    /// Remove a product. Returns whether anything was deleted.
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// User persistence.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user (password already hashed).
    ///
    /// Uniqueness of the username is checked here, before anything is
    /// written; a taken name fails with [`super::RepositoryError::Conflict`].
    async fn create(&self, user: NewUser) -> Result<PublicUser>;

    /// Look up a user by username, hash included. The only operation allowed
    /// to return the password hash, since it feeds credential verification.
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>>;

    /// Look up the user for a login attempt.
    ///
    /// Lookup only: the bcrypt comparison against `raw_password` stays with
    /// the caller, keeping hashing concerns out of the storage layer.
    async fn verify_credentials(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<Option<StoredUser>>;
}
