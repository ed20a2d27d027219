//! User repository backed by a MongoDB collection.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use crate::domain::{NewUser, PublicUser, StoredUser};
use crate::infra::{RepositoryError, Result, UserRepository};

const COLLECTION: &str = "usuarios";

/// Wire form of a user document. The `_id` is absent on insert and assigned
/// by the store.
#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    username: String,
    password: String,
    #[serde(rename = "createdAt")]
    created_at: String,
}

impl UserDocument {
    fn into_stored(self) -> StoredUser {
        StoredUser {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            username: self.username,
            password: self.password,
            created_at: self.created_at,
        }
    }
}

pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: NewUser) -> Result<PublicUser> {
        let existing = self
            .collection
            .find_one(doc! { "username": &user.username })
            .await?;
        if existing.is_some() {
            return Err(RepositoryError::Conflict);
        }

        let document = UserDocument {
            id: None,
            username: user.username,
            password: user.password_hash,
            created_at: user.created_at,
        };
        let inserted = self.collection.insert_one(&document).await?;

        let id = match inserted.inserted_id.as_object_id() {
            Some(oid) => oid.to_hex(),
            None => inserted.inserted_id.to_string(),
        };
        Ok(PublicUser {
            id,
            username: document.username,
            created_at: document.created_at,
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>> {
        let found = self.collection.find_one(doc! { "username": username }).await?;
        Ok(found.map(UserDocument::into_stored))
    }

    async fn verify_credentials(
        &self,
        username: &str,
        _raw_password: &str,
    ) -> Result<Option<StoredUser>> {
        // The hash comparison happens in the controller; this is a lookup.
        self.find_by_username(username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_form_renders_object_id_as_hex() {
        let oid = ObjectId::new();
        let document = UserDocument {
            id: Some(oid),
            username: "ana".to_string(),
            password: "$2b$12$hash".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };

        let stored = document.into_stored();
        assert_eq!(stored.id, oid.to_hex());
        assert_eq!(stored.username, "ana");
    }

    #[test]
    fn unsaved_documents_skip_the_id_field() {
        let document = UserDocument {
            id: None,
            username: "ana".to_string(),
            password: "h".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };

        let value = serde_json::to_value(&document).unwrap();
        assert!(value.get("_id").is_none());
        assert_eq!(value["createdAt"], "2026-01-01T00:00:00Z");
    }
}
