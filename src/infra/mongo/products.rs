//! Product repository backed by a MongoDB collection.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::{sanitize_patch, Product, ProductDraft};
use crate::infra::{ProductRepository, Result};

use super::parse_object_id;

const COLLECTION: &str = "productos";

pub struct MongoProductRepository {
    collection: Collection<Document>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(COLLECTION),
        }
    }
}

/// Everything in a product document except the `_id`.
#[derive(Debug, Deserialize)]
struct ProductFields {
    name: String,
    price: f64,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn doc_to_product(mut doc: Document) -> Result<Product> {
    let id = match doc.remove("_id") {
        Some(Bson::ObjectId(oid)) => oid.to_hex(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    let fields: ProductFields = bson::from_document(doc)?;
    Ok(Product {
        id,
        name: fields.name,
        price: fields.price,
        extra: fields.extra,
    })
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    async fn create(&self, draft: ProductDraft) -> Result<Product> {
        let doc = bson::to_document(&draft)?;
        let inserted = self.collection.insert_one(doc).await?;

        let id = match inserted.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };
        Ok(draft.into_product(id))
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        let mut cursor = self.collection.find(doc! {}).await?;
        let mut products = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            products.push(doc_to_product(doc)?);
        }
        Ok(products)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };

        let found = self.collection.find_one(doc! { "_id": oid }).await?;
        found.map(doc_to_product).transpose()
    }

    async fn update(&self, id: &str, patch: Map<String, Value>) -> Result<Option<Product>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };

        let changes = bson::to_document(&sanitize_patch(patch))?;
        if changes.is_empty() {
            // Nothing to $set; an empty $set document is a driver error.
            return self.find_by_id(id).await;
        }

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await?;
        updated.map(doc_to_product).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(false);
        };

        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn document_mapping_renders_object_id_and_keeps_extra_fields() {
        let oid = ObjectId::new();
        let doc = doc! {
            "_id": oid,
            "name": "Monitor",
            "price": 199.5,
            "stock": 3,
        };

        let product = doc_to_product(doc).unwrap();
        assert_eq!(product.id, oid.to_hex());
        assert_eq!(product.name, "Monitor");
        assert_eq!(product.price, 199.5);
        assert_eq!(product.extra.get("stock"), Some(&serde_json::json!(3)));
    }
}
