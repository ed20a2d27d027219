//! MongoDB storage variant.
//!
//! Identifiers are the store's native `ObjectId` rendered as hex. A
//! syntactically invalid id from a client can never match a document, so it
//! is normalized to "not found" instead of surfacing a driver error.

mod products;
mod users;

pub use products::MongoProductRepository;
pub use users::MongoUserRepository;

use mongodb::bson::oid::ObjectId;

/// Parse a client-supplied id. `None` means the id cannot possibly exist.
fn parse_object_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}
