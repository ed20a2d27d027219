//! Startup-time storage backend selection.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use super::jsonfile::{JsonFileProductRepository, JsonFileUserRepository, JsonStore};
use super::mongo::{MongoProductRepository, MongoUserRepository};
use super::{ProductRepository, Result, UserRepository};

/// Database name used when the MongoDB connection string does not carry one.
const DEFAULT_MONGO_DATABASE: &str = "producto_api";

/// Storage variant selector, parsed once from configuration.
///
/// Any other configured value is a fatal startup error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbProvider {
    Mongo,
    Json,
}

impl DbProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            DbProvider::Mongo => "mongo",
            DbProvider::Json => "json",
        }
    }
}

impl FromStr for DbProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" => Ok(DbProvider::Mongo),
            "json" => Ok(DbProvider::Json),
            other => Err(format!(
                "invalid DB_PROVIDER {other:?}: must be 'mongo' or 'json'"
            )),
        }
    }
}

/// The selected storage backend: both repositories plus the connection
/// handle needed for shutdown.
pub struct Backend {
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    mongo: Option<mongodb::Client>,
}

impl Backend {
    /// Connect or initialize the configured variant.
    ///
    /// MongoDB connects once here; the flat file is read (or created with
    /// the empty structure) here. Mixing variants within one process is not
    /// supported.
    pub async fn connect(
        provider: DbProvider,
        mongo_uri: &str,
        json_db_path: &Path,
    ) -> Result<Self> {
        match provider {
            DbProvider::Mongo => {
                let client = mongodb::Client::with_uri_str(mongo_uri).await?;
                let db = client
                    .default_database()
                    .unwrap_or_else(|| client.database(DEFAULT_MONGO_DATABASE));
                info!(database = %db.name(), "connected to MongoDB");

                Ok(Self {
                    products: Arc::new(MongoProductRepository::new(&db)),
                    users: Arc::new(MongoUserRepository::new(&db)),
                    mongo: Some(client),
                })
            }
            DbProvider::Json => {
                let store = JsonStore::open(json_db_path).await?;
                info!(path = %json_db_path.display(), "flat-file database ready");

                Ok(Self {
                    products: Arc::new(JsonFileProductRepository::new(store.clone())),
                    users: Arc::new(JsonFileUserRepository::new(store)),
                    mongo: None,
                })
            }
        }
    }

    /// Release the document-store connection. No-op for the flat file.
    pub async fn disconnect(self) {
        if let Some(client) = self.mongo {
            client.shutdown().await;
            info!("MongoDB connection released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_parsing() {
        assert_eq!("mongo".parse::<DbProvider>().unwrap(), DbProvider::Mongo);
        assert_eq!(" JSON ".parse::<DbProvider>().unwrap(), DbProvider::Json);
        assert!("postgres".parse::<DbProvider>().is_err());
    }

    #[tokio::test]
    async fn json_backend_serves_both_repositories_from_one_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");

        let backend = Backend::connect(DbProvider::Json, "", &path).await.unwrap();
        assert!(backend.mongo.is_none());

        // The file is created with the empty structure on first open.
        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("productos").unwrap().is_array());
        assert!(value.get("usuarios").unwrap().is_array());

        backend.disconnect().await;
    }
}
