//! Flat-file storage variant.
//!
//! The whole dataset lives in one JSON document held in memory behind an
//! async lock and mirrored to disk on every mutation. Both repositories
//! share the same store. Writes go through a temp file and an atomic rename
//! so a crash mid-write never leaves a half-written database; concurrent
//! mutations are last-writer-wins, an accepted limitation for the
//! low-concurrency deployments this variant targets.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::domain::{sanitize_patch, NewUser, Product, ProductDraft, PublicUser, StoredUser};
use crate::infra::{ProductRepository, RepositoryError, Result, UserRepository};

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Database {
    #[serde(default)]
    productos: Vec<Product>,
    #[serde(default)]
    usuarios: Vec<StoredUser>,
}

/// Shared in-memory store backing both flat-file repositories.
pub struct JsonStore {
    path: PathBuf,
    data: RwLock<Database>,
}

impl JsonStore {
    /// Read the database file, creating it with the empty structure when it
    /// does not exist yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Arc<Self>> {
        let path = path.into();

        let (data, created) = match tokio::fs::read(&path).await {
            Ok(bytes) => (serde_json::from_slice(&bytes)?, false),
            Err(e) if e.kind() == ErrorKind::NotFound => (Database::default(), true),
            Err(e) => return Err(e.into()),
        };

        let store = Self {
            path,
            data: RwLock::new(data),
        };
        if created {
            let data = store.data.read().await;
            store.persist(&data).await?;
        }

        Ok(Arc::new(store))
    }

    /// Serialize the full document and atomically replace the file.
    async fn persist(&self, data: &Database) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Locally generated identifier: base36 millisecond timestamp plus a random
/// base36 suffix. Collisions are not formally prevented, just
/// astronomically unlikely.
fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().unsigned_abs();
    let suffix: u64 = rand::thread_rng().gen();
    format!("{}{}", to_base36(millis), to_base36(suffix))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

pub struct JsonFileProductRepository {
    store: Arc<JsonStore>,
}

impl JsonFileProductRepository {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProductRepository for JsonFileProductRepository {
    async fn create(&self, draft: ProductDraft) -> Result<Product> {
        let mut data = self.store.data.write().await;

        let product = draft.into_product(generate_id());
        data.productos.push(product.clone());
        self.store.persist(&data).await?;
        Ok(product)
    }

    async fn find_all(&self) -> Result<Vec<Product>> {
        Ok(self.store.data.read().await.productos.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        let data = self.store.data.read().await;
        Ok(data.productos.iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, id: &str, patch: Map<String, Value>) -> Result<Option<Product>> {
        let mut data = self.store.data.write().await;

        let Some(product) = data.productos.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        for (key, value) in sanitize_patch(patch) {
            match key.as_str() {
                "name" => {
                    if let Value::String(name) = value {
                        product.name = name;
                    }
                }
                "price" => {
                    if let Some(price) = value.as_f64() {
                        product.price = price;
                    }
                }
                _ => {
                    product.extra.insert(key, value);
                }
            }
        }

        let updated = product.clone();
        self.store.persist(&data).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut data = self.store.data.write().await;

        let before = data.productos.len();
        data.productos.retain(|p| p.id != id);
        if data.productos.len() == before {
            return Ok(false);
        }

        self.store.persist(&data).await?;
        Ok(true)
    }
}

pub struct JsonFileUserRepository {
    store: Arc<JsonStore>,
}

impl JsonFileUserRepository {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for JsonFileUserRepository {
    async fn create(&self, user: NewUser) -> Result<PublicUser> {
        let mut data = self.store.data.write().await;

        if data.usuarios.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict);
        }

        let stored = StoredUser {
            id: generate_id(),
            username: user.username,
            password: user.password_hash,
            created_at: user.created_at,
        };
        let public = stored.public();
        data.usuarios.push(stored);

        self.store.persist(&data).await?;
        Ok(public)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>> {
        let data = self.store.data.read().await;
        Ok(data.usuarios.iter().find(|u| u.username == username).cloned())
    }

    async fn verify_credentials(
        &self,
        username: &str,
        _raw_password: &str,
    ) -> Result<Option<StoredUser>> {
        self.find_by_username(username).await
    }
}
