//! Third-party album export.
//!
//! Fetches album data from the external JSON API and renders the first 15
//! records as CSV for download.

mod csv;

pub use csv::to_csv;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of albums included in the export.
pub const EXPORT_LIMIT: usize = 15;

/// Columns included in the export, in order.
pub const EXPORT_COLUMNS: [&str; 3] = ["userId", "id", "title"];

/// An album record as served by the external API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Error)]
pub enum AlbumsError {
    #[error("failed to fetch albums from the external API: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// HTTP client for the external albums API.
pub struct AlbumsClient {
    http: reqwest::Client,
    url: String,
}

impl AlbumsClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Fetch all albums and keep only the first `limit`.
    pub async fn fetch_first(&self, limit: usize) -> Result<Vec<Album>, AlbumsError> {
        let mut albums: Vec<Album> = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        albums.truncate(limit);
        Ok(albums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn album_parses_external_field_names() {
        let album: Album =
            serde_json::from_str(r#"{"userId": 1, "id": 7, "title": "quidem molestiae"}"#).unwrap();
        assert_eq!(
            album,
            Album {
                user_id: 1,
                id: 7,
                title: "quidem molestiae".to_string()
            }
        );
    }
}
