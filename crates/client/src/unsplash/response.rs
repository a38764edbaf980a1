//! Unsplash API response types.
//!
//! Only the fields the relay reads are typed. Everything else is kept in
//! `extra` so responses are passed to the extension unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A photo as returned by `/photos/random` and `/search/photos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub urls: PhotoUrls,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Image URLs of a photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoUrls {
    pub raw: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result page of `/search/photos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResults {
    pub total: u64,
    pub total_pages: u64,
    pub results: Vec<Photo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `/photos/{id}/download`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadLink {
    pub url: String,
}
