//! Read-through image cache.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::path::entry_path;
use crate::Error;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Something that can fetch a remote image and encode it as a data URI.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_and_encode(&self, endpoint: &str) -> Result<String, Error>;
}

/// Handle to the on-disk image cache.
#[derive(Debug, Clone)]
pub struct ImageCache {
    root: PathBuf,
}

impl ImageCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the cached data URI for `cache_key`/`filename`, or fetch it.
    ///
    /// A readable entry is returned as-is without touching the network. A
    /// missing or unreadable entry falls through to `source`, whose result is
    /// returned unchanged. Nothing is written back here; see [`Self::store`].
    pub async fn resolve<S>(&self, source: &S, endpoint: &str, cache_key: &str, filename: &str) -> Result<String, Error>
    where
        S: ImageSource + ?Sized,
    {
        let path = entry_path(&self.root, cache_key, filename)?;

        if let Some(data_uri) = read_entry(&path).await {
            tracing::info!(image_id = cache_key, file_name = filename, "retrieved image from the cache");
            return Ok(data_uri);
        }

        let data_uri = source.fetch_and_encode(endpoint).await?;

        tracing::info!(image_id = cache_key, file_name = filename, "retrieved image from the network");

        Ok(data_uri)
    }

    /// Whether an entry exists for `cache_key`/`filename`.
    ///
    /// Invalid keys are reported as absent.
    pub async fn contains(&self, cache_key: &str, filename: &str) -> bool {
        match entry_path(&self.root, cache_key, filename) {
            Ok(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Persist a data URI under `cache_key`/`filename`.
    ///
    /// The entry is written to a temporary sibling and renamed into place, so
    /// a concurrent `resolve` sees either the old entry or the complete new one.
    pub async fn store(&self, cache_key: &str, filename: &str, data_uri: &str) -> Result<PathBuf, Error> {
        let path = entry_path(&self.root, cache_key, filename)?;
        let dir = self.root.join(cache_key);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Cache(format!("failed to create {}: {e}", dir.display())))?;

        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = dir.join(format!(".{filename}.{}.{seq}.tmp", std::process::id()));

        tokio::fs::write(&tmp, data_uri)
            .await
            .map_err(|e| Error::Cache(format!("failed to write {}: {e}", tmp.display())))?;

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::Cache(format!("failed to move entry into {}: {e}", path.display())));
        }

        tracing::debug!(path = %path.display(), bytes = data_uri.len(), "stored image in the cache");

        Ok(path)
    }
}

async fn read_entry(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Some(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unable to read cached image");
            None
        }
    }
}
