//! On-disk cache artifacts
//!
//! Every cached URL owns two files named after the hex SHA-256 digest of the
//! URL: `<key>.json` holds the downloaded bytes and `<key>.meta.json` holds a
//! small JSON record with the source URL, capture time and expiration time.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Metadata stored next to every cached document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// Source URL
    pub url: String,

    /// Time the document was downloaded
    pub cached_at: DateTime<Utc>,

    /// Time after which the entry is stale
    pub expiration: DateTime<Utc>,
}

impl CacheMetadata {
    /// Create metadata for a document captured at `cached_at`
    #[must_use]
    pub fn new(url: &str, cached_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expiration = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| cached_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            url: url.to_string(),
            cached_at,
            expiration,
        }
    }

    /// Check whether the entry is still valid at `now`
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expiration
    }
}

/// Directory of cache artifacts with a fixed time-to-live
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    ttl: Duration,
}

impl DiskCache {
    /// Create a cache rooted at `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    /// Cache directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Time-to-live of new entries
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache key of a URL: hex SHA-256 of the URL string
    #[must_use]
    pub fn key_for(url: &str) -> String {
        hex::encode(Sha256::digest(url.as_bytes()))
    }

    /// Path of the data artifact for `url`
    #[must_use]
    pub fn data_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key_for(url)))
    }

    /// Path of the metadata artifact for `url`
    #[must_use]
    pub fn metadata_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.meta.json", Self::key_for(url)))
    }

    /// Create the cache directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::Cache(format!(
                "failed to create cache directory {}: {e}",
                self.dir.display()
            ))
        })
    }

    /// Read the cached bytes for `url` if a fresh entry exists.
    ///
    /// Missing files, unparsable metadata and expired entries all count as a
    /// miss.
    pub async fn load_fresh(&self, url: &str) -> Option<Vec<u8>> {
        let metadata = self.read_metadata(url).await?;
        if !metadata.is_fresh_at(Utc::now()) {
            tracing::debug!("Cache entry for {} expired at {}", url, metadata.expiration);
            return None;
        }

        tokio::fs::read(self.data_path(url)).await.ok()
    }

    /// Read and parse the metadata artifact for `url`
    pub async fn read_metadata(&self, url: &str) -> Option<CacheMetadata> {
        let raw = tokio::fs::read(self.metadata_path(url)).await.ok()?;
        match serde_json::from_slice(&raw) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::debug!("Ignoring corrupt cache metadata for {}: {}", url, e);
                None
            }
        }
    }

    /// Write the data and metadata artifacts for `url`, captured now
    pub async fn store(&self, url: &str, data: &[u8]) -> Result<CacheMetadata> {
        let data_path = self.data_path(url);
        tokio::fs::write(&data_path, data).await.map_err(|e| {
            Error::Cache(format!("failed to write {}: {e}", data_path.display()))
        })?;

        let metadata = CacheMetadata::new(url, Utc::now(), self.ttl);
        self.write_metadata(&metadata).await?;
        Ok(metadata)
    }

    /// Overwrite the metadata artifact of an entry
    pub async fn write_metadata(&self, metadata: &CacheMetadata) -> Result<()> {
        let meta_path = self.metadata_path(&metadata.url);
        let raw = serde_json::to_vec_pretty(metadata)?;
        tokio::fs::write(&meta_path, raw).await.map_err(|e| {
            Error::Cache(format!("failed to write {}: {e}", meta_path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/openapi.yaml";

    #[test]
    fn test_key_is_sha256_hex_of_url() {
        let key = DiskCache::key_for(URL);
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, DiskCache::key_for(URL));
        assert_ne!(key, DiskCache::key_for("https://example.com/other.yaml"));
        assert_eq!(
            DiskCache::key_for(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_artifact_names() {
        let cache = DiskCache::new("/tmp/cache", Duration::from_secs(60));
        let key = DiskCache::key_for(URL);
        assert_eq!(cache.data_path(URL), Path::new("/tmp/cache").join(format!("{key}.json")));
        assert_eq!(
            cache.metadata_path(URL),
            Path::new("/tmp/cache").join(format!("{key}.meta.json"))
        );
    }

    #[test]
    fn test_metadata_expiration() {
        let now = Utc::now();
        let metadata = CacheMetadata::new(URL, now, Duration::from_secs(3600));
        assert_eq!(metadata.expiration - metadata.cached_at, chrono::Duration::hours(1));
        assert!(metadata.is_fresh_at(now));
        assert!(!metadata.is_fresh_at(now + chrono::Duration::hours(2)));

        let huge = CacheMetadata::new(URL, now, Duration::from_secs(u64::MAX));
        assert_eq!(huge.expiration, DateTime::<Utc>::MAX_UTC);
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), Duration::from_secs(60));

        assert!(cache.load_fresh(URL).await.is_none());

        let metadata = cache.store(URL, b"openapi: 3.0.0").await.unwrap();
        assert_eq!(metadata.url, URL);
        assert_eq!(cache.load_fresh(URL).await.unwrap(), b"openapi: 3.0.0");
        assert_eq!(cache.read_metadata(URL).await.unwrap(), metadata);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), Duration::from_secs(60));
        let mut metadata = cache.store(URL, b"data").await.unwrap();

        metadata.expiration = Utc::now() - chrono::Duration::minutes(1);
        cache.write_metadata(&metadata).await.unwrap();

        assert!(cache.load_fresh(URL).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_or_missing_artifacts_are_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), Duration::from_secs(60));

        cache.store(URL, b"data").await.unwrap();
        std::fs::write(cache.metadata_path(URL), b"{not json").unwrap();
        assert!(cache.load_fresh(URL).await.is_none());

        cache.store(URL, b"data").await.unwrap();
        std::fs::remove_file(cache.data_path(URL)).unwrap();
        assert!(cache.load_fresh(URL).await.is_none());
    }

    #[tokio::test]
    async fn test_metadata_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), Duration::from_secs(60));
        cache.store(URL, b"data").await.unwrap();

        let raw = std::fs::read_to_string(cache.metadata_path(URL)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["url"], URL);
        assert!(value["cached_at"].is_string());
        assert!(value["expiration"].is_string());
        assert!(raw.contains("\n  \"url\""));
    }
}
