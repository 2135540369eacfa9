//! Cache module
//!
//! Keeps downloaded specification documents on disk so a remote spec is not
//! fetched again on every start. The cache is best-effort: a broken or
//! unwritable cache never prevents a successful download from being used.

pub mod disk;

pub use disk::{CacheMetadata, DiskCache};

use crate::error::{Error, Result};
use crate::utils::HttpClientBuilder;
use std::path::PathBuf;
use std::time::Duration;

/// Default time-to-live of cached documents (24 hours)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

/// Directory name used under the home directory when none is configured
pub const DEFAULT_CACHE_DIR_NAME: &str = ".openapi-mcp-cache";

/// Cache configuration
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory (defaults to `~/.openapi-mcp-cache`)
    pub directory: Option<String>,

    /// Time-to-live of cached documents (seconds)
    pub ttl_secs: u64,

    /// Timeout of a live download (seconds)
    pub download_timeout_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: None,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            download_timeout_secs: 30,
        }
    }
}

impl CacheConfig {
    /// Directory the cache artifacts live in
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        match &self.directory {
            Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_cache_dir(),
        }
    }

    /// Time-to-live as a [`Duration`]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Default cache directory under the user's home directory
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CACHE_DIR_NAME)
}

/// Fetch-through cache for remote documents
pub struct ContentCache {
    disk: DiskCache,
    client: reqwest::Client,
}

impl ContentCache {
    /// Create a content cache from configuration
    pub fn new(config: &CacheConfig) -> Result<Self> {
        let client = HttpClientBuilder::new()
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()?;
        Ok(Self::with_client(
            DiskCache::new(config.resolved_dir(), config.ttl()),
            client,
        ))
    }

    /// Create a content cache with an explicit HTTP client
    #[must_use]
    pub fn with_client(disk: DiskCache, client: reqwest::Client) -> Self {
        Self { disk, client }
    }

    /// Underlying artifact store
    #[must_use]
    pub fn disk(&self) -> &DiskCache {
        &self.disk
    }

    /// Return the document at `url`, from disk when a fresh copy exists.
    ///
    /// Fails only when there is no fresh cached copy and the download fails.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let cache_usable = match self.disk.ensure_dir().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("{}", e);
                false
            }
        };

        if cache_usable {
            if let Some(data) = self.disk.load_fresh(url).await {
                tracing::info!(
                    "Using cached OpenAPI spec from {}",
                    self.disk.data_path(url).display()
                );
                return Ok(data);
            }
        }

        tracing::info!("Downloading OpenAPI spec from {}", url);
        let data = self.download(url).await?;

        if cache_usable {
            match self.disk.store(url, &data).await {
                Ok(_) => tracing::info!("Downloaded and cached OpenAPI spec from {}", url),
                Err(e) => tracing::warn!("Failed to save to cache: {}", e),
            }
        }

        Ok(data)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Download(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download(format!("{url}: HTTP {}", status.as_u16())));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Download(format!("failed to read response body: {e}")))?;
        Ok(body.to_vec())
    }
}
