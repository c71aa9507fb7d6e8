use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use image::DynamicImage;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::default_image_cache_dir;
use crate::error::{Error, Result};

/// Two-tier poster cache: memory (keyed by exact URL) in front of a
/// content-addressed disk tier, with a network fetch as the final fallback.
/// Configuration is injected at construction; there is no global state.
#[derive(Clone)]
pub struct ImageCache {
    cache_dir: PathBuf,
    enabled: bool,
    client: reqwest::Client,
    memory: Arc<Mutex<HashMap<String, Arc<DynamicImage>>>>,
}

impl ImageCache {
    /// Build a cache rooted at `directory` (or the default cache dir). An
    /// unusable custom directory falls back to the default; only failure to
    /// create the fallback is an error.
    pub fn new(directory: Option<PathBuf>, enabled: bool) -> Result<Self> {
        let fallback = default_image_cache_dir()?;
        let cache_dir = match directory {
            Some(custom) => match std::fs::create_dir_all(&custom) {
                Ok(()) => custom,
                Err(e) => {
                    warn!(
                        dir = %custom.display(),
                        "Cache directory unusable ({}), falling back to default", e
                    );
                    fallback
                }
            },
            None => fallback,
        };

        std::fs::create_dir_all(&cache_dir).map_err(|_| Error::CacheDir(cache_dir.clone()))?;

        Ok(Self {
            cache_dir,
            enabled,
            client: reqwest::Client::new(),
            memory: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Resolve a URL to a decoded image: memory tier, then disk tier, then
    /// network (populating both tiers on the way back). With caching
    /// disabled every call goes straight to the network and nothing is
    /// stored.
    pub async fn get(&self, url: &str) -> Result<Arc<DynamicImage>> {
        if !self.enabled {
            let bytes = self.fetch(url).await?;
            return Ok(Arc::new(image::load_from_memory(&bytes)?));
        }

        if let Some(img) = self.memory_get(url) {
            return Ok(img);
        }

        let path = self.cache_dir.join(cache_file_name(url));

        if path.exists() {
            let bytes = fs::read(&path).await?;
            let img = Arc::new(image::load_from_memory(&bytes)?);
            self.memory_insert(url, img.clone());
            debug!(url, "Poster loaded from disk cache");
            return Ok(img);
        }

        let bytes = self.fetch(url).await?;
        self.write_atomic(&path, &bytes).await?;
        let img = Arc::new(image::load_from_memory(&bytes)?);
        self.memory_insert(url, img.clone());
        Ok(img)
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        info!(url, "Downloading poster");
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Write via temp-then-rename so concurrent writers of the same URL
    /// leave a whole file behind (last write wins).
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }

    fn memory_get(&self, url: &str) -> Option<Arc<DynamicImage>> {
        self.memory.lock().ok()?.get(url).cloned()
    }

    fn memory_insert(&self, url: &str, img: Arc<DynamicImage>) {
        if let Ok(mut memory) = self.memory.lock() {
            memory.insert(url.to_string(), img);
        }
    }
}

/// Content address for a URL: URL-safe base64 (no padding) of its SHA-256,
/// with a fixed `.jpg` suffix regardless of the actual payload format.
pub fn cache_file_name(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    format!("{}.jpg", URL_SAFE_NO_PAD.encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::new_rgb8(width, height);
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_cache_file_name_is_url_safe_and_padding_free() {
        let name = cache_file_name("http://example.com/poster.jpg");
        let stem = name.strip_suffix(".jpg").unwrap();
        // 32-byte digest => 43 base64 chars, no padding
        assert_eq!(stem.len(), 43);
        assert!(!stem.contains('='));
        assert!(!stem.contains('/'));
        assert!(!stem.contains('+'));
    }

    #[test]
    fn test_cache_file_name_deterministic_per_url() {
        let a = cache_file_name("http://example.com/a");
        assert_eq!(a, cache_file_name("http://example.com/a"));
        assert_ne!(a, cache_file_name("http://example.com/b"));
    }

    #[tokio::test]
    async fn test_disk_hit_populates_memory_tier() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(Some(dir.path().to_path_buf()), true).unwrap();

        let url = "http://example.com/poster";
        let path = dir.path().join(cache_file_name(url));
        std::fs::write(&path, png_bytes(2, 3)).unwrap();

        let first = cache.get(url).await.unwrap();
        assert_eq!(first.width(), 2);
        assert_eq!(first.height(), 3);

        // remove the disk entry: a second lookup must be served from memory
        std::fs::remove_file(&path).unwrap();
        let second = cache.get(url).await.unwrap();
        assert_eq!(second.width(), 2);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_corrupt_disk_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(Some(dir.path().to_path_buf()), true).unwrap();

        let url = "http://example.com/broken";
        std::fs::write(dir.path().join(cache_file_name(url)), b"not an image").unwrap();

        assert!(cache.get(url).await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(Some(dir.path().to_path_buf()), true).unwrap();

        // nothing listens on port 1
        assert!(cache.get("http://127.0.0.1:1/poster").await.is_err());
    }
}
