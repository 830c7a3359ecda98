use crate::error::Result;
use crate::log_debug;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    url: String,
    fetched_at: DateTime<Utc>,
    size: usize,
}

/// Response bodies stored on disk, one `.bin`/`.json` pair per URL.
#[derive(Debug, Clone)]
pub struct HttpCache {
    dir: PathBuf,
    expire_after: Option<Duration>,
}

impl HttpCache {
    pub fn open(dir: impl Into<PathBuf>, expire_after: Option<Duration>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, expire_after })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the cached body for `url`. Expired, foreign or unreadable
    /// entries count as misses.
    pub fn get(&self, url: &str) -> Option<Vec<u8>> {
        let (meta_path, body_path) = self.paths(url);

        let meta = fs::read_to_string(&meta_path).ok()?;
        let entry: CacheEntry = match serde_json::from_str(&meta) {
            Ok(entry) => entry,
            Err(e) => {
                log_debug!("[cache] Ignoring corrupt entry {:?}: {}", meta_path, e);
                return None;
            }
        };

        if entry.url != url {
            return None;
        }

        if let Some(expire_after) = self.expire_after {
            let age = Utc::now().signed_duration_since(entry.fetched_at);
            if age.to_std().map_or(false, |age| age > expire_after) {
                log_debug!("[cache] Entry for {} expired", url);
                return None;
            }
        }

        let body = fs::read(&body_path).ok()?;
        if body.len() != entry.size {
            return None;
        }
        Some(body)
    }

    pub fn put(&self, url: &str, body: &[u8]) -> Result<()> {
        let (meta_path, body_path) = self.paths(url);
        let entry = CacheEntry {
            url: url.to_string(),
            fetched_at: Utc::now(),
            size: body.len(),
        };

        fs::write(&body_path, body)?;
        fs::write(&meta_path, serde_json::to_vec(&entry)?)?;
        Ok(())
    }

    /// Drops every entry and leaves an empty cache directory behind.
    pub fn clear(&self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    fn paths(&self, url: &str) -> (PathBuf, PathBuf) {
        let key = hex::encode(Sha256::digest(url.as_bytes()));
        (
            self.dir.join(format!("{}.json", key)),
            self.dir.join(format!("{}.bin", key)),
        )
    }
}
