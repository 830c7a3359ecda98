mod builder;
pub mod cache;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::{log_debug, log_warn};
pub use builder::ClientBuilder;
pub use cache::HttpCache;
use reqwest::Client as HttpClient;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Shared HTTP session: one connection pool plus the response cache.
pub struct Client {
    inner: HttpClient,
    cache: Option<HttpCache>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Builds the session described by the `[http]` config section.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = HttpCache::open(&config.http.cache_dir, config.cache_expiry())?;
        Self::builder()
            .header("user-agent", &config.http.user_agent)?
            .header("accept-language", &config.http.accept_language)?
            .cache(cache)
            .build()
    }

    pub fn cache(&self) -> Option<&HttpCache> {
        self.cache.as_ref()
    }

    pub fn clear_cache(&self) -> Result<()> {
        if let Some(cache) = &self.cache {
            cache.clear()?;
            log_debug!("[client] Cleared cache at {:?}", cache.dir());
        }
        Ok(())
    }

    /// Fetches a page and decodes it as UTF-8 whatever charset the server
    /// declares.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let body = self.fetch_bytes(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(body) = self.cache.as_ref().and_then(|cache| cache.get(url)) {
            log_debug!("[client] Cache hit for {}", url);
            return Ok(body);
        }

        log_debug!("[client] GET {}", url);
        let response = self.send(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| connectivity(url, format!("Failed to read response body: {}", e)))?
            .to_vec();

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(url, &body) {
                log_warn!("[client] Failed to cache {}: {}", url, e);
            }
        }

        Ok(body)
    }

    /// Streams the body of `url` into `path`, replacing any existing file
    /// only once the whole body has arrived. Returns the number of bytes
    /// written. Archives never go through the cache.
    pub async fn download(&self, url: &str, path: &Path) -> Result<u64> {
        let partial = partial_path(path);
        match self.stream_to(url, &partial).await {
            Ok(written) => {
                tokio::fs::rename(&partial, path).await?;
                Ok(written)
            }
            Err(e) => {
                if let Err(remove) = tokio::fs::remove_file(&partial).await {
                    if remove.kind() != std::io::ErrorKind::NotFound {
                        log_warn!("[client] Failed to remove {:?}: {}", partial, remove);
                    }
                }
                Err(e)
            }
        }
    }

    async fn stream_to(&self, url: &str, path: &Path) -> Result<u64> {
        let mut response = self.send(url).await?;
        let mut file = tokio::fs::File::create(path).await?;
        let mut written = 0u64;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| connectivity(url, format!("Failed to read response body: {}", e)))?
        {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| connectivity(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(connectivity(url, format!("HTTP status {}", status.as_u16())));
        }

        Ok(response)
    }
}

/// `<name>.part` next to `path`.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

fn connectivity(url: &str, reason: impl Into<String>) -> crate::error::AppError {
    ClientError::Connectivity {
        url: url.to_string(),
        reason: reason.into(),
    }
    .into()
}
