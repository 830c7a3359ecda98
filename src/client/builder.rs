use super::{cache::HttpCache, Client};
use crate::error::{ClientError, Result};
use http::{
    header::{HeaderMap, HeaderName},
    HeaderValue,
};
use reqwest::Client as HttpClient;
use std::str::FromStr;

#[derive(Default)]
pub struct ClientBuilder {
    cache: Option<HttpCache>,
    headers: HeaderMap,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
            ..Default::default()
        }
    }

    /// Serve and store page bodies through `cache`. Without one every
    /// fetch goes to the network.
    pub fn cache(mut self, cache: HttpCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn header<K, V>(mut self, key: K, value: V) -> Result<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let header_name = HeaderName::from_str(key.as_ref())
            .map_err(|e| ClientError::Build(format!("Invalid header name: {}", e)))?;

        let header_value = HeaderValue::from_str(value.as_ref())
            .map_err(|e| ClientError::Build(format!("Invalid header value: {}", e)))?;

        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn build(self) -> Result<Client> {
        let inner = HttpClient::builder()
            .default_headers(self.headers)
            .build()
            .map_err(|e| ClientError::Build(format!("Failed to build client: {}", e)))?;

        Ok(Client {
            inner,
            cache: self.cache,
        })
    }
}
