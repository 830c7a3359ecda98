use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_directory")]
    pub directory: String,
    #[serde(default = "default_log_filename")]
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_accept_language")]
    pub accept_language: String,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    /// Cached responses older than this are refetched. Unset means never.
    #[serde(default)]
    pub cache_expire_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_doc_url")]
    pub doc_url: String,

    #[serde(default = "default_pep_url")]
    pub pep_url: String,

    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,

    #[serde(default)]
    pub logging: LogConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: default_log_directory(),
            filename: default_log_filename(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            cache_dir: default_cache_dir(),
            cache_expire_secs: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            doc_url: default_doc_url(),
            pep_url: default_pep_url(),
            results_dir: default_results_dir(),
            downloads_dir: default_downloads_dir(),
            logging: LogConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::FileRead)?;
        Self::from_toml(&content)
    }

    /// Like [`Config::from_file`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn cache_expiry(&self) -> Option<Duration> {
        self.http.cache_expire_secs.map(Duration::from_secs)
    }

    /// Root URLs are joined with relative paths, so they must end in `/`.
    fn normalize(&mut self) {
        for url in [&mut self.doc_url, &mut self.pep_url] {
            if !url.is_empty() && !url.ends_with('/') {
                url.push('/');
            }
        }
    }

    fn validate(&self) -> Result<()> {
        validate_url("doc_url", &self.doc_url)?;
        validate_url("pep_url", &self.pep_url)?;

        if self.results_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("results_dir".to_string()).into());
        }

        if self.downloads_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("downloads_dir".to_string()).into());
        }

        if self.http.cache_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("http.cache_dir".to_string()).into());
        }

        if self.http.cache_expire_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "http.cache_expire_secs must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ConfigError::MissingField(field.to_string()).into());
    }
    if !value.starts_with("http") {
        return Err(ConfigError::InvalidValue(format!(
            "{} must start with http(s): {}",
            field, value
        ))
        .into());
    }
    Url::parse(value)
        .map_err(|e| ConfigError::InvalidValue(format!("{} is not a valid URL: {}", field, e)))?;
    Ok(())
}

fn default_doc_url() -> String {
    "https://docs.python.org/3/".to_string()
}

fn default_pep_url() -> String {
    "https://peps.python.org/".to_string()
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.0.0 Safari/537.36".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.7".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".http_cache")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_directory() -> String {
    "Logs".to_string()
}

fn default_log_filename() -> String {
    "parser.log".to_string()
}
