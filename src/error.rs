use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Scraping error: {0}")]
    Scraper(#[from] ScraperError),

    #[error("Python version list not found in the documentation sidebar")]
    VersionDiscovery,

    #[error("Row has {actual} cells, header has {expected}")]
    TableShape { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AppError {
    /// Failures that only affect a single list item or table row. Extractors
    /// record these and move on to the next item.
    pub fn is_item_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Client(ClientError::Connectivity { .. })
                | AppError::Scraper(ScraperError::TagNotFound { .. })
                | AppError::Scraper(ScraperError::MissingAttribute { .. })
        )
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required configuration: {0}")]
    MissingField(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to build client: {0}")]
    Build(String),

    #[error("Connection error while loading {url}: {reason}")]
    Connectivity { url: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Tag {tag} not found {attrs:?}")]
    TagNotFound {
        tag: String,
        attrs: Vec<(String, String)>,
    },

    #[error("Tag {tag} has no {attr} attribute")]
    MissingAttribute { tag: String, attr: String },

    #[error("Selector error: {0}")]
    Selector(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
