use crate::error::{AppError, ConfigError, Result};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    Layer, Registry,
};

#[derive(Debug)]
pub struct LoggerConfig {
    pub directory: String,
    pub file_name: String,
    pub rotation: Rotation,
    pub level: Level,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            directory: "Logs".to_string(),
            file_name: "parser.log".to_string(),
            rotation: Rotation::DAILY,
            level: Level::INFO,
        }
    }
}

/// Installs the global subscriber: a rotating plain-text file log and a
/// colored console log on stderr. Stdout is left to the result output.
pub fn init_logging(config: LoggerConfig) -> Result<()> {
    std::fs::create_dir_all(&config.directory).map_err(|e| {
        AppError::Config(ConfigError::FileRead(std::io::Error::new(
            e.kind(),
            format!("Failed to create log directory {}: {}", config.directory, e),
        )))
    })?;

    let file_appender =
        RollingFileAppender::new(config.rotation, &config.directory, &config.file_name);

    let file_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(file_appender)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_filter(tracing::level_filters::LevelFilter::from_level(
            config.level,
        ));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(tracing::level_filters::LevelFilter::from_level(
            config.level,
        ));

    let subscriber = Registry::default().with(file_layer).with(console_layer);

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        AppError::Config(ConfigError::InvalidValue(format!(
            "Failed to set global subscriber: {}",
            e
        )))
    })?;

    Ok(())
}

pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(AppError::Config(ConfigError::InvalidValue(format!(
            "Invalid log level: {}",
            level
        )))),
    }
}

/// `err` followed by each of its sources, separated by `: `.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl AppError {
    /// Short tag used in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Client(_) => "client",
            AppError::Scraper(_) => "scraper",
            AppError::VersionDiscovery => "version_discovery",
            AppError::TableShape { .. } => "table",
            AppError::Io(_) => "io",
            AppError::Csv(_) => "csv",
            AppError::Serde(_) => "serde",
        }
    }
}

#[macro_export]
macro_rules! log_error {
    // Tag AppError values with their kind
    ($err:expr => $($arg:tt)*) => {{
        let err: &$crate::error::AppError = &$err;
        tracing::error!(error = %err, kind = err.kind(), $($arg)*)
    }};
    ($($arg:tt)*) => {
        tracing::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        tracing::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        tracing::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}
