use anyhow::Context as _;
use clap::Parser;
use pydoc_scraper::cli::Cli;
use pydoc_scraper::config::Config;
use pydoc_scraper::logging::{error_chain, init_logging, parse_log_level, LoggerConfig};
use pydoc_scraper::{log_error, log_info};
use tracing_appender::rolling::Rotation;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    let logger_config = LoggerConfig {
        directory: config.logging.directory.clone(),
        file_name: config.logging.filename.clone(),
        rotation: Rotation::DAILY,
        level: parse_log_level(&config.logging.level)?,
    };
    init_logging(logger_config).context("failed to initialise logging")?;

    log_info!("[main] Parser started");
    if cli.config.exists() {
        log_info!("[main] Configuration loaded from {}", cli.config.display());
    } else {
        log_info!("[main] {} not found, using default configuration", cli.config.display());
    }
    log_info!("[main] Command line arguments: {:?}", cli);

    // Failures inside a mode are logged, not turned into an exit code.
    if let Err(err) = pydoc_scraper::run(cli.mode, cli.output, cli.clear_cache, config).await {
        log_error!(err => "[main] Error during execution: {}", error_chain(&err));
    }

    log_info!("[main] Parser finished");
    Ok(())
}
