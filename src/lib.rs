pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod modes;
pub mod output;
pub mod scraper;
pub mod table;

use crate::client::Client;
use crate::config::Config;
use crate::error::Result;
use crate::modes::{Context, Mode};
use crate::output::OutputMode;

/// Runs one mode end to end: build the session, extract, render.
pub async fn run(
    mode: Mode,
    output: Option<OutputMode>,
    clear_cache: bool,
    config: Config,
) -> Result<()> {
    let client = Client::from_config(&config)?;
    if clear_cache {
        client.clear_cache()?;
        crate::log_info!("[main] HTTP cache cleared");
    }

    let ctx = Context { client, config };
    if let Some(table) = mode.execute(&ctx).await? {
        crate::output::control_output(&table, output, mode, &ctx.config.results_dir)?;
    }
    Ok(())
}
