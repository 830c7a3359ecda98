use crate::modes::Mode;
use crate::output::OutputMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pydoc-scraper",
    version,
    about = "Scrapes the Python documentation and PEP index"
)]
pub struct Cli {
    /// Scraping mode
    #[arg(short, long, value_enum)]
    pub mode: Mode,

    /// Render results as a table or save them to a CSV file.
    /// Without this flag rows are printed as plain text.
    #[arg(short, long, value_enum)]
    pub output: Option<OutputMode>,

    /// Clear the HTTP cache before running
    #[arg(short, long)]
    pub clear_cache: bool,

    /// Path to the TOML configuration file. Defaults apply when it is missing.
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,
}
