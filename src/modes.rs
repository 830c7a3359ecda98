use crate::client::Client;
use crate::config::Config;
use crate::error::Result;
use crate::scraper::{
    download::Download, pep::PepStatus, versions::LatestVersions, whats_new::WhatsNew,
};
use crate::table::Table;
use clap::ValueEnum;

/// Everything an extractor needs for one run.
pub struct Context {
    pub client: Client,
    pub config: Config,
}

/// One scraping mode. `None` means the mode produced a side effect
/// (a saved file) instead of a table.
#[allow(async_fn_in_trait)]
pub trait Extractor {
    async fn execute(&self, ctx: &Context) -> Result<Option<Table>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    WhatsNew,
    LatestVersions,
    Download,
    Pep,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::WhatsNew => "whats-new",
            Mode::LatestVersions => "latest-versions",
            Mode::Download => "download",
            Mode::Pep => "pep",
        }
    }

    pub async fn execute(self, ctx: &Context) -> Result<Option<Table>> {
        match self {
            Mode::WhatsNew => WhatsNew.execute(ctx).await,
            Mode::LatestVersions => LatestVersions.execute(ctx).await,
            Mode::Download => Download.execute(ctx).await,
            Mode::Pep => PepStatus.execute(ctx).await,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
