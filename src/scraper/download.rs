use super::{attr, find_tag, parse_url, resolve, select_all, Page};
use crate::error::{ClientError, Result, ScraperError};
use crate::log_info;
use crate::modes::{Context, Extractor};
use crate::table::Table;
use url::Url;

const ARCHIVE_SUFFIX: &str = "pdf-a4.zip";

pub struct Download;

/// Absolute URL of the first A4 PDF archive in the download table.
pub fn archive_url(page: &Page, page_url: &Url) -> Result<Url> {
    let main = page.find_tag("div", &[("role", "main")])?;
    let table = find_tag(main, "table", &[("class", "docutils")])?;

    let href = select_all(table, "a[href]")?
        .into_iter()
        .filter_map(|a| attr(a, "href").ok())
        .find(|href| href.len() > ARCHIVE_SUFFIX.len() && href.ends_with(ARCHIVE_SUFFIX))
        .ok_or_else(|| ScraperError::TagNotFound {
            tag: "a".to_string(),
            attrs: vec![("href".to_string(), format!("*{}", ARCHIVE_SUFFIX))],
        })?;

    resolve(page_url, href)
}

pub fn archive_file_name(url: &Url) -> Result<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ClientError::InvalidUrl(format!("No file name in {}", url)).into())
}

impl Extractor for Download {
    async fn execute(&self, ctx: &Context) -> Result<Option<Table>> {
        let downloads_url = resolve(&parse_url(&ctx.config.doc_url)?, "download.html")?;
        let archive = {
            let page = Page::parse(&ctx.client.fetch(downloads_url.as_str()).await?);
            archive_url(&page, &downloads_url)?
        };
        let file_name = archive_file_name(&archive)?;

        let downloads_dir = &ctx.config.downloads_dir;
        tokio::fs::create_dir_all(downloads_dir).await?;
        let archive_path = downloads_dir.join(file_name);

        log_info!("[download] Fetching {}", archive);
        let size = ctx.client.download(archive.as_str(), &archive_path).await?;
        log_info!(
            "[download] Archive downloaded and saved: {} ({} bytes)",
            archive_path.display(),
            size
        );

        Ok(None)
    }
}
