use super::{attr, collapse_whitespace, find_tag, parse_url, resolve, text_of, ItemOutcome, Page};
use crate::error::Result;
use crate::modes::{Context, Extractor};
use crate::table::Table;
use crate::{log_debug, log_info};
use url::Url;

pub const HEADER: [&str; 3] = ["Link", "Title", "Editor/Author"];

const ENTRY_SELECTOR: &str = "#what-s-new-in-python div.toctree-wrapper li.toctree-l1";

pub struct WhatsNew;

#[derive(Debug, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub description: String,
}

/// Absolute links of the top-level entries of the what's-new index, in
/// document order. An entry without a usable link is an `Err` in its own
/// slot.
pub fn article_links(index: &Page, index_url: &Url) -> Result<Vec<Result<String>>> {
    Ok(index
        .select_all(ENTRY_SELECTOR)?
        .into_iter()
        .map(|entry| -> Result<String> {
            let anchor = find_tag(entry, "a", &[])?;
            Ok(resolve(index_url, attr(anchor, "href")?)?.to_string())
        })
        .collect())
}

pub fn parse_article(page: &Page) -> Result<Article> {
    let title = text_of(page.find_tag("h1", &[])?);
    let description = text_of(page.find_tag("dl", &[])?);
    Ok(Article {
        title: title.trim().trim_end_matches('\u{b6}').trim_end().to_string(),
        description: collapse_whitespace(&description),
    })
}

impl Extractor for WhatsNew {
    async fn execute(&self, ctx: &Context) -> Result<Option<Table>> {
        let index_url = resolve(&parse_url(&ctx.config.doc_url)?, "whatsnew/")?;
        let links = {
            let index = Page::parse(&ctx.client.fetch(index_url.as_str()).await?);
            article_links(&index, &index_url)?
        };
        log_info!("[whats-new] Found {} articles", links.len());

        let mut table = Table::new(HEADER);
        let mut skipped = Vec::new();
        let progress = super::progress_bar(links.len(), "whats-new");

        for (position, link) in links.into_iter().enumerate() {
            progress.inc(1);
            let link = match ItemOutcome::from_result(format!("entry {}", position + 1), link)? {
                ItemOutcome::Done(link) => link,
                ItemOutcome::Skipped(skip) => {
                    skipped.push(skip);
                    continue;
                }
            };

            log_debug!("[whats-new] Processing {}", link);
            let result = match ctx.client.fetch(&link).await {
                Ok(html) => parse_article(&Page::parse(&html)),
                Err(e) => Err(e),
            };

            match ItemOutcome::from_result(link.as_str(), result)? {
                ItemOutcome::Done(article) => {
                    table.push_row([link, article.title, article.description])?
                }
                ItemOutcome::Skipped(skip) => skipped.push(skip),
            }
        }
        progress.finish_and_clear();

        super::report_skipped("whats-new", &skipped);
        Ok(Some(table))
    }
}
