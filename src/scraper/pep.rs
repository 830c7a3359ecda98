//! Tally of PEP statuses, cross-checked against the status code shown in
//! the numerical index.

use super::{attr, find_tag, parse_url, resolve, text_of, ItemOutcome, Page, Skipped};
use crate::error::{Result, ScraperError};
use crate::modes::{Context, Extractor};
use crate::table::Table;
use crate::{log_debug, log_info, log_warn};
use std::collections::BTreeMap;
use url::Url;

pub const HEADER: [&str; 2] = ["Status", "Count"];

const INDEX_ROW_SELECTOR: &str = "#numerical-index tbody tr";

/// Statuses a PEP may carry for the code shown next to it in the index.
/// The empty code stands for "no code shown".
pub fn expected_statuses(code: &str) -> &'static [&'static str] {
    match code {
        "A" => &["Active", "Accepted"],
        "D" => &["Deferred"],
        "F" => &["Final"],
        "P" => &["Provisional"],
        "R" => &["Rejected"],
        "S" => &["Superseded"],
        "W" => &["Withdrawn"],
        "" => &["Draft", "Active"],
        _ => &[],
    }
}

pub struct PepStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub code: String,
    pub link: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct StatusMismatch {
    pub pep_link: String,
    pub code: String,
    pub observed: String,
    pub expected: &'static [&'static str],
}

/// `Some` when the status on a PEP's page is not one its index code allows.
/// An unknown code allows nothing, so it always mismatches.
pub fn check_status(entry: &IndexEntry, observed: &str) -> Option<StatusMismatch> {
    let expected = expected_statuses(&entry.code);
    if expected.contains(&observed) {
        return None;
    }
    Some(StatusMismatch {
        pep_link: entry.link.clone(),
        code: entry.code.clone(),
        observed: observed.to_string(),
        expected,
    })
}

#[derive(Debug, Default)]
pub struct StatusTally {
    counts: BTreeMap<String, usize>,
}

impl StatusTally {
    pub fn record(&mut self, status: &str) {
        *self.counts.entry(status.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, status: &str) -> usize {
        self.counts.get(status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn into_table(self) -> Result<Table> {
        let total = self.total();
        let mut table = Table::new(HEADER);
        for (status, count) in self.counts {
            table.push_row([status, count.to_string()])?;
        }
        table.push_row(["Total".to_string(), total.to_string()])?;
        Ok(table)
    }
}

/// One result per index row. A row whose code or link cannot be read is an
/// `Err` in its own slot so the caller can skip it by position.
pub fn index_entries(page: &Page, base: &Url) -> Result<Vec<Result<IndexEntry>>> {
    Ok(page
        .select_all(INDEX_ROW_SELECTOR)?
        .into_iter()
        .map(|row| -> Result<IndexEntry> {
            // First character is the type glyph, the rest is the status code.
            let code = text_of(find_tag(row, "td", &[])?)
                .trim()
                .chars()
                .skip(1)
                .collect::<String>();
            let href = attr(find_tag(row, "a", &[])?, "href")?;
            Ok(IndexEntry {
                code,
                link: resolve(base, href)?.to_string(),
            })
        })
        .collect())
}

/// Value next to the `Status` label in a PEP's metadata block.
pub fn detail_status(page: &Page) -> Result<String> {
    let fields = page.find_tag("dl", &[("class", "rfc2822 field-list simple")])?;

    let label = super::select_all(fields, "dt")?
        .into_iter()
        .find(|dt| dt.text().any(|t| t.trim() == "Status"))
        .ok_or_else(|| ScraperError::TagNotFound {
            tag: "dt".to_string(),
            attrs: vec![("string".to_string(), "Status".to_string())],
        })?;

    let value = label
        .next_siblings()
        .find_map(scraper::ElementRef::wrap)
        .ok_or_else(|| ScraperError::TagNotFound {
            tag: "dd".to_string(),
            attrs: Vec::new(),
        })?;

    Ok(text_of(value).trim().to_string())
}

impl PepStatus {
    async fn check_entry(&self, ctx: &Context, entry: &IndexEntry) -> Result<String> {
        let html = ctx.client.fetch(&entry.link).await?;
        detail_status(&Page::parse(&html))
    }
}

impl Extractor for PepStatus {
    async fn execute(&self, ctx: &Context) -> Result<Option<Table>> {
        let pep_url = parse_url(&ctx.config.pep_url)?;
        let entries = {
            let page = Page::parse(&ctx.client.fetch(pep_url.as_str()).await?);
            index_entries(&page, &pep_url)?
        };
        log_info!("[pep] Found {} PEPs in the index", entries.len());

        let mut tally = StatusTally::default();
        let mut mismatches = Vec::new();
        let mut skipped: Vec<Skipped> = Vec::new();
        let progress = super::progress_bar(entries.len(), "pep");

        for (position, entry) in entries.into_iter().enumerate() {
            progress.inc(1);
            let entry = match ItemOutcome::from_result(format!("row {}", position + 1), entry)? {
                ItemOutcome::Done(entry) => entry,
                ItemOutcome::Skipped(skip) => {
                    skipped.push(skip);
                    continue;
                }
            };

            log_debug!("[pep] Processing {}", entry.link);
            let result = self.check_entry(ctx, &entry).await;
            let observed = match ItemOutcome::from_result(entry.link.as_str(), result)? {
                ItemOutcome::Done(status) => status,
                ItemOutcome::Skipped(skip) => {
                    skipped.push(skip);
                    continue;
                }
            };

            if let Some(mismatch) = check_status(&entry, &observed) {
                mismatches.push(mismatch);
            }
            tally.record(&observed);
        }
        progress.finish_and_clear();

        for mismatch in &mismatches {
            log_warn!(
                "[pep] Status mismatch at {}: status {:?} (code {:?}), expected one of {:?}",
                mismatch.pep_link,
                mismatch.observed,
                mismatch.code,
                mismatch.expected
            );
        }
        super::report_skipped("pep", &skipped);

        Ok(Some(tally.into_table()?))
    }
}
