use super::{attr, parse_url, select_all, text_of, Page};
use crate::error::{AppError, Result};
use crate::log_info;
use crate::modes::{Context, Extractor};
use crate::table::Table;
use regex::Regex;
use std::sync::OnceLock;

pub const HEADER: [&str; 3] = ["Doc Link", "Version", "Status"];

const VERSIONS_MARKER: &str = "All versions";

pub struct LatestVersions;

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Python (?P<version>\d\.\d+) \((?P<status>.*)\)").expect("valid version regex")
    })
}

/// `"Python 3.11 (stable)"` becomes `("3.11", "stable")`. Text that does not
/// look like a release is returned whole with an empty status.
pub fn split_version(text: &str) -> (String, String) {
    match version_pattern().captures(text) {
        Some(caps) => (caps["version"].to_string(), caps["status"].to_string()),
        None => (text.to_string(), String::new()),
    }
}

/// `(href, text)` of every link in the sidebar list that holds the version
/// switcher.
pub fn version_links(page: &Page) -> Result<Vec<(String, String)>> {
    let sidebar = page.find_tag("div", &[("class", "sphinxsidebarwrapper")])?;
    let list = select_all(sidebar, "ul")?
        .into_iter()
        .find(|ul| text_of(*ul).contains(VERSIONS_MARKER))
        .ok_or(AppError::VersionDiscovery)?;

    select_all(list, "a")?
        .into_iter()
        .map(|a| -> Result<(String, String)> {
            Ok((attr(a, "href")?.to_string(), text_of(a)))
        })
        .collect()
}

impl Extractor for LatestVersions {
    async fn execute(&self, ctx: &Context) -> Result<Option<Table>> {
        let doc_url = parse_url(&ctx.config.doc_url)?;
        let links = {
            let page = Page::parse(&ctx.client.fetch(doc_url.as_str()).await?);
            version_links(&page)?
        };
        log_info!("[latest-versions] Found {} version links", links.len());

        let mut table = Table::new(HEADER);
        for (href, text) in links {
            let (version, status) = split_version(&text);
            table.push_row([href, version, status])?;
        }
        Ok(Some(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_release_link_text() {
        assert_eq!(
            split_version("Python 3.11 (stable)"),
            ("3.11".to_string(), "stable".to_string())
        );
        assert_eq!(
            split_version("Python 3.14 (in development)"),
            ("3.14".to_string(), "in development".to_string())
        );
    }

    #[test]
    fn unmatched_text_is_kept_whole() {
        assert_eq!(
            split_version("Python 3.x-special"),
            ("Python 3.x-special".to_string(), String::new())
        );
        assert_eq!(
            split_version("All versions"),
            ("All versions".to_string(), String::new())
        );
    }

    #[test]
    fn picks_the_list_holding_all_versions() {
        let page = Page::parse(
            r#"
            <div class="sphinxsidebarwrapper">
              <ul><li><a href="/3/whatsnew/">What's new</a></li></ul>
              <ul>
                <li><a href="https://docs.python.org/3.14/">Python 3.14 (in development)</a></li>
                <li><a href="https://docs.python.org/3.13/">Python 3.13 (stable)</a></li>
                <li><a href="https://www.python.org/doc/versions/">All versions</a></li>
              </ul>
            </div>
            "#,
        );

        let links = version_links(&page).unwrap();
        assert_eq!(links.len(), 3);
        assert_eq!(links[1].0, "https://docs.python.org/3.13/");
        assert_eq!(links[2].1, "All versions");
    }

    #[test]
    fn missing_version_list_is_fatal() {
        let page = Page::parse(
            r#"<div class="sphinxsidebarwrapper"><ul><li><a href="x">Other</a></li></ul></div>"#,
        );
        let err = version_links(&page).unwrap_err();
        assert!(matches!(err, AppError::VersionDiscovery));
        assert!(!err.is_item_recoverable());
    }
}
