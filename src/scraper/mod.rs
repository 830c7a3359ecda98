pub mod download;
pub mod pep;
pub mod versions;
pub mod whats_new;

use crate::error::{AppError, ClientError, Result, ScraperError};
use crate::log_warn;
use indicatif::{ProgressBar, ProgressStyle};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A parsed HTML document.
pub struct Page {
    document: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// First element named `tag` whose attributes match `attrs`.
    pub fn find_tag(&self, tag: &str, attrs: &[(&str, &str)]) -> Result<ElementRef<'_>> {
        let selector = tag_selector(tag, attrs)?;
        self.document
            .select(&selector)
            .next()
            .ok_or_else(|| tag_not_found(tag, attrs))
    }

    pub fn select_all(&self, css: &str) -> Result<Vec<ElementRef<'_>>> {
        let selector = parse_selector(css)?;
        Ok(self.document.select(&selector).collect())
    }
}

/// Same lookup as [`Page::find_tag`], restricted to the descendants of
/// `node`.
pub fn find_tag<'a>(
    node: ElementRef<'a>,
    tag: &str,
    attrs: &[(&str, &str)],
) -> Result<ElementRef<'a>> {
    let selector = tag_selector(tag, attrs)?;
    node.select(&selector)
        .next()
        .ok_or_else(|| tag_not_found(tag, attrs))
}

pub fn select_all<'a>(node: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let selector = parse_selector(css)?;
    Ok(node.select(&selector).collect())
}

pub fn attr<'a>(node: ElementRef<'a>, name: &str) -> Result<&'a str> {
    node.value().attr(name).ok_or_else(|| {
        ScraperError::MissingAttribute {
            tag: node.value().name().to_string(),
            attr: name.to_string(),
        }
        .into()
    })
}

pub fn text_of(node: ElementRef<'_>) -> String {
    node.text().collect()
}

/// Joins all whitespace runs, newlines included, into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn resolve(base: &Url, href: &str) -> Result<Url> {
    base.join(href).map_err(|e| {
        ClientError::InvalidUrl(format!("Cannot resolve {} against {}: {}", href, base, e)).into()
    })
}

pub fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", url, e)).into())
}

// `class` with one token matches any element carrying that class, a
// multi-token value must match the attribute exactly.
fn tag_selector(tag: &str, attrs: &[(&str, &str)]) -> Result<Selector> {
    let mut css = tag.to_string();
    for (name, value) in attrs {
        let value = value.replace('\\', "\\\\").replace('"', "\\\"");
        if *name == "class" && !value.contains(char::is_whitespace) {
            css.push_str(&format!("[class~=\"{}\"]", value));
        } else {
            css.push_str(&format!("[{}=\"{}\"]", name, value));
        }
    }
    parse_selector(&css)
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScraperError::Selector(format!("{}: {}", css, e)).into())
}

fn tag_not_found(tag: &str, attrs: &[(&str, &str)]) -> AppError {
    ScraperError::TagNotFound {
        tag: tag.to_string(),
        attrs: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
    .into()
}

/// An item an extractor gave up on, and why.
#[derive(Debug)]
pub struct Skipped {
    pub item: String,
    pub reason: AppError,
}

#[derive(Debug)]
pub enum ItemOutcome<T> {
    Done(T),
    Skipped(Skipped),
}

impl<T> ItemOutcome<T> {
    /// Turns per-item failures into a skip record. Anything else still
    /// aborts the run.
    pub fn from_result(item: impl Into<String>, result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(ItemOutcome::Done(value)),
            Err(reason) if reason.is_item_recoverable() => Ok(ItemOutcome::Skipped(Skipped {
                item: item.into(),
                reason,
            })),
            Err(e) => Err(e),
        }
    }
}

pub fn report_skipped(mode: &str, skipped: &[Skipped]) {
    if skipped.is_empty() {
        return;
    }
    log_warn!("[{}] Skipped {} item(s)", mode, skipped.len());
    for skip in skipped {
        log_warn!("[{}] {}: {}", mode, skip.item, skip.reason);
    }
}

const PROGRESS_TEMPLATE: &str = "[{prefix}] {bar:40} {pos}/{len} ({elapsed})";

/// Progress bar over a per-item loop, drawn on stderr.
pub fn progress_bar(len: usize, mode: &str) -> ProgressBar {
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len as u64)
        .with_style(style)
        .with_prefix(mode.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
        <html><body>
          <div class="sidebar wrapper" role="main">
            <h1>Title</h1>
            <a href="one.html">one</a>
            <dl class="rfc2822 field-list simple"><dt>Status</dt><dd>Final</dd></dl>
          </div>
        </body></html>
    "#;

    #[test]
    fn finds_tags_by_name_and_attributes() {
        let page = Page::parse(HTML);
        assert_eq!(text_of(page.find_tag("h1", &[]).unwrap()), "Title");
        assert!(page.find_tag("div", &[("role", "main")]).is_ok());
        assert!(page.find_tag("div", &[("class", "wrapper")]).is_ok());
        assert!(page
            .find_tag("dl", &[("class", "rfc2822 field-list simple")])
            .is_ok());
    }

    #[test]
    fn missing_tag_reports_tag_and_attrs() {
        let page = Page::parse(HTML);
        let err = page.find_tag("table", &[("class", "docutils")]).unwrap_err();

        match err {
            AppError::Scraper(ScraperError::TagNotFound { tag, attrs }) => {
                assert_eq!(tag, "table");
                assert_eq!(attrs, vec![("class".to_string(), "docutils".to_string())]);
            }
            other => panic!("expected TagNotFound, got {other:?}"),
        }
    }

    #[test]
    fn multi_token_class_must_match_exactly() {
        let page = Page::parse(HTML);
        assert!(page.find_tag("dl", &[("class", "field-list rfc2822")]).is_err());
    }

    #[test]
    fn nested_lookup_stays_inside_the_node() {
        let page = Page::parse(HTML);
        let dl = page.find_tag("dl", &[]).unwrap();
        assert_eq!(text_of(find_tag(dl, "dd", &[]).unwrap()), "Final");
        assert!(find_tag(dl, "a", &[]).is_err());
    }

    #[test]
    fn missing_attribute_is_reported() {
        let page = Page::parse(HTML);
        let h1 = page.find_tag("h1", &[]).unwrap();
        assert!(matches!(
            attr(h1, "href"),
            Err(AppError::Scraper(ScraperError::MissingAttribute { .. }))
        ));
    }

    #[test]
    fn collapses_newlines_and_runs_of_spaces() {
        assert_eq!(
            collapse_whitespace("Editor:\n   Adam\tTurner\n\nRelease: 3.13"),
            "Editor: Adam Turner Release: 3.13"
        );
    }

    #[test]
    fn fatal_errors_are_not_turned_into_skips() {
        let outcome = ItemOutcome::<()>::from_result("item", Err(AppError::VersionDiscovery));
        assert!(outcome.is_err());

        let outcome = ItemOutcome::<()>::from_result(
            "item",
            Err(ScraperError::TagNotFound {
                tag: "h1".into(),
                attrs: Vec::new(),
            }
            .into()),
        )
        .unwrap();
        assert!(matches!(outcome, ItemOutcome::Skipped(Skipped { ref item, .. }) if item == "item"));
    }

    #[test]
    fn progress_bar_counts_items() {
        assert!(ProgressStyle::with_template(PROGRESS_TEMPLATE).is_ok());

        let progress = progress_bar(3, "pep");
        assert_eq!(progress.length(), Some(3));
        progress.inc(1);
        progress.inc(1);
        assert_eq!(progress.position(), 2);
        assert_eq!(progress.prefix(), "pep");
        progress.finish_and_clear();
    }
}
