// Site adapters: one per marketplace, all built on the same fetch trait
// and pagination driver.

pub mod amazon;
pub mod fetcher;
pub mod flipkart;
pub mod myntra;

pub use amazon::AmazonAdapter;
pub use fetcher::{Fetcher, SessionConfig, open_session};
pub use flipkart::FlipkartAdapter;
pub use myntra::MyntraAdapter;

use crate::model::{RawRecord, ScrapeError, Source};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// One marketplace scraper producing the uniform raw record shape.
#[async_trait::async_trait]
pub trait SiteAdapter: Send + Sync {
    fn source(&self) -> Source;

    /// Scrapes search results for `query`, following pagination up to
    /// `max_pages`. Running out of pages early is not an error; only a
    /// failed initial navigation is.
    async fn scrape(
        &self,
        query: &str,
        max_pages: u32,
    ) -> Result<Vec<RawRecord>, ScrapeError>;
}

/// What one result page yielded: its records plus the "next page" URL, if
/// the page advertises one.
pub(crate) struct PageOutcome {
    pub records: Vec<RawRecord>,
    pub next_url: Option<String>,
}

/// Shared pagination loop. Any irregularity past the first page — no next
/// link, no href, a failed fetch — is treated uniformly as end of results.
pub(crate) async fn crawl<P>(
    session: &dyn Fetcher,
    start_url: String,
    max_pages: u32,
    parse_page: P,
) -> Result<Vec<RawRecord>, ScrapeError>
where
    P: Fn(&Html) -> PageOutcome,
{
    let mut records = Vec::new();
    let mut url = start_url;

    for page in 0..max_pages {
        let html = if page == 0 {
            session.get(&url).await?
        } else {
            match session.get(&url).await {
                Ok(html) => html,
                Err(e) => {
                    debug!("pagination fetch failed, treating as last page: {e}");
                    break;
                }
            }
        };

        let outcome = {
            let doc = Html::parse_document(&html);
            parse_page(&doc)
        };
        records.extend(outcome.records);

        match outcome.next_url {
            Some(next) => url = next,
            None => break,
        }
    }

    Ok(records)
}

/// Trimmed text of the first match, None when the element is missing or
/// its text is empty.
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let text = scope
        .select(selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    if text.is_empty() { None } else { Some(text) }
}

/// Inner HTML of the first match (some sites keep the interesting text in
/// markup rather than text nodes).
pub(crate) fn first_inner_html(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let html = scope.select(selector).next()?.inner_html().trim().to_string();
    if html.is_empty() { None } else { Some(html) }
}

/// Attribute of the first match.
pub(crate) fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()?
        .value()
        .attr(attr)
        .map(str::to_string)
}

/// Document-level variant of [`first_attr`], for page-wide controls like
/// the next-page link.
pub(crate) fn doc_first_attr(doc: &Html, selector: &Selector, attr: &str) -> Option<String> {
    doc.select(selector)
        .next()?
        .value()
        .attr(attr)
        .map(str::to_string)
}

/// Resolves a possibly-relative href against the site origin.
pub(crate) fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}
