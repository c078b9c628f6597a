// Amazon.in search results.
use super::{
    Fetcher, PageOutcome, SiteAdapter, absolutize, crawl, doc_first_attr, first_attr,
    first_inner_html, first_text,
};
use crate::model::{NOT_AVAILABLE, RawRecord, ScrapeError, Source};
use scraper::{Html, Selector};

const BASE: &str = "https://www.amazon.in";

pub struct AmazonAdapter {
    session: Box<dyn Fetcher>,
    item: Selector,
    title: Selector,
    price: Selector,
    rating: Selector,
    link: Selector,
    next: Selector,
}

impl AmazonAdapter {
    pub fn new(session: Box<dyn Fetcher>) -> Self {
        Self {
            session,
            item: Selector::parse("div[data-component-type='s-search-result']").unwrap(),
            title: Selector::parse("h2").unwrap(),
            price: Selector::parse(".a-price-whole").unwrap(),
            // The rating text lives in the alt node's markup, not a text node.
            rating: Selector::parse(".a-icon-alt").unwrap(),
            link: Selector::parse("a").unwrap(),
            next: Selector::parse("a.s-pagination-next").unwrap(),
        }
    }

    fn search_url(query: &str) -> String {
        format!("{BASE}/s?k={}", query.trim().replace(' ', "+"))
    }

    fn parse_page(&self, doc: &Html) -> PageOutcome {
        let mut records = Vec::new();

        for item in doc.select(&self.item) {
            let Some(title) = first_text(item, &self.title) else {
                continue;
            };
            let price =
                first_text(item, &self.price).unwrap_or_else(|| NOT_AVAILABLE.to_string());
            let rating =
                first_inner_html(item, &self.rating).unwrap_or_else(|| NOT_AVAILABLE.to_string());
            let link = first_attr(item, &self.link, "href")
                .map(|href| absolutize(BASE, &href))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());

            records.push(RawRecord {
                source: Source::Amazon,
                title,
                price,
                rating,
                link,
            });
        }

        let next_url = doc_first_attr(doc, &self.next, "href").map(|h| absolutize(BASE, &h));
        PageOutcome { records, next_url }
    }
}

#[async_trait::async_trait]
impl SiteAdapter for AmazonAdapter {
    fn source(&self) -> Source {
        Source::Amazon
    }

    async fn scrape(
        &self,
        query: &str,
        max_pages: u32,
    ) -> Result<Vec<RawRecord>, ScrapeError> {
        crawl(
            self.session.as_ref(),
            Self::search_url(query),
            max_pages,
            |doc| self.parse_page(doc),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraper::testutil::FixtureFetcher;

    const PAGE_ONE: &str = r#"
        <html><body>
          <div data-component-type="s-search-result">
            <a href="/dp/B001"></a>
            <h2><span>Runner Shoe</span></h2>
            <span class="a-price-whole">1,999</span>
            <span class="a-icon-alt">4.3 out of 5 stars</span>
          </div>
          <div data-component-type="s-search-result">
            <a href="/dp/B002"></a>
            <h2><span>Trail Shoe</span></h2>
          </div>
          <div data-component-type="s-search-result">
            <a href="/dp/B003"></a>
            <span class="a-price-whole">899</span>
          </div>
          <a class="s-pagination-next" href="/s?k=shoes&page=2">Next</a>
        </body></html>"#;

    const PAGE_TWO: &str = r#"
        <html><body>
          <div data-component-type="s-search-result">
            <a href="https://www.amazon.in/dp/B004"></a>
            <h2><span>City Shoe</span></h2>
            <span class="a-price-whole">2,499</span>
          </div>
        </body></html>"#;

    fn fixture() -> FixtureFetcher {
        FixtureFetcher::new()
            .page("https://www.amazon.in/s?k=shoes", PAGE_ONE)
            .page("https://www.amazon.in/s?k=shoes&page=2", PAGE_TWO)
    }

    #[tokio::test]
    async fn extracts_fields_and_degrades_missing_ones() {
        let adapter = AmazonAdapter::new(Box::new(fixture()));
        let records = adapter.scrape("shoes", 1).await.unwrap();

        // The item without a title is skipped outright.
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Runner Shoe");
        assert_eq!(records[0].price, "1,999");
        assert_eq!(records[0].rating, "4.3 out of 5 stars");
        assert_eq!(records[0].link, "https://www.amazon.in/dp/B001");
        assert_eq!(records[1].title, "Trail Shoe");
        assert_eq!(records[1].price, NOT_AVAILABLE);
        assert_eq!(records[1].rating, NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn follows_next_link_up_to_max_pages() {
        let adapter = AmazonAdapter::new(Box::new(fixture()));
        let records = adapter.scrape("shoes", 3).await.unwrap();

        // Page two has no next link, so pagination stops there.
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].title, "City Shoe");
    }

    #[tokio::test]
    async fn max_pages_caps_pagination() {
        let session = fixture();
        let adapter = AmazonAdapter::new(Box::new(session));
        let records = adapter.scrape("shoes", 1).await.unwrap();
        assert!(records.iter().all(|r| r.title != "City Shoe"));
    }

    #[tokio::test]
    async fn first_page_fetch_failure_is_an_error() {
        let adapter = AmazonAdapter::new(Box::new(FixtureFetcher::new()));
        assert!(adapter.scrape("shoes", 1).await.is_err());
    }

    #[tokio::test]
    async fn spaces_become_plus_in_search_url() {
        let session = FixtureFetcher::new().page(
            "https://www.amazon.in/s?k=running+shoes",
            "<html></html>",
        );
        let adapter = AmazonAdapter::new(Box::new(session));
        let records = adapter.scrape("running shoes", 1).await.unwrap();
        assert!(records.is_empty());
    }
}
