// Flipkart search results. Unlike the other sites, the card markup here is
// flat: titles, prices and links are picked up as three parallel lists and
// zipped to the shortest one.
use super::{Fetcher, PageOutcome, SiteAdapter, absolutize, crawl, doc_first_attr};
use crate::model::{NOT_AVAILABLE, RawRecord, ScrapeError, Source};
use scraper::{Html, Selector};

const BASE: &str = "https://www.flipkart.com";

pub struct FlipkartAdapter {
    session: Box<dyn Fetcher>,
    titles: Selector,
    prices: Selector,
    links: Selector,
    next: Selector,
}

impl FlipkartAdapter {
    pub fn new(session: Box<dyn Fetcher>) -> Self {
        Self {
            session,
            titles: Selector::parse(".IRpwTa, ._4rR01T").unwrap(),
            prices: Selector::parse("._30jeq3").unwrap(),
            links: Selector::parse("a._1fQZEK, a.IRpwTa").unwrap(),
            next: Selector::parse("a._1LKTO3").unwrap(),
        }
    }

    fn search_url(query: &str) -> String {
        format!("{BASE}/search?q={}", query.trim().replace(' ', "+"))
    }

    fn parse_page(&self, doc: &Html) -> PageOutcome {
        let titles: Vec<String> = doc
            .select(&self.titles)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect();
        let prices: Vec<String> = doc
            .select(&self.prices)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect();
        let links: Vec<String> = doc
            .select(&self.links)
            .map(|el| el.value().attr("href").unwrap_or("").to_string())
            .collect();

        let count = titles.len().min(prices.len()).min(links.len());
        let mut records = Vec::new();
        for i in 0..count {
            if titles[i].is_empty() {
                continue;
            }
            let price = if prices[i].is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                prices[i].clone()
            };
            let link = if links[i].is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                absolutize(BASE, &links[i])
            };

            records.push(RawRecord {
                source: Source::Flipkart,
                title: titles[i].clone(),
                price,
                rating: NOT_AVAILABLE.to_string(),
                link,
            });
        }

        let next_url = doc_first_attr(doc, &self.next, "href").map(|h| absolutize(BASE, &h));
        PageOutcome { records, next_url }
    }
}

#[async_trait::async_trait]
impl SiteAdapter for FlipkartAdapter {
    fn source(&self) -> Source {
        Source::Flipkart
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
