// Myntra listing pages. Myntra exposes no rating on listing cards, and the
// title is split across a brand node and a product node.
use super::{
    Fetcher, PageOutcome, SiteAdapter, absolutize, crawl, doc_first_attr, first_attr, first_text,
};
use crate::model::{NOT_AVAILABLE, RawRecord, ScrapeError, Source};
use scraper::{Html, Selector};

const BASE: &str = "https://www.myntra.com";

pub struct MyntraAdapter {
    session: Box<dyn Fetcher>,
    item: Selector,
    brand: Selector,
    name: Selector,
    price: Selector,
    link: Selector,
    next: Selector,
}

impl MyntraAdapter {
    pub fn new(session: Box<dyn Fetcher>) -> Self {
        Self {
            session,
            item: Selector::parse(".product-base").unwrap(),
            brand: Selector::parse(".product-brand").unwrap(),
            name: Selector::parse(".product-product").unwrap(),
            price: Selector::parse(".product-price").unwrap(),
            link: Selector::parse("a").unwrap(),
            next: Selector::parse("li.pagination-next a").unwrap(),
        }
    }

    fn listing_url(query: &str) -> String {
        format!("{BASE}/{}", query.trim().replace(' ', "-"))
    }

    fn parse_page(&self, doc: &Html) -> PageOutcome {
        let mut records = Vec::new();

        for item in doc.select(&self.item) {
            // Both halves of the title are required; a card missing either
            // is skipped.
            let (Some(brand), Some(name)) =
                (first_text(item, &self.brand), first_text(item, &self.name))
            else {
                continue;
            };
            let price =
                first_text(item, &self.price).unwrap_or_else(|| NOT_AVAILABLE.to_string());
            let link = first_attr(item, &self.link, "href")
                .map(|href| absolutize(BASE, &href))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());

            records.push(RawRecord {
                source: Source::Myntra,
                title: format!("{brand} {name}"),
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
impl SiteAdapter for MyntraAdapter {
    fn source(&self) -> Source {
        Source::Myntra
    }

    async fn scrape(
        &self,
        query: &str,
        max_pages: u32,
    ) -> Result<Vec<RawRecord>, ScrapeError> {
        crawl(
            self.session.as_ref(),
            Self::listing_url(query),
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

    const PAGE: &str = r#"
        <html><body>
          <li class="product-base">
            <a href="shoes/puma/p/100"></a>
            <h3 class="product-brand">Puma</h3>
            <h4 class="product-product">Mesh Sneakers</h4>
            <span class="product-price">Rs. 2999</span>
          </li>
          <li class="product-base">
            <a href="shoes/nike/p/200"></a>
            <h3 class="product-brand">Nike</h3>
            <h4 class="product-product">Court Vision</h4>
          </li>
          <li class="product-base">
            <a href="shoes/zzz/p/300"></a>
            <h4 class="product-product">Orphan Name</h4>
          </li>
        </body></html>"#;

    #[tokio::test]
    async fn joins_brand_and_name_into_title() {
        let session = FixtureFetcher::new().page("https://www.myntra.com/running-shoes", PAGE);
        let adapter = MyntraAdapter::new(Box::new(session));
        let records = adapter.scrape("running shoes", 1).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Puma Mesh Sneakers");
        assert_eq!(records[0].price, "Rs. 2999");
        assert_eq!(records[0].rating, NOT_AVAILABLE);
        assert_eq!(records[0].link, "https://www.myntra.com/shoes/puma/p/100");
        assert_eq!(records[1].price, NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn missing_next_link_ends_pagination_quietly() {
        let session = FixtureFetcher::new().page("https://www.myntra.com/shoes", PAGE);
        let adapter = MyntraAdapter::new(Box::new(session));
        let records = adapter.scrape("shoes", 5).await.unwrap();
        assert_eq!(records.len(), 2);
    }
}
