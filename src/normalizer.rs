// Turns the raw product table into the numeric one: price text becomes a
// required number, rating text an optional one.
use crate::model::{CleanRecord, StorageError};
use crate::storage::SqliteStorage;
use regex::Regex;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOutcome {
    pub kept: usize,
    pub dropped: usize,
}

pub struct Normalizer {
    digits: Regex,
    decimal: Regex,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            digits: Regex::new(r"\d+").unwrap(),
            decimal: Regex::new(r"\d+\.\d+").unwrap(),
        }
    }

    /// First digit run after stripping the currency symbol and thousands
    /// separators; None when there is nothing numeric ("N/A" and friends).
    pub fn clean_price(&self, text: &str) -> Option<f64> {
        let stripped = text.replace('₹', "").replace(',', "");
        self.digits
            .find(&stripped)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .map(|value| value as f64)
    }

    /// First decimal-point number embedded in the rating text, e.g.
    /// "4.3 out of 5 stars" → 4.3.
    pub fn clean_rating(&self, text: &str) -> Option<f64> {
        self.decimal
            .find(text)
            .and_then(|m| m.as_str().parse::<f64>().ok())
    }

    /// Reads the whole table, drops rows without an extractable price,
    /// and rewrites it wholesale with the clean schema. A missing or empty
    /// table is a no-op. Running this on an already-clean table re-extracts
    /// the same values.
    pub fn normalize(&self, storage: &SqliteStorage) -> Result<NormalizeOutcome, StorageError> {
        let raw = storage.load_raw()?;
        if raw.is_empty() {
            return Ok(NormalizeOutcome { kept: 0, dropped: 0 });
        }

        let mut clean = Vec::new();
        let mut dropped = 0;
        for record in raw {
            match self.clean_price(&record.price) {
                Some(price) => clean.push(CleanRecord {
                    source: record.source,
                    title: record.title,
                    price,
                    rating: self.clean_rating(&record.rating),
                    link: record.link,
                }),
                None => dropped += 1,
            }
        }

        storage.replace_with_clean(&clean)?;
        info!(kept = clean.len(), dropped, "normalized product table");
        Ok(NormalizeOutcome {
            kept: clean.len(),
            dropped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NOT_AVAILABLE, RawRecord, Source};

    fn raw(title: &str, price: &str, rating: &str) -> RawRecord {
        RawRecord {
            source: Source::Amazon,
            title: title.to_string(),
            price: price.to_string(),
            rating: rating.to_string(),
            link: "https://example.com/p".to_string(),
        }
    }

    #[test]
    fn price_extraction() {
        let n = Normalizer::new();
        assert_eq!(n.clean_price("₹1,234"), Some(1234.0));
        assert_eq!(n.clean_price("2999"), Some(2999.0));
        assert_eq!(n.clean_price("Rs. 2,59,999"), Some(259999.0));
        assert_eq!(n.clean_price(NOT_AVAILABLE), None);
        assert_eq!(n.clean_price(""), None);
    }

    #[test]
    fn rating_extraction() {
        let n = Normalizer::new();
        assert_eq!(n.clean_rating("4.3 out of 5 stars"), Some(4.3));
        assert_eq!(n.clean_rating("4.3"), Some(4.3));
        assert_eq!(n.clean_rating(NOT_AVAILABLE), None);
        assert_eq!(n.clean_rating("5 stars"), None);
    }

    #[test]
    fn drops_rows_without_a_price_and_keeps_unrated_ones() {
        let storage = SqliteStorage::in_memory("products").unwrap();
        storage
            .append_raw(
                &[
                    raw("Good", "₹999", "4.3 out of 5 stars"),
                    raw("Unrated", "₹1,500", NOT_AVAILABLE),
                    raw("Priceless", NOT_AVAILABLE, "4.0 out of 5 stars"),
                ],
                true,
            )
            .unwrap();

        let outcome = Normalizer::new().normalize(&storage).unwrap();
        assert_eq!(outcome, NormalizeOutcome { kept: 2, dropped: 1 });

        let products = storage.all_products().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price, 999.0);
        assert_eq!(products[0].rating, Some(4.3));
        assert_eq!(products[1].price, 1500.0);
        assert_eq!(products[1].rating, None);
    }

    #[test]
    fn normalize_is_idempotent() {
        let storage = SqliteStorage::in_memory("products").unwrap();
        storage
            .append_raw(
                &[
                    raw("A", "₹1,234", "4.3 out of 5 stars"),
                    raw("B", "2999", NOT_AVAILABLE),
                ],
                true,
            )
            .unwrap();

        let normalizer = Normalizer::new();
        normalizer.normalize(&storage).unwrap();
        let once = storage.all_products().unwrap();

        let outcome = normalizer.normalize(&storage).unwrap();
        let twice = storage.all_products().unwrap();

        assert_eq!(once, twice);
        assert_eq!(outcome, NormalizeOutcome { kept: 2, dropped: 0 });
    }

    #[test]
    fn whole_number_ratings_survive_repeated_normalization() {
        let storage = SqliteStorage::in_memory("products").unwrap();
        storage
            .append_raw(&[raw("A", "₹999", "4.0 out of 5 stars")], true)
            .unwrap();

        let normalizer = Normalizer::new();
        normalizer.normalize(&storage).unwrap();
        let once = storage.all_products().unwrap();
        assert_eq!(once[0].rating, Some(4.0));

        normalizer.normalize(&storage).unwrap();
        let twice = storage.all_products().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn absent_or_empty_table_is_a_noop() {
        let storage = SqliteStorage::in_memory("products").unwrap();
        let outcome = Normalizer::new().normalize(&storage).unwrap();
        assert_eq!(outcome, NormalizeOutcome { kept: 0, dropped: 0 });
        assert!(!storage.table_exists().unwrap());
    }
}
