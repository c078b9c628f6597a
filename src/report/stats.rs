// Aggregates for the presentation layer: price and rating distributions.
use crate::model::{CleanRecord, Source};

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

/// Equal-width histogram over arbitrary values. Empty input (or zero bins)
/// yields no buckets; a degenerate range collapses to a single bucket.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bucket> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![Bucket {
            lo: min,
            hi: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &value in values {
        let idx = (((value - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bucket {
            lo: min + width * i as f64,
            hi: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Price distribution across all clean records.
pub fn price_buckets(records: &[CleanRecord], bins: usize) -> Vec<Bucket> {
    let prices: Vec<f64> = records.iter().map(|r| r.price).collect();
    histogram(&prices, bins)
}

/// Rating distribution for one source; unrated rows are excluded.
pub fn rating_buckets(records: &[CleanRecord], source: Source, bins: usize) -> Vec<Bucket> {
    let ratings: Vec<f64> = records
        .iter()
        .filter(|r| r.source == source)
        .filter_map(|r| r.rating)
        .collect();
    histogram(&ratings, bins)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(source: Source, price: f64, rating: Option<f64>) -> CleanRecord {
        CleanRecord {
            source,
            title: "item".to_string(),
            price,
            rating,
            link: "https://example.com".to_string(),
        }
    }

    #[test]
    fn histogram_spreads_values_across_bins() {
        let buckets = histogram(&[0.0, 1.0, 2.0, 3.0, 9.9], 2);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].count, 4);
        assert_eq!(buckets[1].count, 1);
        // The maximum lands in the last bucket, not past it.
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 5);
    }

    #[test]
    fn histogram_handles_empty_and_degenerate_input() {
        assert!(histogram(&[], 10).is_empty());
        let flat = histogram(&[5.0, 5.0, 5.0], 10);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].count, 3);
    }

    #[test]
    fn rating_buckets_filter_by_source_and_skip_unrated() {
        let records = vec![
            rec(Source::Amazon, 100.0, Some(4.0)),
            rec(Source::Amazon, 200.0, None),
            rec(Source::Myntra, 300.0, Some(2.0)),
            rec(Source::Amazon, 400.0, Some(5.0)),
        ];
        let buckets = rating_buckets(&records, Source::Amazon, 2);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn price_buckets_cover_all_records() {
        let records = vec![
            rec(Source::Amazon, 100.0, None),
            rec(Source::Myntra, 900.0, None),
        ];
        let buckets = price_buckets(&records, 4);
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 2);
    }
}
