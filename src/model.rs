// Core structs: Source, RawRecord, CleanRecord + error types
use std::fmt;
use thiserror::Error;

/// Sentinel stored in raw price/rating cells when extraction found nothing.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Amazon,
    Myntra,
    Flipkart,
}

impl Source {
    /// Fixed processing order for a run.
    pub const ALL: [Source; 3] = [Source::Amazon, Source::Myntra, Source::Flipkart];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Amazon => "Amazon",
            Source::Myntra => "Myntra",
            Source::Flipkart => "Flipkart",
        }
    }

    pub fn parse(text: &str) -> Option<Source> {
        match text {
            "Amazon" => Some(Source::Amazon),
            "Myntra" => Some(Source::Myntra),
            "Flipkart" => Some(Source::Flipkart),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scraped listing, as extracted from the page. Price and rating stay
/// free-text until normalization ("₹1,499", "4.3 out of 5 stars", "N/A").
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub source: Source,
    pub title: String,
    pub price: String,
    pub rating: String,
    pub link: String,
}

/// A listing after normalization: price is required, rating optional.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub source: Source,
    pub title: String,
    pub price: f64,
    pub rating: Option<f64>,
    pub link: String,
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("http error: {0}")]
    Http(String),
    #[error("browser session error: {0}")]
    Session(String),
    #[error("invalid response (status {0})")]
    InvalidResponse(u16),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
