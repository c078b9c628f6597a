use serde::Deserialize;
use std::fs;

/// Which marketplaces a run should hit.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SiteSelection {
    pub amazon: bool,
    pub myntra: bool,
    pub flipkart: bool,
}

impl Default for SiteSelection {
    fn default() -> Self {
        Self {
            amazon: true,
            myntra: true,
            flipkart: false,
        }
    }
}

impl SiteSelection {
    pub fn none_enabled(&self) -> bool {
        !(self.amazon || self.myntra || self.flipkart)
    }
}

/// Fetch backend picked at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Plain HTTP GET via reqwest.
    Http,
    /// Real Chrome via DevTools protocol; needed when a site renders
    /// listings client-side.
    Chrome,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default search query, overridable on the command line.
    pub query: String,
    pub db_path: String,
    pub table_name: String,
    pub sites: SiteSelection,
    pub max_pages: u32,
    pub backend: BackendKind,
    /// Only meaningful for the chrome backend; http has no window to hide.
    pub headless: bool,
    pub user_agent: String,
    /// Fixed settle delay after each page navigation.
    pub page_delay_ms: u64,
    /// When set, the clean table is exported here after each run.
    pub export_csv: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            query: String::new(),
            db_path: "ecommerce.db".to_string(),
            table_name: "products".to_string(),
            sites: SiteSelection::default(),
            max_pages: 1,
            backend: BackendKind::Http,
            headless: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) PriceScoutBot/0.1"
                .to_string(),
            page_delay_ms: 2000,
            export_csv: None,
        }
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let cfg: AppConfig = serde_json::from_str(r#"{"query": "shoes"}"#).unwrap();
        assert_eq!(cfg.query, "shoes");
        assert_eq!(cfg.table_name, "products");
        assert_eq!(cfg.max_pages, 1);
        assert_eq!(cfg.backend, BackendKind::Http);
        assert!(cfg.headless);
    }

    #[test]
    fn backend_parses_lowercase() {
        let cfg: AppConfig = serde_json::from_str(r#"{"backend": "chrome"}"#).unwrap();
        assert_eq!(cfg.backend, BackendKind::Chrome);
    }

    #[test]
    fn site_selection_flags() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{"sites": {"amazon": false, "flipkart": true}}"#).unwrap();
        assert!(!cfg.sites.amazon);
        assert!(cfg.sites.myntra);
        assert!(cfg.sites.flipkart);
        assert!(!cfg.sites.none_enabled());
    }
}
