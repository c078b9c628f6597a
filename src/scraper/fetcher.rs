// Fetch backends: plain HTTP and a real Chrome session behind one trait.
use crate::config::BackendKind;
use crate::model::ScrapeError;
use headless_chrome::{Browser, LaunchOptionsBuilder};
use reqwest::Client;
use std::ffi::OsStr;
use std::time::Duration;
use tracing::debug;

/// One browser-ish session: `get` navigates to a URL and returns the page
/// HTML. Dropping the value tears the session down, on every exit path.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, ScrapeError>;
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub backend: BackendKind,
    pub headless: bool,
    pub user_agent: String,
    /// Fixed settle delay applied after each navigation.
    pub page_delay: Duration,
}

/// Opens a fresh session for the configured backend.
pub fn open_session(cfg: &SessionConfig) -> Result<Box<dyn Fetcher>, ScrapeError> {
    match cfg.backend {
        BackendKind::Http => Ok(Box::new(HttpFetcher::new(cfg)?)),
        BackendKind::Chrome => Ok(Box::new(ChromeFetcher::new(cfg)?)),
    }
}

pub struct HttpFetcher {
    client: Client,
    page_delay: Duration,
}

impl HttpFetcher {
    pub fn new(cfg: &SessionConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| ScrapeError::Session(e.to_string()))?;

        Ok(Self {
            client,
            page_delay: cfg.page_delay,
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::InvalidResponse(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::Http(e.to_string()))?;

        tokio::time::sleep(self.page_delay).await;
        Ok(body)
    }
}

/// Drives a local Chrome over the DevTools protocol. The process is killed
/// when the fetcher is dropped.
pub struct ChromeFetcher {
    browser: Browser,
    page_delay: Duration,
}

impl ChromeFetcher {
    pub fn new(cfg: &SessionConfig) -> Result<Self, ScrapeError> {
        let user_agent_arg = format!("--user-agent={}", cfg.user_agent);
        let options = LaunchOptionsBuilder::default()
            .headless(cfg.headless)
            .args(vec![
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new(&user_agent_arg),
            ])
            .build()
            .map_err(|e| ScrapeError::Session(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| ScrapeError::Session(e.to_string()))?;

        Ok(Self {
            browser,
            page_delay: cfg.page_delay,
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for ChromeFetcher {
    async fn get(&self, url: &str) -> Result<String, ScrapeError> {
        debug!("navigate {url}");
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| ScrapeError::Session(e.to_string()))?;

        tab.navigate_to(url)
            .and_then(|t| t.wait_until_navigated())
            .map_err(|e| ScrapeError::Http(e.to_string()))?;

        tokio::time::sleep(self.page_delay).await;

        let html = tab
            .get_content()
            .map_err(|e| ScrapeError::Http(e.to_string()))?;
        let _ = tab.close(true);
        Ok(html)
    }
}
