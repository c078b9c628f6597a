// One run: scrape each enabled site in fixed order, append to storage
// (resetting on the first write), then normalize once.
use crate::config::AppConfig;
use crate::model::Source;
use crate::normalizer::Normalizer;
use crate::scraper::{
    AmazonAdapter, FlipkartAdapter, MyntraAdapter, SessionConfig, SiteAdapter, open_session,
};
use crate::storage::SqliteStorage;
use std::time::Duration;
use tracing::{info, warn};

/// Counters for one end-to-end run, mainly for logging and tests. Scrape,
/// storage, and normalization failures degrade to warnings; a run never
/// takes the process down.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Records each adapter produced, in processing order.
    pub scraped: Vec<(Source, usize)>,
    /// Raw rows actually written this run.
    pub written: usize,
    /// Rows surviving normalization.
    pub kept: usize,
    /// Rows normalization discarded for lack of a price.
    pub dropped: usize,
}

/// Builds one site's adapter (opening its session) at the moment the site's
/// turn comes; None skips the site.
type AdapterBuilder = Box<dyn FnOnce() -> Option<Box<dyn SiteAdapter>> + Send>;

pub struct Orchestrator {
    adapters: Vec<Box<dyn SiteAdapter>>,
}

impl Orchestrator {
    /// Adapters are processed in the order given; builders are expected to
    /// keep the fixed Amazon, Myntra, Flipkart order.
    pub fn new(adapters: Vec<Box<dyn SiteAdapter>>) -> Self {
        Self { adapters }
    }

    pub async fn run(&self, storage: &SqliteStorage, query: &str, max_pages: u32) -> RunSummary {
        let mut summary = RunSummary::default();

        // Stays true until an append actually writes rows, so a fresh run
        // discards the previous run's table exactly once.
        let mut reset = true;

        for adapter in &self.adapters {
            process_site(
                storage,
                adapter.as_ref(),
                query,
                max_pages,
                &mut reset,
                &mut summary,
            )
            .await;
        }

        normalize_table(storage, &mut summary);
        summary
    }
}

/// Like [`Orchestrator::run`], but each adapter is built only when its turn
/// comes and dropped as soon as its site is done — one live session at a
/// time, torn down before the next one opens.
async fn run_deferred(
    storage: &SqliteStorage,
    query: &str,
    max_pages: u32,
    builders: Vec<AdapterBuilder>,
) -> RunSummary {
    let mut summary = RunSummary::default();
    let mut reset = true;

    for build in builders {
        let Some(adapter) = build() else { continue };
        process_site(
            storage,
            adapter.as_ref(),
            query,
            max_pages,
            &mut reset,
            &mut summary,
        )
        .await;
        // adapter (and its session) dropped here
    }

    normalize_table(storage, &mut summary);
    summary
}

async fn process_site(
    storage: &SqliteStorage,
    adapter: &dyn SiteAdapter,
    query: &str,
    max_pages: u32,
    reset: &mut bool,
    summary: &mut RunSummary,
) {
    let source = adapter.source();
    info!("scraping {source} for {query:?} (up to {max_pages} pages)");

    let records = match adapter.scrape(query, max_pages).await {
        Ok(records) => records,
        Err(e) => {
            warn!("{source} scrape failed: {e}");
            Vec::new()
        }
    };
    info!("{source}: {} records", records.len());
    summary.scraped.push((source, records.len()));

    match storage.append_raw(&records, *reset) {
        Ok(written) if written > 0 => {
            *reset = false;
            summary.written += written;
        }
        Ok(_) => {}
        Err(e) => warn!("{source} save failed: {e}"),
    }
}

fn normalize_table(storage: &SqliteStorage, summary: &mut RunSummary) {
    match Normalizer::new().normalize(storage) {
        Ok(outcome) => {
            summary.kept = outcome.kept;
            summary.dropped = outcome.dropped;
        }
        Err(e) => warn!("normalization failed: {e}"),
    }
}

/// Runs the enabled sites in fixed order. Each site's session is opened
/// immediately before its scrape and torn down with the adapter before the
/// next site begins; a site whose session cannot be opened is skipped with
/// a warning.
pub async fn run_with_config(
    storage: &SqliteStorage,
    config: &AppConfig,
    query: &str,
) -> RunSummary {
    let session_cfg = SessionConfig {
        backend: config.backend,
        headless: config.headless,
        user_agent: config.user_agent.clone(),
        page_delay: Duration::from_millis(config.page_delay_ms),
    };

    let mut builders: Vec<AdapterBuilder> = Vec::new();
    if config.sites.amazon {
        let cfg = session_cfg.clone();
        builders.push(Box::new(move || {
            let session = open_or_warn(&cfg, Source::Amazon)?;
            Some(Box::new(AmazonAdapter::new(session)) as Box<dyn SiteAdapter>)
        }));
    }
    if config.sites.myntra {
        let cfg = session_cfg.clone();
        builders.push(Box::new(move || {
            let session = open_or_warn(&cfg, Source::Myntra)?;
            Some(Box::new(MyntraAdapter::new(session)) as Box<dyn SiteAdapter>)
        }));
    }
    if config.sites.flipkart {
        let cfg = session_cfg.clone();
        builders.push(Box::new(move || {
            let session = open_or_warn(&cfg, Source::Flipkart)?;
            Some(Box::new(FlipkartAdapter::new(session)) as Box<dyn SiteAdapter>)
        }));
    }

    run_deferred(storage, query, config.max_pages, builders).await
}

fn open_or_warn(cfg: &SessionConfig, source: Source) -> Option<Box<dyn crate::scraper::Fetcher>> {
    match open_session(cfg) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("{source}: could not open a session, skipping site: {e}");
            None
        }
    }
}
