mod config;
mod model;
mod normalizer;
mod orchestrator;
mod report;
mod scraper;
mod storage;

use config::{AppConfig, load_config};
use model::Source;
use orchestrator::run_with_config;
use std::env;
use std::path::Path;
use storage::SqliteStorage;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config: AppConfig = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("config.json not usable ({e}), using defaults");
            AppConfig::default()
        }
    };

    let args: Vec<String> = env::args().skip(1).collect();
    let query = if args.is_empty() {
        config.query.clone()
    } else {
        args.join(" ")
    };
    if query.trim().is_empty() {
        error!("no search query: pass one as an argument or set \"query\" in config.json");
        return;
    }
    if config.sites.none_enabled() {
        warn!("no sites enabled; only re-normalizing existing data");
    }

    let storage = match SqliteStorage::open(&config.db_path, &config.table_name) {
        Ok(storage) => storage,
        Err(e) => {
            error!("failed to open {}: {e}", config.db_path);
            return;
        }
    };

    let summary = run_with_config(&storage, &config, &query).await;
    for (source, count) in &summary.scraped {
        info!("{source}: {count} raw records");
    }
    info!(
        "run finished: {} written, {} kept, {} dropped",
        summary.written, summary.kept, summary.dropped
    );

    print_dashboard(&storage);

    if let Some(path) = &config.export_csv {
        match export_clean_table(&storage, path) {
            Ok(rows) => info!("exported {rows} rows to {path}"),
            Err(e) => warn!("csv export failed: {e}"),
        }
    }
}

fn export_clean_table(storage: &SqliteStorage, path: &str) -> Result<usize, model::ReportError> {
    let products = storage.all_products()?;
    report::export::write_csv(&products, Path::new(path))?;
    Ok(products.len())
}

/// The CLI stand-in for the dashboard: top offers, per-source averages and
/// the price/rating distributions, all from the clean table.
fn print_dashboard(storage: &SqliteStorage) {
    match storage.cheapest(5) {
        Ok(products) => {
            for p in &products {
                info!("cheapest | {:>10.2} | {} | {} | {}", p.price, p.source, p.title, p.link);
            }
        }
        Err(e) => warn!("cheapest query failed: {e}"),
    }
    match storage.priciest(5) {
        Ok(products) => {
            for p in &products {
                info!("priciest | {:>10.2} | {} | {} | {}", p.price, p.source, p.title, p.link);
            }
        }
        Err(e) => warn!("priciest query failed: {e}"),
    }
    match storage.average_price_by_source() {
        Ok(averages) => {
            for (source, avg, count) in averages {
                info!("{source}: avg price {avg:.2} across {count} products");
            }
        }
        Err(e) => warn!("average query failed: {e}"),
    }

    let products = match storage.all_products() {
        Ok(products) => products,
        Err(e) => {
            warn!("product read failed: {e}");
            return;
        }
    };
    for bucket in report::stats::price_buckets(&products, 10) {
        info!("price {:>8.0}-{:>8.0} | {}", bucket.lo, bucket.hi, "#".repeat(bucket.count));
    }
    for bucket in report::stats::rating_buckets(&products, Source::Amazon, 10) {
        info!("amazon rating {:.1}-{:.1} | {}", bucket.lo, bucket.hi, "#".repeat(bucket.count));
    }
}
