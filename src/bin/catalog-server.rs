//! Catalog HTTP server over the in-memory inventory store.
//!
//! ```text
//! CATALOG_ROWS_PATH=rows.json CACHE_TTL_MS=30000 RUST_LOG=debug cargo run --bin catalog-server
//! curl 'http://127.0.0.1:3000/sqlqueryfunction?group=CALZADOS%20MASCULINOS&subcat=BRUNO'
//! ```

use catalog_cache::observability::LogMetrics;
use catalog_cache::{CacheStore, Config, InMemoryInventoryStore, QueryExecutor, RequestCoordinator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init()
        .ok();

    let config = Config::from_env()?;

    let store = match &config.rows_path {
        Some(path) => InMemoryInventoryStore::from_json_file(path)?,
        None => {
            log::warn!("CATALOG_ROWS_PATH not set, serving an empty catalog");
            InMemoryInventoryStore::new()
        }
    };

    if config.rows_path.is_some() && store.is_empty() {
        log::warn!("Inventory file holds no rows");
    }
    let rows = store.len();

    let cache = CacheStore::in_memory(config.cache_ttl);
    let sweeper = config
        .sweep_interval
        .map(|interval| cache.spawn_sweeper(interval));

    let coordinator = RequestCoordinator::with_metrics(
        cache,
        QueryExecutor::new(store),
        Box::new(LogMetrics),
    );
    let app = catalog_cache::http::router(coordinator, config.production);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!(
        "Catalog server on http://{} ({} rows, ttl {:?}, production: {})",
        config.bind_addr,
        rows,
        config.cache_ttl,
        config.production
    );

    let served = axum::serve(listener, app).await;
    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    served?;
    Ok(())
}
