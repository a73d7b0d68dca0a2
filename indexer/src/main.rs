//! openmart-sync: per-chain OrderBook event indexer.
//!
//! Wires config → database → redis → chain client → collection filter →
//! indexer tasks, then waits for Ctrl+C and signals every loop to stop.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use openmart_sync::application::collection_filter::CollectionFilter;
use openmart_sync::application::indexer::OrderBookIndexer;
use openmart_sync::config::Config;
use openmart_sync::infrastructure::chain::HttpChainClient;
use openmart_sync::infrastructure::kv::RedisStore;
use openmart_sync::infrastructure::persistence::{DbPool, RepositoryFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("OPENMART_CONFIG").ok())
        .unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {config_path}"))?;
    tracing::info!(chain = %config.chain_cfg.name, "configuration loaded");

    let db_pool = DbPool::new(&config.db)
        .await
        .context("failed to connect to database")?;
    let repositories = RepositoryFactory::create_repositories(&db_pool);

    let kv = Arc::new(
        RedisStore::connect(&config.kv.redis_url)
            .await
            .context("failed to connect to redis")?,
    );

    let chain_client = Arc::new(HttpChainClient::new(config.rpc_endpoint()));

    // Must complete before the sync loop starts so no event is checked
    // against a half-empty set.
    let collection_filter = Arc::new(CollectionFilter::new());
    collection_filter
        .preload(&repositories.collection, config.chain_cfg.id)
        .await
        .context("failed to preload collection filter")?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let indexer = Arc::new(OrderBookIndexer::new(
        &config,
        chain_client,
        kv,
        repositories,
        collection_filter,
        shutdown_rx,
    )?);
    let tasks = indexer.start();
    tracing::info!(chain = %config.chain_cfg.name, "indexer started");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl+c")?;
    tracing::info!("shutdown signal received");
    let _ = shutdown_tx.send(true);

    for task in tasks {
        let _ = task.await;
    }
    tracing::info!("indexer stopped");
    Ok(())
}
