// openmart API server entry point

mod config;
mod db;
mod entity;
mod error;
mod handlers;
mod kv;
mod middleware;
mod models;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, Router};
use http::{header, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::ApiConfig;
use db::DbPool;
use handlers::{get_activities, get_collection_ranking, get_item_image, AppState};
use kv::RedisStore;

#[tokio::main]
async fn main() {
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
    let config = ApiConfig::load(&config_path).expect("Failed to load configuration");
    tracing::info!("Configuration loaded");

    let db_pool = DbPool::new(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    let kv = Arc::new(
        RedisStore::connect(&config.kv.redis_url)
            .await
            .expect("Failed to connect to redis"),
    );

    let repositories = db_pool.repositories();
    let app_state = AppState {
        repositories: Arc::new(repositories),
        kv,
        config: Arc::new(config.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ORIGIN,
            header::AUTHORIZATION,
        ])
        .max_age(Duration::from_secs(3600));

    // The image endpoint replays byte-identical responses for a minute;
    // everything else is served fresh.
    let image_routes = Router::new()
        .route(
            "/api/v1/collections/{address}/{token_id}/image",
            get(get_item_image),
        )
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::cache::cache_api,
        ));

    let app = Router::new()
        .route("/api/v1/activities", get(get_activities))
        .route("/api/v1/collections/ranking", get(get_collection_ranking))
        .merge(image_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
