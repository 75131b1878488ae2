use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use content_grid_api::config::{self, AppConfig, Environment};
use content_grid_api::content::{
    ContentService, ContentStore, MemoryContentStore, Normalizer, PgContentStore, SeedCatalog,
};

mod error;
mod handlers;
mod middleware;

use error::ApiError;
use handlers::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, CONTENT_SEED_PATH, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting content grid API in {:?} mode", config.environment);

    let state = AppState {
        content: build_content_service(config).await?,
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Content grid API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn build_content_service(config: &AppConfig) -> anyhow::Result<ContentService> {
    let store: Arc<dyn ContentStore> = match &config.database.url {
        Some(url) => {
            let store = PgContentStore::connect(
                url,
                config.database.max_connections,
                config.database.connection_timeout,
            )
            .await?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
        None => {
            if content_grid_api::is_production!() {
                tracing::warn!("DATABASE_URL not set in production; content will not survive a restart");
            } else {
                tracing::info!("DATABASE_URL not set, using in-memory content store");
            }
            Arc::new(MemoryContentStore::new())
        }
    };

    let seeds = config.content.seed_catalog().unwrap_or_else(|e| {
        tracing::warn!("Ignoring seed file: {}; using built-in defaults", e);
        SeedCatalog::builtin()
    });

    Ok(ContentService::new(
        store,
        Normalizer::new(seeds),
        config.content.seed_options(),
    ))
}

fn app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Content
        .merge(content_routes())
        .fallback(not_found)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(config)),
        )
}

fn content_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/content/:key",
            get(handlers::content_get).put(handlers::content_put),
        )
        .route("/api/normalize", post(handlers::preview_normalize))
        .route("/api/derive", post(handlers::preview_derive))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }
    if matches!(config.environment, Environment::Development) {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Content Grid API",
            "version": version,
            "description": "Normalized stat-grid content for the marketing site and rep portal",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "content": "/api/content/:key (GET normalized grid, PUT stored document)",
                "normalize": "/api/normalize[?key=] (POST raw document, preview only)",
                "derive": "/api/derive (POST card text, preview only)",
            }
        }
    }))
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.content.store().ping().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "content store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}

async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
