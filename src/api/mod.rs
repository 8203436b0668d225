use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::ChromeLauncher;
use crate::config::Config;
use crate::db::Store;
use crate::services::{CsvKeywordSource, ResultStore, RunService, SearchRunner, SeaOrmResultStore};

mod assets;
mod error;
mod observability;
mod results;
mod runs;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub runner: Arc<dyn RunService>,

    pub results: Arc<dyn ResultStore>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: Config,
        store: Store,
        runner: Arc<dyn RunService>,
        results: Arc<dyn ResultStore>,
        prometheus_handle: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            runner,
            results,
            start_time: std::time::Instant::now(),
            prometheus_handle,
        }
    }
}

/// Wires the production collaborators: CSV keywords, Chrome, `SQLite`.
pub fn create_app_state(
    config: Config,
    store: Store,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let results: Arc<dyn ResultStore> = Arc::new(SeaOrmResultStore::new(store.clone()));
    let runner = SearchRunner::from_config(
        &config,
        Arc::new(CsvKeywordSource::from_config(&config.keywords)),
        ChromeLauncher::new(config.browser.clone()),
        results.clone(),
    )?;

    Ok(Arc::new(AppState::new(
        config,
        store,
        Arc::new(runner),
        results,
        prometheus_handle,
    )))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    create_app_state(config, store, prometheus_handle)
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/search/start", post(runs::start_search))
        .route("/results", get(results::list_results))
        .route("/health", get(system::get_health))
        .route("/metrics", get(observability::get_metrics));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/start_search", post(runs::start_search))
        .nest("/api", api_router)
        .with_state(state)
        .fallback(assets::serve_asset)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(middleware::from_fn(observability::logging_middleware))
}
