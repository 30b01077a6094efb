use std::sync::Arc;

use axum::Router;
use common::utils::logging::{init_logging, LogFormat};
use configs::AppConfig;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::routes::{self, AppState};
use service::file::grade_store::GradeStore;

/// Initialize logging via shared common utils
pub fn init_logging_from(cfg: &AppConfig) {
    let format = LogFormat::parse(&cfg.logging.format).unwrap_or(LogFormat::Compact);
    init_logging(format, cfg.logging.file.as_deref());
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the grade store and create its document if this is the first run.
///
/// A failed bootstrap is logged and startup continues; requests will then
/// report the storage error until the file becomes available.
pub async fn open_store(cfg: &AppConfig) -> Arc<GradeStore> {
    let path = &cfg.storage.data_file;
    let store = GradeStore::new(path);
    match store.bootstrap().await {
        Ok(true) => info!(path = %path.display(), "grades document created"),
        Ok(false) => info!(path = %path.display(), "grades document found"),
        Err(e) => error!(path = %path.display(), error = %e, "cannot create grades document"),
    }
    store
}

pub fn build_app(store: Arc<GradeStore>) -> Router {
    let state = AppState::new(store);
    routes::build_router(state, build_cors())
}

/// Load `.env` and the application config, falling back to environment variables.
pub fn load_config() -> anyhow::Result<AppConfig> {
    dotenv().ok();
    AppConfig::load_or_env()
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let store = open_store(&cfg).await;
    let app = build_app(store);

    let listener = tokio::net::TcpListener::bind(cfg.server.bind_addr()).await?;
    let addr = listener.local_addr()?;
    info!(%addr, data_file = %cfg.storage.data_file.display(), "grades API listening");
    axum::serve(listener, app).await?;
    Ok(())
}
