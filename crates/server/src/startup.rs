use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::AppConfig;
use service::storage::{DocumentStore, MovieInfoStore};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the configured store: file-backed when `store.path` is set, memory-only otherwise.
pub async fn open_store(cfg: &AppConfig) -> anyhow::Result<Arc<dyn MovieInfoStore>> {
    let capacity = cfg.store.channel_capacity;
    let store = match &cfg.store.path {
        Some(path) => {
            info!(%path, "opening file-backed movie info store");
            DocumentStore::open(path, capacity).await?
        }
        None => {
            info!("using in-memory movie info store");
            DocumentStore::in_memory(capacity)
        }
    };
    Ok(Arc::new(store))
}

/// Wire store, services and router together.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let store = open_store(cfg).await?;
    let state = AppState::new(store, cfg.demo.stream_period());
    Ok(routes::build_router(state, build_cors()))
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}

/// Public entry: build the app and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;
    let addr = bind_addr(&cfg)?;
    info!(%addr, "starting movie info server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
