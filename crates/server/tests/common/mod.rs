//! Common test utilities.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use service::storage::{DocumentStore, MovieInfoStore};
use service::test_support::{sample_movie_infos, seed};
use tower_http::cors::CorsLayer;

use server::routes::{self, AppState};

pub const TEST_STREAM_PERIOD: Duration = Duration::from_millis(20);

/// Router over an in-memory store seeded with the three sample records.
pub async fn seeded_app() -> anyhow::Result<(Router, AppState)> {
    let store: Arc<dyn MovieInfoStore> = Arc::new(DocumentStore::in_memory(4));
    seed(store.clone(), sample_movie_infos()).await?;
    Ok(app_over(store))
}

pub fn app_over(store: Arc<dyn MovieInfoStore>) -> (Router, AppState) {
    let state = AppState::new(store, TEST_STREAM_PERIOD);
    let router = routes::build_router(state.clone(), CorsLayer::very_permissive());
    (router, state)
}
