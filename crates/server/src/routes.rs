use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::demo::Ticker;
use service::movie_info::MovieInfoService;
use service::storage::MovieInfoStore;

pub mod demo;
pub mod movie_infos;

pub const MOVIE_INFOS_PATH: &str = "/v1/movieinfos";
pub const MOVIE_INFO_PATH: &str = "/v1/movieinfos/:id";

/// Shared handler state, assembled once at startup.
#[derive(Clone)]
pub struct AppState {
    pub movie_infos: Arc<MovieInfoService>,
    pub ticker: Ticker,
}

impl AppState {
    pub fn new(store: Arc<dyn MovieInfoStore>, stream_period: Duration) -> Self {
        Self {
            movie_infos: Arc::new(MovieInfoService::new(store)),
            ticker: Ticker::new(stream_period),
        }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: health, movie info CRUD and the streaming demos.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let crud = Router::new()
        .route(MOVIE_INFOS_PATH, get(movie_infos::list).post(movie_infos::create))
        .route(
            MOVIE_INFO_PATH,
            get(movie_infos::get).put(movie_infos::update).delete(movie_infos::delete),
        );

    let demos = Router::new()
        .route("/demo/flux", get(demo::flux))
        .route("/demo/mono", get(demo::mono))
        .route("/demo/stream", get(demo::stream));

    Router::new()
        .route("/health", get(health))
        .merge(crud)
        .merge(demos)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
