use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use models::MovieInfo;
use tokio_stream::StreamExt;

use crate::errors::JsonApiError;
use crate::routes::AppState;

/// POST /v1/movieinfos
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<MovieInfo>, JsonRejection>,
) -> Result<(StatusCode, Json<MovieInfo>), JsonApiError> {
    let Json(draft) = payload?;
    let created = state.movie_infos.create(draft).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /v1/movieinfos
///
/// The whole stream is gathered before responding so a store failure midway
/// still yields a single 500 rather than a truncated 200.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<MovieInfo>>, JsonApiError> {
    let all: Result<Vec<MovieInfo>, _> = state.movie_infos.list().collect().await;
    Ok(Json(all?))
}

/// GET /v1/movieinfos/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieInfo>, JsonApiError> {
    Ok(Json(state.movie_infos.get(&id).await?))
}

/// PUT /v1/movieinfos/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MovieInfo>, JsonRejection>,
) -> Result<Json<MovieInfo>, JsonApiError> {
    let Json(patch) = payload?;
    Ok(Json(state.movie_infos.update(&id, patch).await?))
}

/// DELETE /v1/movieinfos/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    state.movie_infos.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
