use std::convert::Infallible;
use std::fmt::Display;

use axum::{
    body::Body,
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use tokio_stream::{Stream, StreamExt};

use service::demo;

use crate::routes::AppState;

/// Render `items` as a JSON array, one chunk per element.
fn json_array<S>(items: S) -> impl Stream<Item = Result<String, Infallible>> + Send + 'static
where
    S: Stream + Send + 'static,
    S::Item: Display,
{
    let mut first = true;
    let elements = items.map(move |item| {
        let sep = if first { "" } else { "," };
        first = false;
        format!("{sep}{item}")
    });
    tokio_stream::once("[".to_string())
        .chain(elements)
        .chain(tokio_stream::once("]".to_string()))
        .map(Ok::<String, Infallible>)
}

/// GET /demo/flux: `[1,2,3]`, then the body ends.
pub async fn flux() -> Response {
    let body = Body::from_stream(json_array(demo::bounded_sequence()));
    ([(CONTENT_TYPE, "application/json")], body).into_response()
}

/// GET /demo/mono
pub async fn mono() -> String {
    demo::greeting().await
}

/// GET /demo/stream: newline-delimited counter that ends only when the client goes away.
pub async fn stream(State(state): State<AppState>) -> Response {
    let ticks = state
        .ticker
        .start()
        .map(|n| Ok::<String, Infallible>(format!("{n}\n")));
    ([(CONTENT_TYPE, "application/x-ndjson")], Body::from_stream(ticks)).into_response()
}
