//! Router-level tests driving the axum `Router` directly.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use service::test_support::FailingStore;
use tower::ServiceExt;

use common::{app_over, seeded_app};

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("json body")
}

fn rises_sequel() -> Value {
    json!({
        "id": null,
        "name": "Dark Knight Rises 2",
        "year": 2005,
        "cast": ["Christian Bale", "Michael Cane"],
        "releaseDate": "2005-06-15"
    })
}

#[tokio::test]
async fn health_is_ok() -> anyhow::Result<()> {
    let (app, _) = seeded_app().await?;
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body)["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn list_and_get_seeded_records() -> anyhow::Result<()> {
    let (app, _) = seeded_app().await?;

    let (status, body) = call(&app, Method::GET, "/v1/movieinfos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body).as_array().map(Vec::len), Some(3));

    let (status, body) = call(&app, Method::GET, "/v1/movieinfos/abc", None).await;
    assert_eq!(status, StatusCode::OK);
    let rises = json_of(&body);
    assert_eq!(rises["name"], "Dark Knight Rises");
    assert_eq!(rises["cast"], json!(["Christian Bale", "Tom Hardy"]));
    assert_eq!(rises["releaseDate"], "2012-07-20");

    let (status, body) = call(&app, Method::GET, "/v1/movieinfos/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_of(&body)["error"], "Not Found");
    Ok(())
}

#[tokio::test]
async fn create_returns_201_with_assigned_id() -> anyhow::Result<()> {
    let (app, _) = seeded_app().await?;
    let mut draft = rises_sequel();
    draft["name"] = json!("Batman Begins 2");

    let (status, body) = call(&app, Method::POST, "/v1/movieinfos", Some(draft)).await;
    assert_eq!(status, StatusCode::CREATED);
    let created = json_of(&body);
    let id = created["id"].as_str().expect("id assigned").to_string();
    assert_ne!(id, "abc");

    let (status, body) = call(&app, Method::GET, &format!("/v1/movieinfos/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body)["name"], "Batman Begins 2");
    Ok(())
}

#[tokio::test]
async fn create_rejects_invalid_input_with_400() -> anyhow::Result<()> {
    let (app, _) = seeded_app().await?;

    let mut preset = rises_sequel();
    preset["id"] = json!("xyz");
    let (status, _) = call(&app, Method::POST, "/v1/movieinfos", Some(preset)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut blank = rises_sequel();
    blank["name"] = json!("");
    let (status, body) = call(&app, Method::POST, "/v1/movieinfos", Some(blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_of(&body)["detail"].as_str().unwrap().contains("movieInfo.name"));

    let (status, _) = call(&app, Method::POST, "/v1/movieinfos", Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::GET, "/v1/movieinfos", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body).as_array().map(Vec::len), Some(3));
    Ok(())
}

#[tokio::test]
async fn update_keeps_path_id() -> anyhow::Result<()> {
    let (app, _) = seeded_app().await?;

    let (status, body) = call(&app, Method::PUT, "/v1/movieinfos/abc", Some(rises_sequel())).await;
    assert_eq!(status, StatusCode::OK);
    let updated = json_of(&body);
    assert_eq!(updated["id"], "abc");
    assert_eq!(updated["name"], "Dark Knight Rises 2");
    assert_eq!(updated["year"], 2005);

    let (status, _) = call(&app, Method::PUT, "/v1/movieinfos/missing", Some(rises_sequel())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_is_204_and_idempotent() -> anyhow::Result<()> {
    let (app, _) = seeded_app().await?;

    for _ in 0..2 {
        let (status, body) = call(&app, Method::DELETE, "/v1/movieinfos/abc", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }
    let (status, _) = call(&app, Method::GET, "/v1/movieinfos/abc", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = call(&app, Method::GET, "/v1/movieinfos", None).await;
    assert_eq!(json_of(&body).as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn store_failures_surface_as_500() {
    let (app, _) = app_over(Arc::new(FailingStore::default()));

    let (status, body) = call(&app, Method::GET, "/v1/movieinfos", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_of(&body)["error"], "Store Failure");

    let (status, _) = call(&app, Method::GET, "/v1/movieinfos/abc", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let (status, _) = call(&app, Method::DELETE, "/v1/movieinfos/abc", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn flux_body_is_json_array() -> anyhow::Result<()> {
    let (app, _) = seeded_app().await?;
    let (status, body) = call(&app, Method::GET, "/demo/flux", None).await;
    assert_eq!(status, StatusCode::OK);
    let values: Vec<i64> = serde_json::from_slice(&body)?;
    assert_eq!(values, [1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn mono_body_is_greeting() -> anyhow::Result<()> {
    let (app, _) = seeded_app().await?;
    let (status, body) = call(&app, Method::GET, "/demo/mono", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body)?, "Hello World");
    Ok(())
}
