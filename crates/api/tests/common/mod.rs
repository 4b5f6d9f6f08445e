#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use leafnote_db::{MemoryStore, NotesStore};
use serde_json::Value;
use tower::ServiceExt;

use leafnote_api::config::{LogFormat, ServerConfig, StoreBackend};
use leafnote_api::router::build_app_router;
use leafnote_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        store: StoreBackend::Memory,
        log_format: LogFormat::Pretty,
    }
}

/// Build the production router over the given store.
pub fn build_app_with_store(store: Arc<dyn NotesStore>) -> Router {
    build_app_router(AppState { store }, &test_config())
}

/// Build the production router over a fresh, empty [`MemoryStore`].
pub fn build_test_app() -> Router {
    build_app_with_store(Arc::new(MemoryStore::new()))
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// POST a body and return the parsed response, asserting the expected status.
pub async fn post_expect(app: &Router, uri: &str, body: Value, status: StatusCode) -> Value {
    let response = post_json(app, uri, body).await;
    assert_eq!(response.status(), status, "POST {uri}");
    body_json(response).await
}
