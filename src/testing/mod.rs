use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::app::app;
use crate::config::AppConfig;
use crate::database::{DynGradeStore, InMemoryGradeStore};
use crate::handlers::AppState;

/// Router over the given in-memory store with development defaults
pub fn router_with(store: Arc<InMemoryGradeStore>, strict_not_found: bool) -> Router {
    let mut config = AppConfig::from_lookup(|_| None);
    config.api.strict_not_found = strict_not_found;
    config.api.enable_request_logging = false;

    let store: DynGradeStore = store;
    app(AppState::new(store, &config.api), &config)
}

/// Send a body-less request and decode the JSON response
pub async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap_or_else(|err| panic!("failed to build request: {err}"));
    dispatch(router, request).await
}

/// Send a JSON request body and decode the JSON response
pub async fn send_json(router: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|err| panic!("failed to build request: {err}"));
    dispatch(router, request).await
}

async fn dispatch(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = match router.clone().oneshot(request).await {
        Ok(response) => response,
        Err(err) => panic!("router request failed: {err}"),
    };
    let status = response.status();

    let bytes = match to_bytes(response.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => panic!("failed to read response body: {err}"),
    };
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|err| panic!("response body is not JSON ({err}): {:?}", bytes));
    (status, value)
}
