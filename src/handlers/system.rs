use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use super::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Grades API",
        "version": version,
        "endpoints": {
            "list": "GET /grades?page=N",
            "get": "GET /grades/:id",
            "create": "POST /grades",
            "update": "PATCH /grades/:id",
            "delete": "DELETE /grades/:id",
            "health": "GET /health",
        }
    }))
}

/// GET /health - round trip to the record store
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "store": backend,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "store": backend,
                    "database": "unavailable"
                })),
            )
        }
    }
}
