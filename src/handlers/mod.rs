pub mod grades;
pub mod system;

use axum::http::StatusCode;
use axum::response::Response;

use crate::config::ApiConfig;
use crate::database::DynGradeStore;
use crate::error::ApiError;

/// Shared handler state: the injected record store plus response policy
#[derive(Clone)]
pub struct AppState {
    pub store: DynGradeStore,
    /// Status used when a well-formed id matches no record
    pub not_found_status: StatusCode,
}

impl AppState {
    pub fn new(store: DynGradeStore, api: &ApiConfig) -> Self {
        let not_found_status = if api.strict_not_found {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::OK
        };
        Self {
            store,
            not_found_status,
        }
    }

    /// Error-shaped body for lookups that matched nothing
    pub fn not_found(&self, message: &str) -> Response {
        ApiError::not_found(message).into_response_with(self.not_found_status)
    }
}
