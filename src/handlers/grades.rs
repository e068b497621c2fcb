use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Json, Response},
};
use mongodb::bson::Document;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::api::format::{document_to_json, documents_to_json, json_to_document};
use crate::database::store::page_offset;
use crate::database::GradeId;
use crate::error::ApiError;

use super::AppState;

const NO_DATA_FOUND: &str = "No data found with the given id";
const COULD_NOT_DELETE: &str = "Could not delete the data";
const COULD_NOT_UPDATE: &str = "Could not update the data";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Zero-indexed page number; absent or empty means page 0
    pub page: Option<String>,
}

/// GET /grades - list one page of records
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let page = parse_page(query.page.as_deref())?;

    let records = state
        .store
        .list_page(page)
        .await
        .map_err(|e| ApiError::store_failure(e, "Could not fetch any data"))?;

    Ok(Json(documents_to_json(records)))
}

/// GET /grades/:id - fetch a single record
pub async fn get(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path_id(raw_id)?;

    let record = state
        .store
        .get_by_id(&id)
        .await
        .map_err(|e| ApiError::store_failure(e, "Could not fetch the data"))?;

    Ok(match record {
        Some(record) => Json(document_to_json(record)).into_response(),
        None => state.not_found(NO_DATA_FOUND),
    })
}

/// POST /grades - insert the request body as a new record
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let record = body_to_document(body)?;

    let ack = state
        .store
        .insert(record)
        .await
        .map_err(|e| ApiError::store_failure(e, "Could not insert the data"))?;

    info!("Inserted grade {}", ack.inserted_id);
    Ok(Json(ack).into_response())
}

/// DELETE /grades/:id - remove a single record
pub async fn delete(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    let id = path_id(raw_id)?;

    let ack = state
        .store
        .delete_by_id(&id)
        .await
        .map_err(|e| ApiError::store_failure(e, "Database error while deleting the data"))?;

    if ack.is_miss() {
        return Ok(state.not_found(COULD_NOT_DELETE));
    }

    info!("Deleted grade {}", id);
    Ok(Json(ack).into_response())
}

/// PATCH /grades/:id - merge the request body into a record
pub async fn update(
    State(state): State<AppState>,
    raw_id: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let id = path_id(raw_id)?;
    let patch = body_to_document(body)?;

    let ack = state
        .store
        .update_by_id(&id, patch)
        .await
        .map_err(|e| ApiError::store_failure(e, "Database error while updating the data"))?;

    if ack.is_miss() {
        return Ok(state.not_found(COULD_NOT_UPDATE));
    }

    info!("Updated grade {} (modified: {})", id, ack.modified_count);
    Ok(Json(ack).into_response())
}

fn path_id(raw: Result<Path<String>, PathRejection>) -> Result<GradeId, ApiError> {
    let Path(raw) = raw?;
    Ok(GradeId::normalize(&raw)?)
}

fn parse_page(raw: Option<&str>) -> Result<u64, ApiError> {
    let page = match raw.map(str::trim) {
        None | Some("") => 0,
        Some(s) => s
            .parse::<u64>()
            .map_err(|_| ApiError::bad_request("Invalid page provided"))?,
    };

    // Reject pages whose offset cannot be represented
    page_offset(page)
        .map(|_| page)
        .ok_or_else(|| ApiError::bad_request("Invalid page provided"))
}

fn body_to_document(body: Result<Json<Value>, JsonRejection>) -> Result<Document, ApiError> {
    let Json(body) = body?;
    let Value::Object(fields) = body else {
        return Err(ApiError::invalid_json("Request body must be a JSON object"));
    };

    json_to_document(&fields)
        .map_err(|e| ApiError::invalid_json(format!("Unsupported value in request body: {}", e)))
}
