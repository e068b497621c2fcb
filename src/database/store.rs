use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use serde::Serialize;
use thiserror::Error;

use crate::api::format::{serialize_bson, serialize_optional_bson};
use crate::database::identifier::GradeId;
use crate::types::Operation;

/// Number of records returned per listing page
pub const PAGE_SIZE: u64 = 10;

/// Errors from the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{operation} failed: {source}")]
    Driver {
        operation: Operation,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("{operation} rejected: {reason}")]
    Rejected { operation: Operation, reason: String },
}

impl StoreError {
    pub fn driver(operation: Operation, source: mongodb::error::Error) -> Self {
        StoreError::Driver { operation, source }
    }

    pub fn rejected(operation: Operation, reason: impl Into<String>) -> Self {
        StoreError::Rejected {
            operation,
            reason: reason.into(),
        }
    }
}

/// Acknowledgment of a single insert
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    #[serde(serialize_with = "serialize_bson")]
    pub inserted_id: Bson,
}

/// Outcome of a delete-by-id; `deleted_count == 0` means nothing matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteAck {
    pub fn is_miss(&self) -> bool {
        self.deleted_count == 0
    }
}

/// Outcome of an update-by-id; `matched_count == 0` means nothing matched
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    #[serde(serialize_with = "serialize_optional_bson")]
    pub upserted_id: Option<Bson>,
}

impl UpdateAck {
    pub fn is_miss(&self) -> bool {
        self.matched_count == 0
    }
}

/// Gateway over the single grades collection.
///
/// Handlers only ever talk to the collection through this trait, so the
/// MongoDB-backed store and the in-memory store are interchangeable.
#[async_trait]
pub trait GradeStore: Send + Sync {
    /// Skip `page * PAGE_SIZE` records and return at most `PAGE_SIZE`, in natural order
    async fn list_page(&self, page: u64) -> Result<Vec<Document>, StoreError>;

    async fn get_by_id(&self, id: &GradeId) -> Result<Option<Document>, StoreError>;

    /// Insert the record as-is; an `_id` is generated when the record has none
    async fn insert(&self, record: Document) -> Result<InsertAck, StoreError>;

    async fn delete_by_id(&self, id: &GradeId) -> Result<DeleteAck, StoreError>;

    /// Merge `patch` into the matching record (`$set` semantics)
    async fn update_by_id(&self, id: &GradeId, patch: Document) -> Result<UpdateAck, StoreError>;

    /// Round trip to the backend, used at startup and by `/health`
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}

pub type DynGradeStore = Arc<dyn GradeStore>;

/// Number of records to skip for a zero-indexed page.
///
/// `None` when the offset does not fit the server's signed 64-bit `skip`.
pub fn page_offset(page: u64) -> Option<u64> {
    page.checked_mul(PAGE_SIZE)
        .filter(|offset| i64::try_from(*offset).is_ok())
}
