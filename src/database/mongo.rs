use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Collection, Database};
use tracing::debug;

use crate::database::identifier::GradeId;
use crate::database::store::{
    page_offset, DeleteAck, GradeStore, InsertAck, StoreError, UpdateAck, PAGE_SIZE,
};
use crate::types::Operation;

/// Record store backed by a MongoDB collection
#[derive(Clone)]
pub struct MongoGradeStore {
    database: Database,
    collection: Collection<Document>,
}

impl MongoGradeStore {
    pub fn new(database: Database, collection_name: &str) -> Self {
        let collection = database.collection::<Document>(collection_name);
        Self {
            database,
            collection,
        }
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }
}

#[async_trait]
impl GradeStore for MongoGradeStore {
    async fn list_page(&self, page: u64) -> Result<Vec<Document>, StoreError> {
        let skip = page_offset(page)
            .ok_or_else(|| StoreError::rejected(Operation::Select, "page offset overflows"))?;
        debug!(collection = self.collection_name(), page, skip, "listing records");

        let cursor = self
            .collection
            .find(doc! {})
            .skip(skip)
            .limit(PAGE_SIZE as i64)
            .await
            .map_err(|e| StoreError::driver(Operation::Select, e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::driver(Operation::Select, e))
    }

    async fn get_by_id(&self, id: &GradeId) -> Result<Option<Document>, StoreError> {
        debug!(collection = self.collection_name(), %id, "fetching record");
        self.collection
            .find_one(id.filter())
            .await
            .map_err(|e| StoreError::driver(Operation::Select, e))
    }

    async fn insert(&self, record: Document) -> Result<InsertAck, StoreError> {
        debug!(collection = self.collection_name(), "inserting record");
        let result = self
            .collection
            .insert_one(record)
            .await
            .map_err(|e| StoreError::driver(Operation::Create, e))?;

        Ok(InsertAck {
            acknowledged: true,
            inserted_id: result.inserted_id,
        })
    }

    async fn delete_by_id(&self, id: &GradeId) -> Result<DeleteAck, StoreError> {
        debug!(collection = self.collection_name(), %id, "deleting record");
        let result = self
            .collection
            .delete_one(id.filter())
            .await
            .map_err(|e| StoreError::driver(Operation::Delete, e))?;

        Ok(DeleteAck {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn update_by_id(&self, id: &GradeId, patch: Document) -> Result<UpdateAck, StoreError> {
        debug!(collection = self.collection_name(), %id, fields = patch.len(), "updating record");
        let result = self
            .collection
            .update_one(id.filter(), doc! { "$set": patch })
            .await
            .map_err(|e| StoreError::driver(Operation::Update, e))?;

        Ok(UpdateAck {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
            upserted_id: result.upserted_id,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| StoreError::driver(Operation::Ping, e))
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}
