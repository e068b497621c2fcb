use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::identifier::GradeId;
use crate::database::store::{
    page_offset, DeleteAck, GradeStore, InsertAck, StoreError, UpdateAck, PAGE_SIZE,
};
use crate::types::Operation;

/// Process-local record store.
///
/// Keeps records in insertion order, which stands in for the collection's
/// natural order. Updates only understand top-level field names; dotted
/// paths are stored as literal keys.
#[derive(Debug, Default)]
pub struct InMemoryGradeStore {
    records: RwLock<Vec<Document>>,
}

impl InMemoryGradeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `records`, generating missing `_id`s
    pub fn with_records(records: impl IntoIterator<Item = Document>) -> Self {
        let records = records.into_iter().map(with_object_id).collect();
        Self {
            records: RwLock::new(records),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

/// Ensure `_id` exists and is the first field, as the server does on insert
fn with_object_id(record: Document) -> Document {
    if record.contains_key("_id") {
        return record;
    }
    let mut out = Document::new();
    out.insert("_id", ObjectId::new());
    for (key, value) in record {
        out.insert(key, value);
    }
    out
}

/// `_id` equality with numeric values compared by value, as the server does
fn same_id(a: &Bson, b: &Bson) -> bool {
    fn as_f64(value: &Bson) -> Option<f64> {
        match value {
            Bson::Int32(n) => Some(f64::from(*n)),
            Bson::Int64(n) => Some(*n as f64),
            Bson::Double(n) => Some(*n),
            _ => None,
        }
    }

    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn find_index(records: &[Document], id: &GradeId) -> Option<usize> {
    records
        .iter()
        .position(|r| r.get("_id").is_some_and(|value| id.matches(value)))
}

#[async_trait]
impl GradeStore for InMemoryGradeStore {
    async fn list_page(&self, page: u64) -> Result<Vec<Document>, StoreError> {
        let skip = page_offset(page)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| StoreError::rejected(Operation::Select, "page offset overflows"))?;

        let records = self.records.read().await;
        Ok(records
            .iter()
            .skip(skip)
            .take(PAGE_SIZE as usize)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &GradeId) -> Result<Option<Document>, StoreError> {
        let records = self.records.read().await;
        Ok(find_index(&records, id).map(|i| records[i].clone()))
    }

    async fn insert(&self, record: Document) -> Result<InsertAck, StoreError> {
        let record = with_object_id(record);
        let inserted_id = record.get("_id").cloned().unwrap_or(Bson::Null);

        let mut records = self.records.write().await;
        if records
            .iter()
            .any(|r| r.get("_id").is_some_and(|id| same_id(id, &inserted_id)))
        {
            return Err(StoreError::rejected(
                Operation::Create,
                format!("duplicate key: _id {}", inserted_id),
            ));
        }
        records.push(record);
        debug!(total = records.len(), "inserted record");

        Ok(InsertAck {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn delete_by_id(&self, id: &GradeId) -> Result<DeleteAck, StoreError> {
        let mut records = self.records.write().await;
        let deleted_count = match find_index(&records, id) {
            Some(i) => {
                records.remove(i);
                1
            }
            None => 0,
        };

        Ok(DeleteAck {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn update_by_id(&self, id: &GradeId, patch: Document) -> Result<UpdateAck, StoreError> {
        let mut records = self.records.write().await;
        let Some(index) = find_index(&records, id) else {
            return Ok(UpdateAck {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
                upserted_count: 0,
                upserted_id: None,
            });
        };

        let record = &mut records[index];
        if let Some(new_id) = patch.get("_id") {
            if !record.get("_id").is_some_and(|id| same_id(id, new_id)) {
                return Err(StoreError::rejected(
                    Operation::Update,
                    "performing an update on the path '_id' would modify the immutable field '_id'",
                ));
            }
        }

        let mut modified = false;
        for (key, value) in patch {
            if key == "_id" {
                continue;
            }
            if record.get(&key) != Some(&value) {
                record.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateAck {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
