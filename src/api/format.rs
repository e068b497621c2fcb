use mongodb::bson::{self, Bson, Document};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Convert a stored record into the JSON shape returned to clients.
///
/// ObjectIds are rendered as bare 24-char hex strings; everything else uses
/// relaxed extended JSON, so numbers stay plain JSON numbers.
pub fn document_to_json(doc: Document) -> Value {
    let map: Map<String, Value> = doc
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect();
    Value::Object(map)
}

pub fn documents_to_json(docs: Vec<Document>) -> Value {
    Value::Array(docs.into_iter().map(document_to_json).collect())
}

pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(doc) => document_to_json(doc),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// `serialize_with` adapter for BSON-valued fields of response types
pub fn serialize_bson<S: Serializer>(value: &Bson, serializer: S) -> Result<S::Ok, S::Error> {
    bson_to_json(value.clone()).serialize(serializer)
}

pub fn serialize_optional_bson<S: Serializer>(
    value: &Option<Bson>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    value.clone().map(bson_to_json).serialize(serializer)
}

/// Convert a JSON request body into a BSON document, field by field
pub fn json_to_document(body: &Map<String, Value>) -> Result<Document, bson::ser::Error> {
    bson::to_document(body)
}
