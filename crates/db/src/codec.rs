//! Conversion from stored BSON documents to the JSON view entities decode from.
//!
//! The view renames `_id` to `id` and renders object ids as hex strings so
//! entity types stay plain serde structs.

use bson::{Bson, Document};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::error::StoreResult;

/// Decodes a stored document into an entity.
pub fn decode<T: DeserializeOwned>(document: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(document_to_json(document))?)
}

/// JSON view of a stored document.
pub fn document_to_json(document: Document) -> Value {
    let mut map = Map::with_capacity(document.len());
    for (key, value) in document {
        let key = if key == "_id" { "id".to_string() } else { key };
        map.insert(key, bson_to_json(value));
    }
    Value::Object(map)
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::String(s) => Value::String(s),
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Null => Value::Null,
        Bson::Int32(v) => Value::Number(v.into()),
        Bson::Int64(v) => Value::Number(v.into()),
        Bson::Double(v) => Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        other => Value::String(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Row {
        id: String,
        owner: String,
        pages: Option<Number>,
    }

    #[test]
    fn renames_id_and_renders_object_ids_as_hex() {
        let id = ObjectId::new();
        let owner = ObjectId::new();
        let row: Row = decode(doc! { "_id": id, "owner": owner, "pages": 300_i64 }).unwrap();

        assert_eq!(row.id, id.to_hex());
        assert_eq!(row.owner, owner.to_hex());
        assert_eq!(row.pages.unwrap().as_i64(), Some(300));
    }

    #[test]
    fn keeps_fractional_numbers() {
        let view = document_to_json(doc! { "preco": 29.9 });
        assert_eq!(view["preco"], serde_json::json!(29.9));
    }
}
