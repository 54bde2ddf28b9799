//! The storage contract every backend implements.

use async_trait::async_trait;
use bson::{oid::ObjectId, Document};

use crate::{
    error::StoreResult,
    query::{Expr, Query},
};

/// Async access to named collections of BSON documents.
///
/// Every document carries an `_id` object id. Backends assign one on insert
/// when the document has none. Consistency and isolation are whatever the
/// backend provides; callers do no locking of their own.
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Inserts a document and returns its id.
    async fn insert_one(&self, collection: &str, document: Document) -> StoreResult<ObjectId>;

    /// Inserts several documents, returning their ids in input order.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> StoreResult<Vec<ObjectId>>;

    async fn find_by_id(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>>;

    /// First document matching the filter, in natural order.
    async fn find_one(&self, collection: &str, filter: &Expr) -> StoreResult<Option<Document>>;

    /// Executes a full query (filter, sort, skip, limit).
    async fn find(&self, collection: &str, query: &Query) -> StoreResult<Vec<Document>>;

    /// Sets the given fields and returns the document as it is after the
    /// update, or `None` when no document has that id.
    async fn update_by_id(
        &self,
        collection: &str,
        id: ObjectId,
        changes: Document,
    ) -> StoreResult<Option<Document>>;

    /// Removes a document and returns it, or `None` when no document has that id.
    async fn delete_by_id(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>>;

    async fn count(&self, collection: &str) -> StoreResult<u64>;

    /// Round-trips to the backend to confirm it is reachable.
    async fn ping(&self) -> StoreResult<()>;
}

/// Returns the document's `_id`, assigning a fresh one when absent.
pub(crate) fn ensure_id(document: &mut Document) -> ObjectId {
    match document.get_object_id("_id") {
        Ok(id) => id,
        Err(_) => {
            let id = ObjectId::new();
            document.insert("_id", id);
            id
        }
    }
}
