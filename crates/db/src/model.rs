//! Typed collection handles.
//!
//! A [`Model`] couples an injected [`DocumentStore`] with an entity's
//! collection name and [`Schema`]. Writes go through the schema (cast, then
//! validate) before reaching the store; reads decode documents into the entity.
//! Listing goes through [`PendingQuery`], which is built first and executed later.

use std::{fmt, marker::PhantomData, sync::Arc};

use bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    codec,
    error::StoreResult,
    query::{Expr, Query, Sort, SortDirection},
    schema::{parse_object_id, Mode, Schema},
    store::DocumentStore,
};

/// A persisted record type.
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    /// Collection the entity lives in.
    const COLLECTION: &'static str;

    fn schema() -> &'static Schema;

    /// Hex identifier assigned by the store.
    fn id(&self) -> &str;
}

pub struct Model<T> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Model<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> fmt::Debug for Model<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("collection", &T::COLLECTION)
            .finish()
    }
}

impl<T: Entity> Model<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Unexecuted query over the collection, optionally filtered.
    pub fn find(&self, filter: Option<Expr>) -> PendingQuery<T> {
        PendingQuery {
            model: self.clone(),
            query: Query {
                filter,
                ..Query::default()
            },
        }
    }

    pub async fn find_one(&self, filter: &Expr) -> StoreResult<Option<T>> {
        self.store
            .find_one(T::COLLECTION, filter)
            .await?
            .map(codec::decode)
            .transpose()
    }

    /// Looks up by hex id. A malformed id is a cast error, not a miss.
    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        let id = parse_object_id("_id", id)?;
        self.find_by_object_id(id).await
    }

    pub async fn find_by_object_id(&self, id: ObjectId) -> StoreResult<Option<T>> {
        self.store
            .find_by_id(T::COLLECTION, id)
            .await?
            .map(codec::decode)
            .transpose()
    }

    pub async fn create(&self, fields: &Value) -> StoreResult<T> {
        let document = T::schema().prepare(fields, Mode::Create)?;
        let id = self.store.insert_one(T::COLLECTION, document).await?;

        tracing::debug!(collection = T::COLLECTION, id = %id, "document created");

        self.inserted(id).await
    }

    /// Validates every entry before inserting any of them.
    pub async fn insert_many(&self, entries: &[Value]) -> StoreResult<Vec<T>> {
        let documents = entries
            .iter()
            .map(|fields| T::schema().prepare(fields, Mode::Create))
            .collect::<StoreResult<Vec<_>>>()?;

        let ids = self.store.insert_many(T::COLLECTION, documents).await?;
        let mut created = Vec::with_capacity(ids.len());
        for id in ids {
            created.push(self.inserted(id).await?);
        }

        Ok(created)
    }

    /// Applies a partial update; only supplied fields are cast and validated.
    pub async fn find_by_id_and_update(&self, id: &str, fields: &Value) -> StoreResult<Option<T>> {
        let id = parse_object_id("_id", id)?;
        let changes = T::schema().prepare(fields, Mode::Update)?;

        self.store
            .update_by_id(T::COLLECTION, id, changes)
            .await?
            .map(codec::decode)
            .transpose()
    }

    pub async fn find_by_id_and_delete(&self, id: &str) -> StoreResult<Option<T>> {
        let id = parse_object_id("_id", id)?;

        self.store
            .delete_by_id(T::COLLECTION, id)
            .await?
            .map(codec::decode)
            .transpose()
    }

    pub async fn count(&self) -> StoreResult<u64> {
        self.store.count(T::COLLECTION).await
    }

    async fn inserted(&self, id: ObjectId) -> StoreResult<T> {
        self.find_by_object_id(id).await?.ok_or_else(|| {
            crate::error::StoreError::Backend(format!(
                "document {} vanished from {} after insert",
                id,
                T::COLLECTION
            ))
        })
    }
}

/// A constructed but not yet executed retrieval.
///
/// Ordering and windowing are applied by whoever executes it; nothing touches
/// the store until [`PendingQuery::exec`].
pub struct PendingQuery<T> {
    model: Model<T>,
    query: Query,
}

impl<T: Entity> fmt::Debug for PendingQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingQuery")
            .field("collection", &T::COLLECTION)
            .field("query", &self.query)
            .finish()
    }
}

impl<T: Entity> PendingQuery<T> {
    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.query.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub async fn exec(self) -> StoreResult<Vec<T>> {
        self.model
            .store
            .find(T::COLLECTION, &self.query)
            .await?
            .into_iter()
            .map(codec::decode)
            .collect()
    }
}
