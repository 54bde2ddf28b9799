//! MongoDB backend.

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::TryStreamExt;
use mongodb::{
    options::{ClientOptions, FindOptions, ReturnDocument},
    Client, Collection,
};

use crate::{
    error::{StoreError, StoreResult},
    query::{Expr, FieldOp, Query, QueryVisitor},
    store::{ensure_id, DocumentStore},
};

#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: String,
}

impl MongoStore {
    pub fn new(client: Client, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }

    /// Parses the connection string and builds a client. The driver connects
    /// lazily; call [`DocumentStore::ping`] to confirm the server is reachable.
    pub async fn connect(url: &str, database: &str) -> StoreResult<Self> {
        let options = ClientOptions::parse(url)
            .await
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        let client =
            Client::with_options(options).map_err(|e| StoreError::Initialization(e.to_string()))?;

        Ok(Self::new(client, database))
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.client.database(&self.database).collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, collection: &str, mut document: Document) -> StoreResult<ObjectId> {
        let id = ensure_id(&mut document);
        self.collection(collection).insert_one(document).await?;

        Ok(id)
    }

    async fn insert_many(
        &self,
        collection: &str,
        mut documents: Vec<Document>,
    ) -> StoreResult<Vec<ObjectId>> {
        if documents.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<ObjectId> = documents.iter_mut().map(ensure_id).collect();
        self.collection(collection).insert_many(documents).await?;

        Ok(ids)
    }

    async fn find_by_id(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>> {
        Ok(self
            .collection(collection)
            .find_one(doc! { "_id": id })
            .await?)
    }

    async fn find_one(&self, collection: &str, filter: &Expr) -> StoreResult<Option<Document>> {
        let filter = MongoQueryTranslator.visit_expr(filter)?;
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn find(&self, collection: &str, query: &Query) -> StoreResult<Vec<Document>> {
        let mut options = FindOptions::default();
        options.skip = query.skip;
        options.limit = query.limit.map(|limit| limit as i64);
        options.sort = query
            .sort
            .as_ref()
            .map(|sort| doc! { sort.field.clone(): sort.direction.as_i32() });

        let filter = match &query.filter {
            Some(expr) => MongoQueryTranslator.visit_expr(expr)?,
            None => doc! {},
        };

        Ok(self
            .collection(collection)
            .find(filter)
            .with_options(options)
            .await?
            .try_collect::<Vec<Document>>()
            .await?)
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: ObjectId,
        mut changes: Document,
    ) -> StoreResult<Option<Document>> {
        changes.remove("_id");
        if changes.is_empty() {
            return self.find_by_id(collection, id).await;
        }

        Ok(self
            .collection(collection)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_by_id(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>> {
        Ok(self
            .collection(collection)
            .find_one_and_delete(doc! { "_id": id })
            .await?)
    }

    async fn count(&self, collection: &str) -> StoreResult<u64> {
        Ok(self.collection(collection).count_documents(doc! {}).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;

        Ok(())
    }
}

/// Translates filter expressions into MongoDB query documents.
pub(crate) struct MongoQueryTranslator;

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;

    fn visit_and(&mut self, exprs: &[Expr]) -> StoreResult<Document> {
        Ok(doc! {
            "$and": exprs
                .iter()
                .map(|expr| self.visit_expr(expr))
                .collect::<StoreResult<Vec<_>>>()?,
        })
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> StoreResult<Document> {
        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::Contains => match value {
                    Bson::String(s) => doc! { "$regex": regex::escape(s), "$options": "i" },
                    _ => {
                        return Err(StoreError::Backend(
                            "Contains operator requires a string value".to_string(),
                        ))
                    }
                },
            }
        })
    }
}
