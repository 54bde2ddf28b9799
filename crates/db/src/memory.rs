//! In-memory backend.
//!
//! Collections are vectors of BSON documents behind an async read-write lock,
//! kept in insertion order. Queries scan the whole collection. Clones share
//! the same data, which makes this the store handed to tests.

use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use crate::{
    error::StoreResult,
    query::{Expr, FieldOp, Query, QueryVisitor, SortDirection},
    schema::as_f64,
    store::{ensure_id, DocumentStore},
};

type StoreMap = HashMap<String, Vec<Document>>;

#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_one(&self, collection: &str, mut document: Document) -> StoreResult<ObjectId> {
        let id = ensure_id(&mut document);
        self.store
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(document);

        Ok(id)
    }

    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> StoreResult<Vec<ObjectId>> {
        let mut store = self.store.write().await;
        let docs = store.entry(collection.to_string()).or_default();

        let mut ids = Vec::with_capacity(documents.len());
        for mut document in documents {
            ids.push(ensure_id(&mut document));
            docs.push(document);
        }

        Ok(ids)
    }

    async fn find_by_id(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>> {
        let store = self.store.read().await;
        Ok(store
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| has_id(doc, id)))
            .cloned())
    }

    async fn find_one(&self, collection: &str, filter: &Expr) -> StoreResult<Option<Document>> {
        let store = self.store.read().await;
        let Some(docs) = store.get(collection) else {
            return Ok(None);
        };

        for doc in docs {
            if DocumentEvaluator::new(doc).evaluate(filter)? {
                return Ok(Some(doc.clone()));
            }
        }

        Ok(None)
    }

    async fn find(&self, collection: &str, query: &Query) -> StoreResult<Vec<Document>> {
        let store = self.store.read().await;
        let Some(docs) = store.get(collection) else {
            return Ok(vec![]);
        };

        let mut matched = Vec::new();
        for doc in docs {
            let keep = match &query.filter {
                Some(filter) => DocumentEvaluator::new(doc).evaluate(filter)?,
                None => true,
            };
            if keep {
                matched.push(doc.clone());
            }
        }

        if let Some(sort) = &query.sort {
            matched.sort_by(|a, b| {
                let ordering = compare(a.get(&sort.field), b.get(&sort.field));
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        Ok(matched
            .into_iter()
            .skip(query.skip.unwrap_or(0) as usize)
            .take(query.limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .collect())
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: ObjectId,
        changes: Document,
    ) -> StoreResult<Option<Document>> {
        let mut store = self.store.write().await;
        let Some(doc) = store
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| has_id(doc, id)))
        else {
            return Ok(None);
        };

        for (key, value) in changes {
            if key != "_id" {
                doc.insert(key, value);
            }
        }

        Ok(Some(doc.clone()))
    }

    async fn delete_by_id(&self, collection: &str, id: ObjectId) -> StoreResult<Option<Document>> {
        let mut store = self.store.write().await;
        let Some(docs) = store.get_mut(collection) else {
            return Ok(None);
        };

        Ok(docs
            .iter()
            .position(|doc| has_id(doc, id))
            .map(|index| docs.remove(index)))
    }

    async fn count(&self, collection: &str) -> StoreResult<u64> {
        Ok(self
            .store
            .read()
            .await
            .get(collection)
            .map(|docs| docs.len() as u64)
            .unwrap_or(0))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

fn has_id(doc: &Document, id: ObjectId) -> bool {
    matches!(doc.get("_id"), Some(Bson::ObjectId(existing)) if *existing == id)
}

/// Total order used for sorting: missing/null first, then numbers, strings,
/// object ids, booleans. Values of different kinds order by that rank.
fn compare(left: Option<&Bson>, right: Option<&Bson>) -> Ordering {
    fn rank(value: Option<&Bson>) -> u8 {
        match value {
            None | Some(Bson::Null) => 0,
            Some(v) if as_f64(v).is_some() => 1,
            Some(Bson::String(_)) => 2,
            Some(Bson::ObjectId(_)) => 3,
            Some(Bson::Boolean(_)) => 4,
            Some(_) => 5,
        }
    }

    match (left, right) {
        (Some(Bson::String(a)), Some(Bson::String(b))) => a.cmp(b),
        (Some(Bson::ObjectId(a)), Some(Bson::ObjectId(b))) => a.bytes().cmp(&b.bytes()),
        (Some(Bson::Boolean(a)), Some(Bson::Boolean(b))) => a.cmp(b),
        (Some(a), Some(b)) => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => rank(left).cmp(&rank(right)),
        },
        _ => rank(left).cmp(&rank(right)),
    }
}

/// Evaluates filter expressions against a single document.
struct DocumentEvaluator<'a> {
    document: &'a Document,
}

impl<'a> DocumentEvaluator<'a> {
    fn new(document: &'a Document) -> Self {
        Self { document }
    }

    fn evaluate(&mut self, expr: &Expr) -> StoreResult<bool> {
        self.visit_expr(expr)
    }
}

impl QueryVisitor for DocumentEvaluator<'_> {
    type Output = bool;

    fn visit_and(&mut self, exprs: &[Expr]) -> StoreResult<bool> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> StoreResult<bool> {
        let Some(actual) = self.document.get(field) else {
            return Ok(false);
        };

        Ok(match op {
            FieldOp::Eq => match (as_f64(actual), as_f64(value)) {
                (Some(a), Some(b)) => a == b,
                _ => actual == value,
            },
            FieldOp::Gte => matches!(
                (as_f64(actual), as_f64(value)),
                (Some(a), Some(b)) if a >= b
            ),
            FieldOp::Lte => matches!(
                (as_f64(actual), as_f64(value)),
                (Some(a), Some(b)) if a <= b
            ),
            FieldOp::Contains => match (actual, value) {
                (Bson::String(haystack), Bson::String(needle)) => haystack
                    .to_lowercase()
                    .contains(&needle.to_lowercase()),
                _ => false,
            },
        })
    }
}
