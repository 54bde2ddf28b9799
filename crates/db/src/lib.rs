//! Document store access for the bookstore.
//!
//! [`connect`] is the client factory: it picks a backend from
//! [`DatabaseSettings`] and hands back a shared [`DocumentStore`] handle that
//! modules wrap in typed [`Model`]s.

use std::sync::Arc;

use bookstore_kernel::settings::{DatabaseBackend, DatabaseSettings};

pub mod codec;
pub mod error;
pub mod memory;
pub mod model;
pub mod mongo;
pub mod query;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use model::{Entity, Model, PendingQuery};
pub use mongo::MongoStore;
pub use store::DocumentStore;

/// Build the configured store and confirm it answers.
pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match settings.backend {
        DatabaseBackend::Memory => {
            tracing::warn!(target: "bookstore-db", "using in-memory store; data is lost on exit");
            Arc::new(InMemoryStore::new())
        }
        DatabaseBackend::MongoDb => {
            Arc::new(MongoStore::connect(&settings.url, &settings.name).await?)
        }
    };

    match store.ping().await {
        Ok(()) => {
            tracing::info!(
                target: "bookstore-db",
                backend = ?settings.backend,
                database = %settings.name,
                "database connection open"
            );
            Ok(store)
        }
        Err(err) => {
            tracing::error!(target: "bookstore-db", error = %err, "database connection error");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_connects_without_a_server() {
        let settings = DatabaseSettings {
            backend: DatabaseBackend::Memory,
            ..DatabaseSettings::default()
        };

        let store = connect(&settings).await.unwrap();
        assert_eq!(store.count("books").await.unwrap(), 0);
    }
}
