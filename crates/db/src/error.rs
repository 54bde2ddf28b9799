//! Error types for document store operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::schema::ValidationErrors;

/// Everything that can go wrong between a handler and the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A supplied value could not be converted to the type the field requires.
    /// Malformed identifiers land here too.
    #[error("Cast to {kind} failed for value \"{value}\" at path \"{path}\"")]
    Cast {
        kind: &'static str,
        value: String,
        path: String,
    },
    /// One or more schema rules were violated.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    /// Converting between BSON, JSON and entity types failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The store could not be reached or configured.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The underlying driver reported a failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn cast(kind: &'static str, value: impl ToString, path: impl Into<String>) -> Self {
        StoreError::Cast {
            kind,
            value: value.to_string(),
            path: path.into(),
        }
    }
}

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}
