use bookstore_db::{
    schema::{FieldKind, FieldSpec, Schema},
    Entity,
};
use serde::{Deserialize, Serialize};

pub const AUTHOR_NAME_REQUIRED: &str = "Author name is required";

pub static AUTHOR_SCHEMA: Schema = Schema::new(&[
    FieldSpec::new("name", FieldKind::String).required(AUTHOR_NAME_REQUIRED),
    FieldSpec::new("nationality", FieldKind::String),
]);

/// A book author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Identifier assigned by the store
    pub id: String,
    pub name: String,
    pub nationality: Option<String>,
}

impl Entity for Author {
    const COLLECTION: &'static str = "authors";

    fn schema() -> &'static Schema {
        &AUTHOR_SCHEMA
    }

    fn id(&self) -> &str {
        &self.id
    }
}
