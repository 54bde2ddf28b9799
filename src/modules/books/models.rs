use bookstore_db::{
    schema::{FieldKind, FieldSpec, Schema},
    Entity,
};
use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::modules::authors::models::Author;

pub const TITLE_REQUIRED: &str = "Book title is required";
pub const PUBLISHER_REQUIRED: &str = "Publisher is required";
pub const AUTHOR_REQUIRED: &str = "Author is required";
pub const PAGE_COUNT_RANGE: &str = "Page count must be between 10 and 5000. Value supplied: {VALUE}";

pub static BOOK_SCHEMA: Schema = Schema::new(&[
    FieldSpec::new("name", FieldKind::String).required(TITLE_REQUIRED),
    FieldSpec::new("editora", FieldKind::String).required(PUBLISHER_REQUIRED),
    FieldSpec::new("preco", FieldKind::Number),
    FieldSpec::new("paginas", FieldKind::Number)
        .min(10.0, PAGE_COUNT_RANGE)
        .max(5000.0, PAGE_COUNT_RANGE),
    FieldSpec::new("author", FieldKind::ObjectId).required(AUTHOR_REQUIRED),
]);

/// A catalogued book. `author` holds the referenced author's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    /// Title
    pub name: String,
    /// Publisher
    pub editora: String,
    /// Price
    pub preco: Option<Number>,
    /// Page count
    pub paginas: Option<Number>,
    pub author: String,
}

impl Entity for Book {
    const COLLECTION: &'static str = "books";

    fn schema() -> &'static Schema {
        &BOOK_SCHEMA
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// A book with its author reference resolved. A dangling reference
/// resolves to `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetails {
    pub id: String,
    pub name: String,
    pub editora: String,
    pub preco: Option<Number>,
    pub paginas: Option<Number>,
    pub author: Option<Author>,
}

impl BookDetails {
    pub fn new(book: Book, author: Option<Author>) -> Self {
        Self {
            id: book.id,
            name: book.name,
            editora: book.editora,
            preco: book.preco,
            paginas: book.paginas,
            author,
        }
    }
}
