pub mod filter;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookstore_db::{query::Filter, schema::parse_object_id, DocumentStore, Model, StoreResult};
use bookstore_kernel::{InitCtx, Module};
use serde_json::json;

use crate::modules::authors::{models::Author, SEED_AUTHOR_NAME};
use handlers::{create_book, delete_book, find_book, list_books, update_book};
use models::{Book, BookDetails};

/// Collections the book endpoints read from
#[derive(Clone, Debug)]
pub struct BooksState {
    pub books: Model<Book>,
    pub authors: Model<Author>,
}

impl BooksState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            books: Model::new(store.clone()),
            authors: Model::new(store),
        }
    }

    /// Looks up a book and resolves its author reference.
    pub async fn find_with_author(&self, id: &str) -> StoreResult<Option<BookDetails>> {
        let Some(book) = self.books.find_by_id(id).await? else {
            return Ok(None);
        };

        let author = match parse_object_id("author", &book.author) {
            Ok(author_id) => self.authors.find_by_object_id(author_id).await?,
            Err(_) => None,
        };

        if author.is_none() {
            tracing::debug!(book_id = %book.id, author_id = %book.author, "dangling author reference");
        }

        Ok(Some(BookDetails::new(book, author)))
    }
}

/// Books catalog: CRUD plus filtered search over the `books` collection
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            state: BooksState::new(store),
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_books).post(create_book))
            .route("/{id}", get(find_book).put(update_book).delete(delete_book))
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let query_param = |name: &str, description: &str| {
            json!({
                "name": name,
                "in": "query",
                "required": false,
                "description": description,
                "schema": { "type": "string" }
            })
        };
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });
        let book_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/BookInput" }
                }
            }
        });
        let message = json!({
            "description": "Confirmation",
            "content": {
                "application/json": {
                    "schema": {
                        "type": "object",
                        "properties": { "message": { "type": "string" } }
                    }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List or search books",
                        "tags": ["Books"],
                        "parameters": [
                            query_param("editora", "Exact publisher"),
                            query_param("name", "Case-insensitive title substring"),
                            query_param("minPages", "Minimum page count"),
                            query_param("maxPages", "Maximum page count"),
                            query_param("author", "Author name"),
                            query_param("qLimit", "Page size, defaults to 5"),
                            query_param("qPages", "Page number, defaults to 1"),
                            query_param("sort", "field:direction, defaults to id:-1")
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "400": error("Invalid filter or pagination parameters")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": book_body.clone(),
                        "responses": {
                            "201": { "description": "Book created" },
                            "400": error("Validation failed")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book with its author",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": {
                                "description": "The book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookDetails" }
                                    }
                                }
                            },
                            "400": error("Malformed id"),
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "requestBody": book_body,
                        "responses": {
                            "200": message.clone(),
                            "400": error("Malformed id or invalid fields"),
                            "404": error("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "200": message,
                            "400": error("Malformed id"),
                            "404": error("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "name": { "type": "string", "description": "Title" },
                            "editora": { "type": "string", "description": "Publisher" },
                            "preco": { "type": "number", "description": "Price" },
                            "paginas": { "type": "number", "description": "Page count" },
                            "author": { "type": "string", "description": "Author id" }
                        },
                        "required": ["id", "name", "editora", "author"]
                    },
                    "BookDetails": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "name": { "type": "string" },
                            "editora": { "type": "string" },
                            "preco": { "type": "number" },
                            "paginas": { "type": "number" },
                            "author": { "$ref": "#/components/schemas/Author" }
                        },
                        "required": ["id", "name", "editora"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "editora": { "type": "string" },
                            "preco": { "type": "number" },
                            "paginas": { "type": "number", "minimum": 10, "maximum": 5000 },
                            "author": { "type": "string" }
                        },
                        "required": ["name", "editora", "author"]
                    }
                }
            }
        }))
    }

    async fn seed(&self) -> anyhow::Result<()> {
        if self.state.books.count().await? > 0 {
            tracing::debug!(module = self.name(), "books already present, skipping seed");
            return Ok(());
        }

        let Some(author) = self
            .state
            .authors
            .find_one(&Filter::eq("name", SEED_AUTHOR_NAME))
            .await?
        else {
            tracing::warn!(
                module = self.name(),
                author = SEED_AUTHOR_NAME,
                "seed author missing, skipping book seed"
            );
            return Ok(());
        };

        let seeded = self
            .state
            .books
            .insert_many(&[
                json!({
                    "name": "The Lord of the Rings",
                    "editora": "Martin Claret",
                    "preco": 60,
                    "paginas": 375,
                    "author": author.id
                }),
                json!({
                    "name": "The Hobbit",
                    "editora": "Martin Claret",
                    "preco": 40,
                    "paginas": 215,
                    "author": author.id
                }),
            ])
            .await?;

        tracing::info!(module = self.name(), count = seeded.len(), "books seeded");
        Ok(())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(store: Arc<dyn DocumentStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}
