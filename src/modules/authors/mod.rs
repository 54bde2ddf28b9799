pub mod handlers;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{routing::get, Router};
use bookstore_db::{DocumentStore, Model};
use bookstore_kernel::{InitCtx, Module};
use serde_json::json;

use handlers::{create_author, delete_author, find_author, list_authors, update_author};
use models::Author;

/// Name the seeded books are attributed to
pub const SEED_AUTHOR_NAME: &str = "J. R. R. Tolkien";

/// Authors catalog: CRUD over the `authors` collection
pub struct AuthorsModule {
    authors: Model<Author>,
}

impl AuthorsModule {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            authors: Model::new(store),
        }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_authors).post(create_author))
            .route(
                "/{id}",
                get(find_author).put(update_author).delete(delete_author),
            )
            .with_state(self.authors.clone())
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
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "string" }
        });
        let author_body = json!({
            "required": true,
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/AuthorInput" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors",
                        "tags": ["Authors"],
                        "responses": {
                            "200": {
                                "description": "One page of authors",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Author" }
                                        }
                                    }
                                }
                            },
                            "400": error("Invalid pagination parameters")
                        }
                    },
                    "post": {
                        "summary": "Create an author",
                        "tags": ["Authors"],
                        "requestBody": author_body.clone(),
                        "responses": {
                            "201": { "description": "Author created" },
                            "400": error("Validation failed")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get an author",
                        "tags": ["Authors"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": {
                                "description": "The author",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Author" }
                                    }
                                }
                            },
                            "400": error("Malformed id"),
                            "404": error("Author not found")
                        }
                    },
                    "put": {
                        "summary": "Update an author",
                        "tags": ["Authors"],
                        "parameters": [id_param.clone()],
                        "requestBody": author_body,
                        "responses": {
                            "200": { "description": "Author updated" },
                            "400": error("Malformed id or invalid fields"),
                            "404": error("Author not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete an author",
                        "tags": ["Authors"],
                        "parameters": [id_param],
                        "responses": {
                            "200": { "description": "Author deleted" },
                            "400": error("Malformed id"),
                            "404": error("Author not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "name": { "type": "string" },
                            "nationality": { "type": "string" }
                        },
                        "required": ["id", "name"]
                    },
                    "AuthorInput": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "nationality": { "type": "string" }
                        },
                        "required": ["name"]
                    }
                }
            }
        }))
    }

    async fn seed(&self) -> anyhow::Result<()> {
        if self.authors.count().await? > 0 {
            tracing::debug!(module = self.name(), "authors already present, skipping seed");
            return Ok(());
        }

        let seeded = self
            .authors
            .insert_many(&[json!({
                "name": SEED_AUTHOR_NAME,
                "nationality": "South Africa"
            })])
            .await?;

        tracing::info!(module = self.name(), count = seeded.len(), "authors seeded");
        Ok(())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

/// Create a new instance of the authors module
pub fn create_module(store: Arc<dyn DocumentStore>) -> Arc<dyn Module> {
    Arc::new(AuthorsModule::new(store))
}
