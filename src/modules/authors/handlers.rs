//! Author endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookstore_db::Model;
use bookstore_http::{AppError, Outcome, PageParams};
use serde_json::{json, Value};

use super::models::Author;

pub const AUTHOR_NOT_FOUND: &str = "Author not found";

/// Every author, left for the pagination stage to order and window.
pub fn all_authors(authors: &Model<Author>) -> Outcome<Author> {
    Outcome::Deferred(authors.find(None))
}

pub async fn list_authors(
    State(authors): State<Model<Author>>,
    page: Result<Query<PageParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(page) = page?;
    all_authors(&authors).respond(&page).await
}

pub async fn find_author(
    State(authors): State<Model<Author>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Author>, AppError> {
    let Path(id) = id?;
    authors
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(AUTHOR_NOT_FOUND))
}

pub async fn create_author(
    State(authors): State<Model<Author>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;
    let author = authors.create(&body).await?;

    tracing::info!(author_id = %author.id, "author created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Author created successfully", "author": author })),
    )
        .into_response())
}

pub async fn update_author(
    State(authors): State<Model<Author>>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let Json(body) = payload?;
    let author = authors
        .find_by_id_and_update(&id, &body)
        .await?
        .ok_or_else(|| AppError::not_found(AUTHOR_NOT_FOUND))?;

    Ok(Json(
        json!({ "message": "Author updated successfully", "author": author }),
    ))
}

pub async fn delete_author(
    State(authors): State<Model<Author>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    authors
        .find_by_id_and_delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(AUTHOR_NOT_FOUND))?;

    Ok(Json(json!({ "message": "Author deleted successfully" })))
}
