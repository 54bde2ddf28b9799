//! Book endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookstore_http::{AppError, Outcome, PageParams};
use serde_json::{json, Value};

use super::{
    filter::{BookFilter, BookSearch},
    models::{Book, BookDetails},
    BooksState,
};

pub const BOOK_NOT_FOUND: &str = "Book not found";

/// Resolves the search into a deferred query, or an empty reply when the
/// filter cannot match anything.
pub async fn search_books(state: &BooksState, search: &BookSearch) -> Result<Outcome<Book>, AppError> {
    match search.build(&state.authors).await? {
        BookFilter::Matching(filter) => Ok(Outcome::Deferred(state.books.find(filter))),
        BookFilter::NoResults => Ok(Outcome::Reply(
            (StatusCode::OK, Json(Vec::<Book>::new())).into_response(),
        )),
    }
}

pub async fn list_books(
    State(state): State<BooksState>,
    search: Result<Query<BookSearch>, QueryRejection>,
    page: Result<Query<PageParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(search) = search?;
    let Query(page) = page?;

    search_books(&state, &search).await?.respond(&page).await
}

pub async fn find_book(
    State(state): State<BooksState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<BookDetails>, AppError> {
    let Path(id) = id?;
    state
        .find_with_author(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))
}

pub async fn create_book(
    State(state): State<BooksState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;
    let book = state.books.create(&body).await?;

    tracing::info!(book_id = %book.id, "book created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Book created successfully", "book": book })),
    )
        .into_response())
}

pub async fn update_book(
    State(state): State<BooksState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let Json(body) = payload?;
    state
        .books
        .find_by_id_and_update(&id, &body)
        .await?
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))?;

    Ok(Json(json!({ "message": "Book updated successfully" })))
}

pub async fn delete_book(
    State(state): State<BooksState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    state
        .books
        .find_by_id_and_delete(&id)
        .await?
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))?;

    Ok(Json(json!({ "message": "Book deleted successfully" })))
}
