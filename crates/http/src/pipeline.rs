//! Hand-off value between controllers and the pagination stage

use axum::response::Response;
use bookstore_db::{Entity, PendingQuery};
use serde::Serialize;

use crate::{
    error::AppError,
    pagination::{self, PageParams},
};

/// What a listing controller produces: either a finished reply, or a query it
/// built but deliberately did not execute.
pub enum Outcome<T> {
    Reply(Response),
    Deferred(PendingQuery<T>),
}

impl<T> Outcome<T>
where
    T: Entity + Serialize,
{
    /// Run the remaining stages. Deferred queries go through pagination.
    pub async fn respond(self, params: &PageParams) -> Result<Response, AppError> {
        match self {
            Outcome::Reply(response) => Ok(response),
            Outcome::Deferred(query) => pagination::paginate(query, params).await,
        }
    }
}
