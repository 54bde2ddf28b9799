//! Pagination stage for listing endpoints
//!
//! Controllers hand over an unexecuted [`PendingQuery`]; this stage applies
//! ordering and windowing from `qLimit`, `qPages` and `sort`, executes it and
//! replies with the resulting array. It is the only place listing queries run.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookstore_db::{query::SortDirection, Entity, PendingQuery};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_LIMIT: u64 = 5;
pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_SORT_FIELD: &str = "_id";
const MAX_SKIP: u64 = i64::MAX as u64;

/// Raw pagination parameters as they arrive in the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    #[serde(rename = "qLimit")]
    pub limit: Option<String>,
    #[serde(rename = "qPages")]
    pub page: Option<String>,
    pub sort: Option<String>,
}

/// Validated window and ordering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub page: u64,
    pub sort_field: String,
    pub direction: SortDirection,
}

impl Page {
    /// Documents to skip, capped at the largest skip a store accepts.
    pub fn skip(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit)
            .min(MAX_SKIP)
    }
}

impl PageParams {
    /// Parse and validate; anything but positive integers is a bad request.
    pub fn parse(&self) -> Result<Page, AppError> {
        let limit = positive(self.limit.as_deref(), DEFAULT_LIMIT)?;
        let page = positive(self.page.as_deref(), DEFAULT_PAGE)?;
        let (sort_field, direction) = parse_sort(self.sort.as_deref())?;

        Ok(Page {
            limit,
            page,
            sort_field,
            direction,
        })
    }
}

fn positive(raw: Option<&str>, default: u64) -> Result<u64, AppError> {
    match raw.map(str::trim) {
        None => Ok(default),
        Some(value) => match value.parse::<i64>() {
            Ok(n) if n > 0 => Ok(n as u64),
            _ => Err(AppError::malformed()),
        },
    }
}

/// `field:direction`; the public `id` names the stored `_id`.
fn parse_sort(raw: Option<&str>) -> Result<(String, SortDirection), AppError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok((DEFAULT_SORT_FIELD.to_string(), SortDirection::Desc));
    };

    let (field, direction) = match raw.split_once(':') {
        Some((field, direction)) => (field.trim(), Some(direction.trim())),
        None => (raw, None),
    };

    let field = match field {
        "" | "id" | "_id" => DEFAULT_SORT_FIELD,
        f if f.starts_with('$') => return Err(AppError::malformed()),
        f => f,
    };

    let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("-1") | Some("desc") => SortDirection::Desc,
        Some("1") | Some("asc") => SortDirection::Asc,
        Some(_) => return Err(AppError::malformed()),
    };

    Ok((field.to_string(), direction))
}

/// Apply the page to the query, execute it and reply `200` with the array.
pub async fn paginate<T>(query: PendingQuery<T>, params: &PageParams) -> Result<Response, AppError>
where
    T: Entity + Serialize,
{
    let page = params.parse()?;

    tracing::debug!(
        limit = page.limit,
        page = page.page,
        sort = %page.sort_field,
        "executing paginated query"
    );

    let items = query
        .sort(page.sort_field.clone(), page.direction)
        .skip(page.skip())
        .limit(page.limit)
        .exec()
        .await?;

    Ok((StatusCode::OK, Json(items)).into_response())
}
