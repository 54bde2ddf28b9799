//! Translation of the `/books` search parameters into a store filter.

use bookstore_db::{
    query::{Expr, Filter},
    schema::{cast_number, parse_object_id},
    Model, StoreResult,
};
use serde::Deserialize;

use crate::modules::authors::models::Author;

/// Search parameters accepted by `GET /books`. Blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookSearch {
    pub editora: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "minPages")]
    pub min_pages: Option<String>,
    #[serde(rename = "maxPages")]
    pub max_pages: Option<String>,
    pub author: Option<String>,
}

/// Outcome of building a book filter.
#[derive(Debug, Clone, PartialEq)]
pub enum BookFilter {
    /// Constrain by the expression; `None` matches every book.
    Matching(Option<Expr>),
    /// A dependent lookup came up empty, so nothing can match.
    NoResults,
}

impl BookSearch {
    /// Builds the filter. Only the author lookup touches storage, and only
    /// the authors collection.
    pub async fn build(&self, authors: &Model<Author>) -> StoreResult<BookFilter> {
        let mut clauses = Vec::new();

        if let Some(editora) = present(&self.editora) {
            clauses.push(Filter::eq("editora", editora));
        }

        if let Some(name) = present(&self.name) {
            clauses.push(Filter::contains("name", name));
        }

        if let Some(min) = present(&self.min_pages) {
            clauses.push(Filter::gte("paginas", cast_number("minPages", min)?));
        }

        if let Some(max) = present(&self.max_pages) {
            clauses.push(Filter::lte("paginas", cast_number("maxPages", max)?));
        }

        if let Some(author_name) = present(&self.author) {
            let Some(author) = authors.find_one(&Filter::eq("name", author_name)).await? else {
                tracing::debug!(author = author_name, "no author by that name");
                return Ok(BookFilter::NoResults);
            };
            let author_id = parse_object_id("author", &author.id)?;
            clauses.push(Filter::eq("author", author_id));
        }

        Ok(BookFilter::Matching(Filter::all(clauses)))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
