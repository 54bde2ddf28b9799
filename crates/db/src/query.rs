//! Query construction for document stores.
//!
//! Filters are built as a small expression tree that each backend either
//! translates (MongoDB) or evaluates directly (in-memory):
//!
//! ```ignore
//! use bookstore_db::query::{Filter, Query, SortDirection};
//!
//! let query = Query::builder()
//!     .filter(Filter::eq("editora", "Martin Claret").and(Filter::gte("paginas", 100)))
//!     .sort("_id", SortDirection::Desc)
//!     .skip(5)
//!     .limit(5)
//!     .build();
//! ```

use bson::Bson;

use crate::error::StoreError;

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Numeric form used by MongoDB sort documents.
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// Field to sort by and its direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Field comparison operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    /// Exact match.
    Eq,
    /// Greater than or equal to.
    Gte,
    /// Less than or equal to.
    Lte,
    /// Case-insensitive substring match on strings.
    Contains,
}

/// A filter expression over document fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// All sub-expressions must match.
    And(Vec<Expr>),
    /// Field comparison.
    Field {
        field: String,
        op: FieldOp,
        value: Bson,
    },
}

impl Expr {
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND, flattening
    /// nested conjunctions.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }
}

/// Helpers for building filter expressions.
pub struct Filter;

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Case-insensitive substring match.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Expr {
        Expr::field(field.into(), FieldOp::Contains, Bson::String(value.into()))
    }

    /// Conjunction of every expression; `None` when there are none.
    pub fn all(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        let mut exprs: Vec<Expr> = exprs.into_iter().collect();
        match exprs.len() {
            0 => None,
            1 => exprs.pop(),
            _ => Some(Expr::And(exprs)),
        }
    }
}

/// A retrieval request: filter plus ordering and windowing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Option<Expr>,
    pub sort: Option<Sort>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder {
            query: Query::default(),
        }
    }

    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filter = Some(filter);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.query.sort = Some(Sort {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.query.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

/// Walks an expression tree; implemented by each backend.
pub trait QueryVisitor {
    type Output;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, StoreError>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, StoreError>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, StoreError> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_flattens_conjunctions() {
        let expr = Filter::eq("editora", "Rocco")
            .and(Filter::gte("paginas", 10))
            .and(Filter::lte("paginas", 500));

        match expr {
            Expr::And(list) => assert_eq!(list.len(), 3),
            other => panic!("expected conjunction, got {:?}", other),
        }
    }

    #[test]
    fn all_collapses_trivial_conjunctions() {
        assert_eq!(Filter::all(Vec::new()), None);
        assert_eq!(
            Filter::all(vec![Filter::eq("name", "X")]),
            Some(Filter::eq("name", "X"))
        );
        assert!(matches!(
            Filter::all(vec![Filter::eq("a", 1), Filter::eq("b", 2)]),
            Some(Expr::And(_))
        ));
    }

    #[test]
    fn builder_sets_window_and_order() {
        let query = Query::builder()
            .sort("_id", SortDirection::Desc)
            .skip(5)
            .limit(5)
            .build();

        assert_eq!(query.skip, Some(5));
        assert_eq!(query.limit, Some(5));
        assert_eq!(
            query.sort,
            Some(Sort {
                field: "_id".to_string(),
                direction: SortDirection::Desc
            })
        );
        assert!(query.filter.is_none());
    }
}
