//! Query construction and filtering API for document stores.
//!
//! Queries are a conjunction of field filters plus an optional result cap, the
//! same shape the hosted document database accepts:
//!
//! ```ignore
//! use docgate::query::{Filter, Query};
//!
//! let query = Query::builder()
//!     .filter(Filter::eq("code", "ENOSTECH"))
//!     .filter(Filter::any_of("role", vec!["admin", "owner"]))
//!     .limit(10)
//!     .build();
//! ```
//!
//! # Operators
//!
//! | [`FieldOp`]      | wire form        | constructor              |
//! |------------------|------------------|--------------------------|
//! | `Eq`             | `==`             | [`Filter::eq`]           |
//! | `Ne`             | `!=`             | [`Filter::ne`]           |
//! | `Lt` / `Lte`     | `<` / `<=`       | [`Filter::lt`] / [`Filter::lte`] |
//! | `Gt` / `Gte`     | `>` / `>=`       | [`Filter::gt`] / [`Filter::gte`] |
//! | `ArrayContains`  | `array-contains` | [`Filter::contains`]     |
//! | `In`             | `in`             | [`Filter::any_of`]       |
//! | `NotIn`          | `not-in`         | [`Filter::none_of`]      |

use bson::Bson;
use std::{fmt, str::FromStr};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Maximum number of values accepted by `in` / `not-in` unless configured otherwise.
pub const DEFAULT_MAX_IN_VALUES: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    ArrayContains,
    In,
    NotIn,
}

impl FieldOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOp::Eq => "==",
            FieldOp::Ne => "!=",
            FieldOp::Lt => "<",
            FieldOp::Lte => "<=",
            FieldOp::Gt => ">",
            FieldOp::Gte => ">=",
            FieldOp::ArrayContains => "array-contains",
            FieldOp::In => "in",
            FieldOp::NotIn => "not-in",
        }
    }

    /// `in` and `not-in` take a list of candidate values.
    pub fn takes_list(&self) -> bool {
        matches!(self, FieldOp::In | FieldOp::NotIn)
    }
}

impl fmt::Display for FieldOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldOp {
    type Err = DocumentStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "==" => FieldOp::Eq,
            "!=" => FieldOp::Ne,
            "<" => FieldOp::Lt,
            "<=" => FieldOp::Lte,
            ">" => FieldOp::Gt,
            ">=" => FieldOp::Gte,
            "array-contains" => FieldOp::ArrayContains,
            "in" => FieldOp::In,
            "not-in" => FieldOp::NotIn,
            other => {
                return Err(DocumentStoreError::InvalidArgument(format!(
                    "unsupported filter operator `{other}`"
                )));
            }
        })
    }
}

/// A single `field op value` condition. Field names may be dotted paths into nested maps.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FieldOp,
    pub value: Bson,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FieldOp, value: impl Into<Bson>) -> Self {
        Filter { field: field.into(), op, value: value.into() }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::new(field, FieldOp::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::new(field, FieldOp::Ne, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::new(field, FieldOp::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::new(field, FieldOp::Lte, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::new(field, FieldOp::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::new(field, FieldOp::Gte, value)
    }

    /// Matches documents whose array field contains `value`.
    pub fn contains(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::new(field, FieldOp::ArrayContains, value)
    }

    /// Matches documents whose field equals any of `values`.
    pub fn any_of<V: Into<Bson>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect::<Vec<Bson>>();

        Filter::new(field, FieldOp::In, values)
    }

    /// Matches documents whose field is present and equals none of `values`.
    pub fn none_of<V: Into<Bson>>(
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect::<Vec<Bson>>();

        Filter::new(field, FieldOp::NotIn, values)
    }

    /// Checks the filter's shape before it is sent anywhere.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] for an empty field name or dotted
    /// path segment, and for an `in` / `not-in` value that is not a non-empty array of
    /// at most `max_in_values` elements.
    pub fn validate(&self, max_in_values: usize) -> DocumentStoreResult<()> {
        if self.field.trim().is_empty() {
            return Err(DocumentStoreError::InvalidArgument(
                "filter field must not be empty".into(),
            ));
        }
        if self.field.split('.').any(str::is_empty) {
            return Err(DocumentStoreError::InvalidArgument(format!(
                "filter field `{}` has an empty path segment",
                self.field
            )));
        }

        if self.op.takes_list() {
            match &self.value {
                Bson::Array(values) if values.is_empty() => {
                    return Err(DocumentStoreError::InvalidArgument(format!(
                        "`{}` filter on `{}` needs at least one value",
                        self.op, self.field
                    )));
                }
                Bson::Array(values) if values.len() > max_in_values => {
                    return Err(DocumentStoreError::InvalidArgument(format!(
                        "`{}` filter on `{}` accepts at most {max_in_values} values, got {}",
                        self.op,
                        self.field,
                        values.len()
                    )));
                }
                Bson::Array(_) => {}
                _ => {
                    return Err(DocumentStoreError::InvalidArgument(format!(
                        "`{}` filter on `{}` needs an array value",
                        self.op, self.field
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Conjunction of filters with an optional result cap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Validates every filter and the limit.
    pub fn validate(&self, max_in_values: usize) -> DocumentStoreResult<()> {
        if self.limit == Some(0) {
            return Err(DocumentStoreError::InvalidArgument(
                "query limit must be greater than zero".into(),
            ));
        }

        self.filters
            .iter()
            .try_for_each(|filter| filter.validate(max_in_values))
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.query.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.query.filters.extend(filters);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn maybe_limit(mut self, limit: Option<usize>) -> Self {
        self.query.limit = limit;
        self
    }

    pub fn build(self) -> Query {
        self.query
    }
}

/// Walks a query's filters. Backends implement this to evaluate or translate queries.
pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_filter(&mut self, filter: &Filter) -> Result<Self::Output, Self::Error> {
        self.visit_field(&filter.field, filter.op, &filter.value)
    }

    fn visit_query(&mut self, query: &Query) -> Result<Self::Output, Self::Error> {
        self.visit_and(&query.filters)
    }
}
