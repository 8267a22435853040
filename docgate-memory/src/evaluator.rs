//! Query evaluation for in-memory document filtering.
//!
//! Semantics follow the hosted document database:
//!
//! - a missing field never matches, `!=` and `not-in` included,
//! - integers and doubles compare as numbers, integers against integers exactly,
//! - range operators only compare values of the same kind,
//! - `array-contains` needs an array field,
//! - `in` matches when the field equals any listed value.

use bson::{Bson, datetime::DateTime};
use std::{cmp::Ordering, collections::HashMap};

use docgate_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    query::{FieldOp, Filter, Query, QueryVisitor},
};

#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    DateTime(DateTime),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
    Other(&'a Bson),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Int(i64::from(*value)),
            Bson::Int64(value) => Comparable::Int(*value),
            Bson::Double(value) => Comparable::Double(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(arr.iter().map(Comparable::from).collect()),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect(),
            ),
            other => Comparable::Other(other),
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Int(a), Comparable::Int(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            (Comparable::Other(a), Comparable::Other(b)) => a == b,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Int(a), Comparable::Int(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

impl Comparable<'_> {
    /// Numeric value for mixed integer / double comparisons.
    fn as_f64(&self) -> Option<f64> {
        match self {
            Comparable::Int(value) => Some(*value as f64),
            Comparable::Double(value) => Some(*value),
            _ => None,
        }
    }
}

/// Resolves a possibly dotted field path inside a document.
pub(crate) fn lookup<'a>(document: &'a bson::Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;

    for segment in segments {
        current = current.as_document()?.get(segment)?;
    }

    Some(current)
}

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a bson::Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a bson::Document) -> Self {
        Self { document }
    }

    pub fn matches(&mut self, query: &Query) -> DocumentStoreResult<bool> {
        self.visit_query(query)
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error> {
        for filter in filters {
            if !self.visit_filter(filter)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_field(
        &mut self,
        field: &str,
        op: FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        let Some(field_value) = lookup(self.document, field) else {
            return Ok(false);
        };

        let left = Comparable::from(field_value);
        let right = Comparable::from(value);

        Ok(match op {
            FieldOp::Eq => left == right,
            FieldOp::Ne => left != right,
            FieldOp::Lt | FieldOp::Lte | FieldOp::Gt | FieldOp::Gte => {
                match left.partial_cmp(&right) {
                    Some(ordering) => match op {
                        FieldOp::Lt => ordering == Ordering::Less,
                        FieldOp::Lte => ordering != Ordering::Greater,
                        FieldOp::Gt => ordering == Ordering::Greater,
                        _ => ordering != Ordering::Less,
                    },
                    None => false,
                }
            }
            FieldOp::ArrayContains => match left {
                Comparable::Array(items) => items.iter().any(|item| item == &right),
                _ => false,
            },
            FieldOp::In => match right {
                Comparable::Array(candidates) => {
                    candidates.iter().any(|candidate| candidate == &left)
                }
                _ => {
                    return Err(DocumentStoreError::InvalidArgument(format!(
                        "`in` filter on `{field}` needs an array value"
                    )));
                }
            },
            FieldOp::NotIn => match right {
                Comparable::Array(candidates) => {
                    !candidates.iter().any(|candidate| candidate == &left)
                }
                _ => {
                    return Err(DocumentStoreError::InvalidArgument(format!(
                        "`not-in` filter on `{field}` needs an array value"
                    )));
                }
            },
        })
    }
}
