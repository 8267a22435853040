//! Query translation from docgate filters to MongoDB query syntax.
//!
//! `!=` and `not-in` also require the field to exist, since a missing field never
//! matches any filter. `array-contains` uses `$elemMatch` so scalar fields do not match.

use bson::{Bson, Document, doc};

use docgate_core::{
    error::DocumentStoreError,
    query::{FieldOp, Filter, QueryVisitor},
};

use crate::sanitizer::ValueSanitizer;

pub(crate) struct MongoQueryTranslator;

impl QueryVisitor for MongoQueryTranslator {
    type Output = Document;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, filters: &[Filter]) -> Result<Self::Output, Self::Error> {
        if filters.is_empty() {
            return Ok(doc! {});
        }

        Ok(doc! {
            "$and": filters
                .iter()
                .map(|filter| self.visit_filter(filter))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }

    fn visit_field(
        &mut self,
        field: &str,
        op: FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        let field = ValueSanitizer::sanitize_path(field);

        Ok(doc! {
            field: match op {
                FieldOp::Eq => doc! { "$eq": value },
                FieldOp::Ne => doc! { "$exists": true, "$ne": value },
                FieldOp::Lt => doc! { "$lt": value },
                FieldOp::Lte => doc! { "$lte": value },
                FieldOp::Gt => doc! { "$gt": value },
                FieldOp::Gte => doc! { "$gte": value },
                FieldOp::ArrayContains => doc! { "$elemMatch": { "$eq": value } },
                FieldOp::In => match value {
                    Bson::Array(values) => doc! { "$in": values },
                    _ => {
                        return Err(DocumentStoreError::InvalidArgument(
                            "`in` requires an array value".to_string(),
                        ));
                    }
                },
                FieldOp::NotIn => match value {
                    Bson::Array(values) => doc! { "$exists": true, "$nin": values },
                    _ => {
                        return Err(DocumentStoreError::InvalidArgument(
                            "`not-in` requires an array value".to_string(),
                        ));
                    }
                },
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgate_core::query::Query;

    #[test]
    fn empty_query_matches_everything() {
        assert_eq!(MongoQueryTranslator.visit_query(&Query::new()).unwrap(), doc! {});
    }

    #[test]
    fn translates_conjunctions() {
        let query = Query::builder()
            .filter(Filter::eq("code", "ENOSTECH"))
            .filter(Filter::none_of("role", ["owner"]))
            .filter(Filter::contains("tags", "b"))
            .build();

        let translated = MongoQueryTranslator.visit_query(&query).unwrap();

        assert_eq!(
            translated,
            doc! {
                "$and": [
                    { "code": { "$eq": "ENOSTECH" } },
                    { "role": { "$exists": true, "$nin": ["owner"] } },
                    { "tags": { "$elemMatch": { "$eq": "b" } } },
                ]
            }
        );
    }
}
