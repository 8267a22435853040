//! Core traits and types for document representation.
//!
//! A [`Document`] is the domain part of a stored record: the fields a caller writes.
//! The three system fields (`id`, `createdAt`, `updatedAt`) are never part of the
//! domain type; they live on [`Stored`], the decoded form handed back by reads.

use bson::{Bson, ser::serialize_to_bson};
use serde::{Serialize, de::DeserializeOwned};
use std::{fmt::Debug, marker::PhantomData, ops::Deref};

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    timestamp::Timestamp,
};

/// Name of the store-assigned identifier field attached on read.
pub const ID_FIELD: &str = "id";
/// Name of the first-write timestamp field.
pub const CREATED_AT_FIELD: &str = "createdAt";
/// Name of the last-write timestamp field.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Core trait for the domain shape of a stored document.
///
/// Serde handles types and required fields. [`Document::fields`] lists the top-level
/// field names as they appear on the wire so that unrecognized fields can be rejected
/// instead of silently dropped.
///
/// Usually derived:
///
/// ```ignore
/// use docgate::Document;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize, Document)]
/// #[serde(rename_all = "camelCase")]
/// pub struct AdminUser {
///     pub email: String,
///     pub role: String,
///     pub organization_id: String,
/// }
///
/// assert_eq!(AdminUser::fields(), &["email", "role", "organizationId"]);
/// ```
pub trait Document: Serialize + DeserializeOwned + Debug + Send + Sync + Clone + 'static {
    /// Declared top-level field names, excluding the system fields.
    fn fields() -> &'static [&'static str];

    /// Returns `true` when `name` is a declared domain field.
    fn declares(name: &str) -> bool {
        Self::fields().contains(&name)
    }
}

/// A document as read back from the store: domain data plus system fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<D> {
    pub id: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub data: D,
}

impl<D> Stored<D> {
    pub fn into_inner(self) -> D {
        self.data
    }
}

impl<D> Deref for Stored<D> {
    type Target = D;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredView<'a, D> {
    id: &'a str,
    #[serde(flatten)]
    data: &'a D,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl<D: Serialize> Serialize for Stored<D> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StoredView {
            id: &self.id,
            data: &self.data,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .serialize(serializer)
    }
}

/// A partial set of declared domain fields, used by updates and merge writes.
///
/// ```ignore
/// let patch = Patch::<Organization>::new().set("name", "Enostech Inc.");
/// organizations.update("YuiNd6IW8QSv9fOKYqZq", patch).await?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Patch<D> {
    fields: bson::Document,
    _marker: PhantomData<fn() -> D>,
}

impl<D> Default for Patch<D> {
    fn default() -> Self {
        Patch { fields: bson::Document::new(), _marker: PhantomData }
    }
}

impl<D: Document> Patch<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: bson::Document) -> Self {
        Patch { fields, _marker: PhantomData }
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets a field from any serializable value, e.g. a nested struct.
    pub fn set_serialized<T: Serialize>(
        mut self,
        field: impl Into<String>,
        value: &T,
    ) -> DocumentStoreResult<Self> {
        self.fields.insert(field.into(), serialize_to_bson(value)?);
        Ok(self)
    }

    pub fn fields(&self) -> &bson::Document {
        &self.fields
    }

    pub fn into_fields(self) -> bson::Document {
        self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Anything that can be written through a typed collection.
///
/// Implemented for the domain type itself, for a previously read [`Stored`] document
/// (which keeps its `createdAt`), and for a [`Patch`].
pub trait IntoPayload<D: Document> {
    fn into_fields(self) -> DocumentStoreResult<bson::Document>;
}

fn to_fields<T: Serialize>(value: &T) -> DocumentStoreResult<bson::Document> {
    match serialize_to_bson(value)? {
        Bson::Document(fields) => Ok(fields),
        other => Err(DocumentStoreError::Validation(format!(
            "document must serialize to a map, got {:?}",
            other.element_type()
        ))),
    }
}

impl<D: Document> IntoPayload<D> for D {
    fn into_fields(self) -> DocumentStoreResult<bson::Document> {
        to_fields(&self)
    }
}

impl<D: Document> IntoPayload<D> for &D {
    fn into_fields(self) -> DocumentStoreResult<bson::Document> {
        to_fields(self)
    }
}

impl<D: Document> IntoPayload<D> for Stored<D> {
    fn into_fields(self) -> DocumentStoreResult<bson::Document> {
        let mut fields = to_fields(&self.data)?;
        fields.insert(CREATED_AT_FIELD, self.created_at);
        fields.insert(UPDATED_AT_FIELD, self.updated_at);

        Ok(fields)
    }
}

impl<D: Document> IntoPayload<D> for Patch<D> {
    fn into_fields(self) -> DocumentStoreResult<bson::Document> {
        Ok(self.fields)
    }
}

/// A document exactly as the backend holds it, keyed by its id.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub id: String,
    pub fields: bson::Document,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, fields: bson::Document) -> Self {
        RawDocument { id: id.into(), fields }
    }

    /// Fields with the store id merged in as `id`, overriding any stored `id` key.
    pub fn into_fields_with_id(self) -> bson::Document {
        let mut fields = self.fields;
        fields.insert(ID_FIELD, self.id);
        fields
    }
}

/// Writes `overlay` onto `base`.
///
/// With `deep`, nested maps present on both sides are merged key by key; otherwise
/// each top-level key of `overlay` replaces the one in `base`.
pub fn merge_fields(base: &mut bson::Document, overlay: bson::Document, deep: bool) {
    for (key, value) in overlay {
        match value {
            Bson::Document(incoming) if deep => match base.get_mut(&key) {
                Some(Bson::Document(existing)) => merge_fields(existing, incoming, true),
                _ => {
                    base.insert(key, Bson::Document(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Organization {
        name: String,
        code: String,
    }

    impl Document for Organization {
        fn fields() -> &'static [&'static str] {
            &["name", "code"]
        }
    }

    #[test]
    fn stored_payload_keeps_system_timestamps() {
        let stored = Stored {
            id: "org-1".to_string(),
            created_at: Timestamp::from_millis(1_000).unwrap(),
            updated_at: Timestamp::from_millis(2_000).unwrap(),
            data: Organization { name: "Enostech".into(), code: "ENOSTECH".into() },
        };

        let fields = IntoPayload::<Organization>::into_fields(stored).unwrap();

        assert_eq!(fields.get_str("code").unwrap(), "ENOSTECH");
        assert!(!fields.contains_key(ID_FIELD));
        assert_eq!(
            Timestamp::from_bson(fields.get(CREATED_AT_FIELD).unwrap()),
            Timestamp::from_millis(1_000)
        );
    }

    #[test]
    fn stored_serializes_flat_with_id() {
        let stored = Stored {
            id: "org-1".to_string(),
            created_at: Timestamp::from_millis(0).unwrap(),
            updated_at: Timestamp::from_millis(0).unwrap(),
            data: Organization { name: "Enostech".into(), code: "ENOSTECH".into() },
        };

        let bson = serialize_to_bson(&stored).unwrap();
        let fields = bson.as_document().unwrap();

        assert_eq!(fields.get_str("id").unwrap(), "org-1");
        assert_eq!(fields.get_str("name").unwrap(), "Enostech");
        assert!(fields.get_datetime("createdAt").is_ok());
    }

    #[test]
    fn raw_document_id_overrides_stored_id_field() {
        let raw = RawDocument::new("real", doc! { "id": "stale", "name": "x" });

        let fields = raw.into_fields_with_id();

        assert_eq!(fields.get_str("id").unwrap(), "real");
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn deep_merge_keeps_sibling_nested_keys() {
        let mut base = doc! {
            "input": { "organizationId": "org-1", "blueprintId": "bp-1" },
            "status": "start",
        };

        merge_fields(&mut base, doc! { "input": { "blueprintId": "bp-2" } }, true);

        assert_eq!(
            base,
            doc! {
                "input": { "organizationId": "org-1", "blueprintId": "bp-2" },
                "status": "start",
            }
        );
    }

    #[test]
    fn shallow_merge_replaces_top_level_maps() {
        let mut base = doc! { "input": { "organizationId": "org-1", "blueprintId": "bp-1" } };

        merge_fields(&mut base, doc! { "input": { "blueprintId": "bp-2" } }, false);

        assert_eq!(base, doc! { "input": { "blueprintId": "bp-2" } });
    }

    #[test]
    fn patch_builder_collects_fields() {
        let patch = Patch::<Organization>::new().set("name", "Renamed");

        assert!(!patch.is_empty());
        assert!(Organization::declares("name"));
        assert!(!Organization::declares("createdAt"));
        assert_eq!(patch.into_fields(), doc! { "name": "Renamed" });
    }
}
