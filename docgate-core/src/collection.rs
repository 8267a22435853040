//! Collection handles for document store operations.
//!
//! - [`TypedCollection`] - schema-validated access to documents of one shape
//! - [`Collection`] - untyped access for heterogeneous collections and bulk maintenance
//!
//! Handles are cheap borrows of a backend plus a collection path. They hold no
//! state between calls.
//!
//! # Example
//!
//! ```ignore
//! use docgate::prelude::*;
//!
//! let organizations = CollectionPath::parse("organizations")?;
//! let collection = store.typed_collection::<Organization>(&organizations);
//!
//! let created = collection
//!     .create("TEST", Organization { name: "Test".into(), code: "TEST".into() }, false)
//!     .await?;
//! let found = collection.find_one(Filter::eq("code", "TEST")).await?;
//! ```

use bson::Bson;
use futures::{StreamExt, stream};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    backend::StoreBackend,
    converter::Converter,
    document::{Document, IntoPayload, Patch, RawDocument, Stored},
    error::{DocumentStoreError, DocumentStoreResult},
    path::CollectionPath,
    query::{Filter, Query},
};

const AUTO_ID_LENGTH: usize = 20;
const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generates a 20 character alphanumeric document id.
pub fn auto_id() -> String {
    // Bytes 6 and 8 of a v4 uuid carry the version and variant bits.
    let random = [Uuid::new_v4().into_bytes(), Uuid::new_v4().into_bytes()];

    random
        .iter()
        .flat_map(|bytes| {
            bytes
                .iter()
                .enumerate()
                .filter(|(index, _)| *index != 6 && *index != 8)
                .map(|(_, byte)| *byte)
        })
        .take(AUTO_ID_LENGTH)
        .map(|byte| AUTO_ID_ALPHABET[byte as usize % AUTO_ID_ALPHABET.len()] as char)
        .collect()
}

/// Outcome of a best-effort bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
    /// `false` when the collection could not be listed, in which case nothing was deleted.
    pub enumerated: bool,
}

impl DeleteReport {
    pub fn is_complete(&self) -> bool {
        self.enumerated && self.failed.is_empty()
    }
}

/// Untyped access to a collection path.
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend + ?Sized> {
    path: CollectionPath,
    backend: &'a B,
    max_in_values: usize,
}

impl<'a, B: StoreBackend + ?Sized> Collection<'a, B> {
    pub(crate) fn new(path: CollectionPath, backend: &'a B, max_in_values: usize) -> Self {
        Self { path, backend, max_in_values }
    }

    pub fn path(&self) -> &CollectionPath {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.name()
    }

    /// Every document in the collection, unvalidated, with its id merged in as `id`.
    pub async fn get_all_raw(&self) -> DocumentStoreResult<Vec<bson::Document>> {
        debug!(collection = %self.path, "listing raw documents");

        let documents = self
            .backend
            .query_documents(&self.path, &Query::new())
            .await
            .inspect_err(|err| error!(collection = %self.path, %err, "failed to list documents"))?;

        Ok(documents
            .into_iter()
            .map(RawDocument::into_fields_with_id)
            .collect())
    }

    /// One document, unvalidated, with its id merged in as `id`.
    pub async fn get_raw(&self, id: &str) -> DocumentStoreResult<Option<bson::Document>> {
        self.path.doc(id)?;

        Ok(self
            .backend
            .get_document(&self.path, id)
            .await?
            .map(|fields| RawDocument::new(id, fields).into_fields_with_id()))
    }

    pub async fn query_raw(&self, query: &Query) -> DocumentStoreResult<Vec<RawDocument>> {
        query.validate(self.max_in_values)?;

        self.backend.query_documents(&self.path, query).await
    }

    /// Writes fields verbatim. No stamping, no validation.
    pub async fn set_raw(
        &self,
        id: &str,
        fields: bson::Document,
        merge: bool,
    ) -> DocumentStoreResult<()> {
        self.path.doc(id)?;

        self.backend
            .set_document(&self.path, id, fields, merge)
            .await
    }

    /// Deletes one document; `false` (and a warning) on any failure.
    pub async fn delete(&self, id: &str) -> bool {
        delete_one(self.backend, &self.path, id).await
    }

    /// Deletes every document in the collection, one at a time.
    ///
    /// Best effort and non-transactional: failures are logged and listed in the
    /// report, never returned as errors.
    pub async fn delete_collection(&self) -> DeleteReport {
        let documents = match self
            .backend
            .query_documents(&self.path, &Query::new())
            .await
        {
            Ok(documents) => documents,
            Err(err) => {
                warn!(collection = %self.path, %err, "failed to list collection for deletion");
                return DeleteReport::default();
            }
        };

        let backend = self.backend;
        let path = &self.path;
        let outcomes = stream::iter(documents)
            .then(|document| async move {
                let deleted = delete_one(backend, path, &document.id).await;
                (document.id, deleted)
            })
            .collect::<Vec<_>>()
            .await;

        let mut report = DeleteReport { enumerated: true, ..DeleteReport::default() };
        for (id, deleted) in outcomes {
            if deleted {
                report.deleted.push(id);
            } else {
                report.failed.push(id);
            }
        }

        debug!(
            collection = %self.path,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "collection deleted"
        );

        report
    }

    /// Typed view of the same path.
    pub fn with_type<D: Document>(&self, converter: Converter<D>) -> TypedCollection<'a, B, D> {
        TypedCollection::new(self.path.clone(), self.backend, converter, self.max_in_values)
    }
}

async fn delete_one<B: StoreBackend + ?Sized>(
    backend: &B,
    path: &CollectionPath,
    id: &str,
) -> bool {
    if let Err(err) = path.doc(id) {
        warn!(collection = %path, id, %err, "refusing to delete document");
        return false;
    }

    match backend.delete_document(path, id).await {
        Ok(()) => {
            debug!(collection = %path, id, "document deleted");
            true
        }
        Err(err) => {
            warn!(collection = %path, id, %err, "failed to delete document");
            false
        }
    }
}

/// Schema-validated access to documents of type `D` under one collection path.
#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend + ?Sized, D: Document> {
    path: CollectionPath,
    backend: &'a B,
    converter: Converter<D>,
    max_in_values: usize,
}

impl<'a, B: StoreBackend + ?Sized, D: Document> TypedCollection<'a, B, D> {
    pub(crate) fn new(
        path: CollectionPath,
        backend: &'a B,
        converter: Converter<D>,
        max_in_values: usize,
    ) -> Self {
        Self { path, backend, converter, max_in_values }
    }

    pub fn path(&self) -> &CollectionPath {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn converter(&self) -> &Converter<D> {
        &self.converter
    }

    /// Untyped view of the same path.
    pub fn untyped(&self) -> Collection<'a, B> {
        Collection::new(self.path.clone(), self.backend, self.max_in_values)
    }

    /// Runs an AND-combined filtered query.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for malformed filters (checked before the backend is called),
    /// `Validation` if any returned document does not match `D`.
    pub async fn query_many(
        &self,
        filters: impl IntoIterator<Item = Filter>,
        limit: Option<usize>,
    ) -> DocumentStoreResult<Vec<Stored<D>>> {
        let query = Query::builder()
            .filters(filters)
            .maybe_limit(limit)
            .build();

        self.query(&query).await
    }

    /// Runs a prebuilt query.
    pub async fn query(&self, query: &Query) -> DocumentStoreResult<Vec<Stored<D>>> {
        query.validate(self.max_in_values)?;

        debug!(
            collection = %self.path,
            filters = query.filters.len(),
            limit = ?query.limit,
            "querying documents"
        );

        let documents = self
            .backend
            .query_documents(&self.path, query)
            .await
            .inspect_err(|err| error!(collection = %self.path, %err, "query failed"))?;

        let decoded = documents
            .into_iter()
            .map(|RawDocument { id, fields }| {
                self.converter.deserialize(&id, fields).inspect_err(|err| {
                    error!(collection = %self.path, id, %err, "stored document failed validation")
                })
            })
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        debug!(collection = %self.path, count = decoded.len(), "query returned");

        Ok(decoded)
    }

    /// Every document in the collection, optionally capped.
    pub async fn get_all(&self, limit: Option<usize>) -> DocumentStoreResult<Vec<Stored<D>>> {
        self.query_many(Vec::new(), limit).await
    }

    /// Reads document `id`; `None` when it does not exist.
    pub async fn get(&self, id: &str) -> DocumentStoreResult<Option<Stored<D>>> {
        self.path.doc(id)?;

        debug!(collection = %self.path, id, "reading document");

        let Some(fields) = self
            .backend
            .get_document(&self.path, id)
            .await
            .inspect_err(|err| error!(collection = %self.path, id, %err, "read failed"))?
        else {
            debug!(collection = %self.path, id, "document not found");
            return Ok(None);
        };

        self.converter
            .deserialize(id, fields)
            .map(Some)
            .inspect_err(|err| {
                error!(collection = %self.path, id, %err, "stored document failed validation")
            })
    }

    /// First document matching a single filter; `None` when nothing matches.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the field is empty or the value is null or an empty string.
    pub async fn find_one(&self, filter: Filter) -> DocumentStoreResult<Option<Stored<D>>> {
        if filter.field.trim().is_empty() {
            return Err(DocumentStoreError::InvalidArgument(
                "single-document query needs a field".into(),
            ));
        }
        match &filter.value {
            Bson::Null | Bson::Undefined => {
                return Err(DocumentStoreError::InvalidArgument(format!(
                    "single-document query on `{}` needs a value",
                    filter.field
                )));
            }
            Bson::String(value) if value.is_empty() => {
                return Err(DocumentStoreError::InvalidArgument(format!(
                    "single-document query on `{}` needs a non-empty value",
                    filter.field
                )));
            }
            _ => {}
        }

        Ok(self
            .query_many([filter], Some(1))
            .await?
            .into_iter()
            .next())
    }

    /// Writes document `id` and returns it as re-read from the store.
    ///
    /// `merge == false` replaces the document; `merge == true` deep-merges the payload
    /// into the existing fields. The document as it will exist after the write is
    /// validated before anything is sent. Returns `None` if the re-read finds nothing.
    pub async fn create<P: IntoPayload<D>>(
        &self,
        id: &str,
        payload: P,
        merge: bool,
    ) -> DocumentStoreResult<Option<Stored<D>>> {
        self.path.doc(id)?;

        debug!(collection = %self.path, id, merge, "writing document");

        let serialized = if merge {
            let base = self.backend.get_document(&self.path, id).await?;
            self.converter.serialize_onto(base.as_ref(), payload, true)
        } else {
            self.converter.serialize(payload)
        };
        let fields = serialized.inspect_err(|err| {
            error!(collection = %self.path, id, %err, "document failed validation")
        })?;

        self.backend
            .set_document(&self.path, id, fields, merge)
            .await
            .inspect_err(|err| error!(collection = %self.path, id, %err, "write failed"))?;

        self.get(id).await
    }

    /// Writes a new document under a generated id.
    pub async fn add<P: IntoPayload<D>>(
        &self,
        payload: P,
    ) -> DocumentStoreResult<Option<Stored<D>>> {
        let id = auto_id();

        self.create(&id, payload, false).await
    }

    /// Replaces the patched top-level fields of an existing document.
    ///
    /// Only `updatedAt` is stamped. Returns `None` whenever the document does not
    /// exist: before the write, at the write, or at the re-read.
    pub async fn update(
        &self,
        id: &str,
        patch: Patch<D>,
    ) -> DocumentStoreResult<Option<Stored<D>>> {
        self.path.doc(id)?;

        debug!(collection = %self.path, id, fields = patch.fields().len(), "updating document");

        let Some(base) = self.backend.get_document(&self.path, id).await? else {
            debug!(collection = %self.path, id, "update target not found");
            return Ok(None);
        };

        let fields = self
            .converter
            .serialize_patch(&base, patch)
            .inspect_err(|err| {
                error!(collection = %self.path, id, %err, "update failed validation")
            })?;

        match self.backend.update_document(&self.path, id, fields).await {
            Ok(()) => self.get(id).await,
            Err(err) if err.is_not_found() => {
                debug!(collection = %self.path, id, "update target deleted before write");
                Ok(None)
            }
            Err(err) => {
                error!(collection = %self.path, id, %err, "update failed");
                Err(err)
            }
        }
    }

    /// Deletes document `id`; `false` (and a warning) on any failure.
    pub async fn delete(&self, id: &str) -> bool {
        delete_one(self.backend, &self.path, id).await
    }
}
