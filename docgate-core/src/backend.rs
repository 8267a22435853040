//! Storage backend abstraction for the document store.
//!
//! This module defines the traits that abstract over concrete document databases,
//! allowing the access layer to work with any backend that can address documents by
//! collection path and id.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core trait for storage backends
//! - [`DynStoreBackend`]: A trait for dynamic dispatch over backend implementations
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! # Examples
//!
//! ```ignore
//! use docgate::backend::StoreBackend;
//! use docgate::path::CollectionPath;
//! use bson::doc;
//!
//! let organizations = CollectionPath::parse("organizations")?;
//! backend
//!     .set_document(&organizations, "TEST", doc! { "name": "Test" }, false)
//!     .await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use std::{any::Any, fmt::Debug};

use crate::{
    document::RawDocument,
    error::DocumentStoreResult,
    path::CollectionPath,
    query::Query,
};

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks. No read-after-write guarantee is required beyond what the underlying
/// database offers.
///
/// # Error Handling
///
/// Backends report failures as
/// [`DocumentStoreError::Backend`](crate::error::DocumentStoreError::Backend).
/// The only backend-level "absent" error is
/// [`DocumentStoreError::DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound)
/// from [`StoreBackend::update_document`].
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Writes `fields` as document `id`.
    ///
    /// With `merge == false` the stored document is replaced. With `merge == true` the
    /// fields are deep-merged into the existing document (nested maps merged key by
    /// key), creating it if it does not exist.
    async fn set_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
        merge: bool,
    ) -> DocumentStoreResult<()>;

    /// Replaces the named top-level fields of an existing document.
    ///
    /// Fails with `DocumentNotFound` if the document does not exist.
    async fn update_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
    ) -> DocumentStoreResult<()>;

    /// Reads document `id`, `None` when absent.
    async fn get_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<Option<bson::Document>>;

    /// Runs a filtered query. Results are ordered by id; the limit applies after filtering.
    async fn query_documents(
        &self,
        collection: &CollectionPath,
        query: &Query,
    ) -> DocumentStoreResult<Vec<RawDocument>>;

    /// Deletes document `id`. Deleting an absent document succeeds.
    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<()>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> StoreBackend for &B
where
    B: StoreBackend + ?Sized,
{
    async fn set_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
        merge: bool,
    ) -> DocumentStoreResult<()> {
        (**self)
            .set_document(collection, id, fields, merge)
            .await
    }

    async fn update_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
    ) -> DocumentStoreResult<()> {
        (**self)
            .update_document(collection, id, fields)
            .await
    }

    async fn get_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<Option<bson::Document>> {
        (**self).get_document(collection, id).await
    }

    async fn query_documents(
        &self,
        collection: &CollectionPath,
        query: &Query,
    ) -> DocumentStoreResult<Vec<RawDocument>> {
        (**self)
            .query_documents(collection, query)
            .await
    }

    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<()> {
        (**self).delete_document(collection, id).await
    }
}

/// Object-safe counterpart of [`StoreBackend`], implemented for every backend.
#[async_trait]
pub trait DynStoreBackend: Send + Sync + Debug {
    async fn set_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
        merge: bool,
    ) -> DocumentStoreResult<()>;
    async fn update_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
    ) -> DocumentStoreResult<()>;
    async fn get_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<Option<bson::Document>>;
    async fn query_documents(
        &self,
        collection: &CollectionPath,
        query: &Query,
    ) -> DocumentStoreResult<Vec<RawDocument>>;
    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<()>;
    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()>;

    fn as_any(&self) -> &dyn Any;
}

#[async_trait]
impl<B: StoreBackend + 'static> DynStoreBackend for B {
    async fn set_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
        merge: bool,
    ) -> DocumentStoreResult<()> {
        StoreBackend::set_document(self, collection, id, fields, merge).await
    }

    async fn update_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
    ) -> DocumentStoreResult<()> {
        StoreBackend::update_document(self, collection, id, fields).await
    }

    async fn get_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<Option<bson::Document>> {
        StoreBackend::get_document(self, collection, id).await
    }

    async fn query_documents(
        &self,
        collection: &CollectionPath,
        query: &Query,
    ) -> DocumentStoreResult<Vec<RawDocument>> {
        StoreBackend::query_documents(self, collection, query).await
    }

    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<()> {
        StoreBackend::delete_document(self, collection, id).await
    }

    async fn shutdown_boxed(self: Box<Self>) -> DocumentStoreResult<()> {
        StoreBackend::shutdown(*self).await
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Lets a type-erased backend be used wherever a [`StoreBackend`] is expected.
#[async_trait]
impl StoreBackend for dyn DynStoreBackend {
    async fn set_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
        merge: bool,
    ) -> DocumentStoreResult<()> {
        DynStoreBackend::set_document(self, collection, id, fields, merge).await
    }

    async fn update_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
    ) -> DocumentStoreResult<()> {
        DynStoreBackend::update_document(self, collection, id, fields).await
    }

    async fn get_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<Option<bson::Document>> {
        DynStoreBackend::get_document(self, collection, id).await
    }

    async fn query_documents(
        &self,
        collection: &CollectionPath,
        query: &Query,
    ) -> DocumentStoreResult<Vec<RawDocument>> {
        DynStoreBackend::query_documents(self, collection, query).await
    }

    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<()> {
        DynStoreBackend::delete_document(self, collection, id).await
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
