//! Main document store interface.
//!
//! - [`DocumentStore`] - store over a concrete backend type
//! - [`DynDocumentStore`] - store over a backend chosen at runtime
//!
//! Both hand out [`TypedCollection`] and [`Collection`] handles for a
//! [`CollectionPath`], and carry the clock used for timestamp stamping.
//!
//! # Example
//!
//! ```ignore
//! use docgate::store::DocumentStore;
//! use docgate::memory::InMemoryStore;
//!
//! let store = DocumentStore::new(InMemoryStore::new());
//! let path = CollectionPath::parse("organizations")?;
//! let organizations = store.typed_collection::<Organization>(&path);
//! ```

use std::sync::Arc;

use crate::{
    backend::{DynStoreBackend, StoreBackend},
    collection::{Collection, TypedCollection},
    config::QueryConfig,
    converter::Converter,
    document::Document,
    error::DocumentStoreResult,
    path::CollectionPath,
    timestamp::{Clock, SharedClock, SystemClock},
};

/// Typed collection over a runtime-selected backend.
pub type DynTypedCollection<'a, D> = TypedCollection<'a, dyn DynStoreBackend, D>;
/// Untyped collection over a runtime-selected backend.
pub type DynCollection<'a> = Collection<'a, dyn DynStoreBackend>;

#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
    clock: SharedClock,
    query: QueryConfig,
}

impl<B: StoreBackend> DocumentStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend, clock: Arc::new(SystemClock), query: QueryConfig::default() }
    }

    /// Replaces the clock used to stamp `createdAt` / `updatedAt`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_query_config(mut self, query: QueryConfig) -> Self {
        self.query = query;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// A converter for `D` bound to this store's clock.
    pub fn converter<D: Document>(&self) -> Converter<D> {
        Converter::new(Arc::clone(&self.clock))
    }

    pub fn typed_collection<'a, D: Document>(
        &'a self,
        path: &CollectionPath,
    ) -> TypedCollection<'a, B, D> {
        self.typed_collection_with(path, self.converter())
    }

    pub fn typed_collection_with<'a, D: Document>(
        &'a self,
        path: &CollectionPath,
        converter: Converter<D>,
    ) -> TypedCollection<'a, B, D> {
        TypedCollection::new(path.clone(), &self.backend, converter, self.query.max_in_values)
    }

    pub fn collection<'a>(&'a self, path: &CollectionPath) -> Collection<'a, B> {
        Collection::new(path.clone(), &self.backend, self.query.max_in_values)
    }

    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await?;

        Ok(())
    }
}

#[derive(Debug)]
pub struct DynDocumentStore {
    backend: Box<dyn DynStoreBackend>,
    clock: SharedClock,
    query: QueryConfig,
}

impl DynDocumentStore {
    pub fn new(backend: Box<dyn DynStoreBackend>) -> Self {
        Self { backend, clock: Arc::new(SystemClock), query: QueryConfig::default() }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_query_config(mut self, query: QueryConfig) -> Self {
        self.query = query;
        self
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn converter<D: Document>(&self) -> Converter<D> {
        Converter::new(Arc::clone(&self.clock))
    }

    pub fn typed_collection<'a, D: Document>(
        &'a self,
        path: &CollectionPath,
    ) -> DynTypedCollection<'a, D> {
        self.typed_collection_with(path, self.converter())
    }

    pub fn typed_collection_with<'a, D: Document>(
        &'a self,
        path: &CollectionPath,
        converter: Converter<D>,
    ) -> DynTypedCollection<'a, D> {
        TypedCollection::new(path.clone(), &*self.backend, converter, self.query.max_in_values)
    }

    pub fn collection<'a>(&'a self, path: &CollectionPath) -> DynCollection<'a> {
        Collection::new(path.clone(), &*self.backend, self.query.max_in_values)
    }

    /// The concrete backend, if it is a `B`.
    pub fn backend_as<B: StoreBackend + 'static>(&self) -> Option<&B> {
        self.backend.as_any().downcast_ref::<B>()
    }

    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown_boxed().await
    }
}

pub trait IntoDynDocumentStore {
    fn into_dyn(self) -> DynDocumentStore;
}

impl<B: StoreBackend + 'static> IntoDynDocumentStore for DocumentStore<B> {
    fn into_dyn(self) -> DynDocumentStore {
        DynDocumentStore {
            backend: Box::new(self.backend),
            clock: self.clock,
            query: self.query,
        }
    }
}

impl IntoDynDocumentStore for DynDocumentStore {
    fn into_dyn(self) -> DynDocumentStore {
        self
    }
}
