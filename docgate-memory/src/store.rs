//! In-memory document storage.
//!
//! Documents are kept per collection path in id order, behind an async-aware
//! read-write lock. Clones share the same underlying data.

use async_trait::async_trait;
use mea::rwlock::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tracing::trace;

use docgate_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::{RawDocument, merge_fields},
    error::{DocumentStoreError, DocumentStoreResult},
    path::CollectionPath,
    query::Query,
};

use crate::evaluator::DocumentEvaluator;

type CollectionMap = BTreeMap<String, bson::Document>;
type StoreMap = HashMap<String, CollectionMap>;

#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self { store: Arc::new(RwLock::new(StoreMap::new())) }
    }

    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Number of documents stored under `collection`.
    pub async fn len(&self, collection: &CollectionPath) -> usize {
        self.store
            .read()
            .await
            .get(collection.as_str())
            .map_or(0, BTreeMap::len)
    }

    pub async fn is_empty(&self, collection: &CollectionPath) -> bool {
        self.len(collection).await == 0
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn set_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
        merge: bool,
    ) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;
        let collection_map = store
            .entry(collection.as_str().to_string())
            .or_default();

        let fields = match collection_map.remove(id) {
            Some(mut existing) if merge => {
                merge_fields(&mut existing, fields, true);
                existing
            }
            _ => fields,
        };
        collection_map.insert(id.to_string(), fields);

        trace!(collection = %collection, id, merge, "document set");

        Ok(())
    }

    async fn update_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: bson::Document,
    ) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;
        let existing = store
            .get_mut(collection.as_str())
            .and_then(|collection_map| collection_map.get_mut(id))
            .ok_or_else(|| {
                DocumentStoreError::DocumentNotFound(id.to_string(), collection.to_string())
            })?;

        for (key, value) in fields {
            existing.insert(key, value);
        }

        trace!(collection = %collection, id, "document updated");

        Ok(())
    }

    async fn get_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<Option<bson::Document>> {
        let store = self.store.read().await;

        Ok(store
            .get(collection.as_str())
            .and_then(|collection_map| collection_map.get(id))
            .cloned())
    }

    async fn query_documents(
        &self,
        collection: &CollectionPath,
        query: &Query,
    ) -> DocumentStoreResult<Vec<RawDocument>> {
        let store = self.store.read().await;
        let Some(collection_map) = store.get(collection.as_str()) else {
            return Ok(vec![]);
        };

        let limit = query.limit.unwrap_or(usize::MAX);
        let mut documents = Vec::new();

        for (id, fields) in collection_map {
            if documents.len() >= limit {
                break;
            }
            if DocumentEvaluator::new(fields).matches(query)? {
                documents.push(RawDocument::new(id.clone(), fields.clone()));
            }
        }

        trace!(collection = %collection, count = documents.len(), "documents queried");

        Ok(documents)
    }

    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;

        if let Some(collection_map) = store.get_mut(collection.as_str()) {
            collection_map.remove(id);

            if collection_map.is_empty() {
                store.remove(collection.as_str());
            }
        }

        Ok(())
    }
}

/// Builds an [`InMemoryStore`], optionally pre-populated.
#[derive(Debug, Default)]
pub struct InMemoryStoreBuilder {
    seed: Vec<(CollectionPath, String, bson::Document)>,
}

impl InMemoryStoreBuilder {
    /// Stores `fields` verbatim as document `id` when the store is built.
    pub fn with_document(
        mut self,
        collection: &CollectionPath,
        id: impl Into<String>,
        fields: bson::Document,
    ) -> Self {
        self.seed.push((collection.clone(), id.into(), fields));
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        let mut store = StoreMap::new();

        for (collection, id, fields) in self.seed {
            store
                .entry(collection.as_str().to_string())
                .or_default()
                .insert(id, fields);
        }

        Ok(InMemoryStore { store: Arc::new(RwLock::new(store)) })
    }
}
