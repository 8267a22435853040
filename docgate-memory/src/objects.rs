//! In-memory object storage.

use async_trait::async_trait;
use chrono::Utc;
use mea::rwlock::RwLock;
use std::{collections::HashMap, sync::Arc};
use tracing::trace;
use uuid::Uuid;

use docgate_core::{
    config::ObjectStoreConfig,
    error::{DocumentStoreError, DocumentStoreResult},
    object::{ContentType, ObjectStore, validate_object_path},
};

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: ContentType,
}

/// Objects kept in a map keyed by path. Clones share the same objects.
#[derive(Debug, Clone)]
pub struct InMemoryObjectStore {
    bucket: String,
    signed_url_ttl_secs: u64,
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::from_config(&ObjectStoreConfig::default())
    }
}

impl InMemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            signed_url_ttl_secs: ObjectStoreConfig::default().signed_url_ttl_secs,
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &ObjectStoreConfig) -> Self {
        Self::new(config.bucket.clone()).with_signed_url_ttl(config.signed_url_ttl_secs)
    }

    pub fn with_signed_url_ttl(mut self, secs: u64) -> Self {
        self.signed_url_ttl_secs = secs;
        self
    }

    /// Content type recorded for an object, if it exists.
    pub async fn content_type(&self, path: &str) -> Option<ContentType> {
        self.objects
            .read()
            .await
            .get(path)
            .map(|object| object.content_type)
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: ContentType,
    ) -> DocumentStoreResult<()> {
        validate_object_path(path)?;

        trace!(bucket = %self.bucket, path, size = bytes.len(), "object stored");

        self.objects
            .write()
            .await
            .insert(path.to_string(), StoredObject { bytes, content_type });

        Ok(())
    }

    async fn get_object(&self, path: &str) -> DocumentStoreResult<Option<Vec<u8>>> {
        Ok(self
            .objects
            .read()
            .await
            .get(path)
            .map(|object| object.bytes.clone()))
    }

    async fn download_url(&self, path: &str) -> DocumentStoreResult<String> {
        if !self.objects.read().await.contains_key(path) {
            return Err(DocumentStoreError::ObjectNotFound(self.object_uri(path)));
        }

        let expires = Utc::now().timestamp() + self.signed_url_ttl_secs as i64;

        Ok(format!(
            "mem://{}/{}?token={}&expires={}",
            self.bucket,
            path,
            Uuid::new_v4(),
            expires
        ))
    }
}
