//! MongoDB storage implementation.
//!
//! Each collection path maps to one MongoDB collection whose name is the sanitized
//! path. The document id is stored in `_id`.

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    options::{ClientOptions, FindOptions},
};
use tracing::{debug, info};

use docgate_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::RawDocument,
    error::{DocumentStoreError, DocumentStoreResult},
    path::CollectionPath,
    query::{Query, QueryVisitor},
};

use crate::{query::MongoQueryTranslator, sanitizer::ValueSanitizer};

const ID_KEY: &str = "_id";

#[derive(Debug)]
pub struct MongoDbStore {
    client: Client,
    database: String,
}

impl MongoDbStore {
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    pub fn builder(dsn: &str, database: &str) -> MongoDbStoreBuilder {
        MongoDbStoreBuilder::new(dsn, database)
    }

    fn get_collection(&self, collection: &CollectionPath) -> MongoCollection<Document> {
        self.client
            .database(&self.database)
            .collection(&ValueSanitizer::sanitize_string(collection.as_str()))
    }

    fn prepare_document(&self, id: &str, fields: &Document) -> Document {
        let mut prepared = ValueSanitizer::sanitize_keys(fields);
        prepared.insert(ID_KEY, id);
        prepared
    }

    fn restore_document(&self, mut document: Document) -> RawDocument {
        let id = match document.remove(ID_KEY) {
            Some(Bson::String(id)) => id,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        RawDocument::new(id, ValueSanitizer::restore_keys(&document))
    }
}

/// Dotted `$set` paths of a merge write, plus the paths of empty maps.
///
/// An empty map merges into an existing one without changing it, so it is only
/// written where the field is missing.
#[derive(Debug, Default, PartialEq)]
struct MergePlan {
    set: Document,
    empty_maps: Vec<String>,
}

impl MergePlan {
    fn new(fields: Document) -> Self {
        let mut plan = Self::default();
        plan.flatten(None, fields);
        plan
    }

    fn flatten(&mut self, prefix: Option<&str>, fields: Document) {
        for (key, value) in fields {
            let path = match prefix {
                Some(prefix) => format!("{prefix}.{key}"),
                None => key,
            };

            match value {
                Bson::Document(nested) if nested.is_empty() => self.empty_maps.push(path),
                Bson::Document(nested) => self.flatten(Some(&path), nested),
                value => {
                    self.set.insert(path, value);
                }
            }
        }
    }
}

fn backend_error(err: mongodb::error::Error) -> DocumentStoreError {
    DocumentStoreError::Backend(err.to_string())
}

#[async_trait]
impl StoreBackend for MongoDbStore {
    async fn set_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Document,
        merge: bool,
    ) -> DocumentStoreResult<()> {
        let target = self.get_collection(collection);

        if merge {
            let plan = MergePlan::new(ValueSanitizer::sanitize_keys(&fields));

            target
                .update_one(doc! { ID_KEY: id }, doc! { "$set": plan.set })
                .upsert(true)
                .await
                .map_err(backend_error)?;

            for path in plan.empty_maps {
                let mut filter = doc! { ID_KEY: id };
                filter.insert(path.clone(), doc! { "$exists": false });
                let mut set = Document::new();
                set.insert(path, Document::new());

                target
                    .update_one(filter, doc! { "$set": set })
                    .await
                    .map_err(backend_error)?;
            }
        } else {
            target
                .replace_one(doc! { ID_KEY: id }, self.prepare_document(id, &fields))
                .upsert(true)
                .await
                .map_err(backend_error)?;
        }

        debug!(collection = %collection, id, merge, "document set");

        Ok(())
    }

    async fn update_document(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Document,
    ) -> DocumentStoreResult<()> {
        let result = self
            .get_collection(collection)
            .update_one(
                doc! { ID_KEY: id },
                doc! { "$set": ValueSanitizer::sanitize_keys(&fields) },
            )
            .await
            .map_err(backend_error)?;

        if result.matched_count == 0 {
            return Err(DocumentStoreError::DocumentNotFound(
                id.to_string(),
                collection.to_string(),
            ));
        }

        Ok(())
    }

    async fn get_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<Option<Document>> {
        Ok(self
            .get_collection(collection)
            .find_one(doc! { ID_KEY: id })
            .await
            .map_err(backend_error)?
            .map(|document| self.restore_document(document).fields))
    }

    async fn query_documents(
        &self,
        collection: &CollectionPath,
        query: &Query,
    ) -> DocumentStoreResult<Vec<RawDocument>> {
        let mut options = FindOptions::default();
        options.sort = Some(doc! { ID_KEY: 1 });

        if let Some(limit) = query.limit {
            options.limit = Some(limit as i64);
        }

        Ok(self
            .get_collection(collection)
            .find(MongoQueryTranslator.visit_query(query)?)
            .with_options(options)
            .await
            .map_err(backend_error)?
            .try_collect::<Vec<Document>>()
            .await
            .map_err(backend_error)?
            .into_iter()
            .map(|document| self.restore_document(document))
            .collect())
    }

    async fn delete_document(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> DocumentStoreResult<()> {
        self.get_collection(collection)
            .delete_one(doc! { ID_KEY: id })
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn shutdown(self) -> DocumentStoreResult<()> {
        info!(database = %self.database, "shutting down mongodb client");

        self.client.shutdown().await;

        Ok(())
    }
}

pub struct MongoDbStoreBuilder {
    dsn: String,
    database: String,
}

impl MongoDbStoreBuilder {
    pub fn new(dsn: &str, database: &str) -> Self {
        Self {
            dsn: dsn.to_string(),
            database: database.to_string(),
        }
    }
}

#[async_trait]
impl StoreBackendBuilder for MongoDbStoreBuilder {
    type Backend = MongoDbStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        let options = ClientOptions::parse(&self.dsn)
            .await
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?;
        let client = Client::with_options(options)
            .map_err(|e| DocumentStoreError::Initialization(e.to_string()))?;

        info!(database = %self.database, "connected mongodb backend");

        Ok(MongoDbStore::new(client, self.database))
    }
}
