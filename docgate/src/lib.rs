//! Main docgate crate: a schema-validated, timestamp-stamping access layer over JSON
//! document databases.
//!
//! This crate is the primary entry point for users of docgate. It re-exports the core
//! types from the sub-crates, provides the `#[derive(Document)]` macro and gives
//! access to the storage backends.
//!
//! # Features
//!
//! - **Strict schemas** - every read and write is validated against a Rust type; unknown
//!   fields are rejected
//! - **Automatic timestamps** - `createdAt` / `updatedAt` are stamped at UTC+9 on every write
//! - **Absent is not an error** - lookups that find nothing return `Ok(None)`
//! - **Multiple backends** - in-memory and MongoDB storage behind one trait
//! - **Hierarchical collections** - sub-collections addressed by `parent/id/child` paths
//!
//! # Quick Start
//!
//! ```ignore
//! use docgate::{prelude::*, memory::InMemoryStore};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Document)]
//! pub struct Organization {
//!     pub name: String,
//!     pub code: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> DocumentStoreResult<()> {
//!     let store = DocumentStore::new(InMemoryStore::new());
//!     let path = CollectionPath::parse("organizations")?;
//!     let organizations = store.typed_collection::<Organization>(&path);
//!
//!     // Stamps createdAt and updatedAt, validates, writes and reads the document back
//!     let created = organizations
//!         .create("TEST", Organization { name: "Test".into(), code: "TEST".into() }, false)
//!         .await?;
//!
//!     // Only updatedAt moves
//!     let updated = organizations
//!         .update("TEST", Patch::new().set("name", "Test Updated"))
//!         .await?;
//!
//!     // None when nothing matches
//!     let missing = organizations.find_one(Filter::eq("code", "NOPE")).await?;
//!
//!     store.shutdown().await
//! }
//! ```
//!
//! # Configuration
//!
//! A store can also be built from [`config::DocgateConfig`], which selects the backend
//! at runtime and returns a [`store::DynDocumentStore`]:
//!
//! ```ignore
//! let config = DocgateConfig::from_file("docgate.yaml")?;
//! docgate::logging::init_from_config(&config.logging);
//!
//! let store = docgate::connect(&config).await?;
//! let path = CollectionPath::parse("organizations")?;
//! let organizations = store.typed_collection::<Organization>(&path);
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

#[allow(unused_extern_crates)]
extern crate self as docgate;

pub mod logging;
pub mod prelude;

pub use docgate_core::{
    backend, collection, config, converter, document, error, object, path, query, store, timestamp,
};
pub use docgate_macros::Document;

// Re-export BSON types for convenience
pub use bson;

use tracing::info;

use docgate_core::{
    config::{BackendConfig, DocgateConfig},
    error::DocumentStoreResult,
    store::{DocumentStore, DynDocumentStore, IntoDynDocumentStore},
};

/// In-memory storage backend implementations.
pub mod memory {
    pub use docgate_memory::{InMemoryObjectStore, InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docgate_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}

/// Builds a store for the backend named in `config`, applying its query settings.
pub async fn connect(config: &DocgateConfig) -> DocumentStoreResult<DynDocumentStore> {
    let store = match &config.backend {
        BackendConfig::Memory => DocumentStore::new(memory::InMemoryStore::new()).into_dyn(),
        #[cfg(feature = "mongodb")]
        BackendConfig::Mongodb { dsn, database } => {
            use docgate_core::backend::StoreBackendBuilder;

            let backend = mongodb::MongoDbStore::builder(dsn, database).build().await?;

            DocumentStore::new(backend).into_dyn()
        }
        #[cfg(not(feature = "mongodb"))]
        BackendConfig::Mongodb { .. } => {
            return Err(docgate_core::error::DocumentStoreError::Config(
                "the mongodb backend requires the `mongodb` feature".to_string(),
            ));
        }
    };

    info!(backend = backend_kind(&config.backend), "document store ready");

    Ok(store.with_query_config(config.query.clone()))
}

/// An object store for `config.object_store`, backed by memory.
pub fn object_store(config: &DocgateConfig) -> memory::InMemoryObjectStore {
    memory::InMemoryObjectStore::from_config(&config.object_store)
}

fn backend_kind(backend: &BackendConfig) -> &'static str {
    match backend {
        BackendConfig::Memory => "memory",
        BackendConfig::Mongodb { .. } => "mongodb",
    }
}
