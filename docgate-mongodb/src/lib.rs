//! MongoDB `StoreBackend` for docgate.
//!
//! Each collection path becomes one MongoDB collection (slashes escaped), the document
//! id is kept in `_id`, and filters are translated to MongoDB operators with the same
//! semantics as the in-memory backend: missing fields never match and results come
//! back ordered by id.
//!
//! Enabled through the facade's `mongodb` feature:
//!
//! ```toml
//! [dependencies]
//! docgate = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! ```ignore
//! use docgate::{backend::StoreBackendBuilder, mongodb::MongoDbStore, store::DocumentStore};
//!
//! let backend = MongoDbStore::builder("mongodb://localhost:27017", "blueprints")
//!     .build()
//!     .await?;
//! let store = DocumentStore::new(backend);
//! ```
//!
//! Merge writes are upserted `$set`s over dotted paths so nested siblings survive;
//! replace writes are upserted `replace_one`s.

#[allow(unused_extern_crates)]
extern crate self as docgate_mongodb;

mod query;
mod sanitizer;
pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
