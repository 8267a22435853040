//! In-memory backends for docgate.
//!
//! This crate provides thread-safe, in-memory implementations of the `StoreBackend`
//! and `ObjectStore` traits. They use async-aware read-write locks for concurrent
//! access and mirror the hosted document database's semantics closely enough to
//! serve as the reference backend in tests.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Hosted-database semantics** - id ordering, deep-merge writes, dotted filter paths
//! - **Object storage** - byte objects with content types and expiring download URLs
//!
//! # Quick Start
//!
//! ```ignore
//! use docgate::prelude::*;
//! use docgate::memory::InMemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(InMemoryStore::new());
//!     let path = CollectionPath::parse("organizations")?;
//!     let organizations = store.typed_collection::<Organization>(&path);
//!
//!     organizations
//!         .create("TEST", Organization { name: "Test".into(), code: "TEST".into() }, false)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docgate_memory;

mod evaluator;
pub mod objects;
pub mod store;

pub use objects::InMemoryObjectStore;
pub use store::{InMemoryStore, InMemoryStoreBuilder};
