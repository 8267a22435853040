//! A schema-validated access layer over JSON document databases.
//!
//! This crate is the core of the docgate project and provides:
//!
//! - **Document traits** ([`document`]) - domain documents, stored documents, patches
//! - **Converter** ([`converter`]) - timestamp stamping and strict schema validation
//! - **Timestamps** ([`timestamp`]) - fixed UTC+9 timestamps and clocks
//! - **Paths** ([`path`]) - hierarchical collection and document addressing
//! - **Query and filtering API** ([`query`]) - AND-combined field filters with limits
//! - **Store backend abstraction** ([`backend`]) - traits for document database backends
//! - **Collections interface** ([`collection`]) - typed and untyped collection handles
//! - **Document store** ([`store`]) - entry point handing out collections
//! - **Object storage** ([`object`]) - file payload boundary and typed helpers
//! - **Configuration** ([`config`]) - YAML configuration with environment overrides
//! - **Error handling** ([`error`]) - error types and result types
//!
//! # Example
//!
//! ```ignore
//! use docgate::prelude::*;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Document)]
//! pub struct Organization {
//!     pub name: String,
//!     pub code: String,
//! }
//!
//! let store = DocumentStore::new(InMemoryStore::new());
//! let path = CollectionPath::parse("organizations")?;
//! let organizations = store.typed_collection::<Organization>(&path);
//! let enostech = organizations.find_one(Filter::eq("code", "ENOSTECH")).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docgate_core;

pub mod backend;
pub mod collection;
pub mod config;
pub mod converter;
pub mod document;
pub mod error;
pub mod object;
pub mod path;
pub mod query;
pub mod store;
pub mod timestamp;
