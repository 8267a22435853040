//! Convenient re-exports of commonly used types from docgate.
//!
//! ```ignore
//! use docgate::prelude::*;
//! ```

pub use docgate_core::{
    backend::{DynStoreBackend, StoreBackend, StoreBackendBuilder},
    collection::{Collection, DeleteReport, TypedCollection, auto_id},
    config::DocgateConfig,
    converter::Converter,
    document::{Document, IntoPayload, Patch, RawDocument, Stored},
    error::{DocumentStoreError, DocumentStoreResult},
    object::{Bucket, ContentType, ObjectStore},
    path::{CollectionPath, DocumentPath},
    query::{FieldOp, Filter, Query, QueryBuilder, QueryVisitor},
    store::{
        DocumentStore, DynCollection, DynDocumentStore, DynTypedCollection, IntoDynDocumentStore,
    },
    timestamp::{Clock, ManualClock, SystemClock, Timestamp},
};
pub use docgate_macros::Document;
