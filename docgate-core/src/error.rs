//! Error types and result types for document store operations.
//!
//! Use [`DocumentStoreResult<T>`] as the return type for fallible operations.
//!
//! A document that does not exist is not an error at the collection level: typed
//! collections report it as `Ok(None)`. [`DocumentStoreError::DocumentNotFound`] only
//! surfaces from backends, and the collection layer folds it back into `None`.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Raw data (outbound or inbound) does not match the document's schema.
    ///
    /// Raised for unrecognized fields, missing required fields, and wrong value types.
    #[error("Validation error: {0}")]
    Validation(String),
    /// Caller supplied structurally incomplete parameters (empty filter field, bad path, ...).
    ///
    /// Always raised before any backend call is made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The requested document was not found in the collection.
    /// The first argument is the document ID, the second is the collection path.
    #[error("Document not found {0} in collection {1}")]
    DocumentNotFound(String, String),
    /// The requested object does not exist in the object store.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DocumentStoreError {
    /// Returns `true` for the backend-level "document does not exist" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentStoreError::DocumentNotFound(..))
    }
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
