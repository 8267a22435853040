//! Object storage boundary for file payloads (PDFs, rendered pages, JSON results).
//!
//! [`ObjectStore`] is the backend trait. [`Bucket`] wraps a store with the typed and
//! best-effort helpers the rest of an application actually calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::{self, Debug};
use tracing::{debug, warn};

use crate::error::{DocumentStoreError, DocumentStoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Pdf,
    Docx,
    Csv,
    Json,
    Png,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Pdf => "application/pdf",
            ContentType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ContentType::Csv => "text/csv",
            ContentType::Json => "application/json",
            ContentType::Png => "image/png",
        }
    }

    /// Guesses the content type from a file name's extension.
    pub fn from_path(path: &str) -> Option<Self> {
        let (_, extension) = path.rsplit_once('.')?;

        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(ContentType::Pdf),
            "docx" => Some(ContentType::Docx),
            "csv" => Some(ContentType::Csv),
            "json" => Some(ContentType::Json),
            "png" => Some(ContentType::Png),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Checks an object path: non-empty, relative, no empty segments.
pub fn validate_object_path(path: &str) -> DocumentStoreResult<()> {
    if path.is_empty() || path.starts_with('/') || path.split('/').any(str::is_empty) {
        return Err(DocumentStoreError::InvalidArgument(format!(
            "invalid object path `{path}`"
        )));
    }

    Ok(())
}

#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Name of the bucket this store writes to.
    fn bucket(&self) -> &str;

    async fn put_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: ContentType,
    ) -> DocumentStoreResult<()>;

    /// Reads an object, `None` when it does not exist.
    async fn get_object(&self, path: &str) -> DocumentStoreResult<Option<Vec<u8>>>;

    /// Short-lived URL for downloading an object.
    ///
    /// Fails with [`DocumentStoreError::ObjectNotFound`] when the object does not exist.
    async fn download_url(&self, path: &str) -> DocumentStoreResult<String>;

    /// `gs://{bucket}/{path}` style URI of an object.
    fn object_uri(&self, path: &str) -> String {
        format!("gs://{}/{}", self.bucket(), path)
    }
}

/// Typed and best-effort helpers over an [`ObjectStore`].
#[derive(Debug)]
pub struct Bucket<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ObjectStore + ?Sized> Bucket<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    pub fn name(&self) -> &str {
        self.store.bucket()
    }

    /// Uploads raw bytes; `false` (and a warning) on failure.
    pub async fn upload_file(&self, path: &str, bytes: Vec<u8>, content_type: ContentType) -> bool {
        if let Err(err) = validate_object_path(path) {
            warn!(bucket = self.name(), path, %err, "refusing to upload object");
            return false;
        }

        match self.store.put_object(path, bytes, content_type).await {
            Ok(()) => {
                debug!(bucket = self.name(), path, content_type = %content_type, "object uploaded");
                true
            }
            Err(err) => {
                warn!(bucket = self.name(), path, %err, "failed to upload object");
                false
            }
        }
    }

    /// Serializes `value` as JSON and uploads it, returning the object's URI.
    pub async fn upload_json<T: Serialize + Sync>(
        &self,
        path: &str,
        value: &T,
    ) -> DocumentStoreResult<String> {
        validate_object_path(path)?;

        let bytes = serde_json::to_vec(value)?;
        self.store.put_object(path, bytes, ContentType::Json).await?;

        Ok(self.store.object_uri(path))
    }

    /// Downloads a JSON object and validates it against `T`.
    ///
    /// Returns `None` when the object does not exist and
    /// [`DocumentStoreError::Validation`] when its contents do not match `T`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> DocumentStoreResult<Option<T>> {
        validate_object_path(path)?;

        let Some(bytes) = self.store.get_object(path).await? else {
            return Ok(None);
        };

        serde_json::from_slice::<T>(&bytes)
            .map(Some)
            .map_err(|err| DocumentStoreError::Validation(format!("object `{path}`: {err}")))
    }

    /// Download URL, or `None` (and a warning) on any failure.
    pub async fn download_url_best_effort(&self, path: &str) -> Option<String> {
        match self.store.download_url(path).await {
            Ok(url) => Some(url),
            Err(DocumentStoreError::ObjectNotFound(_)) => {
                warn!(bucket = self.name(), path, "object does not exist");
                None
            }
            Err(err) => {
                warn!(bucket = self.name(), path, %err, "failed to create download url");
                None
            }
        }
    }

    /// Downloads an object's bytes, `None` when it does not exist.
    pub async fn download_bytes(&self, path: &str) -> DocumentStoreResult<Option<Vec<u8>>> {
        validate_object_path(path)?;

        self.store.get_object(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_from_extension() {
        assert_eq!(ContentType::from_path("blueprints/a/source.PDF"), Some(ContentType::Pdf));
        assert_eq!(ContentType::from_path("report.docx"), Some(ContentType::Docx));
        assert_eq!(ContentType::from_path("no-extension"), None);
        assert_eq!(ContentType::Csv.mime(), "text/csv");
    }

    #[test]
    fn object_paths_must_be_relative_and_non_empty() {
        assert!(validate_object_path("blueprints/bp-1/page-1.png").is_ok());
        assert!(validate_object_path("").is_err());
        assert!(validate_object_path("/abs.pdf").is_err());
        assert!(validate_object_path("a//b.pdf").is_err());
        assert!(validate_object_path("dir/").is_err());
    }
}
