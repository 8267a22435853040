//! Hierarchical collection and document addressing.
//!
//! A collection path alternates collection and document segments and always ends on a
//! collection: `organizations`, `organizations/{id}/blueprints`, and so on. Paths are
//! purely an addressing mechanism; they carry no lifecycle of their own.

use std::{fmt, str::FromStr};

use crate::error::{DocumentStoreError, DocumentStoreResult};

const MAX_ID_BYTES: usize = 1500;

/// Checks a single document id (or collection name) segment.
pub(crate) fn validate_segment(segment: &str) -> DocumentStoreResult<()> {
    if segment.is_empty() {
        return Err(DocumentStoreError::InvalidArgument("path segment must not be empty".into()));
    }
    if segment.contains('/') {
        return Err(DocumentStoreError::InvalidArgument(format!(
            "path segment `{segment}` must not contain `/`"
        )));
    }
    if segment == "." || segment == ".." {
        return Err(DocumentStoreError::InvalidArgument(format!(
            "path segment `{segment}` is reserved"
        )));
    }
    if segment.len() > 4 && segment.starts_with("__") && segment.ends_with("__") {
        return Err(DocumentStoreError::InvalidArgument(format!(
            "path segment `{segment}` matches the reserved `__*__` pattern"
        )));
    }
    if segment.len() > MAX_ID_BYTES {
        return Err(DocumentStoreError::InvalidArgument(format!(
            "path segment exceeds {MAX_ID_BYTES} bytes"
        )));
    }

    Ok(())
}

/// Address of a set of sibling documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath {
    path: String,
}

impl CollectionPath {
    /// Parses a slash separated path with an odd number of segments.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] for empty segments, leading or trailing
    /// slashes, or a path that addresses a document instead of a collection.
    pub fn parse(path: &str) -> DocumentStoreResult<Self> {
        let segments = path.split('/').collect::<Vec<_>>();

        for segment in &segments {
            validate_segment(segment)?;
        }

        if segments.len() % 2 == 0 {
            return Err(DocumentStoreError::InvalidArgument(format!(
                "`{path}` addresses a document, not a collection"
            )));
        }

        Ok(Self { path: path.to_string() })
    }

    /// Top-level collection with the given name.
    pub fn root(name: &str) -> DocumentStoreResult<Self> {
        validate_segment(name)?;

        Ok(Self { path: name.to_string() })
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// The last segment, i.e. the collection's own name.
    pub fn name(&self) -> &str {
        self.path
            .rsplit('/')
            .next()
            .unwrap_or(&self.path)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/')
    }

    /// Document this collection is nested under, if any.
    pub fn parent(&self) -> Option<DocumentPath> {
        let (parent, _) = self.path.rsplit_once('/')?;
        // Segment counts are odd, so the prefix always splits into collection and id.
        let (collection, id) = parent.rsplit_once('/')?;

        Some(DocumentPath {
            collection: CollectionPath { path: collection.to_string() },
            id: id.to_string(),
        })
    }

    /// Address of the document `id` inside this collection.
    pub fn doc(&self, id: &str) -> DocumentStoreResult<DocumentPath> {
        validate_segment(id)?;

        Ok(DocumentPath { collection: self.clone(), id: id.to_string() })
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl FromStr for CollectionPath {
    type Err = DocumentStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionPath::parse(s)
    }
}

impl AsRef<str> for CollectionPath {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

/// Address of a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    pub fn collection_path(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sub-collection `name` nested under this document.
    pub fn collection(&self, name: &str) -> DocumentStoreResult<CollectionPath> {
        validate_segment(name)?;

        Ok(CollectionPath { path: format!("{}/{}/{}", self.collection.path, self.id, name) })
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_collection_paths() {
        let path = CollectionPath::parse("organizations/YuiNd6IW8QSv9fOKYqZq/diagnosiss").unwrap();

        assert_eq!(path.name(), "diagnosiss");
        assert_eq!(path.segments().count(), 3);

        let parent = path.parent().unwrap();
        assert_eq!(parent.id(), "YuiNd6IW8QSv9fOKYqZq");
        assert_eq!(parent.collection_path().as_str(), "organizations");
    }

    #[test]
    fn root_collection_has_no_parent() {
        let path = CollectionPath::parse("organizations").unwrap();

        assert!(path.parent().is_none());
        assert_eq!(path.name(), "organizations");
    }

    #[test]
    fn rejects_document_paths_and_empty_segments() {
        assert!(matches!(
            CollectionPath::parse("organizations/abc"),
            Err(DocumentStoreError::InvalidArgument(_))
        ));
        assert!(CollectionPath::parse("").is_err());
        assert!(CollectionPath::parse("/organizations").is_err());
        assert!(CollectionPath::parse("organizations/").is_err());
        assert!(CollectionPath::parse("a//b").is_err());
        assert!(CollectionPath::parse("__internal__").is_err());
    }

    #[test]
    fn builds_sub_collections_from_documents() {
        let blueprints = CollectionPath::root("organizations")
            .unwrap()
            .doc("org-1")
            .unwrap()
            .collection("blueprints")
            .unwrap();

        assert_eq!(blueprints.as_str(), "organizations/org-1/blueprints");
        assert_eq!(
            blueprints.doc("bp-9").unwrap().to_string(),
            "organizations/org-1/blueprints/bp-9"
        );
        assert!(blueprints.doc("a/b").is_err());
    }
}
