//! Name sanitization for MongoDB compatibility.
//!
//! MongoDB restricts collection names and field names (document keys) from containing
//! certain characters that carry meaning in its own syntax. Collection paths and keys are
//! escaped on the way in and restored on the way out. Field values are never touched.

use bson::Bson;

/// Escapes and restores names that MongoDB cannot store verbatim.
///
/// Replaced characters:
/// - Dots (`.`) - nested field access in queries
/// - Dollar signs (`$`) - operators in queries
/// - Null bytes (`\0`) - name terminators
/// - Slashes (`/`) - collection path separators, folded into a flat collection name
pub(crate) struct ValueSanitizer;

impl ValueSanitizer {
    const REPLACEMENTS: [(&'static str, &'static str); 4] = [
        (".", "__dot__"),
        ("$", "__dollar__"),
        ("\0", "__null__"),
        ("/", "__slash__"),
    ];

    /// Recursively escapes every key in a document, including inside arrays.
    pub(crate) fn sanitize_keys(document: &bson::Document) -> bson::Document {
        document
            .iter()
            .map(|(k, v)| (Self::sanitize_string(k), Self::sanitize_value(v)))
            .collect()
    }

    fn sanitize_value(value: &Bson) -> Bson {
        match value {
            Bson::Array(arr) => Bson::Array(arr.iter().map(Self::sanitize_value).collect()),
            Bson::Document(doc) => Bson::Document(Self::sanitize_keys(doc)),
            _ => value.clone(),
        }
    }

    /// Recursively restores every key in a document.
    pub(crate) fn restore_keys(document: &bson::Document) -> bson::Document {
        document
            .iter()
            .map(|(k, v)| (Self::restore_string(k), Self::restore_value(v)))
            .collect()
    }

    fn restore_value(value: &Bson) -> Bson {
        match value {
            Bson::Array(arr) => Bson::Array(arr.iter().map(Self::restore_value).collect()),
            Bson::Document(doc) => Bson::Document(Self::restore_keys(doc)),
            _ => value.clone(),
        }
    }

    /// Escapes a single name.
    pub(crate) fn sanitize_string(input: &str) -> String {
        let mut sanitized = input.to_string();
        for (target, replacement) in Self::REPLACEMENTS.iter() {
            sanitized = sanitized.replace(*target, *replacement);
        }
        sanitized
    }

    /// Reverts [`ValueSanitizer::sanitize_string`].
    pub(crate) fn restore_string(input: &str) -> String {
        let mut restored = input.to_string();
        for (target, replacement) in Self::REPLACEMENTS.iter().rev() {
            restored = restored.replace(*replacement, *target);
        }
        restored
    }

    /// Escapes each segment of a dotted field path, keeping the dots between them.
    pub(crate) fn sanitize_path(path: &str) -> String {
        path.split('.')
            .map(Self::sanitize_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn collection_paths_flatten_and_restore() {
        let name = ValueSanitizer::sanitize_string("organizations/org-1/blueprints");

        assert_eq!(name, "organizations__slash__org-1__slash__blueprints");
        assert_eq!(ValueSanitizer::restore_string(&name), "organizations/org-1/blueprints");
    }

    #[test]
    fn keys_are_escaped_values_are_not() {
        let original = doc! { "a.b": { "$c": "x.y" }, "list": [{ "d.e": 1 }] };

        let sanitized = ValueSanitizer::sanitize_keys(&original);

        assert_eq!(
            sanitized,
            doc! { "a__dot__b": { "__dollar__c": "x.y" }, "list": [{ "d__dot__e": 1 }] }
        );
        assert_eq!(ValueSanitizer::restore_keys(&sanitized), original);
    }

    #[test]
    fn dotted_paths_keep_their_separators() {
        assert_eq!(ValueSanitizer::sanitize_path("input.organizationId"), "input.organizationId");
        assert_eq!(ValueSanitizer::sanitize_path("meta.$weird"), "meta.__dollar__weird");
    }
}
