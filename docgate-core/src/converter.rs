//! The schema/converter contract bound to one document shape.
//!
//! Outbound, a [`Converter`] stamps the system timestamps and validates the payload
//! strictly. Inbound, it merges the store id in and validates the raw fields against
//! the full decoded shape. Validation is the same in both directions:
//!
//! - every key must be a declared field of `D`, `createdAt` or `updatedAt`
//!   (plus `id` on the way in, where it is attached rather than read),
//! - `createdAt` and `updatedAt` must be present native timestamps,
//! - the remaining fields must deserialize into `D` (types and required fields).
//!
//! Strictness applies to top-level keys; nested maps are checked by `D`'s own serde
//! shape.

use bson::{Bson, de::deserialize_from_bson};
use std::{fmt, marker::PhantomData, sync::Arc};

use crate::{
    document::{
        CREATED_AT_FIELD, Document, ID_FIELD, IntoPayload, Patch, Stored, UPDATED_AT_FIELD,
        merge_fields,
    },
    error::{DocumentStoreError, DocumentStoreResult},
    timestamp::{SharedClock, SystemClock, Timestamp},
};

const SYSTEM_FIELDS: [&str; 3] = [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD];

/// Stamp-and-validate / validate-and-decode pair for documents of type `D`.
pub struct Converter<D> {
    clock: SharedClock,
    _marker: PhantomData<fn() -> D>,
}

impl<D> Clone for Converter<D> {
    fn clone(&self) -> Self {
        Converter { clock: Arc::clone(&self.clock), _marker: PhantomData }
    }
}

impl<D> fmt::Debug for Converter<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("document", &std::any::type_name::<D>())
            .field("clock", &self.clock)
            .finish()
    }
}

impl<D: Document> Default for Converter<D> {
    fn default() -> Self {
        Converter::new(Arc::new(SystemClock))
    }
}

impl<D: Document> Converter<D> {
    pub fn new(clock: SharedClock) -> Self {
        Converter { clock, _marker: PhantomData }
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Stamps and validates an outbound payload.
    ///
    /// Without a `createdAt`, both timestamps are set to the same "now". With one, it
    /// is kept and only `updatedAt` is refreshed.
    ///
    /// # Errors
    ///
    /// [`DocumentStoreError::Validation`] if the stamped payload carries an `id`, an
    /// unrecognized field, or does not match `D`.
    pub fn serialize<P: IntoPayload<D>>(&self, payload: P) -> DocumentStoreResult<bson::Document> {
        let stamped = self.stamp(payload.into_fields()?);

        self.validate_outbound(&stamped)?;

        Ok(stamped)
    }

    /// Stamps a payload that will be written on top of `base`.
    ///
    /// Validation runs on the document as it will exist after the write; only the
    /// stamped payload is returned.
    pub fn serialize_onto<P: IntoPayload<D>>(
        &self,
        base: Option<&bson::Document>,
        payload: P,
        deep: bool,
    ) -> DocumentStoreResult<bson::Document> {
        let stamped = self.stamp(payload.into_fields()?);

        let mut preview = base.map(without_id).unwrap_or_default();
        merge_fields(&mut preview, stamped.clone(), deep);
        self.validate_outbound(&preview)?;

        Ok(stamped)
    }

    /// Stamps a partial update of an existing document.
    ///
    /// Only `updatedAt` is stamped. Patch keys must be declared domain fields.
    pub fn serialize_patch(
        &self,
        base: &bson::Document,
        patch: Patch<D>,
    ) -> DocumentStoreResult<bson::Document> {
        if let Some(key) = patch.fields().keys().find(|key| SYSTEM_FIELDS.contains(&key.as_str())) {
            return Err(DocumentStoreError::Validation(format!(
                "system field `{key}` cannot be patched"
            )));
        }
        check_declared::<D>(patch.fields())?;

        let mut stamped = patch.into_fields();
        stamped.insert(UPDATED_AT_FIELD, self.now());

        let mut preview = without_id(base);
        merge_fields(&mut preview, stamped.clone(), false);
        self.validate_outbound(&preview)?;

        Ok(stamped)
    }

    /// Decodes raw stored fields, attaching `id`.
    ///
    /// # Errors
    ///
    /// [`DocumentStoreError::Validation`] if the fields contain anything undeclared,
    /// lack a system timestamp, or do not match `D`.
    pub fn deserialize(&self, id: &str, raw: bson::Document) -> DocumentStoreResult<Stored<D>> {
        // The store id always wins over a stored `id` key.
        let mut fields = raw;
        fields.remove(ID_FIELD);

        let (created_at, updated_at, data) = decode::<D>(fields)?;

        Ok(Stored { id: id.to_string(), created_at, updated_at, data })
    }

    fn stamp(&self, mut fields: bson::Document) -> bson::Document {
        let now = Bson::from(self.now());

        match fields.get(CREATED_AT_FIELD) {
            None | Some(Bson::Null) => {
                fields.insert(CREATED_AT_FIELD, now.clone());
            }
            Some(_) => {}
        }
        fields.insert(UPDATED_AT_FIELD, now);

        fields
    }

    fn validate_outbound(&self, fields: &bson::Document) -> DocumentStoreResult<()> {
        if fields.contains_key(ID_FIELD) {
            return Err(DocumentStoreError::Validation(
                "unrecognized field `id`: ids are assigned by the store".into(),
            ));
        }

        decode::<D>(fields.clone()).map(|_| ())
    }
}

fn without_id(fields: &bson::Document) -> bson::Document {
    let mut fields = fields.clone();
    fields.remove(ID_FIELD);
    fields
}

fn check_declared<D: Document>(fields: &bson::Document) -> DocumentStoreResult<()> {
    let unknown = fields
        .keys()
        .filter(|key| !D::declares(key) && !SYSTEM_FIELDS.contains(&key.as_str()))
        .map(|key| format!("`{key}`"))
        .collect::<Vec<_>>();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(DocumentStoreError::Validation(format!(
            "unrecognized field(s) {}",
            unknown.join(", ")
        )))
    }
}

fn timestamp_field(fields: &bson::Document, name: &str) -> DocumentStoreResult<Timestamp> {
    match fields.get(name) {
        None | Some(Bson::Null) => Err(DocumentStoreError::Validation(format!(
            "missing required field `{name}`"
        ))),
        Some(value) => Timestamp::from_bson(value).ok_or_else(|| {
            DocumentStoreError::Validation(format!("field `{name}` must be a timestamp"))
        }),
    }
}

fn decode<D: Document>(
    mut fields: bson::Document,
) -> DocumentStoreResult<(Timestamp, Timestamp, D)> {
    check_declared::<D>(&fields)?;

    let created_at = timestamp_field(&fields, CREATED_AT_FIELD)?;
    let updated_at = timestamp_field(&fields, UPDATED_AT_FIELD)?;

    fields.remove(CREATED_AT_FIELD);
    fields.remove(UPDATED_AT_FIELD);

    let data = deserialize_from_bson::<D>(Bson::Document(fields))
        .map_err(|err| DocumentStoreError::Validation(err.to_string()))?;

    Ok((created_at, updated_at, data))
}
