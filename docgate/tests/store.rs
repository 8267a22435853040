//! Typed collection tests - stamping, strict validation, absent values, scenarios

use docgate::{
    Document,
    bson::{Bson, doc},
    collection::TypedCollection,
    document::{Patch, Stored},
    error::DocumentStoreError,
    memory::InMemoryStore,
    path::CollectionPath,
    query::Filter,
    store::DocumentStore,
    timestamp::{ManualClock, Timestamp},
};
use serde::{Deserialize, Serialize};

const T0: i64 = 1_700_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
struct Organization {
    name: String,
    code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[serde(rename_all = "camelCase")]
struct AdminUser {
    email: String,
    role: String,
    organization_id: String,
}

fn org(name: &str, code: &str) -> Organization {
    Organization { name: name.to_string(), code: code.to_string() }
}

fn at(millis: i64) -> Timestamp {
    Timestamp::from_millis(millis).unwrap()
}

fn organizations() -> CollectionPath {
    CollectionPath::parse("organizations").unwrap()
}

fn store() -> (ManualClock, DocumentStore<InMemoryStore>) {
    let clock = ManualClock::starting_at(at(T0));
    let store = DocumentStore::new(InMemoryStore::new()).with_clock(clock.clone());

    (clock, store)
}

async fn seed(collection: &TypedCollection<'_, InMemoryStore, Organization>) {
    for (id, name, code) in [
        ("YuiNd6IW8QSv9fOKYqZq", "Enostech", "ENOSTECH"),
        ("kQ3mZ0aPp2LxR7cVb1Nt", "Acme", "ACME"),
        ("TEST", "Test", "TEST"),
    ] {
        collection.create(id, org(name, code), false).await.unwrap();
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn test_organization_lifecycle() {
    let (clock, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());

    let created = organizations
        .create("TEST", org("Test", "TEST"), false)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(created.id, "TEST");
    assert_eq!(created.data, org("Test", "TEST"));
    assert_eq!(created.created_at, at(T0));
    assert_eq!(created.updated_at, at(T0));

    clock.advance_millis(1_500);

    let updated = organizations
        .update("TEST", Patch::new().set("name", "Test Updated"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Test Updated");
    assert_eq!(updated.code, "TEST");
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.updated_at, at(T0 + 1_500));
    assert!(updated.updated_at > created.updated_at);

    assert!(organizations.delete("TEST").await);
    assert_eq!(organizations.get("TEST").await.unwrap(), None);
}

#[tokio::test]
async fn test_query_by_code_returns_single_match() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());
    seed(&organizations).await;

    let found = organizations
        .query_many([Filter::eq("code", "ENOSTECH")], None)
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "YuiNd6IW8QSv9fOKYqZq");
    assert_eq!(found[0].name, "Enostech");
}

// =============================================================================
// Absent values
// =============================================================================

#[tokio::test]
async fn test_no_match_is_empty_or_none() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());
    seed(&organizations).await;

    assert!(organizations
        .query_many([Filter::eq("code", "NOPE")], None)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(organizations.get("missing").await.unwrap(), None);
    assert_eq!(organizations.find_one(Filter::eq("code", "NOPE")).await.unwrap(), None);
}

#[tokio::test]
async fn test_update_of_missing_document_is_none() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());

    let result = organizations
        .update("GHOST", Patch::new().set("name", "x"))
        .await
        .unwrap();

    assert_eq!(result, None);
    assert!(organizations.get_all(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_of_missing_document_succeeds() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());

    assert!(organizations.delete("never-existed").await);
}

// =============================================================================
// Stamping
// =============================================================================

#[tokio::test]
async fn test_rewriting_a_stored_document_keeps_created_at() {
    let (clock, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());

    let created = organizations
        .create("TEST", org("Test", "TEST"), false)
        .await
        .unwrap()
        .unwrap();

    clock.advance_millis(60_000);

    let mut edited = created.clone();
    edited.data.name = "Renamed".to_string();
    let rewritten = organizations
        .create("TEST", edited, false)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(rewritten.created_at, created.created_at);
    assert_eq!(rewritten.updated_at, at(T0 + 60_000));
    assert_eq!(rewritten.name, "Renamed");
}

#[tokio::test]
async fn test_merge_write_keeps_unnamed_fields() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());
    organizations.create("TEST", org("Test", "TEST"), false).await.unwrap();

    let merged = organizations
        .create("TEST", Patch::<Organization>::new().set("name", "Merged"), true)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(merged.data, org("Merged", "TEST"));
}

#[tokio::test]
async fn test_merge_into_missing_document_must_be_complete() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());

    let partial = organizations
        .create("NEW", Patch::<Organization>::new().set("name", "Only a name"), true)
        .await;
    assert!(matches!(partial, Err(DocumentStoreError::Validation(_))));
    assert_eq!(organizations.get("NEW").await.unwrap(), None);

    let complete = organizations
        .create("NEW", org("New", "NEW"), true)
        .await
        .unwrap();
    assert!(complete.is_some());
}

#[tokio::test]
async fn test_add_generates_an_id() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());

    let added = organizations.add(org("Generated", "GEN")).await.unwrap().unwrap();

    assert_eq!(added.id.len(), 20);
    assert!(added.id.chars().all(|c| c.is_ascii_alphanumeric()));
    let id = added.id.clone();
    assert_eq!(organizations.get(&id).await.unwrap(), Some(added));
}

// =============================================================================
// Strict validation
// =============================================================================

#[tokio::test]
async fn test_undeclared_fields_are_rejected_outbound() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());

    let extra = Patch::<Organization>::new()
        .set("name", "Test")
        .set("code", "TEST")
        .set("plan", "pro");
    let result = organizations.create("TEST", extra, false).await;

    assert!(matches!(result, Err(DocumentStoreError::Validation(_))));
    assert_eq!(organizations.get("TEST").await.unwrap(), None);
}

#[tokio::test]
async fn test_undeclared_fields_are_rejected_inbound() {
    let (_, store) = store();
    let path = organizations();
    let organizations = store.typed_collection::<Organization>(&path);

    store
        .collection(&path)
        .set_raw(
            "LEGACY",
            doc! {
                "name": "Legacy",
                "code": "LEGACY",
                "plan": "pro",
                "createdAt": at(T0),
                "updatedAt": at(T0),
            },
            false,
        )
        .await
        .unwrap();

    assert!(matches!(
        organizations.get("LEGACY").await,
        Err(DocumentStoreError::Validation(_))
    ));
    assert!(matches!(
        organizations.get_all(None).await,
        Err(DocumentStoreError::Validation(_))
    ));
}

#[tokio::test]
async fn test_timestamps_must_be_native() {
    let (_, store) = store();
    let path = organizations();

    store
        .collection(&path)
        .set_raw(
            "STRINGLY",
            doc! {
                "name": "Stringly",
                "code": "S",
                "createdAt": "2024-01-01T00:00:00+09:00",
                "updatedAt": "2024-01-01T00:00:00+09:00",
            },
            false,
        )
        .await
        .unwrap();

    let result = store.typed_collection::<Organization>(&path).get("STRINGLY").await;

    assert!(matches!(result, Err(DocumentStoreError::Validation(_))));
}

#[tokio::test]
async fn test_updates_are_checked_against_the_schema() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());
    organizations.create("TEST", org("Test", "TEST"), false).await.unwrap();

    for patch in [
        Patch::new().set("plan", "pro"),
        Patch::new().set("name", 42),
        Patch::new().set("createdAt", Bson::Null),
        Patch::new().set("id", "OTHER"),
    ] {
        let result = organizations.update("TEST", patch).await;
        assert!(matches!(result, Err(DocumentStoreError::Validation(_))));
    }

    let unchanged = organizations.get("TEST").await.unwrap().unwrap();
    assert_eq!(unchanged.data, org("Test", "TEST"));
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_find_one_requires_field_and_value() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());

    for filter in [
        Filter::eq("", "TEST"),
        Filter::eq("code", ""),
        Filter::eq("code", Bson::Null),
    ] {
        assert!(matches!(
            organizations.find_one(filter).await,
            Err(DocumentStoreError::InvalidArgument(_))
        ));
    }
}

#[tokio::test]
async fn test_query_limits_and_operators() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());
    seed(&organizations).await;

    assert_eq!(organizations.get_all(Some(2)).await.unwrap().len(), 2);

    let not_test = organizations
        .query_many([Filter::ne("code", "TEST")], None)
        .await
        .unwrap();
    assert_eq!(not_test.len(), 2);

    let either = organizations
        .query_many([Filter::any_of("code", ["ACME", "TEST"])], None)
        .await
        .unwrap()
        .into_iter()
        .map(|stored| stored.id)
        .collect::<Vec<_>>();
    assert_eq!(either, vec!["TEST", "kQ3mZ0aPp2LxR7cVb1Nt"]);

    assert!(matches!(
        organizations.get_all(Some(0)).await,
        Err(DocumentStoreError::InvalidArgument(_))
    ));
    assert!(matches!(
        organizations
            .query_many([Filter::any_of("code", Vec::<String>::new())], None)
            .await,
        Err(DocumentStoreError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_get_all_raw_merges_ids_without_validation() {
    let (_, store) = store();
    let path = organizations();
    let raw = store.collection(&path);

    raw.set_raw("a", doc! { "anything": 1 }, false).await.unwrap();
    raw.set_raw("b", doc! { "id": "stale", "other": true }, false).await.unwrap();

    let documents = raw.get_all_raw().await.unwrap();

    assert_eq!(
        documents,
        vec![doc! { "anything": 1, "id": "a" }, doc! { "id": "b", "other": true }]
    );
}

// =============================================================================
// Sub-collections
// =============================================================================

#[tokio::test]
async fn test_sub_collections_are_addressed_by_path() {
    let (_, store) = store();
    let admins_path = organizations()
        .doc("YuiNd6IW8QSv9fOKYqZq")
        .unwrap()
        .collection("adminUsers")
        .unwrap();
    let admins = store.typed_collection::<AdminUser>(&admins_path);

    let admin = AdminUser {
        email: "owner@enostech.example".to_string(),
        role: "owner".to_string(),
        organization_id: "YuiNd6IW8QSv9fOKYqZq".to_string(),
    };
    admins.create("u-1", admin.clone(), false).await.unwrap();

    let found: Stored<AdminUser> = admins
        .find_one(Filter::eq("organizationId", "YuiNd6IW8QSv9fOKYqZq"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.data, admin);
    assert_eq!(admins.name(), "adminUsers");
    assert!(store
        .typed_collection::<AdminUser>(&CollectionPath::parse("adminUsers").unwrap())
        .get_all(None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_invalid_ids_are_refused() {
    let (_, store) = store();
    let organizations = store.typed_collection::<Organization>(&organizations());

    assert!(matches!(
        organizations.get("a/b").await,
        Err(DocumentStoreError::InvalidArgument(_))
    ));
    assert!(matches!(
        organizations.create("", org("x", "y"), false).await,
        Err(DocumentStoreError::InvalidArgument(_))
    ));
    assert!(!organizations.delete("a/b").await);
}
