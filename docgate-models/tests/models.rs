//! Model tests - strictness for every document shape, enum literals, job workflows

use std::sync::Arc;

use docgate::{
    bson::{Bson, doc},
    converter::Converter,
    document::{Document, IntoPayload, Patch},
    error::DocumentStoreError,
    memory::InMemoryStore,
    store::DocumentStore,
    timestamp::{ManualClock, Timestamp},
};
use docgate_models::{
    AdminUser, Blueprint, BlueprintCostEstimationCreateJob, ConvertPdfFileToPngInput,
    ConvertPdfFileToPngRequest, CostEstimationInput, FileFormat, JobLog, JobStatus, Organization,
    PageAnalysis, PreAnalysisOutput, QueryRequest, QueryRequestStatus, paths,
};

const T0: i64 = 1_700_000_000_000;

fn clock() -> ManualClock {
    ManualClock::starting_at(Timestamp::from_millis(T0).unwrap())
}

fn converter<D: Document>() -> Converter<D> {
    Converter::new(Arc::new(clock()))
}

fn pre_analysis() -> PreAnalysisOutput {
    PreAnalysisOutput {
        summary: "Two storey timber frame".to_string(),
        annotation: "Dimensions in mm".to_string(),
        pages: vec![PageAnalysis { page_count: 1.0, summary: "Ground floor plan".to_string() }],
    }
}

fn blueprint() -> Blueprint {
    Blueprint {
        name: "House A".to_string(),
        description: "Detached house".to_string(),
        file_format: FileFormat::Pdf,
        pre_analysis_output: pre_analysis(),
    }
}

fn convert_request() -> ConvertPdfFileToPngRequest {
    ConvertPdfFileToPngRequest::register_blueprint(ConvertPdfFileToPngInput {
        organization_id: "YuiNd6IW8QSv9fOKYqZq".to_string(),
        blueprint_id: None,
        input_pdf_gcs_file_path: "gs://blueprints/org/house-a.pdf".to_string(),
        output_png_gcs_file_path: "gs://blueprints/org/house-a/".to_string(),
    })
}

/// Valid round trip, then an extra top-level field on both sides.
fn assert_strict<D: Document + PartialEq>(valid: D) {
    let converter = converter::<D>();

    let stamped = converter.serialize(valid.clone()).unwrap();
    let decoded = converter.deserialize("doc-1", stamped.clone()).unwrap();
    assert_eq!(decoded.data, valid);
    assert_eq!(decoded.id, "doc-1");

    let mut with_extra = IntoPayload::<D>::into_fields(valid).unwrap();
    with_extra.insert("unexpected", "value");
    assert!(matches!(
        converter.serialize(Patch::<D>::from_fields(with_extra)),
        Err(DocumentStoreError::Validation(_))
    ));

    let mut stored_with_extra = stamped;
    stored_with_extra.insert("unexpected", "value");
    assert!(matches!(
        converter.deserialize("doc-1", stored_with_extra),
        Err(DocumentStoreError::Validation(_))
    ));
}

// =============================================================================
// Strictness
// =============================================================================

#[test]
fn test_every_model_is_strict() {
    assert_strict(Organization::new("Enostech", "ENOSTECH"));
    assert_strict(AdminUser {
        email: "owner@enostech.example".to_string(),
        role: "owner".to_string(),
        organization_id: "YuiNd6IW8QSv9fOKYqZq".to_string(),
    });
    assert_strict(blueprint());
    assert_strict(convert_request());
    assert_strict(QueryRequest::pending(doc! { "collection": "organizations", "limit": 10 }));
    assert_strict(BlueprintCostEstimationCreateJob::new(
        "bp-1",
        CostEstimationInput {
            pdf_file_path: "org/house-a.pdf".to_string(),
            pre_analysis_json: pre_analysis(),
        },
    ));
}

#[test]
fn test_declared_fields_follow_wire_names() {
    assert_eq!(AdminUser::fields(), &["email", "role", "organizationId"]);
    assert_eq!(Blueprint::fields(), &["name", "description", "fileFormat", "preAnalysisOutput"]);
    assert_eq!(ConvertPdfFileToPngRequest::fields(), &["metadata", "input", "status", "logs"]);
    assert!(BlueprintCostEstimationCreateJob::declares("updated_at"));
    assert!(BlueprintCostEstimationCreateJob::declares("step3_output"));
    assert!(BlueprintCostEstimationCreateJob::declares("stepIsCompleted"));
    assert!(!BlueprintCostEstimationCreateJob::declares("updatedAt"));
}

// =============================================================================
// Literal values
// =============================================================================

#[test]
fn test_literal_fields_reject_other_values() {
    let requests = converter::<ConvertPdfFileToPngRequest>();
    let stamped = requests.serialize(convert_request()).unwrap();

    let mut wrong_job = stamped.clone();
    wrong_job.insert("metadata", doc! { "jobType": "deleteBlueprint" });
    assert!(matches!(
        requests.deserialize("job-1", wrong_job),
        Err(DocumentStoreError::Validation(_))
    ));

    let mut wrong_status = stamped;
    wrong_status.insert("status", "running");
    assert!(matches!(
        requests.deserialize("job-1", wrong_status),
        Err(DocumentStoreError::Validation(_))
    ));

    let blueprints = converter::<Blueprint>();
    let mut docx = blueprints.serialize(blueprint()).unwrap();
    docx.insert("fileFormat", "docx");
    assert!(matches!(
        blueprints.deserialize("bp-1", docx),
        Err(DocumentStoreError::Validation(_))
    ));
}

#[test]
fn test_wire_shape_of_requests() {
    let stamped = converter::<ConvertPdfFileToPngRequest>()
        .serialize(convert_request())
        .unwrap();

    assert_eq!(stamped.get_document("metadata").unwrap(), &doc! { "jobType": "registerBlueprint" });
    assert_eq!(stamped.get_str("status").unwrap(), "start");
    assert_eq!(stamped.get_document("input").unwrap().get("blueprintId"), Some(&Bson::Null));

    let query = converter::<QueryRequest>()
        .serialize(QueryRequest::pending(doc! {}))
        .unwrap();
    assert!(!query.contains_key("error"));
    assert_eq!(query.get_str("status").unwrap(), "pending");
}

// =============================================================================
// Workflows
// =============================================================================

#[tokio::test]
async fn test_convert_request_lifecycle() {
    let clock = clock();
    let store = DocumentStore::new(InMemoryStore::new()).with_clock(clock.clone());
    let requests = store.typed_collection::<ConvertPdfFileToPngRequest>(
        &paths::convert_pdf_to_png_requests("YuiNd6IW8QSv9fOKYqZq").unwrap(),
    );

    let created = requests.add(convert_request()).await.unwrap().unwrap();
    assert_eq!(created.status, JobStatus::Start);
    assert_eq!(created.input.blueprint_id, None);

    clock.advance_millis(2_000);

    let linked = requests
        .create(
            &created.id,
            Patch::<ConvertPdfFileToPngRequest>::new().set("input", doc! { "blueprintId": "bp-1" }),
            true,
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(linked.input.blueprint_id.as_deref(), Some("bp-1"));
    assert_eq!(linked.input.input_pdf_gcs_file_path, "gs://blueprints/org/house-a.pdf");

    clock.advance_millis(2_000);

    let completed = requests
        .update(
            &created.id,
            Patch::new()
                .set_serialized("status", &JobStatus::Completed)
                .unwrap()
                .set_serialized("logs", &vec![JobLog::info("converted 1 page")])
                .unwrap(),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(completed.status, JobStatus::Completed);
    assert_eq!(completed.logs, vec![JobLog::info("converted 1 page")]);
    assert_eq!(completed.updated_at, Timestamp::from_millis(T0 + 4_000).unwrap());
    assert!(completed.updated_at > linked.updated_at);
}

#[tokio::test]
async fn test_query_request_status_transition() {
    let store = DocumentStore::new(InMemoryStore::new()).with_clock(clock());
    let path = paths::organizations()
        .unwrap()
        .doc("org-1")
        .unwrap()
        .collection("queryRequests")
        .unwrap();
    let requests = store.typed_collection::<QueryRequest>(&path);

    requests
        .create("q-1", QueryRequest::pending(doc! { "field": "code", "value": "ENOSTECH" }), false)
        .await
        .unwrap();

    let failed = requests
        .update(
            "q-1",
            Patch::new()
                .set_serialized("status", &QueryRequestStatus::Failed)
                .unwrap()
                .set("error", "index missing"),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(failed.status, QueryRequestStatus::Failed);
    assert_eq!(failed.error.as_deref(), Some("index missing"));

    let pending = requests
        .query_many([docgate::query::Filter::eq("status", "pending")], None)
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn test_blueprints_live_under_their_organization() {
    let store = DocumentStore::new(InMemoryStore::new()).with_clock(clock());
    let organizations = store.typed_collection::<Organization>(&paths::organizations().unwrap());
    let org = organizations
        .add(Organization::new("Enostech", "ENOSTECH"))
        .await
        .unwrap()
        .unwrap();

    let blueprints = store.typed_collection::<Blueprint>(&paths::blueprints(&org.id).unwrap());
    let stored = blueprints.create("bp-1", blueprint(), false).await.unwrap().unwrap();

    assert_eq!(stored.pre_analysis_output.pages.len(), 1);
    assert_eq!(organizations.get_all(None).await.unwrap().len(), 1);

    let json = serde_json::to_value(&stored).unwrap();
    for key in ["id", "name", "fileFormat", "preAnalysisOutput", "createdAt", "updatedAt"] {
        assert!(json.get(key).is_some(), "missing `{key}`");
    }
    assert_eq!(json["fileFormat"], "pdf");
}

#[test]
fn test_cost_estimation_optional_outputs() {
    let converter = converter::<BlueprintCostEstimationCreateJob>();
    let mut job = BlueprintCostEstimationCreateJob::new(
        "bp-1",
        CostEstimationInput {
            pdf_file_path: "org/house-a.pdf".to_string(),
            pre_analysis_json: pre_analysis(),
        },
    );
    job.step1_output = Some(Bson::Document(doc! { "rooms": 4 }));
    job.current_step = Some(2.0);

    let stamped = converter.serialize(job.clone()).unwrap();
    assert_eq!(stamped.get_document("step1_output").unwrap(), &doc! { "rooms": 4 });
    assert!(!stamped.contains_key("step2_output"));

    let decoded = converter.deserialize("job-1", stamped).unwrap();
    assert_eq!(decoded.data, job);
}
