//! Collection paths of the application's documents.

use docgate::{error::DocumentStoreResult, path::CollectionPath};

pub const ORGANIZATIONS: &str = "organizations";
pub const ADMIN_USERS: &str = "adminUsers";
pub const BLUEPRINTS: &str = "blueprints";
pub const COST_ESTIMATION_JOBS: &str = "blueprintCostEstimationCreateJobs";
pub const CONVERT_PDF_TO_PNG_REQUESTS: &str = "convertPdfToPngAndCaptureRequests";

pub fn organizations() -> DocumentStoreResult<CollectionPath> {
    CollectionPath::root(ORGANIZATIONS)
}

/// `organizations/{organization_id}/adminUsers`
pub fn admin_users(organization_id: &str) -> DocumentStoreResult<CollectionPath> {
    organization_child(organization_id, ADMIN_USERS)
}

/// `organizations/{organization_id}/blueprints`
pub fn blueprints(organization_id: &str) -> DocumentStoreResult<CollectionPath> {
    organization_child(organization_id, BLUEPRINTS)
}

/// `organizations/{organization_id}/blueprintCostEstimationCreateJobs`
pub fn cost_estimation_jobs(organization_id: &str) -> DocumentStoreResult<CollectionPath> {
    organization_child(organization_id, COST_ESTIMATION_JOBS)
}

/// `organizations/{organization_id}/requests/{request_kind}/logs`
pub fn request_logs(
    organization_id: &str,
    request_kind: &str,
) -> DocumentStoreResult<CollectionPath> {
    organization_child(organization_id, "requests")?
        .doc(request_kind)?
        .collection("logs")
}

/// Where [`ConvertPdfFileToPngRequest`](crate::ConvertPdfFileToPngRequest) documents are written.
pub fn convert_pdf_to_png_requests(organization_id: &str) -> DocumentStoreResult<CollectionPath> {
    request_logs(organization_id, CONVERT_PDF_TO_PNG_REQUESTS)
}

fn organization_child(organization_id: &str, name: &str) -> DocumentStoreResult<CollectionPath> {
    organizations()?.doc(organization_id)?.collection(name)
}
