//! Job request documents picked up by background workers.
//!
//! A request is written with status `start` (or `pending`) and the worker moves it to
//! a terminal status, appending [`JobLog`] entries as it goes.

use docgate::{Document, bson};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLog {
    #[serde(rename = "type")]
    pub level: LogLevel,
    pub message: String,
}

impl JobLog {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into() }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warn, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobType {
    RegisterBlueprint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Start,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub job_type: JobType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertPdfFileToPngInput {
    pub organization_id: String,
    /// `null` until the blueprint document has been created.
    pub blueprint_id: Option<String>,
    pub input_pdf_gcs_file_path: String,
    pub output_png_gcs_file_path: String,
}

/// Request to rasterize an uploaded PDF blueprint into per-page PNGs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Document)]
pub struct ConvertPdfFileToPngRequest {
    pub metadata: RequestMetadata,
    pub input: ConvertPdfFileToPngInput,
    pub status: JobStatus,
    pub logs: Vec<JobLog>,
}

impl ConvertPdfFileToPngRequest {
    /// A fresh `registerBlueprint` request in status `start`.
    pub fn register_blueprint(input: ConvertPdfFileToPngInput) -> Self {
        Self {
            metadata: RequestMetadata { job_type: JobType::RegisterBlueprint },
            input,
            status: JobStatus::Start,
            logs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryRequestStatus {
    Pending,
    Success,
    Failed,
}

/// A document-database query executed on the caller's behalf by a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub request_params: bson::Document,
    pub status: QueryRequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryRequest {
    pub fn pending(request_params: bson::Document) -> Self {
        Self { request_params, status: QueryRequestStatus::Pending, error: None }
    }
}
