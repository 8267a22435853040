//! Uploaded blueprints and their pre-analysis.

use docgate::Document;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Pdf,
}

/// Per-page result of the pre-analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    pub page_count: f64,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreAnalysisOutput {
    pub summary: String,
    pub annotation: String,
    pub pages: Vec<PageAnalysis>,
}

/// A blueprint document. Stored under `organizations/{organizationId}/blueprints`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub name: String,
    pub description: String,
    pub file_format: FileFormat,
    pub pre_analysis_output: PreAnalysisOutput,
}
