//! The multi-step cost estimation job of a blueprint.

use docgate::{Document, bson::Bson};
use serde::{Deserialize, Serialize};

use crate::blueprint::PreAnalysisOutput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimationMetadata {
    pub blueprint_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimationInput {
    pub pdf_file_path: String,
    pub pre_analysis_json: PreAnalysisOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEstimationOutput {
    pub cost_estimation: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepCompletion {
    pub step1: bool,
    pub step2: bool,
    pub step3: bool,
    pub step4: bool,
    pub step5: bool,
}

/// Stored under `organizations/{organizationId}/blueprintCostEstimationCreateJobs`.
///
/// Step outputs are free-form and written by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintCostEstimationCreateJob {
    pub metadata: CostEstimationMetadata,
    pub input: CostEstimationInput,
    pub output: CostEstimationOutput,
    #[serde(rename = "updated_at", default, skip_serializing_if = "Option::is_none")]
    pub worker_updated_at: Option<Bson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_process_completed: Option<bool>,
    #[serde(rename = "step1_output", default, skip_serializing_if = "Option::is_none")]
    pub step1_output: Option<Bson>,
    #[serde(rename = "step2_output", default, skip_serializing_if = "Option::is_none")]
    pub step2_output: Option<Bson>,
    #[serde(rename = "step3_output", default, skip_serializing_if = "Option::is_none")]
    pub step3_output: Option<Bson>,
    #[serde(rename = "step4_output", default, skip_serializing_if = "Option::is_none")]
    pub step4_output: Option<Bson>,
    #[serde(rename = "step5_output", default, skip_serializing_if = "Option::is_none")]
    pub step5_output: Option<Bson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmp_pdf_blueprint_dl_url: Option<String>,
    pub step_is_completed: StepCompletion,
}

impl BlueprintCostEstimationCreateJob {
    pub fn new(blueprint_id: impl Into<String>, input: CostEstimationInput) -> Self {
        Self {
            metadata: CostEstimationMetadata { blueprint_id: blueprint_id.into() },
            input,
            output: CostEstimationOutput { cost_estimation: String::new() },
            worker_updated_at: None,
            all_process_completed: None,
            step1_output: None,
            step2_output: None,
            step3_output: None,
            step4_output: None,
            step5_output: None,
            current_step: None,
            tmp_pdf_blueprint_dl_url: None,
            step_is_completed: StepCompletion::default(),
        }
    }
}
