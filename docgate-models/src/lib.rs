//! Document shapes of the blueprint administration application.
//!
//! Every model derives [`docgate::Document`], so reads and writes through a
//! `TypedCollection` reject fields the model does not declare. [`paths`] builds the
//! collection paths each model lives under.
//!
//! ```ignore
//! use docgate::prelude::*;
//! use docgate_models::{Organization, paths};
//!
//! let organizations = store.typed_collection::<Organization>(&paths::organizations()?);
//! let enostech = organizations.find_one(Filter::eq("code", "ENOSTECH")).await?;
//! ```

pub mod admin_user;
pub mod blueprint;
pub mod estimation;
pub mod organization;
pub mod paths;
pub mod request;

pub use admin_user::AdminUser;
pub use blueprint::{Blueprint, FileFormat, PageAnalysis, PreAnalysisOutput};
pub use estimation::{
    BlueprintCostEstimationCreateJob, CostEstimationInput, CostEstimationMetadata,
    CostEstimationOutput, StepCompletion,
};
pub use organization::Organization;
pub use request::{
    ConvertPdfFileToPngInput, ConvertPdfFileToPngRequest, JobLog, JobStatus, JobType, LogLevel,
    QueryRequest, QueryRequestStatus, RequestMetadata,
};
