use docgate::Document;
use serde::{Deserialize, Serialize};

/// An administrator account of one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Document)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub email: String,
    pub role: String,
    pub organization_id: String,
}
