use docgate::Document;
use serde::{Deserialize, Serialize};

/// A tenant. Stored under `organizations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Document)]
pub struct Organization {
    pub name: String,
    /// Short unique code, e.g. `ENOSTECH`.
    pub code: String,
}

impl Organization {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self { name: name.into(), code: code.into() }
    }
}
