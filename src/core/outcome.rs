use serde::{Deserialize, Serialize};

use crate::core::AuditRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub url: String,
    pub error: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuditOutcome {
    Audited(AuditRecord),
    Failed(ErrorRecord),
}

impl AuditOutcome {
    pub fn url(&self) -> &str {
        match self {
            AuditOutcome::Audited(record) => &record.url,
            AuditOutcome::Failed(record) => &record.url,
        }
    }
}
