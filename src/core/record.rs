use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::Finding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub violations: usize,
    pub passes: usize,
    pub incomplete: usize,
    pub inapplicable: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub url: String,
    pub timestamp: String,
    #[serde(default = "unknown_conformance")]
    pub conformance_level: String,
    pub summary: AuditSummary,
    #[serde(default)]
    pub violations: Vec<Finding>,
    #[serde(default)]
    pub passes: Vec<Finding>,
    #[serde(default)]
    pub incomplete: Vec<Finding>,
    #[serde(default)]
    pub inapplicable: Vec<Finding>,
}

fn unknown_conformance() -> String {
    "unknown".to_string()
}

impl AuditRecord {
    pub fn from_axe_results(
        url: &str,
        timestamp: String,
        conformance_level: String,
        results: &Value,
    ) -> Result<Self> {
        let violations = finding_list(results, "violations")?;
        let passes = finding_list(results, "passes")?;
        let incomplete = finding_list(results, "incomplete")?;
        let inapplicable = finding_list(results, "inapplicable")?;

        Ok(Self {
            url: url.to_string(),
            timestamp,
            conformance_level,
            summary: AuditSummary {
                violations: violations.len(),
                passes: passes.len(),
                incomplete: incomplete.len(),
                inapplicable: inapplicable.len(),
            },
            violations,
            passes,
            incomplete,
            inapplicable,
        })
    }

    pub fn counts_match(&self) -> bool {
        self.summary.violations == self.violations.len()
            && self.summary.passes == self.passes.len()
            && self.summary.incomplete == self.incomplete.len()
            && self.summary.inapplicable == self.inapplicable.len()
    }
}

fn finding_list(results: &Value, key: &str) -> Result<Vec<Finding>> {
    let Some(value) = results.get(key) else {
        return Ok(Vec::new());
    };
    serde_json::from_value(value.clone())
        .with_context(|| format!("axe の結果を解析できませんでした: {key}"))
}
