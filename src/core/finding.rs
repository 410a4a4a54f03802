use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    Serious,
    Moderate,
    Minor,
    Unknown,
}

impl Impact {
    pub const NAMED: [Impact; 4] = [
        Impact::Critical,
        Impact::Serious,
        Impact::Moderate,
        Impact::Minor,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Impact::Critical => "critical",
            Impact::Serious => "serious",
            Impact::Moderate => "moderate",
            Impact::Minor => "minor",
            Impact::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingNode {
    #[serde(default)]
    pub target: Vec<String>,
    #[serde(default)]
    pub html: String,
}

impl FindingNode {
    pub fn display_target(&self) -> &str {
        self.target.first().map(String::as_str).unwrap_or("unknown")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub help: String,
    #[serde(rename = "helpUrl", default, skip_serializing_if = "Option::is_none")]
    pub help_url: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<FindingNode>,
}

impl Finding {
    pub fn impact_level(&self) -> Impact {
        match self.impact.as_deref() {
            Some("critical") => Impact::Critical,
            Some("serious") => Impact::Serious,
            Some("moderate") => Impact::Moderate,
            Some("minor") => Impact::Minor,
            _ => Impact::Unknown,
        }
    }
}
