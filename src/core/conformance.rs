use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConformanceLevel {
    A,
    AA,
    AAA,
}

impl ConformanceLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            ConformanceLevel::A => "A",
            ConformanceLevel::AA => "AA",
            ConformanceLevel::AAA => "AAA",
        }
    }

    pub fn label(self) -> String {
        format!("WCAG 2.2 Level {}", self.as_str())
    }

    pub const fn tags(self) -> &'static [&'static str] {
        match self {
            ConformanceLevel::A => &["wcag2a", "wcag21a", "wcag22a"],
            ConformanceLevel::AA => &[
                "wcag2a", "wcag2aa", "wcag21a", "wcag21aa", "wcag22a", "wcag22aa",
            ],
            ConformanceLevel::AAA => &[
                "wcag2a", "wcag2aa", "wcag2aaa", "wcag21a", "wcag21aa", "wcag21aaa", "wcag22a",
                "wcag22aa", "wcag22aaa",
            ],
        }
    }
}

impl fmt::Display for ConformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConformanceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(ConformanceLevel::A),
            "AA" => Ok(ConformanceLevel::AA),
            "AAA" => Ok(ConformanceLevel::AAA),
            _ => Err(format!(
                "適合レベルが不正です: {s}（A|AA|AAA を指定してください）"
            )),
        }
    }
}
