//! Shared domain types

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a competition's scores are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreFormat {
    /// Durations, stored as whole seconds
    Time,
    /// Raw integer counts
    Count,
}

impl ScoreFormat {
    /// Value stored in the `score_format` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Count => "count",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Time => "Time (h:mm:ss)",
            Self::Count => "Count",
        }
    }
}

impl std::fmt::Display for ScoreFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown score format '{0}' (expected 'time' or 'count')")]
pub struct UnknownScoreFormat(pub String);

impl FromStr for ScoreFormat {
    type Err = UnknownScoreFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "count" | "number" => Ok(Self::Count),
            other => Err(UnknownScoreFormat(other.to_string())),
        }
    }
}
