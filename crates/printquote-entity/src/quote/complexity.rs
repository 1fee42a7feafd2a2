//! Model complexity classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Printing complexity derived from the orientation analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Few overhangs.
    Low,
    /// Default when no indicator is available.
    #[default]
    Medium,
    /// Heavy support or high unprintability.
    High,
}

impl Complexity {
    /// Classify an unprintability score.
    pub fn from_unprintability(score: f64) -> Self {
        if score < 5.0 {
            Self::Low
        } else if score < 15.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Classify a support percentage.
    pub fn from_support_percent(percent: f64) -> Self {
        if percent < 10.0 {
            Self::Low
        } else if percent < 25.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Return the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
