use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{scan::ProfileRules, severity::Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    /// Findings at or above this severity fail the gate.
    pub error: Severity,
    /// Findings at or above this severity are reported as warnings.
    pub warn: Severity,
}

/// Named, versioned compliance configuration. `rules` is keyed by backend
/// name and each entry is shaped by the backend it targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub version: String,
    pub description: String,
    pub severity_thresholds: SeverityThresholds,
    #[serde(default)]
    pub rules: Map<String, Value>,
}

impl Profile {
    /// Owned copy of the rules for dispatch.
    pub fn snapshot(&self) -> ProfileRules {
        ProfileRules {
            name: self.name.clone(),
            rules: self.rules.clone(),
        }
    }

    pub fn rule(&self, scanner: &str) -> Option<&Value> {
        self.rules.get(scanner)
    }
}
