use serde::{Deserialize, Serialize};

use crate::{error::ModelError, severity::Severity};

/// One detected issue in the common shape every backend emits.
///
/// `id` follows the `<BACKEND-PREFIX>-<native-id>` convention and is unique
/// within a scan. `id`, `title`, `description`, `file` and `remediation` are
/// mandatory; see [`Finding::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Path or URL; the exact form is backend-defined.
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<Vec<String>>,
    pub remediation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_snippet: Option<String>,
}

/// Identity used to collapse the same issue reported by several backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub file: String,
    pub line: Option<u32>,
    pub cwe_or_title: String,
}

impl Finding {
    /// Check the mandatory-field contract.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mandatory: [(&'static str, &str); 5] = [
            ("id", &self.id),
            ("title", &self.title),
            ("description", &self.description),
            ("file", &self.file),
            ("remediation", &self.remediation),
        ];

        for (field, value) in mandatory {
            if value.trim().is_empty() {
                return Err(ModelError::InvalidFinding {
                    id: self.id.clone(),
                    field,
                });
            }
        }
        Ok(())
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            file: self.file.clone(),
            line: self.line,
            cwe_or_title: self
                .cwe
                .clone()
                .unwrap_or_else(|| self.title.clone()),
        }
    }

    /// `file:line` when a line is known, otherwise just the file.
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{}", self.file, line),
            None => self.file.clone(),
        }
    }
}
