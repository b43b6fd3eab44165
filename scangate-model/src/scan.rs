use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::finding::Finding;

/// One file handed to a backend. Without `content` the backend resolves
/// `path` itself (typically a directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTarget {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl FileTarget {
    pub fn with_content(
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            content: Some(content.into()),
        }
    }

    pub fn path_only(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: None,
        }
    }
}

/// Owned snapshot of a profile's rules taken at dispatch time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProfileRules {
    pub name: String,
    #[serde(default)]
    pub rules: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(
        rename = "rootDir",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub root_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub files: Vec<FileTarget>,
    pub profile: ProfileRules,
    #[serde(default)]
    pub context: ProjectContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub scanner: String,
    pub version: String,
    pub duration_ms: u64,
    pub files_scanned: usize,
    /// RFC 3339 timestamp of when the result was produced.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub findings: Vec<Finding>,
    pub metadata: ScanMetadata,
}

impl ScanResult {
    /// Empty, zero-duration result attributed to `scanner`.
    pub fn empty(scanner: impl Into<String>) -> Self {
        Self {
            findings: Vec::new(),
            metadata: ScanMetadata {
                scanner: scanner.into(),
                version: "unknown".to_string(),
                duration_ms: 0,
                files_scanned: 0,
                timestamp: now_rfc3339(),
                warnings: Vec::new(),
            },
        }
    }

    /// Result standing in for a backend that could not be reached.
    pub fn degraded(scanner: &str, reason: impl AsRef<str>) -> Self {
        let mut result = Self::empty(scanner);
        result.metadata.warnings.push(format!(
            "Scanner '{}' unavailable: {}",
            scanner,
            reason.as_ref()
        ));
        result
    }
}

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
