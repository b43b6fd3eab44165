//! Scanner backend clients.
//!
//! A client never fails a scan: transport errors, timeouts, non-2xx replies
//! and undecodable bodies all come back as [`ScanOutcome::Degraded`], which the
//! router folds into a warning on the merged result.

mod http;

use async_trait::async_trait;
use scangate_model::{ScanRequest, ScanResult};

pub use http::{DEFAULT_HEALTH_TIMEOUT, DEFAULT_SCAN_TIMEOUT, HttpScannerClient};

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Completed(ScanResult),
    Degraded { scanner: String, reason: String },
}

impl ScanOutcome {
    pub fn degraded(scanner: impl Into<String>, reason: impl Into<String>) -> Self {
        ScanOutcome::Degraded {
            scanner: scanner.into(),
            reason: reason.into(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ScanOutcome::Degraded { .. })
    }

    /// Collapse into a plain result; degraded outcomes become an empty
    /// result carrying one `unavailable` warning.
    pub fn into_result(self) -> ScanResult {
        match self {
            ScanOutcome::Completed(result) => result,
            ScanOutcome::Degraded { scanner, reason } => {
                ScanResult::degraded(&scanner, reason)
            }
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScannerClient: Send + Sync {
    fn name(&self) -> &str;

    async fn scan(&self, request: &ScanRequest) -> ScanOutcome;

    async fn is_healthy(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_outcome_becomes_warning_result() {
        let result =
            ScanOutcome::degraded("sast", "connection refused").into_result();
        assert!(result.findings.is_empty());
        assert_eq!(result.metadata.scanner, "sast");
        assert_eq!(
            result.metadata.warnings,
            vec!["Scanner 'sast' unavailable: connection refused".to_string()]
        );
    }
}
