use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use scangate_model::scan::now_rfc3339;
use scangate_model::{ScanMetadata, ScanRequest, ScanResult};
use tracing::{debug, info};

use crate::dedup::dedup_findings;
use crate::scanner::{ScanOutcome, ScannerClient};
use crate::{GATEWAY_SCANNER, GATEWAY_VERSION};

struct RegisteredScanner {
    name: String,
    client: Arc<dyn ScannerClient>,
}

/// Fans a request out to the enabled backends and merges what comes back.
///
/// Registration order is configuration order, and every merge step walks
/// clients in that order so the combined finding list is reproducible.
#[derive(Default)]
pub struct ScanRouter {
    scanners: Vec<RegisteredScanner>,
}

impl std::fmt::Debug for ScanRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanRouter")
            .field("scanners", &self.scanner_names())
            .finish()
    }
}

impl ScanRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under `name`. Re-registering a name replaces the
    /// earlier client in place.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        client: Arc<dyn ScannerClient>,
    ) {
        let name = name.into();
        if let Some(existing) = self.scanners.iter_mut().find(|s| s.name == name)
        {
            existing.client = client;
        } else {
            self.scanners.push(RegisteredScanner { name, client });
        }
    }

    pub fn with_scanner(
        mut self,
        name: impl Into<String>,
        client: Arc<dyn ScannerClient>,
    ) -> Self {
        self.register(name, client);
        self
    }

    pub fn scanner_names(&self) -> Vec<String> {
        self.scanners.iter().map(|s| s.name.clone()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scanners.iter().any(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.scanners.is_empty()
    }

    /// Names in `requested` that match no registered backend.
    pub fn unknown_names<'a>(&self, requested: &'a [String]) -> Vec<&'a str> {
        requested
            .iter()
            .filter(|name| !self.contains(name))
            .map(String::as_str)
            .collect()
    }

    /// Scan with every registered backend, or only those named in
    /// `requested`. An empty list means every backend; each unknown name
    /// adds a warning.
    pub async fn scan_all(
        &self,
        request: &ScanRequest,
        requested: Option<&[String]>,
    ) -> ScanResult {
        let started = Instant::now();
        let requested = requested.filter(|names| !names.is_empty());
        let selected: Vec<&RegisteredScanner> = self
            .scanners
            .iter()
            .filter(|s| requested.is_none_or(|names| names.contains(&s.name)))
            .collect();
        let mut warnings: Vec<String> = requested
            .map(|names| self.unknown_names(names))
            .unwrap_or_default()
            .into_iter()
            .map(|name| format!("Scanner '{}' is not enabled", name))
            .collect();

        debug!(
            scanners = ?selected.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            files = request.files.len(),
            "dispatching scan"
        );

        let outcomes =
            join_all(selected.iter().map(|s| s.client.scan(request))).await;

        let mut findings = Vec::new();
        for outcome in outcomes {
            match outcome {
                ScanOutcome::Completed(result) => {
                    findings.extend(result.findings);
                    warnings.extend(result.metadata.warnings);
                }
                ScanOutcome::Degraded { scanner, reason } => {
                    warnings.push(format!(
                        "Scanner '{}' unavailable: {}",
                        scanner, reason
                    ));
                }
            }
        }

        let findings = dedup_findings(findings);
        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            scanners = selected.len(),
            findings = findings.len(),
            warnings = warnings.len(),
            duration_ms,
            "scan merged"
        );

        ScanResult {
            findings,
            metadata: ScanMetadata {
                scanner: GATEWAY_SCANNER.to_string(),
                version: GATEWAY_VERSION.to_string(),
                duration_ms,
                files_scanned: request.files.len(),
                timestamp: now_rfc3339(),
                warnings,
            },
        }
    }

    /// Scan with a single backend. An unregistered name yields an empty
    /// result rather than an error.
    pub async fn scan_with(
        &self,
        name: &str,
        request: &ScanRequest,
    ) -> ScanResult {
        match self.scanners.iter().find(|s| s.name == name) {
            Some(scanner) => scanner.client.scan(request).await.into_result(),
            None => {
                debug!(scanner = name, "scanner not enabled, returning empty result");
                ScanResult::empty(name)
            }
        }
    }

    pub async fn health_check(&self) -> BTreeMap<String, bool> {
        let probes = join_all(self.scanners.iter().map(|s| async move {
            (s.name.clone(), s.client.is_healthy().await)
        }))
        .await;
        probes.into_iter().collect()
    }
}
