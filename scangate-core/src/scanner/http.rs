use std::time::{Duration, Instant};

use async_trait::async_trait;
use scangate_model::{Finding, ScanMetadata, ScanRequest, ScanResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ScanOutcome, ScannerClient};

pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Backend response with findings left undecoded, so one bad entry does not
/// sink its siblings.
#[derive(Debug, Deserialize)]
struct WireScanResult {
    findings: Vec<Value>,
    metadata: ScanMetadata,
}

/// JSON-over-HTTP client for one scanner backend.
///
/// Scans are `POST {base_url}/scan` with a [`ScanRequest`] body; health is
/// `GET {base_url}/health` and only a 2xx counts as healthy.
#[derive(Debug, Clone)]
pub struct HttpScannerClient {
    name: String,
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
    health_timeout: Duration,
}

impl HttpScannerClient {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            timeout: DEFAULT_SCAN_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request_scan(
        &self,
        request: &ScanRequest,
    ) -> Result<WireScanResult, String> {
        let url = format!("{}/scan", self.base_url);
        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.describe_transport_error(&e))?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        response
            .json::<WireScanResult>()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.timeout_reason()
                } else {
                    format!("invalid response body: {}", e)
                }
            })
    }

    fn describe_transport_error(&self, err: &reqwest::Error) -> String {
        if err.is_timeout() {
            self.timeout_reason()
        } else if err.is_connect() {
            format!("connection to {} failed", self.base_url)
        } else {
            err.to_string()
        }
    }

    fn timeout_reason(&self) -> String {
        if self.timeout.subsec_millis() == 0 {
            format!("timed out after {}s", self.timeout.as_secs())
        } else {
            format!("timed out after {}ms", self.timeout.as_millis())
        }
    }

    /// Decode findings one at a time, dropping any that fail to decode or
    /// miss a mandatory field, and note how many went.
    fn decode_findings(&self, wire: WireScanResult) -> ScanResult {
        let received = wire.findings.len();
        let findings: Vec<Finding> = wire
            .findings
            .into_iter()
            .filter_map(|raw| {
                let decoded = serde_json::from_value::<Finding>(raw)
                    .map_err(|err| err.to_string())
                    .and_then(|finding| {
                        finding.validate().map(|()| finding).map_err(|err| err.to_string())
                    });
                match decoded {
                    Ok(finding) => Some(finding),
                    Err(error) => {
                        debug!(scanner = %self.name, %error, "dropping malformed finding");
                        None
                    }
                }
            })
            .collect();

        let mut result = ScanResult {
            findings,
            metadata: wire.metadata,
        };
        let dropped = received - result.findings.len();
        if dropped > 0 {
            warn!(
                scanner = %self.name,
                dropped,
                "scanner returned malformed findings"
            );
            result.metadata.warnings.push(format!(
                "Scanner '{}' returned {} malformed finding(s)",
                self.name, dropped
            ));
        }
        result
    }
}

#[async_trait]
impl ScannerClient for HttpScannerClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn scan(&self, request: &ScanRequest) -> ScanOutcome {
        let started = Instant::now();
        match self.request_scan(request).await {
            Ok(wire) => {
                debug!(
                    scanner = %self.name,
                    findings = wire.findings.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "scan completed"
                );
                ScanOutcome::Completed(self.decode_findings(wire))
            }
            Err(reason) => {
                warn!(scanner = %self.name, %reason, "scanner unavailable");
                ScanOutcome::degraded(&self.name, reason)
            }
        }
    }

    async fn is_healthy(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self
            .http
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(scanner = %self.name, error = %err, "health probe failed");
                false
            }
        }
    }
}
