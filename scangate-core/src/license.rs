//! License validation and usage metering against the remote authority.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use scangate_model::scan::now_rfc3339;
use scangate_model::{Finding, LicenseVerdict, SeverityCounts};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// How the authority answered a validation request.
#[derive(Debug, Clone, PartialEq)]
pub enum LicenseCheck {
    /// 2xx with `valid: true`.
    Valid(LicenseVerdict),
    /// 2xx with `valid: false`, or any 4xx.
    Invalid(LicenseVerdict),
    /// 5xx, transport failure, timeout, or an undecodable 2xx body.
    Unreachable(String),
}

impl LicenseCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, LicenseCheck::Valid(_))
    }

    pub fn into_verdict(self) -> LicenseVerdict {
        match self {
            LicenseCheck::Valid(verdict) => verdict,
            LicenseCheck::Invalid(_) | LicenseCheck::Unreachable(_) => {
                LicenseVerdict::invalid()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    pub license_key: String,
    pub scanner: String,
    pub total_findings: usize,
    pub severity_counts: SeverityCounts,
    pub duration_ms: u64,
    pub timestamp: String,
}

impl UsageReport {
    pub fn new(
        license_key: impl Into<String>,
        scanner: impl Into<String>,
        findings: &[Finding],
        duration_ms: u64,
    ) -> Self {
        Self {
            license_key: license_key.into(),
            scanner: scanner.into(),
            total_findings: findings.len(),
            severity_counts: SeverityCounts::tally(
                findings.iter().map(|f| &f.severity),
            ),
            duration_ms,
            timestamp: now_rfc3339(),
        }
    }
}

#[derive(Serialize)]
struct ValidateRequest<'a> {
    license_key: &'a str,
}

#[derive(Debug, Clone)]
struct CachedVerdict {
    verdict: LicenseVerdict,
    fetched_at: Instant,
}

#[derive(Debug)]
pub struct LicenseClient {
    http: reqwest::Client,
    base_url: String,
    cache_ttl: Duration,
    timeout: Duration,
    cache: DashMap<String, CachedVerdict>,
}

impl LicenseClient {
    pub fn new(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            timeout: DEFAULT_TIMEOUT,
            cache: DashMap::new(),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validate `key`, answering from cache while a valid verdict is fresh.
    pub async fn check(&self, key: &str) -> LicenseCheck {
        if let Some(verdict) = self.cached(key) {
            return LicenseCheck::Valid(verdict);
        }

        let check = self.request_validation(key).await;
        match &check {
            LicenseCheck::Valid(verdict) => {
                self.cache.insert(
                    key.to_string(),
                    CachedVerdict {
                        verdict: verdict.clone(),
                        fetched_at: Instant::now(),
                    },
                );
            }
            LicenseCheck::Invalid(_) => {
                self.cache.remove(key);
            }
            LicenseCheck::Unreachable(reason) => {
                warn!(%reason, "license authority unreachable");
            }
        }
        check
    }

    /// Verdict for `key`; anything short of a valid answer is
    /// [`LicenseVerdict::invalid`].
    pub async fn validate(&self, key: &str) -> LicenseVerdict {
        self.check(key).await.into_verdict()
    }

    pub async fn is_feature_allowed(
        &self,
        key: Option<&str>,
        feature: &str,
    ) -> bool {
        match key {
            Some(key) => self.validate(key).await.allows(feature),
            None => false,
        }
    }

    /// Post a usage record. Failures are logged and dropped.
    pub async fn report_usage(
        &self,
        key: Option<&str>,
        backend_label: &str,
        findings: &[Finding],
        duration_ms: u64,
    ) {
        let Some(key) = key else {
            return;
        };
        let report = UsageReport::new(key, backend_label, findings, duration_ms);
        self.send_usage(&report).await;
    }

    /// Build the report now and post it on a background task.
    ///
    /// Returns `None` without a key. Callers on a response path drop the
    /// handle; tests may await it.
    pub fn spawn_report_usage(
        self: &Arc<Self>,
        key: Option<&str>,
        backend_label: &str,
        findings: &[Finding],
        duration_ms: u64,
    ) -> Option<JoinHandle<()>> {
        let key = key?;
        let report = UsageReport::new(key, backend_label, findings, duration_ms);
        let client = Arc::clone(self);
        Some(tokio::spawn(async move {
            client.send_usage(&report).await;
        }))
    }

    fn cached(&self, key: &str) -> Option<LicenseVerdict> {
        let entry = self.cache.get(key)?;
        if entry.fetched_at.elapsed() < self.cache_ttl {
            Some(entry.verdict.clone())
        } else {
            drop(entry);
            self.cache.remove(key);
            None
        }
    }

    async fn request_validation(&self, key: &str) -> LicenseCheck {
        let url = format!("{}/validate", self.base_url);
        let response = match self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&ValidateRequest { license_key: key })
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                return LicenseCheck::Unreachable(format!(
                    "timed out after {}ms",
                    self.timeout.as_millis()
                ));
            }
            Err(err) => return LicenseCheck::Unreachable(err.to_string()),
        };

        let status = response.status();
        if status.is_server_error() {
            return LicenseCheck::Unreachable(format!("HTTP {}", status));
        }
        if status.is_client_error() {
            debug!(%status, "license authority rejected key");
            return LicenseCheck::Invalid(LicenseVerdict::invalid());
        }
        if !status.is_success() {
            return LicenseCheck::Unreachable(format!("unexpected HTTP {}", status));
        }

        match response.json::<LicenseVerdict>().await {
            Ok(verdict) if verdict.valid => LicenseCheck::Valid(verdict),
            Ok(verdict) => LicenseCheck::Invalid(verdict),
            Err(err) => LicenseCheck::Unreachable(format!(
                "invalid response body: {}",
                err
            )),
        }
    }

    async fn send_usage(&self, report: &UsageReport) {
        let url = format!("{}/usage", self.base_url);
        let result = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(report)
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => debug!(scanner = %report.scanner, "usage reported"),
            Err(err) => {
                debug!(scanner = %report.scanner, error = %err, "usage report failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_addr, finding, serve};
    use axum::{
        Json, Router,
        extract::State,
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::post,
    };
    use scangate_model::Severity;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct Authority {
        validations: Arc<AtomicUsize>,
        usage: Arc<Mutex<Vec<Value>>>,
    }

    async fn validate(
        State(authority): State<Authority>,
        Json(body): Json<Value>,
    ) -> Response {
        authority.validations.fetch_add(1, Ordering::SeqCst);
        match body["license_key"].as_str() {
            Some("good") => Json(json!({
                "valid": true,
                "plan": "team",
                "features": ["scan", "dast"]
            }))
            .into_response(),
            Some("expired") => Json(json!({ "valid": false })).into_response(),
            Some("broken") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            Some("garbled") => "not json".into_response(),
            _ => StatusCode::UNAUTHORIZED.into_response(),
        }
    }

    async fn usage(
        State(authority): State<Authority>,
        Json(body): Json<Value>,
    ) -> StatusCode {
        authority.usage.lock().await.push(body);
        StatusCode::ACCEPTED
    }

    async fn authority() -> (Authority, String) {
        let state = Authority::default();
        let app = Router::new()
            .route("/validate", post(validate))
            .route("/usage", post(usage))
            .with_state(state.clone());
        let addr = serve(app).await;
        (state, format!("http://{}", addr))
    }

    #[tokio::test]
    async fn valid_verdict_is_cached_within_ttl() {
        let (state, url) = authority().await;
        let client = LicenseClient::new(url, reqwest::Client::new());

        let first = client.check("good").await;
        let second = client.check("good").await;

        assert!(first.is_valid());
        assert_eq!(first, second);
        assert_eq!(state.validations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_cache_entry_is_refetched() {
        let (state, url) = authority().await;
        let client = LicenseClient::new(url, reqwest::Client::new())
            .with_cache_ttl(Duration::ZERO);

        assert!(client.check("good").await.is_valid());
        assert!(client.check("good").await.is_valid());
        assert_eq!(state.validations.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn rejected_keys_are_invalid_and_not_cached() {
        let (state, url) = authority().await;
        let client = LicenseClient::new(url, reqwest::Client::new());

        assert!(matches!(client.check("expired").await, LicenseCheck::Invalid(_)));
        assert!(matches!(client.check("unknown").await, LicenseCheck::Invalid(_)));
        assert_eq!(client.validate("expired").await, LicenseVerdict::invalid());
        assert_eq!(state.validations.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn server_errors_and_garbage_are_unreachable() {
        let (_state, url) = authority().await;
        let client = LicenseClient::new(url, reqwest::Client::new());

        assert!(matches!(client.check("broken").await, LicenseCheck::Unreachable(_)));
        assert!(matches!(client.check("garbled").await, LicenseCheck::Unreachable(_)));
        assert!(!client.validate("broken").await.valid);
    }

    #[tokio::test]
    async fn closed_authority_is_unreachable() {
        let addr = closed_addr().await;
        let client = LicenseClient::new(format!("http://{}", addr), reqwest::Client::new());
        assert!(matches!(client.check("good").await, LicenseCheck::Unreachable(_)));
    }

    #[tokio::test]
    async fn feature_checks_require_key_and_feature() {
        let (_state, url) = authority().await;
        let client = LicenseClient::new(url, reqwest::Client::new());

        assert!(client.is_feature_allowed(Some("good"), "dast").await);
        assert!(!client.is_feature_allowed(Some("good"), "posture").await);
        assert!(!client.is_feature_allowed(Some("expired"), "dast").await);
        assert!(!client.is_feature_allowed(None, "dast").await);
    }

    #[tokio::test]
    async fn usage_report_carries_severity_breakdown() {
        let (state, url) = authority().await;
        let client = Arc::new(LicenseClient::new(url, reqwest::Client::new()));

        let mut critical = finding("SAST-1", "a.js", Some(1), Some("CWE-89"));
        critical.severity = Severity::Critical;
        let findings = vec![critical, finding("SAST-2", "a.js", Some(2), None)];

        client
            .spawn_report_usage(Some("good"), "gateway", &findings, 42)
            .expect("key present")
            .await
            .expect("report task");

        let reports = state.usage.lock().await;
        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(report["license_key"], "good");
        assert_eq!(report["scanner"], "gateway");
        assert_eq!(report["total_findings"], 2);
        assert_eq!(report["duration_ms"], 42);
        assert_eq!(report["severity_counts"]["critical"], 1);
        assert_eq!(report["severity_counts"]["medium"], 1);
        assert!(report["timestamp"].is_string());
    }

    #[tokio::test]
    async fn usage_without_key_is_a_no_op() {
        let (state, url) = authority().await;
        let client = Arc::new(LicenseClient::new(url, reqwest::Client::new()));

        assert!(client.spawn_report_usage(None, "sast", &[], 1).is_none());
        client.report_usage(None, "sast", &[], 1).await;
        assert!(state.usage.lock().await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_usage_endpoint_is_swallowed() {
        let addr = closed_addr().await;
        let client = LicenseClient::new(format!("http://{}", addr), reqwest::Client::new());
        client.report_usage(Some("good"), "sast", &[], 1).await;
    }
}
