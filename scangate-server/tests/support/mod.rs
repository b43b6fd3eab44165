use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_test::TestServer;
use scangate_config::{
    Config, ConfigMetadata, LicenseConfig, LimitsConfig, PathMapping, ProfileConfig,
    ScannerEndpoint, ServerConfig, SessionConfig,
};
use scangate_server::{AppState, create_app};
use serde_json::{Value, json};
use tokio::sync::Mutex;

/// In-process scanner backend that reports one high finding per file.
#[derive(Clone)]
pub struct FakeScanner {
    pub name: &'static str,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeScanner {
    pub async fn received(&self) -> Vec<Value> {
        self.requests.lock().await.clone()
    }
}

fn cwe_for(name: &str) -> &'static str {
    match name {
        "sast" => "CWE-89",
        "secrets" => "CWE-798",
        _ => "CWE-1104",
    }
}

async fn fake_scan(State(fake): State<FakeScanner>, Json(body): Json<Value>) -> Json<Value> {
    fake.requests.lock().await.push(body.clone());

    let files = body["files"].as_array().cloned().unwrap_or_default();
    let findings: Vec<Value> = files
        .iter()
        .enumerate()
        .map(|(index, file)| {
            json!({
                "id": format!("{}-{}", fake.name.to_uppercase(), index + 1),
                "severity": "high",
                "title": format!("{} issue", fake.name),
                "description": "Found by the fake backend",
                "file": file["path"],
                "line": 1,
                "cwe": cwe_for(fake.name),
                "remediation": "Apply the recommended fix",
                "fix_snippet": "safe()"
            })
        })
        .collect();

    Json(json!({
        "findings": findings,
        "metadata": {
            "scanner": fake.name,
            "version": "1.0.0",
            "duration_ms": 3,
            "files_scanned": files.len(),
            "timestamp": "2026-01-01T00:00:00Z"
        }
    }))
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

pub async fn spawn_scanner(name: &'static str) -> (FakeScanner, ScannerEndpoint) {
    let fake = FakeScanner {
        name,
        requests: Arc::default(),
    };
    let app = Router::new()
        .route("/scan", post(fake_scan))
        .route("/health", get(|| async { StatusCode::OK }))
        .with_state(fake.clone());
    let addr = serve(app).await;

    let mut endpoint = ScannerEndpoint::new(name, "127.0.0.1", addr.port());
    endpoint.timeout = Duration::from_secs(5);
    (fake, endpoint)
}

/// Endpoint pointing at a port nothing listens on.
pub async fn closed_endpoint(name: &str) -> ScannerEndpoint {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let port = listener.local_addr().expect("free port address").port();
    drop(listener);

    let mut endpoint = ScannerEndpoint::new(name, "127.0.0.1", port);
    endpoint.timeout = Duration::from_secs(2);
    endpoint
}

async fn validate(Json(body): Json<Value>) -> Response {
    match body["license_key"].as_str() {
        Some("good") => {
            Json(json!({ "valid": true, "plan": "team", "features": ["scan"] })).into_response()
        }
        Some("expired") => Json(json!({ "valid": false })).into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

/// License authority accepting only the key `good`.
pub async fn spawn_authority() -> String {
    let app = Router::new()
        .route("/validate", post(validate))
        .route("/usage", post(|| async { StatusCode::ACCEPTED }));
    format!("http://{}", serve(app).await)
}

pub fn test_config(scanners: Vec<ScannerEndpoint>) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8700,
        },
        scanners,
        license: LicenseConfig {
            key: None,
            server_url: "http://127.0.0.1:9".to_string(),
            cache_ttl: Duration::from_secs(3_600),
            timeout: Duration::from_secs(2),
        },
        limits: LimitsConfig {
            max_body_bytes: 64 * 1024,
            max_file_bytes: 64 * 1024,
            max_files: 100,
        },
        paths: PathMapping::default(),
        profile: ProfileConfig::default(),
        sessions: SessionConfig {
            idle_timeout: Duration::from_secs(1_800),
        },
        metadata: ConfigMetadata::default(),
    }
}

pub fn test_server(config: Config) -> (TestServer, AppState) {
    let state = AppState::from_config(Arc::new(config)).expect("app state");
    let server = TestServer::new(create_app(state.clone())).expect("test server");
    (server, state)
}

/// Serve the gateway on a real socket, for tests that hold a streaming
/// response open.
pub async fn spawn_gateway(config: Config) -> (String, AppState) {
    let state = AppState::from_config(Arc::new(config)).expect("app state");
    let addr = serve(create_app(state.clone())).await;
    (format!("http://{}", addr), state)
}
