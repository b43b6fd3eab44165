//! Helpers for tests that need findings or a live HTTP peer.

use std::net::SocketAddr;

use scangate_model::{
    FileTarget, Finding, ProfileRules, ProjectContext, ScanRequest, Severity,
};

pub fn finding(
    id: &str,
    file: &str,
    line: Option<u32>,
    cwe: Option<&str>,
) -> Finding {
    Finding {
        id: id.to_string(),
        severity: Severity::Medium,
        title: format!("Issue {id}"),
        description: "Test finding".to_string(),
        file: file.to_string(),
        line,
        cwe: cwe.map(str::to_string),
        compliance: None,
        remediation: "Fix it".to_string(),
        code_snippet: None,
        fix_snippet: None,
    }
}

pub fn request(path: &str, content: &str) -> ScanRequest {
    ScanRequest {
        files: vec![FileTarget::with_content(path, content)],
        profile: ProfileRules {
            name: "standard".to_string(),
            rules: Default::default(),
        },
        context: ProjectContext::default(),
    }
}

/// Serve `app` on an ephemeral localhost port for the rest of the test.
pub async fn serve(app: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    addr
}
