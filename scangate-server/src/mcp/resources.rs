//! Read-only `scangate://` resources.

use serde_json::{Value, json};

use scangate_core::SecurityScore;
use scangate_model::SeverityCounts;

use super::{protocol::RpcError, session::SessionContext};
use crate::infra::app_state::AppState;

pub const PROFILES_URI: &str = "scangate://profiles";
pub const FINDINGS_SUMMARY_URI: &str = "scangate://findings/summary";
pub const CONFIG_URI: &str = "scangate://config";
pub const COMPLIANCE_PREFIX: &str = "scangate://compliance/";

const MIME_JSON: &str = "application/json";

pub fn list_resources(context: &SessionContext) -> Value {
    let mut resources = vec![
        json!({
            "uri": PROFILES_URI,
            "name": "Compliance profiles",
            "description": "Registered profiles and the active one",
            "mimeType": MIME_JSON,
        }),
        json!({
            "uri": FINDINGS_SUMMARY_URI,
            "name": "Findings summary",
            "description": "Severity counts and security score for this session",
            "mimeType": MIME_JSON,
        }),
        json!({
            "uri": CONFIG_URI,
            "name": "Gateway configuration",
            "description": "Bind address, scanners and license mode",
            "mimeType": MIME_JSON,
        }),
    ];

    resources.extend(context.profiles.profiles().map(|profile| {
        json!({
            "uri": format!("{}{}", COMPLIANCE_PREFIX, profile.name),
            "name": format!("{} profile", profile.name),
            "description": profile.description,
            "mimeType": MIME_JSON,
        })
    }));

    json!({ "resources": resources })
}

pub fn read_resource(
    state: &AppState,
    context: &SessionContext,
    uri: &str,
) -> Result<Value, RpcError> {
    let body = match uri {
        PROFILES_URI => profiles_view(context),
        FINDINGS_SUMMARY_URI => findings_summary(context),
        CONFIG_URI => config_view(state, context),
        _ => {
            let profile = uri
                .strip_prefix(COMPLIANCE_PREFIX)
                .and_then(|name| context.profiles.get_profile(name))
                .ok_or_else(|| RpcError::resource_not_found(uri))?;
            serde_json::to_value(profile).map_err(|e| RpcError::internal(e.to_string()))?
        }
    };

    let text = serde_json::to_string_pretty(&body)
        .map_err(|e| RpcError::internal(e.to_string()))?;
    Ok(json!({
        "contents": [{ "uri": uri, "mimeType": MIME_JSON, "text": text }]
    }))
}

fn profiles_view(context: &SessionContext) -> Value {
    let profiles: Vec<Value> = context
        .profiles
        .profiles()
        .map(|profile| {
            json!({
                "name": profile.name,
                "version": profile.version,
                "description": profile.description,
                "severity_thresholds": profile.severity_thresholds,
            })
        })
        .collect();
    json!({
        "active": context.profiles.active_name(),
        "profiles": profiles,
    })
}

fn findings_summary(context: &SessionContext) -> Value {
    let counts = SeverityCounts::tally(context.last_findings.iter().map(|f| &f.severity));
    let score = SecurityScore::compute(&context.last_findings, context.profiles.active());
    json!({
        "total": counts.total(),
        "counts": counts,
        "score": score,
    })
}

fn config_view(state: &AppState, context: &SessionContext) -> Value {
    let config = &state.config;
    let scanners: Vec<Value> = config
        .scanners
        .iter()
        .map(|endpoint| {
            json!({
                "name": endpoint.name,
                "url": endpoint.base_url(),
                "enabled": endpoint.enabled,
                "timeout_secs": endpoint.timeout.as_secs(),
            })
        })
        .collect();

    json!({
        "bind": config.bind_address(),
        "scanners": scanners,
        "active_profile": context.profiles.active_name(),
        "license": {
            "mode": if config.license.is_licensed() { "licensed" } else { "community" },
            "server_url": config.license.server_url,
        },
        "limits": {
            "max_body_bytes": config.limits.max_body_bytes,
            "max_file_bytes": config.limits.max_file_bytes,
            "max_files": config.limits.max_files,
        },
        "sessions": {
            "open": state.sessions.len(),
            "idle_timeout_secs": config.sessions.idle_timeout.as_secs(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scangate_core::ProfileManager;

    #[test]
    fn lists_fixed_and_compliance_resources() {
        let context = SessionContext::new(ProfileManager::new());
        let listed = list_resources(&context);
        let uris: Vec<&str> = listed["resources"]
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|r| r["uri"].as_str())
            .collect();

        assert!(uris.contains(&PROFILES_URI));
        assert!(uris.contains(&FINDINGS_SUMMARY_URI));
        assert!(uris.contains(&CONFIG_URI));
        assert!(uris.contains(&"scangate://compliance/pci-dss"));
        assert_eq!(uris.len(), 3 + 6);
    }

    #[test]
    fn empty_session_summary_is_a_clean_pass() {
        let context = SessionContext::new(ProfileManager::new());
        let summary = findings_summary(&context);
        assert_eq!(summary["total"], 0);
        assert_eq!(summary["score"]["score"], 100);
        assert_eq!(summary["score"]["status"], "pass");
    }

    #[test]
    fn profiles_view_names_active() {
        let context = SessionContext::new(
            ProfileManager::with_active("hipaa").expect("hipaa exists"),
        );
        let view = profiles_view(&context);
        assert_eq!(view["active"], "hipaa");
        assert_eq!(view["profiles"].as_array().map(Vec::len), Some(6));
    }
}
