//! Tool catalog and tool execution.
//!
//! Every tool runs with its session's context locked. Business failures
//! (bad arguments, unknown profile, unknown finding) come back as a normal
//! result flagged `isError`; only an unknown tool name is a protocol error.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{debug, info};

use scangate_core::{ProfileError, SecurityScore, dedup_findings};
use scangate_model::{
    FileTarget, Finding, ProjectContext, ScanRequest, ScanResult, Severity,
    SeverityCounts,
};

use super::{
    protocol::{RpcError, notification},
    resources::FINDINGS_SUMMARY_URI,
    session::{McpSession, SessionContext},
};
use crate::{
    files::{collect_files, read_target, to_caller_view},
    handlers::scan::GATEWAY_USAGE_LABEL,
    infra::app_state::AppState,
};

/// Cache note shared by the tools that add to the session's findings.
macro_rules! merged_note {
    () => {
        " Findings are added to the session cache; repeat scans replace matching findings instead of duplicating them."
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    ScanFile,
    ScanProject,
    ScanDependencies,
    GetFindings,
    SetProfile,
    GetSecurityScore,
    SuggestFix,
    ScanIac,
    CheckContainer,
    CheckLicense,
    DastCheck,
    CheckPosture,
}

impl Tool {
    pub const ALL: [Tool; 12] = [
        Tool::ScanFile,
        Tool::ScanProject,
        Tool::ScanDependencies,
        Tool::GetFindings,
        Tool::SetProfile,
        Tool::GetSecurityScore,
        Tool::SuggestFix,
        Tool::ScanIac,
        Tool::CheckContainer,
        Tool::CheckLicense,
        Tool::DastCheck,
        Tool::CheckPosture,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::ScanFile => "scan_file",
            Tool::ScanProject => "scan_project",
            Tool::ScanDependencies => "scan_dependencies",
            Tool::GetFindings => "get_findings",
            Tool::SetProfile => "set_profile",
            Tool::GetSecurityScore => "get_security_score",
            Tool::SuggestFix => "suggest_fix",
            Tool::ScanIac => "scan_iac",
            Tool::CheckContainer => "check_container",
            Tool::CheckLicense => "check_license",
            Tool::DastCheck => "dast_check",
            Tool::CheckPosture => "check_posture",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.name() == name)
    }

    fn description(self) -> &'static str {
        match self {
            Tool::ScanFile => concat!(
                "Scan a single file for code vulnerabilities and hardcoded secrets.",
                merged_note!()
            ),
            Tool::ScanProject => {
                "Scan a whole project directory with every enabled scanner, applying a .scangate/profile override when present. Replaces the session's cached findings."
            }
            Tool::ScanDependencies => concat!(
                "Audit a project's dependency manifests for known vulnerable packages.",
                merged_note!()
            ),
            Tool::GetFindings => {
                "List findings from this session's scans, optionally filtered by minimum severity or file path"
            }
            Tool::SetProfile => "Switch the compliance profile used by later scans",
            Tool::GetSecurityScore => {
                "Score this session's findings from 0 to 100 against the active profile"
            }
            Tool::SuggestFix => "Explain how to remediate one finding by id",
            Tool::ScanIac => concat!(
                "Check infrastructure-as-code (Terraform, Kubernetes, CloudFormation, Dockerfile) for misconfigurations.",
                merged_note!()
            ),
            Tool::CheckContainer => concat!(
                "Scan a container image reference or Dockerfile for vulnerable packages.",
                merged_note!()
            ),
            Tool::CheckLicense => concat!(
                "Check dependency licenses against the active profile's blocked list.",
                merged_note!()
            ),
            Tool::DastCheck => concat!(
                "Run dynamic security checks against a running application URL.",
                merged_note!()
            ),
            Tool::CheckPosture => concat!(
                "Review an API definition (OpenAPI file or URL) for security posture gaps.",
                merged_note!()
            ),
        }
    }

    fn input_schema(self) -> Value {
        let directory = json!({
            "type": "string",
            "description": "Absolute path of the project directory"
        });
        match self {
            Tool::ScanFile => json!({
                "type": "object",
                "properties": {
                    "path": { "type": "string", "description": "Absolute path of the file" },
                    "content": {
                        "type": "string",
                        "description": "File content; read from disk when omitted"
                    },
                    "language": { "type": "string" }
                },
                "required": ["path"]
            }),
            Tool::ScanProject => json!({
                "type": "object",
                "properties": {
                    "directory": directory,
                    "scanners": {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "enum": ["sast", "sca", "secrets", "iac", "container", "dast", "license", "posture"]
                        },
                        "description": "Restrict the scan to these backends"
                    },
                    "language": { "type": "string" },
                    "framework": { "type": "string" }
                },
                "required": ["directory"]
            }),
            Tool::ScanDependencies | Tool::ScanIac | Tool::CheckLicense => json!({
                "type": "object",
                "properties": { "directory": directory },
                "required": ["directory"]
            }),
            Tool::GetFindings => json!({
                "type": "object",
                "properties": {
                    "severity": {
                        "type": "string",
                        "enum": ["critical", "high", "medium", "low", "info"],
                        "description": "Only findings at or above this severity"
                    },
                    "file": {
                        "type": "string",
                        "description": "Only findings whose file contains this text"
                    }
                }
            }),
            Tool::SetProfile => json!({
                "type": "object",
                "properties": {
                    "profile": {
                        "type": "string",
                        "description": "standard, hardened, owasp, soc2, pci-dss, hipaa, or custom"
                    }
                },
                "required": ["profile"]
            }),
            Tool::GetSecurityScore => json!({ "type": "object", "properties": {} }),
            Tool::SuggestFix => json!({
                "type": "object",
                "properties": { "finding_id": { "type": "string" } },
                "required": ["finding_id"]
            }),
            Tool::CheckContainer => json!({
                "type": "object",
                "properties": {
                    "target": {
                        "type": "string",
                        "description": "Image reference (e.g. nginx:1.25) or Dockerfile path"
                    }
                },
                "required": ["target"]
            }),
            Tool::DastCheck => json!({
                "type": "object",
                "properties": {
                    "target_url": { "type": "string", "description": "Base URL of the running application" }
                },
                "required": ["target_url"]
            }),
            Tool::CheckPosture => json!({
                "type": "object",
                "properties": {
                    "target": {
                        "type": "string",
                        "description": "OpenAPI document path or URL"
                    }
                },
                "required": ["target"]
            }),
        }
    }

    /// Backend a single-backend tool dispatches to.
    fn backend(self) -> Option<&'static str> {
        match self {
            Tool::ScanDependencies => Some("sca"),
            Tool::ScanIac => Some("iac"),
            Tool::CheckContainer => Some("container"),
            Tool::CheckLicense => Some("license"),
            Tool::DastCheck => Some("dast"),
            Tool::CheckPosture => Some("posture"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

pub fn tool_catalog() -> Vec<ToolDefinition> {
    Tool::ALL
        .into_iter()
        .map(|tool| ToolDefinition {
            name: tool.name(),
            description: tool.description(),
            input_schema: tool.input_schema(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub content: Vec<TextContent>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![TextContent {
                kind: "text",
                text: text.into(),
            }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(text)
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Missing required argument '{0}'")]
    MissingArgument(&'static str),

    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("Finding '{0}' not found. Run a scan first or check the finding id.")]
    FindingNotFound(String),

    #[error("Cannot read file '{0}'")]
    Unreadable(String),

    #[error("No enabled scanner among: {requested}. Enabled scanners: {enabled}")]
    NoEnabledScanner { requested: String, enabled: String },

    #[error("{0}")]
    Internal(String),
}

/// Typed access to a `tools/call` argument object.
struct Arguments(Map<String, Value>);

impl Arguments {
    fn required_str(&self, key: &'static str) -> Result<&str, ToolError> {
        match self.optional_str(key)? {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ToolError::MissingArgument(key)),
        }
    }

    fn optional_str(&self, key: &'static str) -> Result<Option<&str>, ToolError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(_) => Err(ToolError::InvalidArgument {
                name: key,
                reason: "expected a string".into(),
            }),
        }
    }

    fn optional_list(&self, key: &'static str) -> Result<Option<Vec<String>>, ToolError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ToolError::InvalidArgument {
                            name: key,
                            reason: "expected an array of strings".into(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(ToolError::InvalidArgument {
                name: key,
                reason: "expected an array of strings".into(),
            }),
        }
    }
}

/// How a scan tool updates the session's finding cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheUpdate {
    Append,
    Overwrite,
}

pub async fn call_tool(
    state: &AppState,
    session: &McpSession,
    name: &str,
    arguments: Map<String, Value>,
) -> Result<ToolResult, RpcError> {
    let Some(tool) = Tool::from_name(name) else {
        return Err(RpcError::invalid_params(format!("Unknown tool: {}", name)));
    };

    let args = Arguments(arguments);
    let mut context = session.context().await;
    debug!(session_id = %session.id(), tool = name, "tool call");

    let outcome = match tool {
        Tool::ScanFile => scan_file(state, session, &mut context, &args).await,
        Tool::ScanProject => scan_project(state, session, &mut context, &args).await,
        Tool::GetFindings => get_findings(&context, &args),
        Tool::SetProfile => set_profile(&mut context, &args),
        Tool::GetSecurityScore => security_score(&context),
        Tool::SuggestFix => suggest_fix(&context, &args),
        Tool::ScanDependencies
        | Tool::ScanIac
        | Tool::CheckContainer
        | Tool::CheckLicense
        | Tool::DastCheck
        | Tool::CheckPosture => {
            single_backend(state, session, &mut context, tool, &args).await
        }
    };

    Ok(outcome.unwrap_or_else(|err| {
        debug!(session_id = %session.id(), tool = name, error = %err, "tool failed");
        ToolResult::error(err.to_string())
    }))
}

/// Backends `scan_file` fans out to.
const FILE_SCANNERS: [&str; 2] = ["sast", "secrets"];

fn no_enabled_scanner(state: &AppState, requested: &str) -> ToolError {
    ToolError::NoEnabledScanner {
        requested: requested.to_string(),
        enabled: state.scanners.scanner_names().join(", "),
    }
}

async fn scan_file(
    state: &AppState,
    session: &McpSession,
    context: &mut SessionContext,
    args: &Arguments,
) -> Result<ToolResult, ToolError> {
    let path = args.required_str("path")?;
    let local = state.paths().to_gateway(path);
    let content = match args.optional_str("content")? {
        Some(content) => content.to_string(),
        None => read_target(Path::new(&local), state.config.limits.max_file_bytes)
            .ok_or_else(|| ToolError::Unreadable(path.to_string()))?,
    };

    let request = ScanRequest {
        files: vec![FileTarget::with_content(local, content)],
        profile: context.profiles.active().snapshot(),
        context: ProjectContext {
            language: args.optional_str("language")?.map(str::to_string),
            ..ProjectContext::default()
        },
    };

    let requested: Vec<String> = FILE_SCANNERS
        .iter()
        .filter(|name| state.scanners.contains(name))
        .map(|name| name.to_string())
        .collect();
    if requested.is_empty() {
        return Err(no_enabled_scanner(state, &FILE_SCANNERS.join(", ")));
    }
    let started = Instant::now();
    let result = state.scanners.scan_all(&request, Some(&requested[..])).await;
    finish_scan(
        state,
        session,
        context,
        GATEWAY_USAGE_LABEL,
        result,
        started,
        CacheUpdate::Append,
    )
}

async fn scan_project(
    state: &AppState,
    session: &McpSession,
    context: &mut SessionContext,
    args: &Arguments,
) -> Result<ToolResult, ToolError> {
    let directory = args.required_str("directory")?;
    let scanners = args
        .optional_list("scanners")?
        .filter(|names| !names.is_empty());
    if let Some(names) = scanners.as_deref()
        && state.scanners.unknown_names(names).len() == names.len()
    {
        return Err(no_enabled_scanner(state, &names.join(", ")));
    }
    let local = state.paths().to_gateway(directory);

    if let Some(custom) = context.profiles.load_custom_profile(Path::new(&local))? {
        info!(
            session_id = %session.id(),
            version = %custom.version,
            "project profile override activated"
        );
    }

    let root = PathBuf::from(&local);
    let limits = state.config.limits.clone();
    let mut files = tokio::task::spawn_blocking(move || collect_files(&root, &limits))
        .await
        .map_err(|e| ToolError::Internal(format!("file collection failed: {}", e)))?;
    if files.is_empty() {
        files.push(FileTarget::path_only(local.clone()));
    }

    let request = ScanRequest {
        files,
        profile: context.profiles.active().snapshot(),
        context: ProjectContext {
            language: args.optional_str("language")?.map(str::to_string),
            framework: args.optional_str("framework")?.map(str::to_string),
            root_dir: Some(local),
            target_url: None,
        },
    };

    let started = Instant::now();
    let result = state.scanners.scan_all(&request, scanners.as_deref()).await;
    finish_scan(
        state,
        session,
        context,
        GATEWAY_USAGE_LABEL,
        result,
        started,
        CacheUpdate::Overwrite,
    )
}

async fn single_backend(
    state: &AppState,
    session: &McpSession,
    context: &mut SessionContext,
    tool: Tool,
    args: &Arguments,
) -> Result<ToolResult, ToolError> {
    let backend = tool
        .backend()
        .ok_or_else(|| ToolError::Internal(format!("{} has no backend", tool.name())))?;

    let mut project = ProjectContext::default();
    let target = match tool {
        Tool::DastCheck => {
            let url = args.required_str("target_url")?.to_string();
            project.target_url = Some(url.clone());
            url
        }
        Tool::CheckContainer | Tool::CheckPosture => {
            state.paths().to_gateway(args.required_str("target")?)
        }
        _ => {
            let dir = state.paths().to_gateway(args.required_str("directory")?);
            project.root_dir = Some(dir.clone());
            dir
        }
    };

    let request = ScanRequest {
        files: vec![FileTarget::path_only(target)],
        profile: context.profiles.active().snapshot(),
        context: project,
    };

    let started = Instant::now();
    let result = state.scanners.scan_with(backend, &request).await;
    finish_scan(
        state,
        session,
        context,
        backend,
        result,
        started,
        CacheUpdate::Append,
    )
}

fn finish_scan(
    state: &AppState,
    session: &McpSession,
    context: &mut SessionContext,
    usage_label: &str,
    result: ScanResult,
    started: Instant,
    update: CacheUpdate,
) -> Result<ToolResult, ToolError> {
    let duration_ms = started.elapsed().as_millis() as u64;
    let result = to_caller_view(result, state.paths());

    context.last_findings = match update {
        CacheUpdate::Overwrite => result.findings.clone(),
        CacheUpdate::Append => {
            let mut merged = std::mem::take(&mut context.last_findings);
            merged.extend(result.findings.iter().cloned());
            dedup_findings(merged)
        }
    };

    let _ = state.license.spawn_report_usage(
        state.license_key(),
        usage_label,
        &result.findings,
        duration_ms,
    );

    session.notify(notification(
        "notifications/resources/updated",
        json!({ "uri": FINDINGS_SUMMARY_URI }),
    ));

    let body = serde_json::to_string_pretty(&result)
        .map_err(|e| ToolError::Internal(e.to_string()))?;
    Ok(ToolResult::text(format!("{}\n\n{}", scan_summary(&result), body)))
}

fn scan_summary(result: &ScanResult) -> String {
    let counts = SeverityCounts::tally(result.findings.iter().map(|f| &f.severity));
    let mut summary = format!(
        "Scan complete: {} finding(s) ({} critical, {} high, {} medium, {} low, {} info) in {} ms",
        result.findings.len(),
        counts.critical,
        counts.high,
        counts.medium,
        counts.low,
        counts.info,
        result.metadata.duration_ms
    );
    if !result.metadata.warnings.is_empty() {
        summary.push_str(&format!(
            "; {} warning(s)",
            result.metadata.warnings.len()
        ));
    }
    summary
}

fn get_findings(
    context: &SessionContext,
    args: &Arguments,
) -> Result<ToolResult, ToolError> {
    let threshold = args
        .optional_str("severity")?
        .map(|raw| {
            raw.parse::<Severity>().map_err(|e| ToolError::InvalidArgument {
                name: "severity",
                reason: e.to_string(),
            })
        })
        .transpose()?;
    let file = args.optional_str("file")?;

    if context.last_findings.is_empty() {
        return Ok(ToolResult::text(
            "No findings cached. Run scan_file or scan_project first.",
        ));
    }

    let matched: Vec<&Finding> = context
        .last_findings
        .iter()
        .filter(|f| threshold.is_none_or(|t| f.severity.meets(t)))
        .filter(|f| file.is_none_or(|needle| f.file.contains(needle)))
        .collect();

    let body = serde_json::to_string_pretty(&matched)
        .map_err(|e| ToolError::Internal(e.to_string()))?;
    Ok(ToolResult::text(format!(
        "{} of {} cached finding(s) matched\n\n{}",
        matched.len(),
        context.last_findings.len(),
        body
    )))
}

fn set_profile(
    context: &mut SessionContext,
    args: &Arguments,
) -> Result<ToolResult, ToolError> {
    let name = args.required_str("profile")?;
    context.profiles.set_active(name)?;
    let active = context.profiles.active();
    Ok(ToolResult::text(format!(
        "Active profile set to '{}': {}",
        active.name, active.description
    )))
}

fn security_score(context: &SessionContext) -> Result<ToolResult, ToolError> {
    let score = SecurityScore::compute(&context.last_findings, context.profiles.active());
    let body = serde_json::to_string_pretty(&score)
        .map_err(|e| ToolError::Internal(e.to_string()))?;
    Ok(ToolResult::text(format!(
        "Security score: {}/100 (grade {}), status: {}\n\n{}",
        score.score, score.grade, score.status, body
    )))
}

fn suggest_fix(
    context: &SessionContext,
    args: &Arguments,
) -> Result<ToolResult, ToolError> {
    let id = args.required_str("finding_id")?;
    let finding = context
        .last_findings
        .iter()
        .find(|f| f.id == id)
        .ok_or_else(|| ToolError::FindingNotFound(id.to_string()))?;
    Ok(ToolResult::text(render_fix(finding)))
}

fn render_fix(finding: &Finding) -> String {
    let mut out = format!(
        "## Fix for {}: {}\n\n**Severity:** {}\n**Location:** {}\n",
        finding.id,
        finding.title,
        finding.severity,
        finding.location()
    );
    if let Some(cwe) = &finding.cwe {
        out.push_str(&format!("**CWE:** {}\n", cwe));
    }
    if let Some(tags) = finding.compliance.as_ref().filter(|tags| !tags.is_empty()) {
        out.push_str(&format!("**Compliance:** {}\n", tags.join(", ")));
    }
    out.push_str(&format!("\n### Problem\n{}\n", finding.description));
    out.push_str(&format!("\n### Remediation\n{}\n", finding.remediation));
    if let Some(code) = &finding.code_snippet {
        out.push_str(&format!("\n### Current code\n```\n{}\n```\n", code));
    }
    if let Some(fix) = &finding.fix_snippet {
        out.push_str(&format!("\n### Suggested fix\n```\n{}\n```\n", fix));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scangate_core::ProfileManager;

    fn finding(id: &str, severity: Severity, file: &str) -> Finding {
        serde_json::from_value(json!({
            "id": id,
            "severity": severity,
            "title": format!("Issue {id}"),
            "description": "Something is wrong",
            "file": file,
            "line": 3,
            "cwe": "CWE-79",
            "remediation": "Escape output",
            "fix_snippet": "escape(x)"
        }))
        .expect("finding")
    }

    fn context_with(findings: Vec<Finding>) -> SessionContext {
        let mut context = SessionContext::new(ProfileManager::new());
        context.last_findings = findings;
        context
    }

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => Arguments(map),
            _ => panic!("arguments must be an object"),
        }
    }

    #[test]
    fn catalog_lists_every_tool_with_required_fields() {
        let catalog = tool_catalog();
        assert_eq!(catalog.len(), 12);
        let scan_file = catalog.iter().find(|t| t.name == "scan_file").expect("scan_file");
        assert_eq!(scan_file.input_schema["required"], json!(["path"]));
        let dast = catalog.iter().find(|t| t.name == "dast_check").expect("dast_check");
        assert_eq!(dast.input_schema["required"], json!(["target_url"]));
        for tool in Tool::ALL {
            assert_eq!(Tool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(Tool::from_name("rm_rf"), None);
    }

    #[test]
    fn scan_tool_descriptions_state_cache_behaviour() {
        for tool in Tool::ALL {
            let appends = tool == Tool::ScanFile || tool.backend().is_some();
            assert_eq!(
                tool.description().contains("repeat scans replace matching findings"),
                appends,
                "{}",
                tool.name()
            );
        }
        assert!(
            Tool::ScanProject
                .description()
                .ends_with("Replaces the session's cached findings.")
        );
    }

    #[test]
    fn get_findings_filters_at_or_above_severity_and_by_file() {
        let context = context_with(vec![
            finding("A", Severity::Critical, "src/db.js"),
            finding("B", Severity::Medium, "src/db.js"),
            finding("C", Severity::High, "src/web.js"),
        ]);

        let result = get_findings(&context, &args(json!({ "severity": "high" })))
            .expect("filter");
        let text = &result.content[0].text;
        assert!(text.starts_with("2 of 3 cached finding(s) matched"));
        assert!(text.contains("\"A\"") && text.contains("\"C\""));
        assert!(!text.contains("\"B\""));

        let result = get_findings(
            &context,
            &args(json!({ "severity": "medium", "file": "db.js" })),
        )
        .expect("filter");
        assert!(result.content[0].text.starts_with("2 of 3"));
    }

    #[test]
    fn get_findings_rejects_unknown_severity() {
        let context = context_with(vec![finding("A", Severity::Low, "a.js")]);
        let err = get_findings(&context, &args(json!({ "severity": "urgent" })))
            .expect_err("bad severity");
        assert!(matches!(err, ToolError::InvalidArgument { name: "severity", .. }));
    }

    #[test]
    fn set_profile_reports_unknown_names() {
        let mut context = context_with(Vec::new());
        let err = set_profile(&mut context, &args(json!({ "profile": "iso" })))
            .expect_err("unknown");
        assert!(err.to_string().contains("Unknown profile 'iso'"));
        assert_eq!(context.profiles.active_name(), "standard");

        let ok = set_profile(&mut context, &args(json!({ "profile": "pci-dss" })))
            .expect("known");
        assert!(ok.content[0].text.starts_with("Active profile set to 'pci-dss'"));
    }

    #[test]
    fn suggest_fix_renders_markdown_or_not_found() {
        let context = context_with(vec![finding("SAST-9", Severity::High, "a.js")]);

        let fix = suggest_fix(&context, &args(json!({ "finding_id": "SAST-9" })))
            .expect("found");
        let text = &fix.content[0].text;
        assert!(text.starts_with("## Fix for SAST-9"));
        assert!(text.contains("**Location:** a.js:3"));
        assert!(text.contains("escape(x)"));

        let err = suggest_fix(&context, &args(json!({ "finding_id": "NOPE" })))
            .expect_err("missing");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn missing_and_mistyped_arguments() {
        let a = args(json!({ "path": "", "scanners": "sast" }));
        assert!(matches!(a.required_str("path"), Err(ToolError::MissingArgument("path"))));
        assert!(matches!(a.required_str("other"), Err(ToolError::MissingArgument("other"))));
        assert!(matches!(
            a.optional_list("scanners"),
            Err(ToolError::InvalidArgument { name: "scanners", .. })
        ));
    }

    #[test]
    fn error_results_are_flagged() {
        let value = serde_json::to_value(ToolResult::error("boom")).expect("serialize");
        assert_eq!(value["isError"], json!(true));
        assert_eq!(value["content"][0]["type"], "text");

        let value = serde_json::to_value(ToolResult::text("fine")).expect("serialize");
        assert!(value.get("isError").is_none());
    }
}
