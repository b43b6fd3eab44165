use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value, json};
use tracing::debug;

use scangate_core::GATEWAY_VERSION;

use super::{
    prompts, resources,
    protocol::{PROTOCOL_VERSION, RpcError},
    session::McpSession,
    tools,
};
use crate::infra::app_state::AppState;

/// Protocol revisions a client may ask for; anything else gets ours.
const SUPPORTED_VERSIONS: [&str; 2] = [PROTOCOL_VERSION, "2024-11-05"];

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ResourceReadParams {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct PromptGetParams {
    name: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct InitializeParams {
    #[serde(default, rename = "protocolVersion")]
    protocol_version: Option<String>,
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, RpcError> {
    serde_json::from_value(params)
        .map_err(|e| RpcError::invalid_params(format!("Invalid params: {}", e)))
}

/// Route one JSON-RPC request to its handler.
pub async fn dispatch(
    state: &AppState,
    session: &McpSession,
    method: &str,
    params: Value,
) -> Result<Value, RpcError> {
    match method {
        "initialize" => {
            let params: InitializeParams = parse_params(params).unwrap_or_default();
            Ok(initialize_result(params.protocol_version.as_deref()))
        }
        "ping" => Ok(json!({})),
        "tools/list" => Ok(json!({ "tools": tools::tool_catalog() })),
        "tools/call" => {
            let call: ToolCallParams = parse_params(params)?;
            let result = tools::call_tool(state, session, &call.name, call.arguments).await?;
            serde_json::to_value(result).map_err(|e| RpcError::internal(e.to_string()))
        }
        "resources/list" => {
            let context = session.context().await;
            Ok(resources::list_resources(&context))
        }
        "resources/read" => {
            let read: ResourceReadParams = parse_params(params)?;
            let context = session.context().await;
            resources::read_resource(state, &context, &read.uri)
        }
        "prompts/list" => Ok(json!({ "prompts": prompts::prompt_catalog() })),
        "prompts/get" => {
            let get: PromptGetParams = parse_params(params)?;
            prompts::get_prompt(&get.name, &get.arguments)
        }
        other => Err(RpcError::method_not_found(other)),
    }
}

/// Notifications carry no reply; only logged.
pub fn handle_notification(session: &McpSession, method: &str) {
    match method {
        "notifications/initialized" => {
            debug!(session_id = %session.id(), "client initialized");
        }
        "notifications/cancelled" => {
            debug!(session_id = %session.id(), "client cancelled a request");
        }
        other => {
            debug!(session_id = %session.id(), method = other, "ignoring notification");
        }
    }
}

fn initialize_result(requested: Option<&str>) -> Value {
    let version = requested
        .filter(|v| SUPPORTED_VERSIONS.contains(v))
        .unwrap_or(PROTOCOL_VERSION);
    json!({
        "protocolVersion": version,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "subscribe": false, "listChanged": false },
            "prompts": { "listChanged": false }
        },
        "serverInfo": {
            "name": "scangate",
            "version": GATEWAY_VERSION
        },
        "instructions": "Security scanning gateway. Run scan_project or scan_file, \
                         then inspect results with get_findings, get_security_score \
                         and suggest_fix."
    })
}
