//! Line-delimited JSON-RPC 2.0 stdio transport: one request per line on
//! stdin, one response per line on stdout, using a `BufReader` /
//! `AsyncBufReadExt` read loop. Request/response envelope and error codes
//! follow the JSON-RPC 2.0 specification.

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use ai_agent_common::{AgentNetworkError, ToolDescriptor};

use crate::state::AppState;

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// Runs the stdio server until stdin is closed. One JSON-RPC request or
/// notification per line; malformed lines get a `PARSE_ERROR` response
/// (or are dropped, if the line carried no recoverable `id`).
pub async fn run_stdio(state: AppState) -> std::io::Result<()> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(err) => {
                write_response(&mut stdout, error_response(Value::Null, PARSE_ERROR, &err.to_string())).await?;
                continue;
            }
        };

        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let method = request.get("method").and_then(Value::as_str).unwrap_or("");

        // `notifications/initialized` carries no `id` and expects no reply.
        if method == "notifications/initialized" {
            continue;
        }

        let response = match method {
            "initialize" => ok_response(id, handle_initialize()),
            "tools/list" => ok_response(id, handle_tools_list(&state)),
            "tools/call" => match handle_tools_call(&state, request.get("params")).await {
                Ok(result) => ok_response(id, result),
                Err(ToolCallError::InvalidParams(message)) => error_response(id, INVALID_PARAMS, &message),
                Err(ToolCallError::UnknownTool(message)) => error_response(id, METHOD_NOT_FOUND, &message),
            },
            other => error_response(id, METHOD_NOT_FOUND, &format!("unknown method: {other}")),
        };

        write_response(&mut stdout, response).await?;
    }

    Ok(())
}

fn handle_initialize() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "serverInfo": { "name": "agent-swarm", "version": env!("CARGO_PKG_VERSION") },
        "capabilities": { "tools": {} },
    })
}

fn handle_tools_list(state: &AppState) -> Value {
    let tools: Vec<ToolDescriptor> = state
        .registry
        .list_names()
        .into_iter()
        .filter_map(|name| {
            let meta = state.registry.get_schema(&name)?;
            Some(ToolDescriptor {
                name,
                description: meta.description,
                input_schema: meta.input_schema,
            })
        })
        .collect();
    json!({ "tools": tools })
}

/// Distinguishes a malformed `tools/call` request (-32602 `INVALID_PARAMS`)
/// from a well-formed call naming a tool the registry doesn't have
/// (-32601 `METHOD_NOT_FOUND`).
enum ToolCallError {
    InvalidParams(String),
    UnknownTool(String),
}

async fn handle_tools_call(state: &AppState, params: Option<&Value>) -> Result<Value, ToolCallError> {
    let params = params.ok_or_else(|| ToolCallError::InvalidParams("missing params".to_string()))?;
    let name = params
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolCallError::InvalidParams("params.name must be a string".to_string()))?;
    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    state
        .registry
        .call(name, arguments, &state.memory)
        .await
        .map(|result| json!({ "content": [{ "type": "text", "text": result }] }))
        .map_err(|err| match err {
            AgentNetworkError::ToolNotFound(name) => {
                ToolCallError::UnknownTool(format!("unknown tool: {name}"))
            }
            other => ToolCallError::InvalidParams(other.to_string()),
        })
}

fn ok_response(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })
}

async fn write_response(stdout: &mut tokio::io::Stdout, response: Value) -> std::io::Result<()> {
    let mut line = serde_json::to_string(&response).expect("jsonrpc envelope always serializes");
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await
}
