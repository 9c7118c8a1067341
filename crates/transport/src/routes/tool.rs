//! `POST /tool` — direct tool call, JSON in/out.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ToolCallBody {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Serialize)]
pub struct ToolCallResponse {
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn call_tool(
    State(state): State<AppState>,
    Json(body): Json<ToolCallBody>,
) -> Result<Json<ToolCallResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .registry
        .call(&body.name, body.arguments, &state.memory)
        .await
        .map(|result| Json(ToolCallResponse { result }))
        .map_err(|err| (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: err.to_string() })))
}
