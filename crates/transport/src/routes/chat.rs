//! `POST /chat` — runs the tool-aware model adapter for a single-turn user
//! message.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::routes::tool::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub message: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    pub text: String,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Json<ChatResponseBody>, (StatusCode, Json<ErrorResponse>)> {
    let system_prompt = body.system_prompt.unwrap_or_else(|| "You are a helpful assistant.".to_string());
    state
        .adapter
        .call(&state.default_model_name, &system_prompt, &body.message, &state.memory)
        .await
        .map(|text| Json(ChatResponseBody { text }))
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: err.to_string() })))
}
