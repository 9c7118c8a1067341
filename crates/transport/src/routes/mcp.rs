//! `POST /mcp` — Server-Sent-Events stream for multi-context requests. The
//! adapter itself never streams tokens for tool-aware runs, so this endpoint
//! streams coarse-grained lifecycle events around one `ToolAwareAdapter::call`
//! rather than partial model tokens.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct McpRequestBody {
    pub message: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

pub async fn mcp_stream(
    State(state): State<AppState>,
    Json(body): Json<McpRequestBody>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let system_prompt = body.system_prompt.unwrap_or_else(|| "You are a helpful assistant.".to_string());

    let stream = async_stream::stream! {
        yield Ok(Event::default().event("start").data(json!({"message": body.message}).to_string()));

        match state.adapter.call(&state.default_model_name, &system_prompt, &body.message, &state.memory).await {
            Ok(text) => {
                yield Ok(Event::default().event("message").data(json!({"text": text}).to_string()));
                yield Ok(Event::default().event("done").data("{}"));
            }
            Err(err) => {
                yield Ok(Event::default().event("error").data(json!({"error": err.to_string()}).to_string()));
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
