//! `POST /swarm/run` — runs the agent swarm scheduler for one request and
//! returns the response envelope as JSON.

use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use ai_agent_common::{Message, ResponseEnvelope, SwarmConfig};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SwarmRunBody {
    pub entry_agent: String,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub context_vars: HashMap<String, String>,
    #[serde(default)]
    pub config: Option<SwarmConfig>,
}

pub async fn run_swarm(State(state): State<AppState>, Json(body): Json<SwarmRunBody>) -> Json<ResponseEnvelope> {
    let config = body.config.unwrap_or_default();
    let envelope = state
        .scheduler
        .run(
            &body.entry_agent,
            body.messages,
            body.context_vars,
            &config,
            CancellationToken::new(),
        )
        .await;
    Json(envelope)
}
