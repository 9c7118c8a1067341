//! `GET /schema` — the same tool descriptors `tools/list` returns over
//! stdio.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use ai_agent_common::ToolDescriptor;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SchemaResponse {
    pub tools: Vec<ToolDescriptor>,
}

pub async fn schema(State(state): State<AppState>) -> Json<SchemaResponse> {
    let tools = state
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
    Json(SchemaResponse { tools })
}
