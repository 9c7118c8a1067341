//! `/react` — a small demonstration endpoint invoking a hardcoded thought
//! sequence, separate from the real tool-aware loop so callers can see the
//! shape of a multi-step reasoning trace without a live model.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ReactStep {
    pub thought: String,
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReactResponse {
    pub steps: Vec<ReactStep>,
    pub answer: String,
}

pub async fn react_demo() -> Json<ReactResponse> {
    Json(ReactResponse {
        steps: vec![
            ReactStep {
                thought: "I should check what two plus three is.".to_string(),
                action: Some("arithmetic(op=add, a=2, b=3)".to_string()),
            },
            ReactStep {
                thought: "The tool returned 5. That answers the question.".to_string(),
                action: None,
            },
        ],
        answer: "5".to_string(),
    })
}
