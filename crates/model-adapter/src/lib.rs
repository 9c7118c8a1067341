//! Model Adapter (C3): translates a user prompt into a model-selected tool
//! call, executes it through the tool registry, and loops for a final
//! answer.

pub mod adapter;
pub mod client;

pub use adapter::{ToolAwareAdapter, MAX_FOLLOWUP_ROUNDS};
pub use client::{
    ChatRequest, ChatResponse, ChatTurn, ModelClient, OllamaClient, OpenAiCompatClient, ToolCallRequest, ToolChoice,
    TurnRole,
};
