//! Core data model shared across the tool registry, model adapter, scheduler
//! and transport crates.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one scheduler/adapter run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
            Role::Tool => "TOOL",
            Role::System => "SYSTEM",
        };
        write!(f, "{s}")
    }
}

/// A single tool-call record carried on an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// One entry in a conversation transcript.
///
/// Invariant: every `Role::Tool` message carries a `tool_call_id` that names
/// a tool-call record on the immediately preceding `Role::Assistant` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRecord>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_name: None,
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_name: None,
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_name: None,
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCallRecord>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_name: None,
            tool_call_id: None,
            tool_calls,
        }
    }

    pub fn tool_result(name: impl Into<String>, tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_name: Some(name.into()),
            tool_call_id: Some(tool_call_id.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Render as `ROLE: content`, the format the scheduler uses for the
    /// rendered conversation-window slice of the decision prompt.
    pub fn render_line(&self) -> String {
        format!("{}: {}", self.role, self.content)
    }
}

/// JSON-schema + description metadata attached to a registered tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub description: String,
    pub input_schema: serde_json::Value,
    pub required_args: Vec<String>,
}

/// A tool descriptor as handed to the model (name + description + schema),
/// independent of the callable behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A named policy: instructions, an allowed tool subset, and an optional
/// per-agent model binding (by name only here — the actual `ModelClient` is
/// resolved in the scheduler crate, which depends on model-adapter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub instructions: String,
    pub allowed_tools: HashSet<String>,
    #[serde(default)]
    pub model_name: Option<String>,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            allowed_tools: HashSet::new(),
            model_name: None,
        }
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.allowed_tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }
}

/// Swarm-wide scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmConfig {
    pub max_turns: u32,
    pub execute_tools: bool,
    pub debug: bool,
    pub stream: bool,
    pub timeout_secs: u64,
    pub enable_memory: bool,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            execute_tools: true,
            debug: false,
            stream: false,
            timeout_secs: 30,
            enable_memory: true,
        }
    }
}

/// Per-run execution state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub session_id: SessionId,
    pub current_agent: String,
    pub turn: u32,
    pub tool_calls: u32,
    pub handoffs: u32,
    pub started_at: DateTime<Utc>,
    pub debug: bool,
}

impl ExecutionContext {
    pub fn new(entry_agent: impl Into<String>, debug: bool) -> Self {
        Self {
            session_id: SessionId::new(),
            current_agent: entry_agent.into(),
            turn: 0,
            tool_calls: 0,
            handoffs: 0,
            started_at: Utc::now(),
            debug,
        }
    }
}

/// Final result of a scheduler run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub transcript: Vec<Message>,
    pub agent: String,
    pub context_variables: std::collections::HashMap<String, String>,
    pub execution_time_ms: u64,
    pub total_turns: u32,
    pub tool_calls: u32,
    pub handoffs: u32,
    pub error: Option<String>,
    pub success: bool,
}
