use thiserror::Error;

/// Error kinds shared by every crate in the workspace.
///
/// Transport layers match on the variant rather than parsing messages, so
/// each distinct failure mode gets its own arm.
#[derive(Debug, Error)]
pub enum AgentNetworkError {
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("tool '{name}' failed: {reason}")]
    ToolFailed { name: String, reason: String },

    #[error("model transport error: {0}")]
    ModelTransport(String),

    #[error("model returned an empty response")]
    ModelEmpty,

    #[error("no model bound for agent '{agent}' or swarm")]
    NoLlm { agent: String },

    #[error("handoff target not found: {0}")]
    HandoffMissing(String),

    #[error("run was cancelled")]
    Cancelled,

    #[error("run timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("malformed transport input: {0}")]
    TransportMalformed(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl AgentNetworkError {
    pub fn tool_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ToolFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether the whole run must abort, vs. the current turn/tool recovering
    /// and the run continuing.
    pub fn is_run_fatal(&self) -> bool {
        matches!(
            self,
            Self::ModelTransport(_)
                | Self::ModelEmpty
                | Self::NoLlm { .. }
                | Self::Cancelled
                | Self::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AgentNetworkError>;
