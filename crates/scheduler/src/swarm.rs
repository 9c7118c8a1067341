//! The swarm: registered agents plus a directed, possibly-cyclic handoff
//! graph. Cyclic agent graphs are allowed (an agent may hand control back
//! to one that already handed off to it), so the graph is a plain
//! `HashMap<String, HashSet<String>>` rather than a DAG structure.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ai_agent_common::{AgentNetworkError, Result};
use ai_agent_memory::SharedMemory;
use ai_agent_model_adapter::ModelClient;
use ai_agent_tool_registry::ToolRegistry;

use crate::agent::BoundAgent;

pub struct Swarm {
    agents: HashMap<String, BoundAgent>,
    /// source agent name -> set of legal handoff targets.
    handoffs: HashMap<String, HashSet<String>>,
    pub registry: Arc<ToolRegistry>,
    pub memory: SharedMemory,
    /// Fallback model used when an agent carries no model of its own
    /// (resolution order: agent.model_func -> swarm.model_func -> NO_LLM).
    pub default_model: Option<Arc<dyn ModelClient>>,
    /// Fallback model id string, resolved the same way as `default_model`.
    /// Kept distinct from `default_model` because a `ChatRequest` needs the
    /// provider-specific model name, not just a client handle.
    pub default_model_name: Option<String>,
}

impl Swarm {
    pub fn new(registry: Arc<ToolRegistry>, memory: SharedMemory) -> Self {
        Self {
            agents: HashMap::new(),
            handoffs: HashMap::new(),
            registry,
            memory,
            default_model: None,
            default_model_name: None,
        }
    }

    pub fn with_default_model(mut self, model: Arc<dyn ModelClient>) -> Self {
        self.default_model = Some(model);
        self
    }

    pub fn with_default_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.default_model_name = Some(model_name.into());
        self
    }

    /// Registered at swarm construction; immutable thereafter.
    pub fn register_agent(&mut self, agent: BoundAgent) {
        self.agents.insert(agent.name().to_string(), agent);
    }

    /// Legal handoffs are directed and per-agent: this registers `target` as
    /// a callable transfer from `source`, whichever order they were added in.
    pub fn register_handoff(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.handoffs.entry(source.into()).or_default().insert(target.into());
    }

    pub fn agent(&self, name: &str) -> Option<&BoundAgent> {
        self.agents.get(name)
    }

    pub fn peer_names(&self, current: &str) -> Vec<String> {
        self.handoffs
            .get(current)
            .map(|targets| targets.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn allows_handoff(&self, source: &str, target: &str) -> bool {
        self.handoffs.get(source).map(|targets| targets.contains(target)).unwrap_or(false)
    }

    /// Resolves which `ModelClient` a turn for `agent_name` should use:
    /// agent-bound model, else the swarm-level default, else `NO_LLM`.
    pub fn resolve_model(&self, agent_name: &str) -> Result<Arc<dyn ModelClient>> {
        let agent = self
            .agents
            .get(agent_name)
            .ok_or_else(|| AgentNetworkError::Config(format!("unknown agent '{agent_name}'")))?;

        agent
            .model
            .clone()
            .or_else(|| self.default_model.clone())
            .ok_or_else(|| AgentNetworkError::NoLlm {
                agent: agent_name.to_string(),
            })
    }

    /// Resolves the model id string a turn for `agent_name` should send on
    /// the wire, with the same agent-then-swarm fallback order as
    /// `resolve_model`.
    pub fn resolve_model_name(&self, agent_name: &str) -> Option<String> {
        self.agents
            .get(agent_name)
            .and_then(|agent| agent.spec.model_name.clone())
            .or_else(|| self.default_model_name.clone())
    }
}

/// Conventional naming for the structural handoff "tool" a model may name in
/// a `tool_use` decision instead of the dedicated `handoff` action — its name
/// is conventionally `transfer_to_<target>`.
pub fn handoff_tool_name(target: &str) -> String {
    format!("transfer_to_{target}")
}

pub fn target_from_handoff_tool_name(tool_name: &str) -> Option<&str> {
    tool_name.strip_prefix("transfer_to_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_agent_common::AgentSpec;

    fn test_swarm() -> Swarm {
        let registry = Arc::new(ToolRegistry::with_builtins());
        let memory = SharedMemory::new();
        let mut swarm = Swarm::new(registry, memory);
        swarm.register_agent(BoundAgent::new(AgentSpec::new("planner", "plan things")));
        swarm.register_agent(BoundAgent::new(AgentSpec::new("writer", "write things")));
        swarm.register_handoff("planner", "writer");
        swarm
    }

    #[test]
    fn registered_handoffs_are_directed() {
        let swarm = test_swarm();
        assert!(swarm.allows_handoff("planner", "writer"));
        assert!(!swarm.allows_handoff("writer", "planner"));
    }

    #[test]
    fn handoff_graph_permits_cycles() {
        let mut swarm = test_swarm();
        swarm.register_handoff("writer", "planner");
        assert!(swarm.allows_handoff("planner", "writer"));
        assert!(swarm.allows_handoff("writer", "planner"));
    }

    #[test]
    fn resolve_model_without_any_binding_is_no_llm() {
        let swarm = test_swarm();
        let err = swarm.resolve_model("planner").unwrap_err();
        assert!(matches!(err, AgentNetworkError::NoLlm { agent } if agent == "planner"));
    }

    #[test]
    fn handoff_tool_name_round_trips() {
        assert_eq!(handoff_tool_name("writer"), "transfer_to_writer");
        assert_eq!(target_from_handoff_tool_name("transfer_to_writer"), Some("writer"));
        assert_eq!(target_from_handoff_tool_name("arithmetic"), None);
    }
}
