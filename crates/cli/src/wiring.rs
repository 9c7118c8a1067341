//! Builds the shared [`AppState`] from [`AppConfig`]: tool registry, memory,
//! model adapter, and a small demonstration swarm (a planner that can hand
//! off to a writer).

use std::collections::HashSet;
use std::sync::Arc;

use ai_agent_common::config::AppConfig;
use ai_agent_common::AgentSpec;
use ai_agent_memory::SharedMemory;
use ai_agent_model_adapter::{ModelClient, OllamaClient, OpenAiCompatClient, ToolAwareAdapter};
use ai_agent_scheduler::{BoundAgent, Scheduler, Swarm};
use ai_agent_tool_registry::ToolRegistry;
use ai_agent_transport::AppState;

/// Picks the model binding named by `config.model.default_provider`.
pub fn build_model_client(config: &AppConfig) -> Arc<dyn ModelClient> {
    match config.model.default_provider.as_str() {
        "openai" => {
            let api_key = std::env::var(&config.model.openai.api_key_env).unwrap_or_default();
            Arc::new(OpenAiCompatClient::new(&config.model.openai.base_url, &api_key))
        }
        _ => Arc::new(OllamaClient::new(&config.model.ollama.base_url)),
    }
}

fn default_model_name(config: &AppConfig) -> String {
    match config.model.default_provider.as_str() {
        "openai" => config.model.openai.model.clone(),
        _ => config.model.ollama.model.clone(),
    }
}

/// A planner/writer pair wired with a one-way handoff, just enough to
/// exercise `/swarm/run` and the stdio `tools/call` path out of the box.
fn default_swarm(
    registry: Arc<ToolRegistry>,
    memory: SharedMemory,
    model: Arc<dyn ModelClient>,
    model_name: String,
) -> Swarm {
    let mut swarm = Swarm::new(registry, memory)
        .with_default_model(model)
        .with_default_model_name(model_name);

    let mut planner_tools = HashSet::new();
    planner_tools.insert("memory_set".to_string());
    planner_tools.insert("memory_get".to_string());
    planner_tools.insert("arithmetic".to_string());
    let planner = AgentSpec::new("planner", "Break the user's request into a short plan, then hand off to writer.")
        .with_tools(planner_tools);

    let mut writer_tools = HashSet::new();
    writer_tools.insert("current_timestamp".to_string());
    let writer = AgentSpec::new("writer", "Write the final answer for the user from the plan so far.")
        .with_tools(writer_tools);

    swarm.register_agent(BoundAgent::new(planner));
    swarm.register_agent(BoundAgent::new(writer));
    swarm.register_handoff("planner", "writer");
    swarm
}

pub fn build_app_state(config: &AppConfig) -> AppState {
    let registry = Arc::new(ToolRegistry::with_builtins());
    let memory = SharedMemory::new();
    let model = build_model_client(config);

    let model_name = default_model_name(config);
    let adapter = Arc::new(ToolAwareAdapter::new(model.clone(), registry.clone()));
    let swarm = default_swarm(registry.clone(), memory.clone(), model, model_name.clone());
    let scheduler = Arc::new(Scheduler::new(swarm));

    AppState {
        registry,
        memory,
        adapter,
        scheduler,
        default_model_name: model_name,
    }
}
