//! Shared application state: the registry, memory, model adapter and
//! scheduler every route and the stdio loop are built against, threaded
//! through via axum's `State` extractor.

use std::sync::Arc;

use ai_agent_memory::SharedMemory;
use ai_agent_model_adapter::ToolAwareAdapter;
use ai_agent_scheduler::Scheduler;
use ai_agent_tool_registry::ToolRegistry;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
    pub memory: SharedMemory,
    pub adapter: Arc<ToolAwareAdapter>,
    pub scheduler: Arc<Scheduler>,
    pub default_model_name: String,
}
