//! A registered agent: `ai_agent_common::AgentSpec` plus an optional
//! per-agent model binding (model-function + model name).

use std::sync::Arc;

use ai_agent_common::AgentSpec;
use ai_agent_model_adapter::ModelClient;

#[derive(Clone)]
pub struct BoundAgent {
    pub spec: AgentSpec,
    pub model: Option<Arc<dyn ModelClient>>,
}

impl BoundAgent {
    pub fn new(spec: AgentSpec) -> Self {
        Self { spec, model: None }
    }

    pub fn with_model(mut self, model: Arc<dyn ModelClient>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn allows_tool(&self, name: &str) -> bool {
        self.spec.allowed_tools.contains(name)
    }
}
