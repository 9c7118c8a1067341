//! Tool Registry (C2): a name-indexed map of callable tools with optional
//! schema metadata, plus a small built-in tool set that makes the system
//! exercisable without any external tool plugin.
//!
//! `RwLock<HashMap<String, Arc<dyn ToolExecutor>>>` behind a name lookup;
//! built-ins implement `ToolExecutor` directly rather than through a blanket
//! impl, so no unsafe pointer tricks are needed to paper over an owned-vs-
//! borrowed `self` mismatch.

pub mod builtins;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use ai_agent_common::{AgentNetworkError, Result};
use ai_agent_memory::SharedMemory;

/// A callable tool. `call` receives raw JSON arguments plus a handle to the
/// run's shared memory.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> String;

    /// Hand-written JSON-schema for the tool's arguments, used by the model
    /// adapter's descriptor-assembly step.
    fn input_schema(&self) -> Value;

    fn required_args(&self) -> Vec<String> {
        Vec::new()
    }

    async fn call(&self, arguments: Value, memory: &SharedMemory) -> anyhow::Result<String>;
}

/// Description + schema metadata for one registered tool.
#[derive(Debug, Clone)]
pub struct ToolMetadata {
    pub description: String,
    pub input_schema: Value,
    pub required_args: Vec<String>,
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn ToolExecutor>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    /// A registry pre-loaded with the built-in tool set.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(builtins::MemorySet));
        registry.register(Arc::new(builtins::MemoryGet));
        registry.register(Arc::new(builtins::MemoryDelete));
        registry.register(Arc::new(builtins::Arithmetic));
        registry.register(Arc::new(builtins::CurrentTimestamp));
        registry
    }

    /// Idempotent overwrite.
    pub fn register(&self, tool: Arc<dyn ToolExecutor>) {
        self.tools
            .write()
            .unwrap()
            .insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolExecutor>> {
        self.tools.read().unwrap().get(name).cloned()
    }

    /// Stable-within-a-process, not required to be sorted.
    pub fn list_names(&self) -> Vec<String> {
        self.tools.read().unwrap().keys().cloned().collect()
    }

    pub fn get_schema(&self, name: &str) -> Option<ToolMetadata> {
        self.tools.read().unwrap().get(name).map(|tool| ToolMetadata {
            description: tool.description(),
            input_schema: tool.input_schema(),
            required_args: tool.required_args(),
        })
    }

    /// `call(name, arguments, memory) → result | TOOL_NOT_FOUND | TOOL_FAILED`.
    /// The registry holds the read lock only long enough to clone the `Arc`
    /// so concurrent calls to distinct tools never block each other.
    pub async fn call(&self, name: &str, arguments: Value, memory: &SharedMemory) -> Result<String> {
        let tool = {
            let tools = self.tools.read().unwrap();
            tools
                .get(name)
                .cloned()
                .ok_or_else(|| AgentNetworkError::ToolNotFound(name.to_string()))?
        };

        tool.call(arguments, memory)
            .await
            .map_err(|err| AgentNetworkError::tool_failed(name, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn call_on_missing_tool_is_tool_not_found() {
        let registry = ToolRegistry::new();
        let memory = SharedMemory::new();
        let err = registry.call("nope", json!({}), &memory).await.unwrap_err();
        assert!(matches!(err, AgentNetworkError::ToolNotFound(name) if name == "nope"));
    }

    #[test]
    fn register_is_idempotent_overwrite() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(builtins::Arithmetic));
        registry.register(Arc::new(builtins::Arithmetic));
        assert_eq!(registry.list_names().len(), 1);
    }

    #[test]
    fn with_builtins_registers_all_five() {
        let registry = ToolRegistry::with_builtins();
        let mut names = registry.list_names();
        names.sort();
        assert_eq!(
            names,
            vec![
                "arithmetic",
                "current_timestamp",
                "memory_delete",
                "memory_get",
                "memory_set",
            ]
        );
    }

    #[tokio::test]
    async fn get_schema_returns_metadata_for_registered_tool() {
        let registry = ToolRegistry::with_builtins();
        let meta = registry.get_schema("arithmetic").unwrap();
        assert!(meta.description.to_lowercase().contains("arithmetic"));
        assert!(meta.input_schema.is_object());
    }

    #[test]
    fn get_schema_on_missing_tool_is_none() {
        let registry = ToolRegistry::new();
        assert!(registry.get_schema("nope").is_none());
    }
}
