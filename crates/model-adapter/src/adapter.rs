//! The tool-aware loop: descriptor assembly, a first model request with
//! `tool_choice=auto`, sequential tool dispatch through the registry, and
//! exactly one follow-up request with `tool_choice=none`.

use std::sync::Arc;

use ai_agent_common::{AgentNetworkError, Result, ToolDescriptor};
use ai_agent_memory::SharedMemory;
use ai_agent_tool_registry::ToolRegistry;

use crate::client::{ChatRequest, ChatTurn, ModelClient, ToolChoice, ToolCallRequest, TurnRole, parse_tool_arguments};

/// The adapter makes exactly one follow-up round after tool dispatch, never
/// more.
pub const MAX_FOLLOWUP_ROUNDS: u32 = 1;

pub struct ToolAwareAdapter {
    client: Arc<dyn ModelClient>,
    registry: Arc<ToolRegistry>,
}

impl ToolAwareAdapter {
    pub fn new(client: Arc<dyn ModelClient>, registry: Arc<ToolRegistry>) -> Self {
        Self { client, registry }
    }

    /// Walks the registry and builds one descriptor per tool. Every built-in
    /// in this registry registers with a full schema, so there's never a gap
    /// to paper over with a per-name override here.
    fn tool_descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry
            .list_names()
            .into_iter()
            .filter_map(|name| {
                let meta = self.registry.get_schema(&name)?;
                Some(ToolDescriptor {
                    name,
                    description: meta.description,
                    input_schema: meta.input_schema,
                })
            })
            .collect()
    }

    /// `call(query, session_id, memory) → final_text | error`.
    pub async fn call(&self, model: &str, system_prompt: &str, query: &str, memory: &SharedMemory) -> Result<String> {
        let tools = self.tool_descriptors();

        let first_request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatTurn {
                    role: TurnRole::System,
                    content: system_prompt.to_string(),
                    name: None,
                    tool_call_id: None,
                    tool_calls: Vec::new(),
                },
                ChatTurn {
                    role: TurnRole::User,
                    content: query.to_string(),
                    name: None,
                    tool_call_id: None,
                    tool_calls: Vec::new(),
                },
            ],
            tools: tools.clone(),
            tool_choice: ToolChoice::Auto,
        };

        let first_response = match self.client.chat(first_request).await {
            Ok(response) => response,
            Err(err) if matches!(err, AgentNetworkError::ModelTransport(_) | AgentNetworkError::Timeout(_)) => {
                // Provider doesn't support native tool-calling, or is unreachable
                // for the structured path — drop to the textual fallback.
                return self.fallback_call(model, system_prompt, query, &tools, memory).await;
            }
            Err(err) => return Err(err),
        };

        if first_response.tool_calls.is_empty() {
            return match first_response.content {
                Some(content) if !content.is_empty() => Ok(content),
                _ if !tools.is_empty() => {
                    // Declared tools but got nothing back — provider likely
                    // doesn't support native tool-calling.
                    self.fallback_call(model, system_prompt, query, &tools, memory).await
                }
                _ => Err(AgentNetworkError::ModelEmpty),
            };
        }

        let mut tool_result_turns = Vec::new();
        for tool_call in &first_response.tool_calls {
            tool_result_turns.push(self.dispatch_tool_call(tool_call, memory).await);
        }

        let mut follow_up_messages = vec![
            ChatTurn {
                role: TurnRole::System,
                content: system_prompt.to_string(),
                name: None,
                tool_call_id: None,
                tool_calls: Vec::new(),
            },
            ChatTurn {
                role: TurnRole::User,
                content: query.to_string(),
                name: None,
                tool_call_id: None,
                tool_calls: Vec::new(),
            },
            ChatTurn {
                role: TurnRole::Assistant,
                content: first_response.content.clone().unwrap_or_default(),
                name: None,
                tool_call_id: None,
                tool_calls: first_response.tool_calls.clone(),
            },
        ];
        follow_up_messages.extend(tool_result_turns);

        // MAX_FOLLOWUP_ROUNDS = 1: exactly one follow-up, tool_choice=none,
        // tools omitted entirely so a second round can't be triggered.
        debug_assert_eq!(MAX_FOLLOWUP_ROUNDS, 1);
        let follow_up_request = ChatRequest {
            model: model.to_string(),
            messages: follow_up_messages,
            tools: Vec::new(),
            tool_choice: ToolChoice::None,
        };

        let follow_up = self.client.chat(follow_up_request).await?;
        follow_up.content.filter(|c| !c.is_empty()).ok_or(AgentNetworkError::ModelEmpty)
    }

    /// Parses arguments, invokes the tool, and renders a `tool` turn carrying
    /// the stringified result (or `"error: <message>"` on failure). A tool
    /// failure is never fatal to the call.
    async fn dispatch_tool_call(&self, tool_call: &ToolCallRequest, memory: &SharedMemory) -> ChatTurn {
        let content = match parse_tool_arguments(&tool_call.arguments) {
            Some(arguments) => match self.registry.call(&tool_call.name, arguments, memory).await {
                Ok(result) => result,
                Err(err) => format!("error: {err}"),
            },
            None => {
                tracing::warn!(tool = %tool_call.name, "skipping tool-call with unparseable arguments");
                "error: unparseable arguments".to_string()
            }
        };

        ChatTurn {
            role: TurnRole::Tool,
            content,
            name: Some(tool_call.name.clone()),
            tool_call_id: Some(tool_call.id.clone()),
            tool_calls: Vec::new(),
        }
    }

    /// Prompt-engineering mode for providers without native tool-calling:
    /// embed a textual tool list, require `TOOL_CALL:<name>:<argument-text>`
    /// lines, execute them, splice the results back into the text. No
    /// follow-up round is made here.
    async fn fallback_call(
        &self,
        model: &str,
        system_prompt: &str,
        query: &str,
        tools: &[ToolDescriptor],
        memory: &SharedMemory,
    ) -> Result<String> {
        let tool_list = tools
            .iter()
            .map(|tool| format!("- {}: {}", tool.name, tool.description))
            .collect::<Vec<_>>()
            .join("\n");

        let augmented_system_prompt = format!(
            "{system_prompt}\n\nYou may use the following tools. To invoke one, emit a line of the form \
             TOOL_CALL:<name>:<argument-text>.\n{tool_list}"
        );

        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatTurn {
                    role: TurnRole::System,
                    content: augmented_system_prompt,
                    name: None,
                    tool_call_id: None,
                    tool_calls: Vec::new(),
                },
                ChatTurn {
                    role: TurnRole::User,
                    content: query.to_string(),
                    name: None,
                    tool_call_id: None,
                    tool_calls: Vec::new(),
                },
            ],
            tools: Vec::new(),
            tool_choice: ToolChoice::None,
        };

        let response = self.client.chat(request).await?;
        let text = response.content.ok_or(AgentNetworkError::ModelEmpty)?;

        let mut rendered = String::new();
        for line in text.lines() {
            match parse_fallback_tool_call_line(line) {
                Some((name, arg_text)) => {
                    let arguments = parse_tool_arguments(&arg_text).unwrap_or(serde_json::json!({}));
                    let result = match self.registry.call(&name, arguments, memory).await {
                        Ok(result) => result,
                        Err(err) => format!("error: {err}"),
                    };
                    rendered.push_str(&format!("[{name} -> {result}]\n"));
                }
                None => {
                    rendered.push_str(line);
                    rendered.push('\n');
                }
            }
        }

        let rendered = rendered.trim_end().to_string();
        if rendered.is_empty() {
            Err(AgentNetworkError::ModelEmpty)
        } else {
            Ok(rendered)
        }
    }
}

/// Parses a single `TOOL_CALL:<name>:<argument-text>` line.
fn parse_fallback_tool_call_line(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("TOOL_CALL:")?;
    let (name, arg_text) = rest.split_once(':')?;
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), arg_text.to_string()))
}
