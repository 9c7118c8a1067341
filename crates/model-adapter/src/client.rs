//! The `ModelClient` trait and its two provider bindings: an
//! OpenAI-compatible chat-completions client (`async_openai::Client<OpenAIConfig>`
//! pointed at an Ollama-compatible `/v1` base url), and a native-Ollama
//! client (`ollama_rs::Ollama` used directly).

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolArgs,
    ChatCompletionToolChoiceOption, ChatCompletionToolType, CreateChatCompletionRequestArgs,
    FunctionObjectArgs,
};
use async_trait::async_trait;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::chat::ChatMessage as OllamaChatMessage;
use ollama_rs::generation::tools::{ToolCall, ToolFunctionInfo, ToolInfo, ToolType};
use ollama_rs::Ollama;
use serde_json::Value;

use ai_agent_common::AgentNetworkError;

/// One role-tagged entry sent to the model; independent of `ai_agent_common::Message`
/// so the adapter doesn't force its wire shape onto the transcript type.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
    pub name: Option<String>,
    pub tool_call_id: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool-call as returned by the model.
#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// Raw, unparsed argument payload — either a JSON object or a JSON string
    /// that itself decodes to one.
    pub arguments: String,
}

/// Whether the model may call a tool this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    Auto,
    None,
}

pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatTurn>,
    pub tools: Vec<ai_agent_common::ToolDescriptor>,
    pub tool_choice: ToolChoice,
}

#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

/// Common provider interface the adapter's loop is generic over.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentNetworkError>;
}

/// Binding against any endpoint speaking the `{model, messages, tools,
/// tool_choice}` chat-completions contract — OpenAI itself, or Ollama's
/// OpenAI-compatible `/v1/chat/completions` surface.
pub struct OpenAiCompatClient {
    client: async_openai::Client<OpenAIConfig>,
}

impl OpenAiCompatClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(api_key);
        Self {
            client: async_openai::Client::with_config(config),
        }
    }

    fn to_request_message(turn: &ChatTurn) -> Result<ChatCompletionRequestMessage, AgentNetworkError> {
        let message = match turn.role {
            TurnRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(turn.content.clone())
                .build()
                .map_err(|e| AgentNetworkError::ModelTransport(e.to_string()))?
                .into(),
            TurnRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(turn.content.clone())
                .build()
                .map_err(|e| AgentNetworkError::ModelTransport(e.to_string()))?
                .into(),
            TurnRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(turn.content.clone())
                .build()
                .map_err(|e| AgentNetworkError::ModelTransport(e.to_string()))?
                .into(),
            TurnRole::Tool => ChatCompletionRequestToolMessageArgs::default()
                .content(turn.content.clone())
                .tool_call_id(turn.tool_call_id.clone().unwrap_or_default())
                .build()
                .map_err(|e| AgentNetworkError::ModelTransport(e.to_string()))?
                .into(),
        };
        Ok(message)
    }
}

#[async_trait]
impl ModelClient for OpenAiCompatClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentNetworkError> {
        let messages = request
            .messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        let tools: Vec<ChatCompletionTool> = request
            .tools
            .iter()
            .map(|tool| {
                ChatCompletionToolArgs::default()
                    .r#type(ChatCompletionToolType::Function)
                    .function(
                        FunctionObjectArgs::default()
                            .name(tool.name.clone())
                            .description(tool.description.clone())
                            .parameters(tool.input_schema.clone())
                            .build()
                            .unwrap(),
                    )
                    .build()
                    .unwrap()
            })
            .collect();

        let tool_choice = match request.tool_choice {
            ToolChoice::Auto if !tools.is_empty() => Some(ChatCompletionToolChoiceOption::Auto),
            ToolChoice::None => Some(ChatCompletionToolChoiceOption::None),
            _ => None,
        };

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(request.model).messages(messages).stream(false);
        if !tools.is_empty() {
            builder.tools(tools);
        }
        if let Some(choice) = tool_choice {
            builder.tool_choice(choice);
        }
        let completion_request = builder
            .build()
            .map_err(|e| AgentNetworkError::ModelTransport(e.to_string()))?;

        let response = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            self.client.chat().create(completion_request),
        )
        .await
        .map_err(|_| AgentNetworkError::Timeout(std::time::Duration::from_secs(30)))?
        .map_err(|e| AgentNetworkError::ModelTransport(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(AgentNetworkError::ModelEmpty)?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        Ok(ChatResponse {
            content: choice.message.content,
            tool_calls,
        })
    }
}

/// Binding against Ollama's native `/api/chat`, with `tools` declared in the
/// `ollama_rs::generation::tools` wire shape (`ToolInfo`/`ToolType::Function`).
pub struct OllamaClient {
    client: Ollama,
}

impl OllamaClient {
    pub fn new(base_url: &str) -> Self {
        let parsed = url::Url::parse(base_url).ok();
        let host = parsed
            .as_ref()
            .map(|url| format!("{}://{}", url.scheme(), url.host_str().unwrap_or("localhost")))
            .unwrap_or_else(|| "http://localhost".to_string());
        let port = parsed.as_ref().and_then(|url| url.port()).unwrap_or(11434);
        Self {
            client: Ollama::new(host, port),
        }
    }

    fn to_chat_message(turn: &ChatTurn) -> OllamaChatMessage {
        match turn.role {
            TurnRole::System => OllamaChatMessage::system(turn.content.clone()),
            TurnRole::User => OllamaChatMessage::user(turn.content.clone()),
            TurnRole::Assistant => OllamaChatMessage::assistant(turn.content.clone()),
            // ollama_rs has no distinct tool role; represent as a user-visible
            // result line the way `/api/chat` expects tool output folded back
            // into the conversation.
            TurnRole::Tool => OllamaChatMessage::user(format!(
                "[tool result: {}] {}",
                turn.name.clone().unwrap_or_default(),
                turn.content
            )),
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AgentNetworkError> {
        let messages: Vec<OllamaChatMessage> = request.messages.iter().map(Self::to_chat_message).collect();

        let tools: Vec<ToolInfo> = request
            .tools
            .iter()
            .map(|tool| ToolInfo {
                tool_type: ToolType::Function,
                function: ToolFunctionInfo {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.input_schema.clone(),
                },
            })
            .collect();

        let mut chat_request = ChatMessageRequest::new(request.model, messages);
        if request.tool_choice == ToolChoice::Auto && !tools.is_empty() {
            chat_request = chat_request.tools(tools);
        }

        let response = tokio::time::timeout(
            std::time::Duration::from_secs(30),
            self.client.send_chat_messages(chat_request),
        )
        .await
        .map_err(|_| AgentNetworkError::Timeout(std::time::Duration::from_secs(30)))?
        .map_err(|e| AgentNetworkError::ModelTransport(e.to_string()))?;

        let tool_calls = response
            .message
            .tool_calls
            .into_iter()
            .enumerate()
            .map(|(i, call): (usize, ToolCall)| ToolCallRequest {
                id: format!("call_{i}"),
                name: call.function.name,
                arguments: serde_json::to_string(&call.function.arguments).unwrap_or_default(),
            })
            .collect::<Vec<_>>();

        let content = response.message.content;

        Ok(ChatResponse {
            content: if content.is_empty() { None } else { Some(content) },
            tool_calls,
        })
    }
}

/// Accepts both a JSON object and a JSON string that itself decodes to a JSON
/// object. Returns `None` if both attempts fail — callers skip that single
/// tool-call.
pub fn parse_tool_arguments(raw: &str) -> Option<Value> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        return Some(Value::Object(map));
    }
    if let Ok(Value::String(inner)) = serde_json::from_str::<Value>(raw) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&inner) {
            return Some(Value::Object(map));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tool_arguments_accepts_plain_object() {
        let parsed = parse_tool_arguments(r#"{"key":"a"}"#).unwrap();
        assert_eq!(parsed["key"], "a");
    }

    #[test]
    fn parse_tool_arguments_accepts_double_encoded_string() {
        let parsed = parse_tool_arguments(r#""{\"key\":\"a\"}""#).unwrap();
        assert_eq!(parsed["key"], "a");
    }

    #[test]
    fn parse_tool_arguments_rejects_non_object_shapes() {
        assert!(parse_tool_arguments("42").is_none());
        assert!(parse_tool_arguments("not json at all").is_none());
    }
}
