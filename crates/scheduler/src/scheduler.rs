//! The bounded multi-agent turn loop: each turn asks the current agent's
//! model for one decision (tool use, handoff, or a final response), acts on
//! it, and repeats until a response is produced, the turn budget is spent,
//! or the run is cancelled.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use ai_agent_common::{ExecutionContext, Message, ResponseEnvelope, SwarmConfig, ToolDescriptor};
use ai_agent_model_adapter::{ChatRequest, ChatTurn, ToolChoice, TurnRole};
use ai_agent_tool_registry::ToolRegistry;

use crate::agent::BoundAgent;
use crate::decision::{parse_decision, Decision};
use crate::events::{EventStream, TurnEvent, TurnEventKind};
use crate::swarm::{target_from_handoff_tool_name, Swarm};

const CONVERSATION_WINDOW: usize = 5;

pub struct Scheduler {
    swarm: Swarm,
    events: EventStream,
}

impl Scheduler {
    pub fn new(swarm: Swarm) -> Self {
        Self {
            swarm,
            events: EventStream::new(),
        }
    }

    pub fn subscribe_events(&self) -> tokio::sync::broadcast::Receiver<TurnEvent> {
        self.events.subscribe()
    }

    /// `run(entry_agent, messages, context_vars, cancellation_signal) ->
    /// response_envelope`.
    pub async fn run(
        &self,
        entry_agent: &str,
        messages: Vec<Message>,
        mut context_vars: HashMap<String, String>,
        config: &SwarmConfig,
        cancel: CancellationToken,
    ) -> ResponseEnvelope {
        let start = Instant::now();
        let mut ctx = ExecutionContext::new(entry_agent, config.debug);
        let user_message = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        let mut transcript = messages;
        let mut error: Option<String> = None;

        tracing::info!(session_id = %ctx.session_id, entry_agent, "swarm run started");
        self.events.emit(TurnEvent {
            session_id: ctx.session_id.to_string(),
            turn: 0,
            agent: entry_agent.to_string(),
            kind: TurnEventKind::RunStarted,
            timestamp: chrono::Utc::now(),
        });

        loop {
            if cancel.is_cancelled() {
                error = Some("run was cancelled".to_string());
                break;
            }
            if ctx.turn >= config.max_turns {
                tracing::warn!(session_id = %ctx.session_id, max_turns = config.max_turns, "swarm run hit turn budget");
                break;
            }
            ctx.turn += 1;

            let agent = match self.swarm.agent(&ctx.current_agent) {
                Some(agent) => agent,
                None => {
                    error = Some(format!("unknown agent '{}'", ctx.current_agent));
                    break;
                }
            };

            let model = match self.swarm.resolve_model(&ctx.current_agent) {
                Ok(model) => model,
                Err(err) => {
                    error = Some(err.to_string());
                    break;
                }
            };

            let peer_names = self.swarm.peer_names(&ctx.current_agent);
            let decision_prompt = build_decision_prompt(
                agent,
                &context_vars,
                &transcript,
                &user_message,
                &peer_names,
                self.swarm.registry.as_ref(),
            );

            let request = ChatRequest {
                model: self.swarm.resolve_model_name(&ctx.current_agent).unwrap_or_default(),
                messages: vec![ChatTurn {
                    role: TurnRole::System,
                    content: decision_prompt,
                    name: None,
                    tool_call_id: None,
                    tool_calls: Vec::new(),
                }],
                tools: Vec::new(),
                tool_choice: ToolChoice::None,
            };

            let call = tokio::time::timeout(Duration::from_secs(config.timeout_secs), model.chat(request)).await;
            let response = match call {
                Ok(Ok(response)) => response,
                Ok(Err(err)) => {
                    error = Some(err.to_string());
                    break;
                }
                Err(_) => {
                    error = Some(format!("run timed out after {}s", config.timeout_secs));
                    break;
                }
            };

            let raw_text = response.content.unwrap_or_default();
            let decision = parse_decision(&raw_text);

            match decision {
                Decision::Respond { response, .. } => {
                    transcript.push(Message::assistant(response));
                    self.events.emit(TurnEvent {
                        session_id: ctx.session_id.to_string(),
                        turn: ctx.turn,
                        agent: ctx.current_agent.clone(),
                        kind: TurnEventKind::Responded,
                        timestamp: chrono::Utc::now(),
                    });
                    break;
                }
                Decision::ToolUse {
                    tool_name, tool_args, ..
                } => {
                    if let Some(target) = target_from_handoff_tool_name(&tool_name) {
                        self.dispatch_handoff(&mut ctx, &mut transcript, target.to_string());
                        continue;
                    }

                    if !agent.allows_tool(&tool_name) {
                        transcript.push(Message::assistant(format!(
                            "tool '{tool_name}' is not available to agent '{}': failed",
                            ctx.current_agent
                        )));
                        self.events.emit(TurnEvent {
                            session_id: ctx.session_id.to_string(),
                            turn: ctx.turn,
                            agent: ctx.current_agent.clone(),
                            kind: TurnEventKind::ToolFailed {
                                name: tool_name,
                                reason: "not in agent's allowed tool set".to_string(),
                            },
                            timestamp: chrono::Utc::now(),
                        });
                        continue;
                    }

                    match self.swarm.registry.call(&tool_name, tool_args, &self.swarm.memory).await {
                        Ok(result) => {
                            transcript.push(Message::assistant(format!("used tool '{tool_name}': {result}")));
                            ctx.tool_calls += 1;
                            self.events.emit(TurnEvent {
                                session_id: ctx.session_id.to_string(),
                                turn: ctx.turn,
                                agent: ctx.current_agent.clone(),
                                kind: TurnEventKind::ToolInvoked { name: tool_name },
                                timestamp: chrono::Utc::now(),
                            });
                        }
                        Err(err) => {
                            transcript.push(Message::assistant(format!("tool '{tool_name}' failed: {err}")));
                            self.events.emit(TurnEvent {
                                session_id: ctx.session_id.to_string(),
                                turn: ctx.turn,
                                agent: ctx.current_agent.clone(),
                                kind: TurnEventKind::ToolFailed {
                                    name: tool_name,
                                    reason: err.to_string(),
                                },
                                timestamp: chrono::Utc::now(),
                            });
                        }
                    }
                    continue;
                }
                Decision::Handoff { handoff_agent, .. } => {
                    self.dispatch_handoff(&mut ctx, &mut transcript, handoff_agent);
                    continue;
                }
            }
        }

        tracing::info!(
            session_id = %ctx.session_id,
            turns = ctx.turn,
            success = error.is_none(),
            "swarm run finished"
        );

        if let Some(reason) = &error {
            self.events.emit(TurnEvent {
                session_id: ctx.session_id.to_string(),
                turn: ctx.turn,
                agent: ctx.current_agent.clone(),
                kind: TurnEventKind::RunFailed { reason: reason.clone() },
                timestamp: chrono::Utc::now(),
            });
        }

        ResponseEnvelope {
            transcript,
            agent: ctx.current_agent,
            context_variables: std::mem::take(&mut context_vars),
            execution_time_ms: start.elapsed().as_millis() as u64,
            total_turns: ctx.turn,
            tool_calls: ctx.tool_calls,
            handoffs: ctx.handoffs,
            success: error.is_none(),
            error,
        }
    }

    /// Shared by both handoff paths (dedicated `handoff` action, and a
    /// `tool_use` naming the conventional `transfer_to_<target>` pseudo-tool).
    fn dispatch_handoff(&self, ctx: &mut ExecutionContext, transcript: &mut Vec<Message>, target: String) {
        if self.swarm.allows_handoff(&ctx.current_agent, &target) && self.swarm.agent(&target).is_some() {
            ctx.current_agent = target.clone();
            transcript.push(Message::assistant(format!("Transferring to {target}")));
            ctx.handoffs += 1;
            self.events.emit(TurnEvent {
                session_id: ctx.session_id.to_string(),
                turn: ctx.turn,
                agent: ctx.current_agent.clone(),
                kind: TurnEventKind::HandoffTo { target },
                timestamp: chrono::Utc::now(),
            });
        } else {
            transcript.push(Message::assistant(format!("handoff target '{target}' not found")));
            self.events.emit(TurnEvent {
                session_id: ctx.session_id.to_string(),
                turn: ctx.turn,
                agent: ctx.current_agent.clone(),
                kind: TurnEventKind::HandoffRejected { target },
                timestamp: chrono::Utc::now(),
            });
        }
    }
}

fn build_decision_prompt(
    agent: &BoundAgent,
    context_vars: &HashMap<String, String>,
    transcript: &[Message],
    user_message: &str,
    peer_names: &[String],
    registry: &ToolRegistry,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(&agent.spec.instructions);
    prompt.push('\n');

    if !context_vars.is_empty() {
        prompt.push_str("\nContext variables:\n");
        let mut keys: Vec<_> = context_vars.keys().collect();
        keys.sort();
        for key in keys {
            prompt.push_str(&format!("- {key} = {}\n", context_vars[key]));
        }
    }

    let window: Vec<&Message> = transcript.iter().rev().take(CONVERSATION_WINDOW).collect();
    if !window.is_empty() {
        prompt.push_str("\nRecent conversation:\n");
        for message in window.into_iter().rev() {
            prompt.push_str(&message.render_line());
            prompt.push('\n');
        }
    }

    prompt.push_str(&format!("\nUSER: {user_message}\n"));

    let tools: Vec<ToolDescriptor> = agent
        .spec
        .allowed_tools
        .iter()
        .filter_map(|name| {
            let meta = registry.get_schema(name)?;
            Some(ToolDescriptor {
                name: name.clone(),
                description: meta.description,
                input_schema: meta.input_schema,
            })
        })
        .collect();

    if !tools.is_empty() {
        prompt.push_str("\nAvailable tools:\n");
        for tool in &tools {
            prompt.push_str(&format!("- {}: {}\n", tool.name, tool.description));
        }
    }

    if !peer_names.is_empty() {
        prompt.push_str("\nAgents you may hand off to:\n");
        for name in peer_names {
            prompt.push_str(&format!("- {name}\n"));
        }
    }

    prompt.push_str(
        "\nRespond with exactly one JSON object of one of these shapes:\n\
         {\"action\": \"tool_use\", \"tool_name\": \"<name>\", \"tool_args\": { ... }, \"reasoning\": \"<why>\"}\n\
         {\"action\": \"handoff\", \"handoff_agent\": \"<name>\", \"reasoning\": \"<why>\"}\n\
         {\"action\": \"respond\", \"response\": \"<final text>\", \"reasoning\": \"<why>\"}\n",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_agent_common::AgentSpec;
    use std::collections::HashSet;

    #[test]
    fn decision_prompt_lists_allowed_tools_and_peers() {
        let registry = ToolRegistry::with_builtins();
        let mut allowed = HashSet::new();
        allowed.insert("arithmetic".to_string());
        let spec = AgentSpec::new("planner", "plan carefully").with_tools(allowed);
        let agent = BoundAgent::new(spec);

        let prompt = build_decision_prompt(
            &agent,
            &HashMap::new(),
            &[],
            "what is 2+2?",
            &["writer".to_string()],
            &registry,
        );

        assert!(prompt.contains("plan carefully"));
        assert!(prompt.contains("arithmetic"));
        assert!(prompt.contains("writer"));
        assert!(prompt.contains("\"action\""));
    }
}
