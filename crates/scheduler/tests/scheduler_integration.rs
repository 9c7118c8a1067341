//! Integration tests for the bounded multi-agent turn loop, against a
//! scripted stub `ModelClient` rather than a live provider.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use ai_agent_common::{AgentSpec, Message, Result, SwarmConfig};
use ai_agent_memory::SharedMemory;
use ai_agent_model_adapter::{ChatRequest, ChatResponse, ModelClient};
use ai_agent_scheduler::{BoundAgent, Scheduler, Swarm};
use ai_agent_tool_registry::ToolRegistry;

struct ScriptedClient {
    replies: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ModelClient for ScriptedClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok(ChatResponse {
                content: Some(r#"{"action":"respond","response":"out of script"}"#.to_string()),
                tool_calls: Vec::new(),
            });
        }
        Ok(ChatResponse {
            content: Some(replies.remove(0)),
            tool_calls: Vec::new(),
        })
    }
}

fn swarm_with(model: Arc<dyn ModelClient>) -> Swarm {
    let registry = Arc::new(ToolRegistry::with_builtins());
    let memory = SharedMemory::new();
    Swarm::new(registry, memory).with_default_model(model)
}

#[tokio::test]
async fn single_tool_round_trip_then_respond() {
    let model = Arc::new(ScriptedClient::new(vec![
        r#"{"action":"tool_use","tool_name":"arithmetic","tool_args":{"op":"add","a":2,"b":3}}"#,
        r#"{"action":"respond","response":"2+3 is 5"}"#,
    ]));
    let mut swarm = swarm_with(model);
    let mut tools = HashSet::new();
    tools.insert("arithmetic".to_string());
    swarm.register_agent(BoundAgent::new(AgentSpec::new("calc", "you do arithmetic").with_tools(tools)));

    let scheduler = Scheduler::new(swarm);
    let envelope = scheduler
        .run(
            "calc",
            vec![Message::user("what is 2+3?")],
            HashMap::new(),
            &SwarmConfig::default(),
            CancellationToken::new(),
        )
        .await;

    assert!(envelope.success);
    assert_eq!(envelope.tool_calls, 1);
    assert!(envelope.transcript.iter().any(|m| m.content.contains("5")));
}

#[tokio::test]
async fn handoff_chain_switches_current_agent() {
    let model = Arc::new(ScriptedClient::new(vec![
        r#"{"action":"handoff","handoff_agent":"writer"}"#,
        r#"{"action":"respond","response":"written!"}"#,
    ]));
    let mut swarm = swarm_with(model);
    swarm.register_agent(BoundAgent::new(AgentSpec::new("planner", "you plan")));
    swarm.register_agent(BoundAgent::new(AgentSpec::new("writer", "you write")));
    swarm.register_handoff("planner", "writer");

    let scheduler = Scheduler::new(swarm);
    let envelope = scheduler
        .run(
            "planner",
            vec![Message::user("write a poem")],
            HashMap::new(),
            &SwarmConfig::default(),
            CancellationToken::new(),
        )
        .await;

    assert!(envelope.success);
    assert_eq!(envelope.agent, "writer");
    assert_eq!(envelope.handoffs, 1);
}

#[tokio::test]
async fn three_agent_handoff_chain_lands_on_the_last_target() {
    let model = Arc::new(ScriptedClient::new(vec![
        r#"{"action":"handoff","handoff_agent":"B"}"#,
        r#"{"action":"handoff","handoff_agent":"C"}"#,
        r#"{"action":"respond","response":"done"}"#,
    ]));
    let mut swarm = swarm_with(model);
    swarm.register_agent(BoundAgent::new(AgentSpec::new("A", "first")));
    swarm.register_agent(BoundAgent::new(AgentSpec::new("B", "second")));
    swarm.register_agent(BoundAgent::new(AgentSpec::new("C", "third")));
    swarm.register_handoff("A", "B");
    swarm.register_handoff("B", "C");

    let scheduler = Scheduler::new(swarm);
    let envelope = scheduler
        .run("A", vec![Message::user("go")], HashMap::new(), &SwarmConfig::default(), CancellationToken::new())
        .await;

    assert!(envelope.success);
    assert_eq!(envelope.agent, "C");
    assert_eq!(envelope.handoffs, 2);
    assert_eq!(envelope.total_turns, 3);
}

#[tokio::test]
async fn max_turns_terminates_without_error() {
    let model = Arc::new(ScriptedClient::new(vec![
        r#"{"action":"tool_use","tool_name":"current_timestamp","tool_args":{}}"#,
        r#"{"action":"tool_use","tool_name":"current_timestamp","tool_args":{}}"#,
        r#"{"action":"tool_use","tool_name":"current_timestamp","tool_args":{}}"#,
    ]));
    let mut swarm = swarm_with(model);
    let mut tools = HashSet::new();
    tools.insert("current_timestamp".to_string());
    swarm.register_agent(BoundAgent::new(AgentSpec::new("looper", "you stall").with_tools(tools)));

    let scheduler = Scheduler::new(swarm);
    let mut config = SwarmConfig::default();
    config.max_turns = 3;

    let envelope = scheduler
        .run("looper", vec![Message::user("loop forever")], HashMap::new(), &config, CancellationToken::new())
        .await;

    assert!(envelope.success);
    assert_eq!(envelope.total_turns, 3);
    assert!(envelope.error.is_none());
}

#[tokio::test]
async fn tool_failure_does_not_abort_the_run() {
    let model = Arc::new(ScriptedClient::new(vec![
        r#"{"action":"tool_use","tool_name":"arithmetic","tool_args":{"op":"div","a":1,"b":0}}"#,
        r#"{"action":"respond","response":"can't divide by zero"}"#,
    ]));
    let mut swarm = swarm_with(model);
    let mut tools = HashSet::new();
    tools.insert("arithmetic".to_string());
    swarm.register_agent(BoundAgent::new(AgentSpec::new("calc", "you do arithmetic").with_tools(tools)));

    let scheduler = Scheduler::new(swarm);
    let envelope = scheduler
        .run(
            "calc",
            vec![Message::user("what is 1/0?")],
            HashMap::new(),
            &SwarmConfig::default(),
            CancellationToken::new(),
        )
        .await;

    assert!(envelope.success);
    assert!(envelope.transcript.iter().any(|m| m.content.contains("failed")));
}

#[tokio::test]
async fn missing_handoff_target_continues_the_run() {
    let model = Arc::new(ScriptedClient::new(vec![
        r#"{"action":"handoff","handoff_agent":"nobody"}"#,
        r#"{"action":"respond","response":"gave up transferring"}"#,
    ]));
    let mut swarm = swarm_with(model);
    swarm.register_agent(BoundAgent::new(AgentSpec::new("planner", "you plan")));

    let scheduler = Scheduler::new(swarm);
    let envelope = scheduler
        .run(
            "planner",
            vec![Message::user("hand off to nobody")],
            HashMap::new(),
            &SwarmConfig::default(),
            CancellationToken::new(),
        )
        .await;

    assert!(envelope.success);
    assert_eq!(envelope.agent, "planner");
    assert_eq!(envelope.handoffs, 0);
}

#[tokio::test]
async fn no_model_bound_anywhere_is_no_llm_error() {
    let registry = Arc::new(ToolRegistry::with_builtins());
    let memory = SharedMemory::new();
    let mut swarm = Swarm::new(registry, memory);
    swarm.register_agent(BoundAgent::new(AgentSpec::new("lonely", "no model bound")));

    let scheduler = Scheduler::new(swarm);
    let envelope = scheduler
        .run(
            "lonely",
            vec![Message::user("hello?")],
            HashMap::new(),
            &SwarmConfig::default(),
            CancellationToken::new(),
        )
        .await;

    assert!(!envelope.success);
    assert!(envelope.error.unwrap().contains("no model bound"));
}

#[tokio::test]
async fn cancellation_returns_the_partial_transcript() {
    let model = Arc::new(ScriptedClient::new(vec![
        r#"{"action":"tool_use","tool_name":"current_timestamp","tool_args":{}}"#,
    ]));
    let mut swarm = swarm_with(model);
    let mut tools = HashSet::new();
    tools.insert("current_timestamp".to_string());
    swarm.register_agent(BoundAgent::new(AgentSpec::new("looper", "you stall").with_tools(tools)));

    let scheduler = Scheduler::new(swarm);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let envelope = scheduler
        .run("looper", vec![Message::user("go")], HashMap::new(), &SwarmConfig::default(), cancel)
        .await;

    assert!(!envelope.success);
    assert_eq!(envelope.total_turns, 0);
}
