//! Agent Swarm Scheduler (C4): a bounded-turn driver that routes messages
//! between agents, executing tools and handoffs, until the model responds
//! or the turn budget is exhausted.

pub mod agent;
pub mod decision;
pub mod events;
pub mod scheduler;
pub mod swarm;

pub use agent::BoundAgent;
pub use decision::{parse_decision, Decision};
pub use events::{EventStream, TurnEvent, TurnEventKind};
pub use scheduler::Scheduler;
pub use swarm::{handoff_tool_name, target_from_handoff_tool_name, Swarm};
