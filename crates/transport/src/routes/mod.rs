pub mod chat;
pub mod health;
pub mod mcp;
pub mod react;
pub mod schema;
pub mod swarm;
pub mod tool;
