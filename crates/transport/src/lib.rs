//! Transport Surface (C5): stdio JSON-RPC 2.0 and HTTP/SSE front ends over
//! the same shared [`AppState`].
//!
//! Both transports are thin: they parse a request, call into the tool
//! registry, model adapter, or scheduler, and serialize the result. No
//! transport-specific business logic lives here.

pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod stdio;

pub use http::build_router;
pub use state::AppState;
pub use stdio::run_stdio;
