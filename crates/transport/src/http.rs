//! Router assembly for the HTTP/SSE transport surface: a route table plus
//! request-id logging, tracing, and CORS layers.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::middleware::logging::{get_tracing_layer, logging_middleware};
use crate::routes::{chat, health, mcp, react, schema, swarm, tool};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/tool", post(tool::call_tool))
        .route("/chat", post(chat::chat))
        .route("/schema", get(schema::schema))
        .route("/health", get(health::health))
        .route("/react", get(react::react_demo))
        .route("/swarm/run", post(swarm::run_swarm))
        .route("/mcp", post(mcp::mcp_stream))
        .layer(axum::middleware::from_fn(logging_middleware))
        .layer(get_tracing_layer())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
