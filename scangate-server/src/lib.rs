//! # Scangate Server
//!
//! Security scan gateway in front of a fleet of scanner backends.
//!
//! Two surfaces share one [`AppState`]:
//!
//! - **REST**: `GET /api/health` probes every backend, `POST /api/scan` fans a
//!   scan out and returns one merged, deduplicated result.
//! - **MCP**: `POST|GET|DELETE /mcp` speaks JSON-RPC over streamable HTTP with
//!   per-session profile selection and a finding cache.

pub mod files;
pub mod handlers;
pub mod infra;
pub mod mcp;
pub mod middleware;
pub mod routes;

pub use infra::app_state::AppState;
pub use routes::create_app;
