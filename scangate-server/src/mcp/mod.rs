//! MCP over streamable HTTP: JSON-RPC framing, per-session state, and the
//! tool, resource and prompt handlers.

pub mod dispatch;
pub mod manager;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod session;
pub mod tools;
pub mod transport;

pub use manager::{SessionCloseGuard, SessionManager};
pub use session::{McpSession, SessionContext};
