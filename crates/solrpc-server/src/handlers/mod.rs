mod health;
mod mcp;

pub use health::health;
pub use mcp::{dispatch, mcp_message, mcp_request, mcp_sse};
