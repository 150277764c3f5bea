//! Model Context Protocol (MCP) interface for LLM integration
//!
//! Exposes the ECS operations as MCP tools that LLMs can discover and
//! call. The server communicates with exactly one client over stdio.

mod server;
mod types;

pub use server::McpServer;
pub use types::*;
