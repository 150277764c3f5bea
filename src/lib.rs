//! OTC MCP Server - Open Telekom Cloud operations for AI agents
//!
//! Exposes a small set of Elastic Cloud Server (ECS) operations through
//! the Model Context Protocol. Token acquisition against the OTC identity
//! service is cached and renewed proactively; every other operation is a
//! direct translation of a tool call into one HTTP request and its JSON
//! response back into a tool result.

pub mod auth;
pub mod config;
pub mod ecs;
pub mod mcp;
