//! MCP (Model Context Protocol) server for MathMentor.
//!
//! Exposes the tutor's `retrieve_data` and `web_search` tools to MCP clients.
//! Implements JSON-RPC 2.0 over stdio.

mod protocol;
mod server;
mod tools;

pub use server::McpServer;
