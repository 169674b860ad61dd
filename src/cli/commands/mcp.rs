//! MCP command implementation.

use super::{open_knowledge_base, tool_context};
use crate::cli::preflight::{self, Operation};
use crate::config::Settings;
use crate::mcp::McpServer;
use anyhow::Result;

/// Run the MCP server.
pub async fn run_mcp(settings: Settings) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;

    let kb = open_knowledge_base(&settings)?;
    let server = McpServer::new(tool_context(&settings, kb.clone())?);
    server.run().await?;

    kb.shutdown().await?;
    Ok(())
}
