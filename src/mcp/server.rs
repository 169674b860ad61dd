//! MCP server implementation.

use super::protocol::*;
use super::tools::get_tools;
use crate::agent::{parse_tool_call, ToolContext};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "mathmentor";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for MathMentor.
pub struct McpServer {
    tools: ToolContext,
}

impl McpServer {
    /// Create a new MCP server over an opened tool context.
    pub fn new(tools: ToolContext) -> Self {
        Self { tools }
    }

    /// Run the MCP server (reads from stdin, writes to stdout).
    pub async fn run(&self) -> anyhow::Result<()> {
        info!("MathMentor MCP server starting");
        self.serve(io::stdin().lock(), io::stdout()).await
    }

    /// Serve newline-delimited JSON-RPC from `input` until EOF.
    pub async fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => {
                    warn!("Failed to parse request: {}", e);
                    Some(JsonRpcResponse::error(None, ErrorCode::ParseError, "Parse error"))
                }
            };

            if let Some(response) = response {
                writeln!(output, "{}", serde_json::to_string(&response)?)?;
                output.flush()?;
            }
        }

        info!("MCP input closed");
        Ok(())
    }

    /// Handle a single JSON-RPC request. Notifications get no response.
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                ErrorCode::InvalidRequest,
                "Invalid Request",
            ));
        }

        if request.id.is_none() {
            debug!("Notification: {}", request.method);
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => JsonRpcResponse::result(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                ErrorCode::MethodNotFound,
                format!("Method not found: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION,
            capabilities: json!({ "tools": { "listChanged": false } }),
            server_info: ServerInfo {
                name: SERVER_NAME,
                version: SERVER_VERSION,
            },
        };

        success(id, result)
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        success(id, ToolsListResult { tools: get_tools() })
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    ErrorCode::InvalidParams,
                    format!("Invalid params: {}", e),
                )
            }
            None => {
                return JsonRpcResponse::error(id, ErrorCode::InvalidParams, "Missing params")
            }
        };

        let arguments = params.arguments.unwrap_or_else(|| json!({})).to_string();
        info!("MCP tool call: {} with args: {}", params.name, arguments);

        let result = match parse_tool_call(&params.name, &arguments) {
            Ok(tool) => match self.tools.execute(&tool).await {
                Ok(text) => ToolCallResult::text(text),
                Err(e) => ToolCallResult::failure(format!("Tool error: {}", e)),
            },
            Err(e) => ToolCallResult::failure(e.to_string()),
        };

        success(id, result)
    }
}

fn success<T: serde::Serialize>(id: Option<Value>, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::result(id, value),
        Err(e) => JsonRpcResponse::error(id, ErrorCode::InternalError, format!("Internal error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{Embedder, HashingEmbedder};
    use crate::error::Result;
    use crate::knowledge::KnowledgeBase;
    use crate::search::{SearchHit, WebSearch};
    use crate::vector_store::knowledge_unit;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoWeb;

    #[async_trait]
    impl WebSearch for NoWeb {
        async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
            Ok(vec![])
        }
    }

    async fn server(dir: &std::path::Path) -> McpServer {
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(64));
        let kb = KnowledgeBase::create(
            dir.join("vector_store"),
            embedder,
            vec![knowledge_unit("What is 12 * 12?", "144")],
            false,
        )
        .await
        .unwrap();
        McpServer::new(ToolContext::new(Arc::new(kb), Arc::new(NoWeb), 3))
    }

    async fn exchange(server: &McpServer, input: &str) -> Vec<Value> {
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_list_and_notifications() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path()).await;

        let responses = exchange(
            &server,
            concat!(
                r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
                "\n",
                r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
                "\n",
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
                "\n",
            ),
        )
        .await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "mathmentor");
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["result"]["tools"][0]["name"], "retrieve_data");
    }

    #[tokio::test]
    async fn test_tools_call_retrieve_data() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path()).await;

        let responses = exchange(
            &server,
            r#"{"jsonrpc":"2.0","id":"a","method":"tools/call","params":{"name":"retrieve_data","arguments":{"query":"12 * 12"}}}"#,
        )
        .await;

        let result = &responses[0]["result"];
        assert_eq!(result["content"][0]["text"], "Q: What is 12 * 12?\nA: 144");
        assert!(result.get("isError").is_none());
    }

    #[tokio::test]
    async fn test_errors() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path()).await;

        let responses = exchange(
            &server,
            concat!(
                "not json\n",
                r#"{"jsonrpc":"2.0","id":1,"method":"resources/list"}"#,
                "\n",
                r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"solve","arguments":{}}}"#,
                "\n",
            ),
        )
        .await;

        assert_eq!(responses[0]["error"]["code"], ErrorCode::ParseError.code());
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[1]["error"]["code"], ErrorCode::MethodNotFound.code());
        assert_eq!(responses[2]["result"]["isError"], true);
    }
}
