//! Tool definitions and implementations for the tutoring agent.

use crate::error::{MentorError, Result};
use crate::knowledge::KnowledgeBase;
use crate::search::WebSearch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Available tools for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum ToolCall {
    /// Look up similar solved problems in the knowledge base.
    RetrieveData { query: String },

    /// Search the web.
    WebSearch { query: String },
}

/// Tool execution context with access to the knowledge base and web search.
pub struct ToolContext {
    pub knowledge_base: Arc<KnowledgeBase>,
    pub web: Arc<dyn WebSearch>,
    /// Knowledge units returned per `retrieve_data` call.
    pub top_k: usize,
}

impl ToolContext {
    /// Create a new tool context.
    pub fn new(knowledge_base: Arc<KnowledgeBase>, web: Arc<dyn WebSearch>, top_k: usize) -> Self {
        Self {
            knowledge_base,
            web,
            top_k,
        }
    }

    /// Execute a tool call and return the result as a string.
    pub async fn execute(&self, tool: &ToolCall) -> Result<String> {
        match tool {
            ToolCall::RetrieveData { query } => self.execute_retrieve_data(query).await,
            ToolCall::WebSearch { query } => self.execute_web_search(query).await,
        }
    }

    async fn execute_retrieve_data(&self, query: &str) -> Result<String> {
        let results = self.knowledge_base.search(query, self.top_k).await?;

        if results.is_empty() {
            return Ok("No documents found for your query.".to_string());
        }

        Ok(results
            .iter()
            .map(|r| r.document.content.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    async fn execute_web_search(&self, query: &str) -> Result<String> {
        let hits = self.web.search(query).await?;

        if hits.is_empty() {
            return Ok("No web results found.".to_string());
        }

        Ok(hits
            .iter()
            .map(|h| h.content.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Get OpenAI function/tool definitions for the agent.
pub fn tool_definitions() -> Vec<async_openai::types::ChatCompletionTool> {
    use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

    let query_only = serde_json::json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The search query"
            }
        },
        "required": ["query"]
    });

    vec![
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "retrieve_data".to_string(),
                description: Some(
                    "Retrieve similar solved math problems from the knowledge base. \
                    Always call this first."
                        .to_string(),
                ),
                parameters: Some(query_only.clone()),
                strict: None,
            },
        },
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: "web_search".to_string(),
                description: Some(
                    "Search the web for formulas, definitions or worked examples. \
                    Use this when the knowledge base results are insufficient."
                        .to_string(),
                ),
                parameters: Some(query_only),
                strict: None,
            },
        },
    ]
}

/// Parse a tool call from the OpenAI response format.
pub fn parse_tool_call(name: &str, arguments: &str) -> Result<ToolCall> {
    let args: serde_json::Value = serde_json::from_str(arguments)
        .map_err(|e| MentorError::Agent(format!("Invalid tool arguments: {}", e)))?;

    let query = || {
        args["query"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| MentorError::Agent("Missing 'query' argument".to_string()))
    };

    match name {
        "retrieve_data" => Ok(ToolCall::RetrieveData { query: query()? }),
        "web_search" => Ok(ToolCall::WebSearch { query: query()? }),
        _ => Err(MentorError::Agent(format!("Unknown tool: {}", name))),
    }
}
