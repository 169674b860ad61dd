//! MCP tool definitions for MathMentor.

use super::protocol::Tool;
use crate::agent::tool_definitions;
use serde_json::json;

/// Get all available tools, mirroring the tutor's function tools.
pub fn get_tools() -> Vec<Tool> {
    tool_definitions()
        .into_iter()
        .map(|t| Tool {
            name: t.function.name,
            description: t.function.description.unwrap_or_default(),
            input_schema: t
                .function
                .parameters
                .unwrap_or_else(|| json!({"type": "object", "properties": {}})),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools_require_query() {
        let tools = get_tools();
        assert_eq!(tools.len(), 2);
        for tool in &tools {
            assert_eq!(tool.input_schema["required"][0], "query");
            assert!(!tool.description.is_empty());
        }
    }
}
