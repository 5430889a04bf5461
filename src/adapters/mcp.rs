//! Model Context Protocol `tools/list` and `tools/call`, on the `rmcp` protocol model.

use super::{encode_result, Dispatcher, Framework, FrameworkAdapter};
use crate::config::MembraneConfig;
use crate::error::{ErrorKind, ToolError};
use crate::tools::ToolCatalog;
use async_trait::async_trait;
use serde_json::{Map, Value};

pub use rmcp::model::{CallToolRequestParam, CallToolResult, Content, ListToolsResult, Tool as McpTool};

/// `tools/list` result for `catalog`; `inputSchema` is the catalog schema projection.
pub fn list_tools(catalog: &ToolCatalog) -> ListToolsResult {
    let tools = catalog
        .definitions()
        .into_iter()
        .map(|def| {
            let schema = match def.parameters {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            McpTool::new(def.name, def.description, schema)
        })
        .collect();
    ListToolsResult::with_all_items(tools)
}

/// Successful `tools/call` result carrying the JSON-encoded tool output as text.
pub fn text_result(result: &Value) -> CallToolResult {
    CallToolResult::success(vec![Content::text(encode_result(result))])
}

/// `tools/call` result with `isError: true`.
pub fn error_result(err: &ToolError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(err.to_string())])
}

#[derive(Debug, Clone)]
pub struct McpAdapter {
    dispatcher: Dispatcher,
}

impl McpAdapter {
    pub fn new(catalog: &ToolCatalog, config: &MembraneConfig) -> Result<Self, ToolError> {
        Ok(Self::from_dispatcher(Dispatcher::new(catalog, config)?))
    }

    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn list_tools(&self) -> ListToolsResult {
        list_tools(self.dispatcher.catalog())
    }

    /// Handle `tools/call` the way MCP servers report outcomes: execution failures
    /// become `isError` results, while an unknown tool stays a protocol error.
    pub async fn call_tool(&self, params: CallToolRequestParam) -> Result<CallToolResult, ToolError> {
        match self.invoke(params).await {
            Ok(result) => Ok(result),
            Err(err) if err.kind() == ErrorKind::UnknownTool => Err(err),
            Err(err) => Ok(error_result(&err)),
        }
    }
}

#[async_trait]
impl FrameworkAdapter for McpAdapter {
    type Tool = McpTool;
    type Call = CallToolRequestParam;
    type Output = CallToolResult;

    fn framework(&self) -> Framework {
        Framework::Mcp
    }

    fn tools(&self) -> Vec<McpTool> {
        self.list_tools().tools
    }

    fn tool_name(tool: &McpTool) -> &str {
        tool.name.as_ref()
    }

    async fn invoke(&self, call: CallToolRequestParam) -> Result<CallToolResult, ToolError> {
        let args = Value::Object(call.arguments.unwrap_or_default());
        let result = self.dispatcher.dispatch(&call.name, args).await?;
        Ok(text_result(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::standard_catalog;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn call(value: Value) -> CallToolRequestParam {
        serde_json::from_value(value).expect("tools/call params")
    }

    fn adapter() -> McpAdapter {
        McpAdapter::new(
            standard_catalog(),
            &MembraneConfig::new("tok").with_api_url("http://127.0.0.1:9"),
        )
        .expect("adapter")
    }

    #[test]
    fn list_tools_uses_camel_case_schema_key() {
        let listed = serde_json::to_value(list_tools(standard_catalog())).expect("serialize");
        let first = &listed["tools"][0];
        assert_eq!(first["name"], "list-connections");
        assert_eq!(first["inputSchema"], json!({ "type": "object", "properties": {} }));
        assert!(first.get("input_schema").is_none());
        assert_eq!(listed["tools"].as_array().map(Vec::len), Some(10));
    }

    #[test]
    fn error_results_serialize_as_text_content() {
        let value = serde_json::to_value(error_result(&ToolError::Cancelled)).expect("serialize");
        assert_eq!(value["isError"], true);
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "Membrane API request was cancelled");
    }

    #[test]
    fn call_params_allow_missing_arguments() {
        let params = call(json!({ "name": "list-connections" }));
        assert_eq!(params.name, "list-connections");
        assert_eq!(params.arguments, None);
    }

    #[tokio::test]
    async fn unknown_tool_stays_a_protocol_error() {
        let err = adapter()
            .call_tool(call(json!({ "name": "nope" })))
            .await
            .expect_err("unknown");
        assert!(matches!(err, ToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn invalid_arguments_become_error_results() {
        let result = adapter()
            .call_tool(call(json!({ "name": "run-tool", "arguments": {} })))
            .await
            .expect("tool-level error");
        assert_eq!(result.is_error, Some(true));
    }
}
