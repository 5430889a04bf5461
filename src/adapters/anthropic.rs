//! Anthropic Messages API tool use (`tools` + `tool_use` / `tool_result` blocks).

use super::{encode_result, Dispatcher, Framework, FrameworkAdapter};
use crate::config::MembraneConfig;
use crate::error::ToolError;
use crate::tools::ToolCatalog;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A `tool_use` content block from an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub input: Value,
}

/// A `tool_result` content block for the following user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResultBlock {
    pub r#type: String,
    pub tool_use_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

pub fn tool_definitions(catalog: &ToolCatalog) -> Vec<AnthropicTool> {
    catalog
        .definitions()
        .into_iter()
        .map(|def| AnthropicTool {
            name: def.name,
            description: def.description,
            input_schema: def.parameters,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct AnthropicAdapter {
    dispatcher: Dispatcher,
}

impl AnthropicAdapter {
    pub fn new(catalog: &ToolCatalog, config: &MembraneConfig) -> Result<Self, ToolError> {
        Ok(Self::from_dispatcher(Dispatcher::new(catalog, config)?))
    }

    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Answer a `tool_use` block; failures are reported with `is_error: true`.
    pub async fn tool_result(&self, tool_use: &ToolUse) -> ToolResultBlock {
        let (content, is_error) = match self.invoke(tool_use.clone()).await {
            Ok(output) => (output, false),
            Err(err) => (err.to_string(), true),
        };
        ToolResultBlock {
            r#type: "tool_result".into(),
            tool_use_id: tool_use.id.clone(),
            content,
            is_error,
        }
    }
}

#[async_trait]
impl FrameworkAdapter for AnthropicAdapter {
    type Tool = AnthropicTool;
    type Call = ToolUse;
    type Output = String;

    fn framework(&self) -> Framework {
        Framework::Anthropic
    }

    fn tools(&self) -> Vec<AnthropicTool> {
        tool_definitions(self.dispatcher.catalog())
    }

    fn tool_name(tool: &AnthropicTool) -> &str {
        &tool.name
    }

    async fn invoke(&self, call: ToolUse) -> Result<String, ToolError> {
        // Some clients send `null` input for parameterless tools.
        let input = match call.input {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let result = self.dispatcher.dispatch(&call.name, input).await?;
        Ok(encode_result(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::standard_catalog;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn manifest_uses_input_schema_key() {
        let tools = tool_definitions(standard_catalog());
        let value = serde_json::to_value(&tools[0]).expect("serialize");
        assert_eq!(value["name"], "list-connections");
        assert_eq!(
            value["input_schema"],
            json!({ "type": "object", "properties": {} })
        );
    }

    #[test]
    fn successful_results_omit_is_error() {
        let block = ToolResultBlock {
            r#type: "tool_result".into(),
            tool_use_id: "toolu_1".into(),
            content: "[]".into(),
            is_error: false,
        };
        assert_eq!(
            serde_json::to_value(&block).expect("serialize"),
            json!({ "type": "tool_result", "tool_use_id": "toolu_1", "content": "[]" })
        );
    }
}
