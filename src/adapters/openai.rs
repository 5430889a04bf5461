//! OpenAI-compatible function calling (Chat Completions `tools` + `tool_calls`).

use super::{encode_result, Dispatcher, Framework, FrameworkAdapter};
use crate::config::MembraneConfig;
use crate::error::ToolError;
use crate::tools::ToolCatalog;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{"type": "function", "function": {...}}` entry of the `tools` request field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiTool {
    pub r#type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// One entry of an assistant message's `tool_calls`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(default = "function_type")]
    pub r#type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, exactly as the model produced them.
    pub arguments: String,
}

/// `{"role": "tool", ...}` message answering a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMessage {
    pub role: String,
    pub tool_call_id: String,
    pub content: String,
}

fn function_type() -> String {
    "function".into()
}

/// Build the `tools` array for `catalog`.
pub fn tool_definitions(catalog: &ToolCatalog) -> Vec<OpenAiTool> {
    catalog
        .definitions()
        .into_iter()
        .map(|def| OpenAiTool {
            r#type: function_type(),
            function: FunctionDefinition {
                name: def.name,
                description: def.description,
                parameters: def.parameters,
            },
        })
        .collect()
}

/// Tools manifest plus an executor for `tool_calls`.
#[derive(Debug, Clone)]
pub struct OpenAiAdapter {
    dispatcher: Dispatcher,
}

impl OpenAiAdapter {
    pub fn new(catalog: &ToolCatalog, config: &MembraneConfig) -> Result<Self, ToolError> {
        Ok(Self::from_dispatcher(Dispatcher::new(catalog, config)?))
    }

    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Answer a tool call with a `tool` message; failures become `Error: ...` content
    /// so the model can react instead of the loop aborting.
    pub async fn tool_message(&self, call: &OpenAiToolCall) -> ToolMessage {
        let content = match self.invoke(call.clone()).await {
            Ok(output) => output,
            Err(err) => format!("Error: {}", err),
        };
        ToolMessage {
            role: "tool".into(),
            tool_call_id: call.id.clone(),
            content,
        }
    }
}

#[async_trait]
impl FrameworkAdapter for OpenAiAdapter {
    type Tool = OpenAiTool;
    type Call = OpenAiToolCall;
    type Output = String;

    fn framework(&self) -> Framework {
        Framework::OpenAi
    }

    fn tools(&self) -> Vec<OpenAiTool> {
        tool_definitions(self.dispatcher.catalog())
    }

    fn tool_name(tool: &OpenAiTool) -> &str {
        &tool.function.name
    }

    async fn invoke(&self, call: OpenAiToolCall) -> Result<String, ToolError> {
        let result = self
            .dispatcher
            .dispatch_json(&call.function.name, &call.function.arguments)
            .await?;
        Ok(encode_result(&result))
    }
}
