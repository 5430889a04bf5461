//! Action discovery and execution tools.

use crate::error::ToolError;
use crate::membrane::ApiRequest;
use crate::schema::{Field, ParameterSchema, ValidatedInput};
use crate::tools::{Tool, ToolContext};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// `GET /actions?connectionId=&intent=[&limit=]`
#[derive(Debug, Default)]
pub struct SearchTools;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchToolsArgs {
    connection_id: String,
    intent: String,
    limit: Option<u32>,
}

#[async_trait]
impl Tool for SearchTools {
    fn name(&self) -> &str {
        "search-tools"
    }

    fn description(&self) -> &str {
        "Search for actions (tools) available on a connection. Describe what you want to do in natural language."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .field(Field::string("connectionId").describe("Connection ID to search actions for"))
            .field(
                Field::string("intent")
                    .max_length(200)
                    .describe("Natural language description of what you want to do"),
            )
            .field(
                Field::integer("limit")
                    .range(1, 100)
                    .optional()
                    .describe("Max results (default 10)"),
            )
    }

    async fn execute(&self, input: ValidatedInput, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: SearchToolsArgs = input.parse(self.name())?;
        let request = ApiRequest::get(["actions"])
            .query("connectionId", &args.connection_id)
            .query("intent", &args.intent)
            .query_opt("limit", args.limit);
        ctx.send(request).await
    }
}

/// `POST /actions/{actionId}/run?connectionId=` with body `{"input": ...}`.
#[derive(Debug, Default)]
pub struct RunTool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunToolArgs {
    action_id: String,
    connection_id: String,
    input: Option<Map<String, Value>>,
}

#[async_trait]
impl Tool for RunTool {
    fn name(&self) -> &str {
        "run-tool"
    }

    fn description(&self) -> &str {
        "Run an action on a connection. Provide input matching the action's inputSchema."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .field(Field::string("actionId").describe("Action ID to run"))
            .field(Field::string("connectionId").describe("Connection ID to run the action on"))
            .field(
                Field::record("input")
                    .optional()
                    .describe("Action input parameters"),
            )
    }

    async fn execute(&self, input: ValidatedInput, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: RunToolArgs = input.parse(self.name())?;
        let request = ApiRequest::post(["actions", args.action_id.as_str(), "run"])
            .query("connectionId", &args.connection_id)
            .json(json!({ "input": args.input.unwrap_or_default() }));
        ctx.send(request).await
    }
}
