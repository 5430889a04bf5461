//! Membrane Agent session lifecycle tools.

use crate::error::ToolError;
use crate::membrane::ApiRequest;
use crate::schema::{Field, ParameterSchema, ValidatedInput};
use crate::tools::{Tool, ToolContext};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionArgs {
    session_id: String,
}

fn session_id_field() -> Field {
    Field::string("sessionId").describe("Agent session ID")
}

/// `POST /agent/sessions` with body `{"prompt": ...}`.
#[derive(Debug, Default)]
pub struct CreateAgentSession;

#[derive(Debug, Deserialize)]
struct CreateAgentSessionArgs {
    prompt: String,
}

#[async_trait]
impl Tool for CreateAgentSession {
    fn name(&self) -> &str {
        "create-agent-session"
    }

    fn description(&self) -> &str {
        "Create a Membrane Agent session to build connectors or actions. Provide a prompt describing what to build."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().field(Field::string("prompt").describe("Task description for the agent"))
    }

    async fn execute(&self, input: ValidatedInput, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: CreateAgentSessionArgs = input.parse(self.name())?;
        ctx.send(ApiRequest::post(["agent", "sessions"]).json(json!({ "prompt": args.prompt })))
            .await
    }
}

/// `GET /agent/sessions/{sessionId}[?wait=&timeout=]`
///
/// `wait`/`timeout` are long-poll hints for the server, not client-side deadlines.
#[derive(Debug, Default)]
pub struct GetAgentSession;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetAgentSessionArgs {
    session_id: String,
    wait: Option<bool>,
    timeout: Option<u32>,
}

#[async_trait]
impl Tool for GetAgentSession {
    fn name(&self) -> &str {
        "get-agent-session"
    }

    fn description(&self) -> &str {
        "Get agent session status. Use wait=true to long-poll until the session is idle or the timeout is reached."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .field(session_id_field())
            .field(
                Field::boolean("wait")
                    .optional()
                    .describe("If true, long-poll until session is idle"),
            )
            .field(
                Field::integer("timeout")
                    .range(1, 60)
                    .optional()
                    .describe("Max wait in seconds (default 30)"),
            )
    }

    async fn execute(&self, input: ValidatedInput, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: GetAgentSessionArgs = input.parse(self.name())?;
        let request = ApiRequest::get(["agent", "sessions", args.session_id.as_str()])
            .query_opt("wait", args.wait)
            .query_opt("timeout", args.timeout);
        ctx.send(request).await
    }
}

/// `POST /agent/sessions/{sessionId}/message` with body `{"input": ...}`.
#[derive(Debug, Default)]
pub struct SendAgentMessage;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendAgentMessageArgs {
    session_id: String,
    input: String,
}

#[async_trait]
impl Tool for SendAgentMessage {
    fn name(&self) -> &str {
        "send-agent-message"
    }

    fn description(&self) -> &str {
        "Send a follow-up message to an active agent session."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .field(session_id_field())
            .field(Field::string("input").describe("Message to send"))
    }

    async fn execute(&self, input: ValidatedInput, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: SendAgentMessageArgs = input.parse(self.name())?;
        let request = ApiRequest::post(["agent", "sessions", args.session_id.as_str(), "message"])
            .json(json!({ "input": args.input }));
        ctx.send(request).await
    }
}

/// `POST /agent/sessions/{sessionId}/interrupt`
#[derive(Debug, Default)]
pub struct AbortAgentSession;

#[async_trait]
impl Tool for AbortAgentSession {
    fn name(&self) -> &str {
        "abort-agent-session"
    }

    fn description(&self) -> &str {
        "Abort an active agent session."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().field(session_id_field())
    }

    async fn execute(&self, input: ValidatedInput, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: SessionArgs = input.parse(self.name())?;
        ctx.send(ApiRequest::post([
            "agent",
            "sessions",
            args.session_id.as_str(),
            "interrupt",
        ]))
        .await
    }
}
