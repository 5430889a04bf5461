//! Connection and connector tools.

use crate::error::ToolError;
use crate::membrane::ApiRequest;
use crate::schema::{Field, ParameterSchema, ValidatedInput};
use crate::tools::{Tool, ToolContext};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// `GET /connections`
#[derive(Debug, Default)]
pub struct ListConnections;

#[async_trait]
impl Tool for ListConnections {
    fn name(&self) -> &str {
        "list-connections"
    }

    fn description(&self) -> &str {
        "List all connections. A connection is an authenticated link to an external app (e.g. Slack, HubSpot)."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
    }

    async fn execute(&self, _input: ValidatedInput, ctx: &ToolContext) -> Result<Value, ToolError> {
        ctx.send(ApiRequest::get(["connections"])).await
    }
}

/// `GET /search?q=&elementType=connector[&limit=]`
#[derive(Debug, Default)]
pub struct SearchConnectors;

#[derive(Debug, Deserialize)]
struct SearchConnectorsArgs {
    q: String,
    limit: Option<u32>,
}

#[async_trait]
impl Tool for SearchConnectors {
    fn name(&self) -> &str {
        "search-connectors"
    }

    fn description(&self) -> &str {
        "Search for available connectors by keyword. A connector is a pre-built adapter for an external app. Returns matching connectors that can be used to create connections."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .field(
                Field::string("q")
                    .min_length(1)
                    .max_length(200)
                    .describe("Search query"),
            )
            .field(
                Field::integer("limit")
                    .range(1, 100)
                    .optional()
                    .describe("Max results"),
            )
    }

    async fn execute(&self, input: ValidatedInput, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: SearchConnectorsArgs = input.parse(self.name())?;
        let request = ApiRequest::get(["search"])
            .query("q", &args.q)
            .query("elementType", "connector")
            .query_opt("limit", args.limit);
        ctx.send(request).await
    }
}

/// `POST /connection-requests` with the validated input as body.
#[derive(Debug, Default)]
pub struct RequestConnection;

#[async_trait]
impl Tool for RequestConnection {
    fn name(&self) -> &str {
        "request-connection"
    }

    fn description(&self) -> &str {
        "Create a connection request so the user can authenticate with an external app. Returns a URL the user must open to complete authentication."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .field(Field::string("connectorId").optional().describe("Connector ID"))
            .field(Field::string("integrationId").optional().describe("Integration ID"))
            .field(Field::string("integrationKey").optional().describe("Integration key"))
            .field(
                Field::string("connectionId")
                    .optional()
                    .describe("Existing connection ID (for reconnecting)"),
            )
            .field(Field::string("name").optional().describe("Custom connection name"))
    }

    async fn execute(&self, input: ValidatedInput, ctx: &ToolContext) -> Result<Value, ToolError> {
        ctx.send(ApiRequest::post(["connection-requests"]).json(input.into_value()))
            .await
    }
}

/// `GET /connection-requests/{requestId}`
#[derive(Debug, Default)]
pub struct CheckConnectionResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckConnectionResultArgs {
    request_id: String,
}

#[async_trait]
impl Tool for CheckConnectionResult {
    fn name(&self) -> &str {
        "check-connection-result"
    }

    fn description(&self) -> &str {
        "Check the status of a connection request. Poll until status is \"success\" or \"error\"."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().field(Field::string("requestId").describe("Connection request ID"))
    }

    async fn execute(&self, input: ValidatedInput, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: CheckConnectionResultArgs = input.parse(self.name())?;
        ctx.send(ApiRequest::get(["connection-requests", args.request_id.as_str()]))
            .await
    }
}
