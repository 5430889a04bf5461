//! Tool trait definition.

use crate::error::ToolError;
use crate::schema::{ParameterSchema, ValidatedInput};
use crate::tools::ToolContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use tracing::warn;

/// Framework-neutral description of a tool, with parameters projected to JSON Schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A Membrane operation callable by an agent.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    /// Tool name (used in function calls and dispatch tables).
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// Declared input fields.
    fn parameters(&self) -> ParameterSchema;

    /// Run the operation on input that already passed [`Tool::parameters`].
    async fn execute(&self, input: ValidatedInput, ctx: &ToolContext) -> Result<Value, ToolError>;

    /// Validate raw arguments, then execute. Invalid input never reaches the network.
    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let input = self.parameters().validate(&args).map_err(|errors| {
            warn!("Rejected arguments for {}: {}", self.name(), errors);
            ToolError::invalid_input(self.name(), errors)
        })?;
        // Input rejected while building the request is reported under this tool's name.
        self.execute(input, ctx).await.map_err(|err| match err {
            ToolError::InvalidInput { errors, .. } => ToolError::invalid_input(self.name(), errors),
            other => other,
        })
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters().to_json_schema(),
        }
    }
}
