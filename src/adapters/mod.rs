//! Projections of a [`ToolCatalog`] into the shapes agent frameworks register.
//!
//! Every adapter follows the same contract:
//! - one native tool entry per catalog tool, names identical, no drops or duplicates;
//! - parameters are the catalog schema's JSON Schema projection, unchanged;
//! - invoking a native entry is equivalent to executing the catalog tool directly
//!   (errors may be re-encoded, never swallowed);
//! - the adapter holds nothing beyond the [`Dispatcher`] built at construction.
//!
//! Adding a framework means writing one adapter; the catalog is never touched.

pub mod anthropic;
pub mod mcp;
pub mod openai;
pub mod toolset;

pub use anthropic::AnthropicAdapter;
pub use mcp::McpAdapter;
pub use openai::OpenAiAdapter;
pub use toolset::ToolSet;

use crate::config::MembraneConfig;
use crate::error::{FieldError, ToolError};
use crate::membrane::RequestOptions;
use crate::tools::{ToolCatalog, ToolContext};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Shared dispatch path: name lookup, argument decoding, validation, execution.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    catalog: ToolCatalog,
    ctx: ToolContext,
}

impl Dispatcher {
    pub fn new(catalog: &ToolCatalog, config: &MembraneConfig) -> Result<Self, ToolError> {
        Ok(Self::with_context(catalog, ToolContext::new(config)?))
    }

    pub fn with_context(catalog: &ToolCatalog, ctx: ToolContext) -> Self {
        Self {
            catalog: catalog.clone(),
            ctx,
        }
    }

    /// Apply a deadline and/or cancellation token to every dispatched call.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.ctx = self.ctx.with_options(options);
        self
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    /// Execute `name` with already-decoded arguments.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let result = self.catalog.execute(name, args, &self.ctx).await;
        if let Err(err) = &result {
            warn!("Tool {} failed ({}): {}", name, err.kind(), err);
        }
        result
    }

    /// Execute `name` with a raw JSON argument string as emitted by function-calling models.
    ///
    /// The name is resolved before the arguments are decoded, so an unknown tool
    /// is reported as such even when its arguments are garbage.
    pub async fn dispatch_json(&self, name: &str, arguments: &str) -> Result<Value, ToolError> {
        self.catalog.require(name)?;
        let args = parse_arguments(name, arguments)?;
        self.dispatch(name, args).await
    }
}

/// Decode a function-call argument string. Blank input means "no arguments".
pub fn parse_arguments(tool: &str, arguments: &str) -> Result<Value, ToolError> {
    if arguments.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(arguments).map_err(|err| {
        debug!("Undecodable arguments for {}: {}", tool, arguments);
        ToolError::invalid_input(
            tool,
            vec![FieldError::new(
                "",
                format!("arguments are not valid JSON: {}", err),
            )],
        )
    })
}

/// Serialize a tool result the way string-returning frameworks expect it.
pub fn encode_result(result: &Value) -> String {
    result.to_string()
}

/// The contract every framework adapter implements.
#[async_trait]
pub trait FrameworkAdapter: Send + Sync {
    /// Native tool manifest entry.
    type Tool: Serialize + Send;
    /// Invocation as issued by the framework.
    type Call: Send;
    /// Result handed back to the framework.
    type Output: Send;

    fn framework(&self) -> Framework;

    /// One entry per catalog tool, in catalog order.
    fn tools(&self) -> Vec<Self::Tool>;

    /// Name carried by a native entry.
    fn tool_name(tool: &Self::Tool) -> &str;

    /// Execute a framework-issued call.
    async fn invoke(&self, call: Self::Call) -> Result<Self::Output, ToolError>;
}

/// Supported target frameworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framework {
    OpenAi,
    Anthropic,
    Mcp,
    ToolSet,
}

impl Framework {
    pub const ALL: [Framework; 4] = [Self::OpenAi, Self::Anthropic, Self::Mcp, Self::ToolSet];

    /// Manifest for `catalog` in this framework's registration format. Needs no credential.
    pub fn manifest(&self, catalog: &ToolCatalog) -> Result<Value, serde_json::Error> {
        match self {
            Self::OpenAi => serde_json::to_value(openai::tool_definitions(catalog)),
            Self::Anthropic => serde_json::to_value(anthropic::tool_definitions(catalog)),
            Self::Mcp => serde_json::to_value(mcp::list_tools(catalog)),
            Self::ToolSet => Ok(toolset::manifest(catalog)),
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Mcp => write!(f, "mcp"),
            Self::ToolSet => write!(f, "toolset"),
        }
    }
}

impl FromStr for Framework {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "mcp" => Ok(Self::Mcp),
            "toolset" | "vercel" => Ok(Self::ToolSet),
            other => Err(format!("unknown framework: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::tools::standard_catalog;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn blank_arguments_mean_empty_object() {
        assert_eq!(parse_arguments("list-connections", "").expect("blank"), json!({}));
        assert_eq!(
            parse_arguments("list-connections", "  \n").expect("whitespace"),
            json!({})
        );
    }

    #[test]
    fn malformed_arguments_are_validation_errors() {
        let err = parse_arguments("run-tool", "{not json").expect_err("malformed");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("arguments are not valid JSON"));
    }

    #[test]
    fn framework_names_round_trip() {
        for framework in Framework::ALL {
            assert_eq!(framework.to_string().parse::<Framework>(), Ok(framework));
        }
        assert_eq!("vercel".parse::<Framework>(), Ok(Framework::ToolSet));
        assert!("langchain".parse::<Framework>().is_err());
    }

    #[test]
    fn opencode_is_not_a_tool_set_alias() {
        // OpenCode plugins return text, while the tool set hands back raw JSON.
        assert_eq!(
            "opencode".parse::<Framework>(),
            Err("unknown framework: opencode".to_string())
        );
    }

    #[test]
    fn manifests_cover_the_whole_catalog() {
        for framework in Framework::ALL {
            let manifest = framework.manifest(standard_catalog()).expect("manifest");
            let count = match &manifest {
                Value::Array(entries) => entries.len(),
                Value::Object(map) if framework == Framework::Mcp => {
                    map["tools"].as_array().map(Vec::len).unwrap_or(0)
                }
                Value::Object(map) => map.len(),
                _ => 0,
            };
            assert_eq!(count, 10, "{}", framework);
        }
    }

    #[tokio::test]
    async fn unknown_tool_wins_over_bad_arguments() {
        let dispatcher = Dispatcher::new(
            standard_catalog(),
            &MembraneConfig::new("tok").with_api_url("http://127.0.0.1:9"),
        )
        .expect("dispatcher");
        let err = dispatcher
            .dispatch_json("does-not-exist", "{not json")
            .await
            .expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::UnknownTool);
    }
}
