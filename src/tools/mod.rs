pub mod actions;
pub mod agent_sessions;
pub mod catalog;
pub mod connections;
pub mod traits;

pub use catalog::ToolCatalog;
pub use traits::{Tool, ToolDefinition};

use crate::config::MembraneConfig;
use crate::error::ToolError;
use crate::membrane::{ApiRequest, MembraneClient, RequestOptions};
use serde_json::Value;
use std::sync::{Arc, OnceLock};

// ---------------------------------------------------------------------------
// Tool execution context
// ---------------------------------------------------------------------------

/// What a tool needs to run: the client built from the configuration and per-call options.
#[derive(Debug, Clone)]
pub struct ToolContext {
    client: MembraneClient,
    options: RequestOptions,
}

impl ToolContext {
    pub fn new(config: &MembraneConfig) -> Result<Self, ToolError> {
        Ok(Self::from_client(MembraneClient::new(config)?))
    }

    pub fn from_client(client: MembraneClient) -> Self {
        Self {
            client,
            options: RequestOptions::default(),
        }
    }

    /// Apply a deadline and/or cancellation token to every request made through this context.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn client(&self) -> &MembraneClient {
        &self.client
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Send one request with this context's options.
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ToolError> {
        self.client.request(request, &self.options).await
    }
}

// ---------------------------------------------------------------------------
// Standard catalog
// ---------------------------------------------------------------------------

/// Fresh instances of the ten Membrane tools, in catalog order.
pub fn standard_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(connections::ListConnections),
        Arc::new(connections::SearchConnectors),
        Arc::new(actions::SearchTools),
        Arc::new(actions::RunTool),
        Arc::new(connections::RequestConnection),
        Arc::new(connections::CheckConnectionResult),
        Arc::new(agent_sessions::CreateAgentSession),
        Arc::new(agent_sessions::GetAgentSession),
        Arc::new(agent_sessions::SendAgentMessage),
        Arc::new(agent_sessions::AbortAgentSession),
    ]
}

/// Process-wide immutable catalog of the standard tools, built on first use.
pub fn standard_catalog() -> &'static ToolCatalog {
    static CATALOG: OnceLock<ToolCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| ToolCatalog::from_unique(standard_tools()))
}
