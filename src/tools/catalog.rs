//! Ordered, name-unique collection of tools.

use crate::error::ToolError;
use crate::tools::{Tool, ToolContext, ToolDefinition};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Tools in insertion order. Cloning shares the tool instances.
#[derive(Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolCatalog {
    /// Build a catalog, rejecting duplicate names.
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self, ToolError> {
        let mut seen = HashSet::new();
        for tool in &tools {
            if !seen.insert(tool.name().to_string()) {
                return Err(ToolError::DuplicateTool(tool.name().to_string()));
            }
        }
        Ok(Self { tools })
    }

    /// Build a catalog from tools whose names are fixed at compile time.
    pub(crate) fn from_unique(tools: Vec<Arc<dyn Tool>>) -> Self {
        debug_assert!(
            Self::new(tools.clone()).is_ok(),
            "duplicate name in a built-in tool list"
        );
        Self { tools }
    }

    /// Append a tool, rejecting a name already present.
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Result<Self, ToolError> {
        if self.get(tool.name()).is_some() {
            return Err(ToolError::DuplicateTool(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(self)
    }

    /// Catalog restricted to `names`, keeping catalog order.
    pub fn select(&self, names: &[&str]) -> Result<Self, ToolError> {
        if let Some(missing) = names.iter().find(|name| self.get(name).is_none()) {
            return Err(ToolError::UnknownTool(missing.to_string()));
        }
        Ok(Self {
            tools: self
                .tools
                .iter()
                .filter(|tool| names.contains(&tool.name()))
                .cloned()
                .collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    /// Look up a tool, failing with [`ToolError::UnknownTool`].
    pub fn require(&self, name: &str) -> Result<&Arc<dyn Tool>, ToolError> {
        self.get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Framework-neutral definitions for every tool, in catalog order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|tool| tool.definition()).collect()
    }

    /// Resolve `name`, validate `args` and execute.
    pub async fn execute(
        &self,
        name: &str,
        args: Value,
        ctx: &ToolContext,
    ) -> Result<Value, ToolError> {
        let tool = self.require(name)?;
        debug!("Executing tool {}", name);
        tool.call(args, ctx).await
    }
}

impl fmt::Debug for ToolCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
