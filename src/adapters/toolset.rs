//! Keyed record of bound tools (`name -> { description, parameters, execute }`),
//! the registration shape of Vercel AI SDK `tools`. `execute` returns raw JSON,
//! so hosts that expect text (OpenCode plugins) encode the result themselves.

use super::{Dispatcher, Framework, FrameworkAdapter};
use crate::config::MembraneConfig;
use crate::error::ToolError;
use crate::tools::ToolCatalog;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Manifest entry of one bound tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSetEntry {
    #[serde(skip)]
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool with its configuration already bound; `execute` takes raw input.
#[derive(Debug, Clone)]
pub struct BoundTool {
    entry: ToolSetEntry,
    dispatcher: Dispatcher,
}

impl BoundTool {
    pub fn name(&self) -> &str {
        &self.entry.name
    }

    pub fn description(&self) -> &str {
        &self.entry.description
    }

    pub fn parameters(&self) -> &Value {
        &self.entry.parameters
    }

    /// Run the tool and return its JSON result unchanged.
    pub async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        self.dispatcher.dispatch(&self.entry.name, input).await
    }
}

/// Invocation of a keyed tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSetCall {
    pub name: String,
    pub input: Value,
}

/// `name -> { description, parameters }` object for `catalog`.
pub fn manifest(catalog: &ToolCatalog) -> Value {
    let mut map = Map::new();
    for def in catalog.definitions() {
        map.insert(
            def.name,
            json!({ "description": def.description, "parameters": def.parameters }),
        );
    }
    Value::Object(map)
}

#[derive(Debug, Clone)]
pub struct ToolSet {
    tools: Vec<BoundTool>,
}

impl ToolSet {
    pub fn new(catalog: &ToolCatalog, config: &MembraneConfig) -> Result<Self, ToolError> {
        Ok(Self::from_dispatcher(Dispatcher::new(catalog, config)?))
    }

    pub fn from_dispatcher(dispatcher: Dispatcher) -> Self {
        let tools = dispatcher
            .catalog()
            .definitions()
            .into_iter()
            .map(|def| BoundTool {
                entry: ToolSetEntry {
                    name: def.name,
                    description: def.description,
                    parameters: def.parameters,
                },
                dispatcher: dispatcher.clone(),
            })
            .collect();
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<&BoundTool> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundTool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn manifest(&self) -> Value {
        let mut map = Map::new();
        for tool in &self.tools {
            map.insert(
                tool.entry.name.clone(),
                json!({ "description": tool.entry.description, "parameters": tool.entry.parameters }),
            );
        }
        Value::Object(map)
    }
}

#[async_trait]
impl FrameworkAdapter for ToolSet {
    type Tool = ToolSetEntry;
    type Call = ToolSetCall;
    type Output = Value;

    fn framework(&self) -> Framework {
        Framework::ToolSet
    }

    fn tools(&self) -> Vec<ToolSetEntry> {
        self.tools.iter().map(|tool| tool.entry.clone()).collect()
    }

    fn tool_name(tool: &ToolSetEntry) -> &str {
        &tool.name
    }

    async fn invoke(&self, call: ToolSetCall) -> Result<Value, ToolError> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;
        tool.execute(call.input).await
    }
}
