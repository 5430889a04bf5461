//! membrane-tools: Membrane API operations as LLM agent tools.
//!
//! One canonical [`ToolCatalog`] of ten tools backed by a single
//! [`MembraneClient`], projected into the tool shapes of OpenAI function
//! calling, Anthropic tool use, MCP and keyed tool sets.

pub mod adapters;
pub mod config;
pub mod error;
pub mod membrane;
pub mod polling;
pub mod schema;
pub mod tools;

pub use adapters::{Dispatcher, Framework, FrameworkAdapter};
pub use config::MembraneConfig;
pub use error::{ErrorKind, FieldError, FieldErrors, ToolError};
pub use membrane::{ApiRequest, MembraneClient, RequestOptions};
pub use polling::PollOptions;
pub use schema::{Field, FieldType, ParameterSchema, ValidatedInput};
pub use tools::{standard_catalog, Tool, ToolCatalog, ToolContext, ToolDefinition};
