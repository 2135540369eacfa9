//! MCP tools module
//!
//! One tool per specification projection. Every tool shares the same
//! [`SpecExplorer`] and turns its output into an MCP tool result.

pub mod categories;
pub mod endpoints;
pub mod info;
pub mod schema;

use crate::error::Error;
use crate::spec::{QueryOutput, SpecExplorer};
use crate::utils::json_response;
use async_trait::async_trait;
use rust_mcp_sdk::schema::{CallToolError, CallToolResult, ContentBlock, Tool as McpTool};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Tool trait
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get tool definition
    fn definition(&self) -> McpTool;

    /// Execute tool
    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError>;
}

/// Tool registry
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    #[must_use]
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register tool
    #[must_use]
    pub fn register<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(tool));
        self
    }

    /// Get all tool definitions
    #[must_use]
    pub fn get_tools(&self) -> Vec<McpTool> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Execute tool
    ///
    /// A missing argument map (`null`) is treated as an empty object.
    pub async fn execute_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let arguments = if arguments.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            arguments
        };

        for tool in &self.tools {
            if tool.definition().name == name {
                tracing::debug!("Executing tool {}", name);
                return tool.execute(arguments).await;
            }
        }

        Err(CallToolError::unknown_tool(name.to_string()))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create default tool registry
#[must_use]
pub fn create_default_registry(explorer: &Arc<SpecExplorer>) -> ToolRegistry {
    ToolRegistry::new()
        .register(categories::ListCategoriesToolImpl::new(explorer.clone()))
        .register(endpoints::ListEndpointsToolImpl::new(explorer.clone()))
        .register(endpoints::ShowEndpointToolImpl::new(explorer.clone()))
        .register(info::GetSpecInfoToolImpl::new(explorer.clone()))
        .register(schema::ShowSchemaToolImpl::new(explorer.clone()))
}

/// Deserialize tool arguments, reporting failures as invalid arguments.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    tool: &str,
    arguments: serde_json::Value,
) -> std::result::Result<T, CallToolError> {
    serde_json::from_value(arguments).map_err(|e| {
        CallToolError::invalid_arguments(tool, Some(format!("Failed to parse arguments: {e}")))
    })
}

/// Turn a projection result into a tool result.
pub(crate) fn respond(
    tool: &str,
    output: crate::Result<QueryOutput>,
) -> std::result::Result<CallToolResult, CallToolError> {
    match output {
        Ok(QueryOutput::Message(text)) => Ok(CallToolResult::text_content(vec![text.into()])),
        Ok(QueryOutput::Json(value)) => {
            let text = json_response(&value).map_err(|e| {
                tracing::error!("Failed to serialize {} result: {}", tool, e);
                CallToolError::from_message("Failed to marshal response".to_string())
            })?;
            Ok(CallToolResult::text_content(vec![text.into()]))
        }
        Err(Error::InvalidArgument(message)) => {
            Err(CallToolError::invalid_arguments(tool, Some(message)))
        }
        Err(e) => {
            if !e.is_request_error() {
                tracing::error!("{} failed: {}", tool, e);
            }
            Err(CallToolError::from_message(e.to_string()))
        }
    }
}

/// Concatenated text blocks of a tool result
#[must_use]
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|block| match block {
            ContentBlock::TextContent(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
