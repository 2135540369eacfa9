//! Endpoint tools
#![allow(missing_docs)]

use crate::spec::SpecExplorer;
use crate::tools::{parse_arguments, respond, Tool};
use async_trait::async_trait;
use rust_mcp_sdk::macros;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tool names
pub const LIST_ENDPOINTS: &str = "list_endpoints";
pub const SHOW_ENDPOINT: &str = "show_endpoint";

/// Arguments of `list_endpoints`
#[macros::mcp_tool(
    name = "list_endpoints",
    title = "List Endpoints",
    description = "List endpoints, filtered by category (based on first path segment). Always check the list of categories first!",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = false,
    read_only_hint = true,
    execution(task_support = "optional")
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct ListEndpointsTool {
    #[json_schema(
        title = "Category",
        description = "The category (first path segment) to filter endpoints by."
    )]
    pub category: Option<String>,
}

/// Arguments of `show_endpoint`
#[macros::mcp_tool(
    name = "show_endpoint",
    title = "Show Endpoint",
    description = "Show detailed information about a specific endpoint including types",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = false,
    read_only_hint = true,
    execution(task_support = "optional")
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct ShowEndpointTool {
    #[json_schema(
        title = "Path",
        description = "The path of the endpoint (e.g., /users/{id})"
    )]
    pub path: String,

    #[json_schema(
        title = "Method",
        description = "The HTTP method (GET, POST, PUT, DELETE, etc.)"
    )]
    pub method: String,
}

pub struct ListEndpointsToolImpl {
    explorer: Arc<SpecExplorer>,
}

impl ListEndpointsToolImpl {
    #[must_use]
    pub fn new(explorer: Arc<SpecExplorer>) -> Self {
        Self { explorer }
    }
}

#[async_trait]
impl Tool for ListEndpointsToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        ListEndpointsTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<
        rust_mcp_sdk::schema::CallToolResult,
        rust_mcp_sdk::schema::CallToolError,
    > {
        let params: ListEndpointsTool = parse_arguments(LIST_ENDPOINTS, arguments)?;
        respond(
            LIST_ENDPOINTS,
            Ok(self.explorer.list_endpoints(params.category.as_deref())),
        )
    }
}

pub struct ShowEndpointToolImpl {
    explorer: Arc<SpecExplorer>,
}

impl ShowEndpointToolImpl {
    #[must_use]
    pub fn new(explorer: Arc<SpecExplorer>) -> Self {
        Self { explorer }
    }
}

#[async_trait]
impl Tool for ShowEndpointToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        ShowEndpointTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<
        rust_mcp_sdk::schema::CallToolResult,
        rust_mcp_sdk::schema::CallToolError,
    > {
        let params: ShowEndpointTool = parse_arguments(SHOW_ENDPOINT, arguments)?;
        respond(
            SHOW_ENDPOINT,
            self.explorer.show_endpoint(&params.path, &params.method),
        )
    }
}
