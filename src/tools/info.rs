//! Specification info tool
#![allow(missing_docs)]

use crate::spec::SpecExplorer;
use crate::tools::{respond, Tool};
use async_trait::async_trait;
use rust_mcp_sdk::macros;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tool name
pub const GET_SPEC_INFO: &str = "get_spec_info";

#[macros::mcp_tool(
    name = "get_spec_info",
    title = "Get Spec Info",
    description = "Get general information about the OpenAPI specification",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = false,
    read_only_hint = true,
    execution(task_support = "optional")
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct GetSpecInfoTool {}

pub struct GetSpecInfoToolImpl {
    explorer: Arc<SpecExplorer>,
}

impl GetSpecInfoToolImpl {
    #[must_use]
    pub fn new(explorer: Arc<SpecExplorer>) -> Self {
        Self { explorer }
    }
}

#[async_trait]
impl Tool for GetSpecInfoToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        GetSpecInfoTool::tool()
    }

    async fn execute(
        &self,
        _arguments: serde_json::Value,
    ) -> std::result::Result<
        rust_mcp_sdk::schema::CallToolResult,
        rust_mcp_sdk::schema::CallToolError,
    > {
        respond(GET_SPEC_INFO, Ok(self.explorer.get_spec_info()))
    }
}
