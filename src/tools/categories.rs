//! List categories tool
#![allow(missing_docs)]

use crate::spec::SpecExplorer;
use crate::tools::{respond, Tool};
use async_trait::async_trait;
use rust_mcp_sdk::macros;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tool name
pub const LIST_CATEGORIES: &str = "list_categories";

#[macros::mcp_tool(
    name = "list_categories",
    title = "List Categories",
    description = "List all categories based on the first path segment of endpoints. Always call this before querying deeper!",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = false,
    read_only_hint = true,
    execution(task_support = "optional")
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct ListCategoriesTool {}

pub struct ListCategoriesToolImpl {
    explorer: Arc<SpecExplorer>,
}

impl ListCategoriesToolImpl {
    #[must_use]
    pub fn new(explorer: Arc<SpecExplorer>) -> Self {
        Self { explorer }
    }
}

#[async_trait]
impl Tool for ListCategoriesToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        ListCategoriesTool::tool()
    }

    async fn execute(
        &self,
        _arguments: serde_json::Value,
    ) -> std::result::Result<
        rust_mcp_sdk::schema::CallToolResult,
        rust_mcp_sdk::schema::CallToolError,
    > {
        respond(LIST_CATEGORIES, Ok(self.explorer.list_categories()))
    }
}
