//! Schema component tool
#![allow(missing_docs)]

use crate::spec::SpecExplorer;
use crate::tools::{parse_arguments, respond, Tool};
use async_trait::async_trait;
use rust_mcp_sdk::macros;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Tool name
pub const SHOW_SCHEMA: &str = "show_schema";

#[macros::mcp_tool(
    name = "show_schema",
    title = "Show Schema",
    description = "Show details of a specific schema component by reference",
    destructive_hint = false,
    idempotent_hint = true,
    open_world_hint = false,
    read_only_hint = true,
    execution(task_support = "optional")
)]
#[derive(Debug, Clone, Deserialize, Serialize, macros::JsonSchema)]
pub struct ShowSchemaTool {
    #[serde(rename = "ref")]
    #[json_schema(
        title = "Schema reference",
        description = "The schema reference (e.g., #/components/schemas/User)"
    )]
    pub reference: String,
}

pub struct ShowSchemaToolImpl {
    explorer: Arc<SpecExplorer>,
}

impl ShowSchemaToolImpl {
    #[must_use]
    pub fn new(explorer: Arc<SpecExplorer>) -> Self {
        Self { explorer }
    }
}

#[async_trait]
impl Tool for ShowSchemaToolImpl {
    fn definition(&self) -> rust_mcp_sdk::schema::Tool {
        ShowSchemaTool::tool()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
    ) -> std::result::Result<
        rust_mcp_sdk::schema::CallToolResult,
        rust_mcp_sdk::schema::CallToolError,
    > {
        let params: ShowSchemaTool = parse_arguments(SHOW_SCHEMA, arguments)?;
        respond(SHOW_SCHEMA, self.explorer.show_schema(&params.reference))
    }
}
