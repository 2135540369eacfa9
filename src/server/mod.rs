//! Server module
//!
//! Holds the loaded specification and exposes it over MCP transports.

pub mod handler;
pub mod transport;

use crate::cache::ContentCache;
use crate::config::AppConfig;
use crate::error::Result;
use crate::spec::{load_spec, OpenApiDocument, SpecExplorer};
use crate::tools::ToolRegistry;
use rust_mcp_sdk::schema::{
    Implementation, InitializeResult, ProtocolVersion, ServerCapabilities,
    ServerCapabilitiesTools,
};
use std::sync::Arc;

/// MCP server
#[derive(Clone)]
pub struct OpenApiServer {
    config: AppConfig,
    explorer: Arc<SpecExplorer>,
    tool_registry: Arc<ToolRegistry>,
}

impl OpenApiServer {
    /// Create a server around an already parsed specification
    #[must_use]
    pub fn new(config: AppConfig, spec: OpenApiDocument) -> Self {
        let explorer = Arc::new(SpecExplorer::new(spec));
        let tool_registry = Arc::new(crate::tools::create_default_registry(&explorer));

        Self {
            config,
            explorer,
            tool_registry,
        }
    }

    /// Resolve the configured source, load the specification and create the server
    ///
    /// Remote sources go through the disk cache.
    pub async fn load(config: AppConfig) -> Result<Self> {
        let source = config.spec_source()?;
        let cache = ContentCache::new(&config.cache)?;
        let spec = load_spec(&source, &cache).await?;
        Ok(Self::new(config, spec))
    }

    /// Get server configuration
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the query interface
    #[must_use]
    pub fn explorer(&self) -> &Arc<SpecExplorer> {
        &self.explorer
    }

    /// Get tool registry
    #[must_use]
    pub fn tool_registry(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Get server information
    #[must_use]
    pub fn server_info(&self) -> InitializeResult {
        let server = &self.config.server;
        InitializeResult {
            server_info: Implementation {
                name: server.name.clone(),
                version: server.version.clone(),
                title: Some("OpenAPI MCP Server".to_string()),
                description: server.description.clone(),
                icons: vec![],
                website_url: None,
            },
            capabilities: ServerCapabilities {
                tools: Some(ServerCapabilitiesTools { list_changed: None }),
                resources: None,
                prompts: None,
                experimental: None,
                completions: None,
                logging: None,
                tasks: None,
            },
            protocol_version: ProtocolVersion::V2025_11_25.into(),
            instructions: Some(format!(
                "Use this server to explore the '{}' OpenAPI specification. \
                 Call list_categories first, then list_endpoints for a category, \
                 then show_endpoint and show_schema for details.",
                self.explorer.spec().info.title
            )),
            meta: None,
        }
    }

    /// Run Stdio server
    pub async fn run_stdio(&self) -> Result<()> {
        transport::run_stdio_server(self).await
    }

    /// Run HTTP server
    pub async fn run_http(&self) -> Result<()> {
        transport::run_http_server(self).await
    }
}
