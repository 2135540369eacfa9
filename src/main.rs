//! OpenAPI MCP server binary

use clap::{Parser, Subcommand};
use openapi_mcp::config::AppConfig;
use openapi_mcp::server::transport::{self, TransportMode};
use openapi_mcp::tools::result_text;
use openapi_mcp::OpenApiServer;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "openapi-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server for exploring OpenAPI specifications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// OpenAPI document URL or file path (overrides OPENAPI_SPEC_URL)
    #[arg(short, long, global = true)]
    spec: Option<String>,

    /// Cache directory (overrides OPENAPI_CACHE_DIR)
    #[arg(long, global = true)]
    cache_dir: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server
    Serve {
        /// Transport mode [stdio, http]
        #[arg(short, long)]
        mode: Option<String>,

        /// Listen host (http mode)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (http mode)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Explore the specification from an interactive menu
    Interactive,

    /// Run a single tool and print its result
    Call {
        /// Tool name [list_categories, list_endpoints, show_endpoint, get_spec_info, show_schema]
        #[arg(short, long)]
        tool: String,

        /// Category filter (list_endpoints)
        #[arg(long)]
        category: Option<String>,

        /// Path template (show_endpoint)
        #[arg(long)]
        path: Option<String>,

        /// HTTP method (show_endpoint)
        #[arg(long)]
        method: Option<String>,

        /// Schema reference (show_schema)
        #[arg(long = "ref")]
        reference: Option<String>,
    },

    /// Generate a configuration file
    Config {
        /// Output file path
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show version information
    Version,
}

/// Overrides given on the command line
#[derive(Default)]
struct Overrides {
    spec: Option<String>,
    cache_dir: Option<String>,
    mode: Option<String>,
    host: Option<String>,
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = Overrides {
        spec: cli.spec.clone(),
        cache_dir: cli.cache_dir.clone(),
        ..Overrides::default()
    };

    match cli.command {
        Commands::Serve { mode, host, port } => {
            let overrides = Overrides {
                mode,
                host,
                port,
                ..overrides
            };
            serve_command(&cli.config, cli.debug, overrides).await?;
        }
        Commands::Interactive => {
            interactive_command(&cli.config, cli.debug, overrides).await?;
        }
        Commands::Call {
            tool,
            category,
            path,
            method,
            reference,
        } => {
            let mut arguments = serde_json::Map::new();
            let fields = [
                ("category", category),
                ("path", path),
                ("method", method),
                ("ref", reference),
            ];
            for (key, value) in fields {
                if let Some(value) = value {
                    arguments.insert(key.to_string(), serde_json::Value::String(value));
                }
            }
            call_command(&cli.config, cli.debug, overrides, &tool, arguments).await?;
        }
        Commands::Config { output, force } => {
            config_command(&output, force)?;
        }
        Commands::Version => {
            version_command();
        }
    }

    Ok(())
}

/// Build the effective configuration: defaults < file < environment < flags
fn load_config(
    config_path: &Path,
    debug: bool,
    overrides: Overrides,
) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let from_file = config_path.exists();
    let mut config = if from_file {
        AppConfig::from_file(config_path).map_err(|e| format!("Failed to load config file: {e}"))?
    } else {
        AppConfig::default()
    };

    config.apply_env()?;

    if let Some(spec) = overrides.spec {
        config.spec.source = Some(spec);
    }
    if let Some(dir) = overrides.cache_dir {
        config.cache.directory = Some(dir);
    }
    if let Some(host) = overrides.host {
        config.server.host = host;
    }
    if let Some(port) = overrides.port {
        config.server.port = port;
    }
    if let Some(mode) = overrides.mode {
        config.server.transport_mode = mode.to_lowercase();
    }
    if debug {
        config.logging.level = "debug".to_string();
    }

    config
        .validate()
        .map_err(|e| format!("Invalid configuration: {e}"))?;

    openapi_mcp::init_logging_with_config(&config.logging)
        .map_err(|e| format!("Failed to initialize logging: {e}"))?;

    if from_file {
        tracing::info!("Loaded configuration from {}", config_path.display());
    } else {
        tracing::debug!(
            "Config file {} not found, using defaults",
            config_path.display()
        );
    }

    Ok(config)
}

async fn load_server(
    config_path: &Path,
    debug: bool,
    overrides: Overrides,
) -> Result<OpenApiServer, Box<dyn std::error::Error>> {
    let config = load_config(config_path, debug, overrides)?;
    let server = OpenApiServer::load(config).await?;
    Ok(server)
}

/// Start server command
async fn serve_command(
    config_path: &Path,
    debug: bool,
    overrides: Overrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let server = load_server(config_path, debug, overrides).await?;
    let mode: TransportMode = server.config().server.transport_mode.parse()?;

    tracing::info!(
        "Starting OpenAPI MCP server v{} ({} transport)",
        openapi_mcp::VERSION,
        mode
    );

    transport::run_server_with_mode(&server, mode)
        .await
        .map_err(|e| format!("{mode} server failed: {e}"))?;

    Ok(())
}

/// Interactive console command
async fn interactive_command(
    config_path: &Path,
    debug: bool,
    overrides: Overrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let server = load_server(config_path, debug, overrides).await?;
    openapi_mcp::console::run_interactive(server.tool_registry()).await?;
    Ok(())
}

/// Single tool invocation command
async fn call_command(
    config_path: &Path,
    debug: bool,
    overrides: Overrides,
    tool: &str,
    arguments: serde_json::Map<String, serde_json::Value>,
) -> Result<(), Box<dyn std::error::Error>> {
    let server = load_server(config_path, debug, overrides).await?;

    let result = server
        .tool_registry()
        .execute_tool(tool, serde_json::Value::Object(arguments))
        .await
        .map_err(|e| format!("Tool {tool} failed: {e}"))?;

    println!("{}", result_text(&result));
    Ok(())
}

/// Generate configuration file command
fn config_command(output: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if output.exists() && !force {
        return Err(format!(
            "Config file already exists: {}, use --force to overwrite",
            output.display()
        )
        .into());
    }

    AppConfig::default()
        .save_to_file(output)
        .map_err(|e| format!("Failed to save config file: {e}"))?;

    println!("Config file generated: {}", output.display());
    println!("Set [spec] source (or OPENAPI_SPEC_URL) before starting the server.");

    Ok(())
}

/// Version command
fn version_command() {
    println!("OpenAPI MCP server v{}", env!("CARGO_PKG_VERSION"));
    println!("Build time: {}", env!("BUILD_TIMESTAMP"));
    println!("Git commit: {}", env!("GIT_COMMIT"));
    println!("Rust version: {}", env!("RUST_VERSION"));
}
