//! Configuration module
//!
//! Settings come from built-in defaults, an optional TOML file, environment
//! variables and finally command-line flags, each layer overriding the last.

use crate::cache::CacheConfig;
use crate::error::Error;
use crate::spec::SpecSource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Specification source (`http(s)://` URL or file path)
pub const ENV_SPEC_URL: &str = "OPENAPI_SPEC_URL";
/// Cache directory override
pub const ENV_CACHE_DIR: &str = "OPENAPI_CACHE_DIR";
/// HTTP listen host
pub const ENV_HOST: &str = "OPENAPI_MCP_HOST";
/// HTTP listen port
pub const ENV_PORT: &str = "OPENAPI_MCP_PORT";
/// Transport mode (`stdio` or `http`)
pub const ENV_TRANSPORT_MODE: &str = "OPENAPI_MCP_TRANSPORT_MODE";
/// Log level
pub const ENV_LOG_LEVEL: &str = "OPENAPI_MCP_LOG_LEVEL";

const VALID_TRANSPORT_MODES: [&str; 2] = ["stdio", "http"];
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Specification source
    pub spec: SpecConfig,

    /// Cache configuration
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server name
    pub name: String,

    /// Server version
    pub version: String,

    /// Server description
    pub description: Option<String>,

    /// Host address (HTTP mode)
    pub host: String,

    /// Port (HTTP mode)
    pub port: u16,

    /// Transport mode
    pub transport_mode: String,
}

/// Specification configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SpecConfig {
    /// URL or file path of the OpenAPI document
    pub source: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,

    /// Log file path
    pub file_path: Option<String>,

    /// Whether to log to the console (stderr)
    pub enable_console: bool,

    /// Whether to log to a daily rolling file
    pub enable_file: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: crate::NAME.to_string(),
            version: crate::VERSION.to_string(),
            description: Some(
                "Explore OpenAPI specifications: categories, endpoints and schemas".to_string(),
            ),
            host: "127.0.0.1".to_string(),
            port: 8080,
            transport_mode: "stdio".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: Some("./logs/openapi-mcp.log".to_string()),
            enable_console: true,
            enable_file: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or fails validation
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, directory creation or the write fails
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create directory: {e}")))?;
        }

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error for an empty host, port 0, an unknown transport mode or
    /// log level, or a zero cache TTL
    pub fn validate(&self) -> Result<(), Error> {
        if self.server.host.is_empty() {
            return Err(Error::Config("Server host cannot be empty".to_string()));
        }

        if self.server.port == 0 {
            return Err(Error::Config("Server port cannot be 0".to_string()));
        }

        if !VALID_TRANSPORT_MODES.contains(&self.server.transport_mode.as_str()) {
            return Err(Error::Config(format!(
                "Invalid transport mode: {}, valid values: {:?}",
                self.server.transport_mode, VALID_TRANSPORT_MODES
            )));
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level: {}, valid values: {:?}",
                self.logging.level, VALID_LOG_LEVELS
            )));
        }

        if self.cache.ttl_secs == 0 {
            return Err(Error::Config("Cache TTL cannot be 0".to_string()));
        }

        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Unset and empty variables leave the current value untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAPI_MCP_PORT` is not a valid port number
    pub fn apply_env(&mut self) -> Result<(), Error> {
        if let Some(source) = env_value(ENV_SPEC_URL) {
            self.spec.source = Some(source);
        }

        if let Some(dir) = env_value(ENV_CACHE_DIR) {
            self.cache.directory = Some(dir);
        }

        if let Some(host) = env_value(ENV_HOST) {
            self.server.host = host;
        }

        if let Some(port) = env_value(ENV_PORT) {
            self.server.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid port '{port}': {e}")))?;
        }

        if let Some(mode) = env_value(ENV_TRANSPORT_MODE) {
            self.server.transport_mode = mode.to_lowercase();
        }

        if let Some(level) = env_value(ENV_LOG_LEVEL) {
            self.logging.level = level.to_lowercase();
        }

        Ok(())
    }

    /// Load configuration from defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment value is invalid or validation fails
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Classified specification source
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no source is configured or the URL is invalid
    pub fn spec_source(&self) -> Result<SpecSource, Error> {
        SpecSource::parse(self.spec.source.as_deref().unwrap_or_default())
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 6] = [
        ENV_SPEC_URL,
        ENV_CACHE_DIR,
        ENV_HOST,
        ENV_PORT,
        ENV_TRANSPORT_MODE,
        ENV_LOG_LEVEL,
    ];

    fn unset_all() -> Vec<(&'static str, Option<&'static str>)> {
        ALL_VARS.iter().map(|name| (*name, None)).collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.transport_mode, "stdio");
        assert!(config.spec.source.is_none());
        assert!(!config.logging.enable_file);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.server.host = String::new();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.server.transport_mode = "sse".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.cache.ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let mut vars = unset_all();
        vars.retain(|(name, _)| *name != ENV_SPEC_URL && *name != ENV_PORT && *name != ENV_LOG_LEVEL);
        vars.push((ENV_SPEC_URL, Some("https://example.com/openapi.yaml")));
        vars.push((ENV_PORT, Some("9090")));
        vars.push((ENV_LOG_LEVEL, Some("DEBUG")));

        temp_env::with_vars(vars, || {
            let config = AppConfig::from_env().unwrap();
            assert_eq!(
                config.spec.source.as_deref(),
                Some("https://example.com/openapi.yaml")
            );
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.logging.level, "debug");
            assert!(config.spec_source().unwrap().is_remote());
        });
    }

    #[test]
    fn test_apply_env_invalid_port() {
        let mut vars = unset_all();
        vars.retain(|(name, _)| *name != ENV_PORT);
        vars.push((ENV_PORT, Some("not-a-port")));

        temp_env::with_vars(vars, || {
            assert!(matches!(AppConfig::from_env(), Err(Error::Config(_))));
        });
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut vars = unset_all();
        vars.retain(|(name, _)| *name != ENV_HOST);
        vars.push((ENV_HOST, Some("  ")));

        temp_env::with_vars(vars, || {
            let config = AppConfig::from_env().unwrap();
            assert_eq!(config.server.host, "127.0.0.1");
        });
    }

    #[test]
    fn test_missing_spec_source() {
        let config = AppConfig::default();
        assert!(matches!(config.spec_source(), Err(Error::Config(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.spec.source = Some("./openapi.yaml".to_string());
        config.cache.ttl_secs = 60;
        config.save_to_file(&path).unwrap();

        let loaded = AppConfig::from_file(&path).unwrap();
        assert_eq!(loaded.spec.source.as_deref(), Some("./openapi.yaml"));
        assert_eq!(loaded.cache.ttl_secs, 60);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[spec]\nsource = \"spec.json\"\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.spec.source.as_deref(), Some("spec.json"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.cache.ttl_secs, crate::cache::DEFAULT_CACHE_TTL_SECS);
    }
}
