//! Error handling module

use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum Error {
    /// Initialization error
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// Configuration error (e.g. no specification source given)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The specification source could not be read or parsed
    #[error("Failed to load OpenAPI spec: {0}")]
    Load(String),

    /// Live download of a remote document failed
    #[error("Failed to download spec: {0}")]
    Download(String),

    /// Cache artifacts could not be written
    #[error("Cache operation failed: {0}")]
    Cache(String),

    /// Requested path, method or schema is not declared
    #[error("{0}")]
    NotFound(String),

    /// Malformed or missing tool argument
    #[error("{0}")]
    InvalidArgument(String),

    /// MCP protocol error
    #[error("MCP protocol error: {0}")]
    Mcp(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl Error {
    /// Whether the error belongs to a single request rather than the process.
    ///
    /// Request errors are reported back to the caller as tool results and
    /// never stop the server.
    #[must_use]
    pub fn is_request_error(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::InvalidArgument(_))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

