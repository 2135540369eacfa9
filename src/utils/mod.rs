//! Utility functions module
//!
//! Result shaping helpers shared by the query projections and the HTTP
//! client builder used by the content cache.

use crate::error::{Error, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// HTTP client builder
pub struct HttpClientBuilder {
    timeout: Duration,
    connect_timeout: Duration,
    pool_max_idle_per_host: usize,
    user_agent: String,
    no_proxy: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
            user_agent: format!("OpenApiMCP/{}", crate::VERSION),
            no_proxy: false,
        }
    }
}

impl HttpClientBuilder {
    /// Create a new HTTP client builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connection timeout
    #[must_use]
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Set connection pool size
    #[must_use]
    pub fn pool_max_idle_per_host(mut self, max_idle: usize) -> Self {
        self.pool_max_idle_per_host = max_idle;
        self
    }

    /// Set User-Agent
    #[must_use]
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Ignore proxy settings from the environment
    #[must_use]
    pub fn no_proxy(mut self, no_proxy: bool) -> Self {
        self.no_proxy = no_proxy;
        self
    }

    /// Build HTTP client
    pub fn build(self) -> Result<Client> {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .user_agent(&self.user_agent);

        if self.no_proxy {
            builder = builder.no_proxy();
        }

        builder.build().map_err(|e| Error::Initialization(e.to_string()))
    }
}

/// Sort name-bearing result objects by their `name` field.
///
/// Ordinal (byte-wise) comparison; entries without a string `name` sort as
/// if the name were empty. The sort is stable.
pub fn sort_by_name(items: &mut [Value]) {
    items.sort_by(|a, b| name_of(a).cmp(name_of(b)));
}

fn name_of(item: &Value) -> &str {
    item.get("name").and_then(Value::as_str).unwrap_or("")
}

/// Serialize a result object to two-space indented JSON text.
pub fn json_response<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    serde_json::to_string_pretty(data).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sort_by_name_is_ordinal() {
        let mut items = vec![
            json!({"name": "users", "endpoint_count": 2}),
            json!({"name": "Accounts", "endpoint_count": 1}),
            json!({"name": "orders", "endpoint_count": 1}),
        ];
        sort_by_name(&mut items);

        let names: Vec<&str> = items.iter().map(name_of).collect();
        assert_eq!(names, vec!["Accounts", "orders", "users"]);
    }

    #[test]
    fn test_sort_by_name_missing_name_sorts_first() {
        let mut items = vec![
            json!({"name": "b"}),
            json!({"count": 3}),
            json!({"name": 7}),
            json!({"name": "a"}),
        ];
        sort_by_name(&mut items);

        assert_eq!(items[0], json!({"count": 3}));
        assert_eq!(items[1], json!({"name": 7}));
        assert_eq!(items[2], json!({"name": "a"}));
        assert_eq!(items[3], json!({"name": "b"}));
    }

    #[test]
    fn test_json_response_uses_two_space_indent() {
        let text = json_response(&json!({"name": "users", "endpoint_count": 2})).unwrap();
        assert_eq!(text, "{\n  \"name\": \"users\",\n  \"endpoint_count\": 2\n}");
    }

    #[test]
    fn test_http_client_builder() {
        let client = HttpClientBuilder::new()
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(2))
            .pool_max_idle_per_host(1)
            .user_agent("Test/1.0".to_string())
            .no_proxy(true)
            .build();
        assert!(client.is_ok());
    }
}
