//! Connection settings for the agent transport.

use std::time::Duration;

/// Where the agent lives and how long to wait for a connection.
///
/// No request timeout lives here: per-call deadlines come
/// from the caller's `CallContext`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub endpoint: String,
    pub connect_timeout: Duration,
}

impl AgentConfig {
    pub const DEFAULT_ENDPOINT: &'static str = "http://127.0.0.1:55000";
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    /// Overrides `DEFAULT_ENDPOINT` in `from_env`.
    pub const ENDPOINT_ENV: &'static str = "PIP_AGENT_URL";

    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn from_env() -> Self {
        match std::env::var(Self::ENDPOINT_ENV) {
            Ok(endpoint) if !endpoint.is_empty() => Self::new(&endpoint),
            _ => Self::default(),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ENDPOINT)
    }
}
