//! Credentials supplied to the agent transport.
//!
//! The transport asks its authorizer for an `authorization` header value on
//! every call, so token rotation is the authorizer's business.

use std::fmt;
use std::sync::Arc;

use crate::error::ApiError;

/// Environment variable holding a bearer token for the agent.
pub const TOKEN_ENV: &str = "PIP_AGENT_TOKEN";

/// Supplies the `authorization` header for agent calls.
pub trait Authorizer: Send + Sync + fmt::Debug {
    /// Header value to send, or `None` to send no header.
    fn authorization(&self) -> Result<Option<String>, ApiError>;
}

/// Sends no credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl Authorizer for Anonymous {
    fn authorization(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// Static bearer token. The token never appears in `Debug` output.
#[derive(Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
        }
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken").field("token", &"<redacted>").finish()
    }
}

impl Authorizer for BearerToken {
    fn authorization(&self) -> Result<Option<String>, ApiError> {
        if self.token.is_empty() {
            return Err(ApiError::InvalidConfiguration("bearer token is empty".to_string()));
        }
        Ok(Some(format!("Bearer {}", self.token)))
    }
}

/// `BearerToken` when `PIP_AGENT_TOKEN` is set and non-empty, else `Anonymous`.
pub fn authorizer_from_env() -> Arc<dyn Authorizer> {
    match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.is_empty() => Arc::new(BearerToken::new(&token)),
        _ => Arc::new(Anonymous),
    }
}
