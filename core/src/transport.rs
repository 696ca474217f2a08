//! Transport seam between the client and the agent.
//!
//! # Design
//! `AgentTransport` is the only place I/O happens. The client builds an
//! envelope, hands it to the transport together with the caller's
//! `CallContext`, and translates whatever comes back. `HttpTransport` speaks
//! JSON over HTTP to `{endpoint}/PublicIPAddressAgent/{Invoke,Precheck}`;
//! tests substitute an in-memory transport.
//!
//! Whether one transport may be shared across threads is the transport's
//! property. `HttpTransport` wraps a `ureq::Agent`, which is.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::auth::Authorizer;
use crate::config::AgentConfig;
use crate::error::ApiError;
use crate::wire::{
    PublicIpAddressPrecheckRequest, PublicIpAddressPrecheckResponse, PublicIpAddressRequest,
    PublicIpAddressResponse,
};

pub const INVOKE_PATH: &str = "/PublicIPAddressAgent/Invoke";
pub const PRECHECK_PATH: &str = "/PublicIPAddressAgent/Precheck";
pub const SUBSCRIPTION_HEADER: &str = "x-subscription-id";

/// Caller-supplied deadline, passed through to the transport unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallContext {
    deadline: Option<Instant>,
}

impl CallContext {
    /// No deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `Ok(None)` when there is none.
    pub fn remaining(&self) -> Result<Option<Duration>, ApiError> {
        match self.deadline {
            None => Ok(None),
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(ApiError::DeadlineExceeded);
                }
                Ok(Some(deadline - now))
            }
        }
    }
}

/// The two RPC methods the public IP address agent exposes.
pub trait AgentTransport: Send + Sync {
    fn invoke(
        &self,
        ctx: &CallContext,
        request: &PublicIpAddressRequest,
    ) -> Result<PublicIpAddressResponse, ApiError>;

    fn precheck(
        &self,
        ctx: &CallContext,
        request: &PublicIpAddressPrecheckRequest,
    ) -> Result<PublicIpAddressPrecheckResponse, ApiError>;
}

/// JSON-over-HTTP transport to a single agent endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    agent: ureq::Agent,
    endpoint: String,
    subscription_id: String,
    authorizer: Arc<dyn Authorizer>,
}

/// Open a transport to the agent described by `config` for one subscription.
pub fn connect(
    config: &AgentConfig,
    subscription_id: &str,
    authorizer: Arc<dyn Authorizer>,
) -> Result<HttpTransport, ApiError> {
    if subscription_id.is_empty() {
        return Err(ApiError::InvalidInput("subscription id not specified".to_string()));
    }
    if !(config.endpoint.starts_with("http://") || config.endpoint.starts_with("https://")) {
        return Err(ApiError::InvalidConfiguration(format!(
            "agent endpoint must be an http(s) URL, got [{}]",
            config.endpoint
        )));
    }

    // Status codes are interpreted by `check_status`, not by ureq.
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_connect(Some(config.connect_timeout))
        .build()
        .new_agent();

    debug!(endpoint = %config.endpoint, subscription_id, "connected agent transport");
    Ok(HttpTransport {
        agent,
        endpoint: config.endpoint.trim_end_matches('/').to_string(),
        subscription_id: subscription_id.to_string(),
        authorizer,
    })
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("subscription_id", &self.subscription_id)
            .field("authorizer", &self.authorizer)
            .finish()
    }
}

impl HttpTransport {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    fn call<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        ctx: &CallContext,
        path: &str,
        request: &Req,
    ) -> Result<Resp, ApiError> {
        let remaining = ctx.remaining()?;
        let body = serde_json::to_string(request)
            .map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let url = format!("{}{path}", self.endpoint);

        let mut builder = self
            .agent
            .post(&url)
            .content_type("application/json")
            .header(SUBSCRIPTION_HEADER, self.subscription_id.as_str());
        if let Some(auth) = self.authorizer.authorization()? {
            builder = builder.header("authorization", auth.as_str());
        }
        if let Some(remaining) = remaining {
            builder = builder.config().timeout_global(Some(remaining)).build();
        }

        let mut response = builder.send(body.as_bytes()).map_err(map_ureq_error)?;
        let reply = AgentReply {
            status: response.status().as_u16(),
            body: response
                .body_mut()
                .read_to_string()
                .map_err(map_ureq_error)?,
        };

        check_status(&reply)?;
        serde_json::from_str(&reply.body).map_err(|e| {
            warn!(url = %url, error = %e, "undecodable agent reply");
            ApiError::DeserializationError(e.to_string())
        })
    }
}

impl AgentTransport for HttpTransport {
    fn invoke(
        &self,
        ctx: &CallContext,
        request: &PublicIpAddressRequest,
    ) -> Result<PublicIpAddressResponse, ApiError> {
        self.call(ctx, INVOKE_PATH, request)
    }

    fn precheck(
        &self,
        ctx: &CallContext,
        request: &PublicIpAddressPrecheckRequest,
    ) -> Result<PublicIpAddressPrecheckResponse, ApiError> {
        self.call(ctx, PRECHECK_PATH, request)
    }
}

/// Raw agent reply before decoding.
#[derive(Debug, Clone)]
struct AgentReply {
    status: u16,
    body: String,
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(reply: &AgentReply) -> Result<(), ApiError> {
    if (200..300).contains(&reply.status) {
        return Ok(());
    }
    if reply.status == 404 {
        return Err(ApiError::NotFound(reply.body.clone()));
    }
    Err(ApiError::HttpError {
        status: reply.status,
        body: reply.body.clone(),
    })
}

fn map_ureq_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Timeout(_) => ApiError::DeadlineExceeded,
        other => ApiError::Transport(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Anonymous;

    fn reply(status: u16, body: &str) -> AgentReply {
        AgentReply {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn success_statuses_pass() {
        assert!(check_status(&reply(200, "{}")).is_ok());
        assert!(check_status(&reply(201, "{}")).is_ok());
    }

    #[test]
    fn not_found_status_maps_to_not_found() {
        let err = check_status(&reply(404, "public IP address [pip1] not found")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(msg) if msg.contains("pip1")));
    }

    #[test]
    fn other_statuses_map_to_http_error() {
        let err = check_status(&reply(500, "internal error")).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
    }

    #[test]
    fn connect_requires_subscription() {
        let err = connect(&AgentConfig::default(), "", Arc::new(Anonymous)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn connect_rejects_non_http_endpoint() {
        let config = AgentConfig::new("unix:///var/run/agent.sock");
        let err = connect(&config, "sub1", Arc::new(Anonymous)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfiguration(_)));
    }

    #[test]
    fn connect_keeps_subscription_and_endpoint() {
        let transport = connect(&AgentConfig::new("http://agent:55000/"), "sub1", Arc::new(Anonymous))
            .unwrap();
        assert_eq!(transport.endpoint(), "http://agent:55000");
        assert_eq!(transport.subscription_id(), "sub1");
    }

    #[test]
    fn background_context_has_no_deadline() {
        assert_eq!(CallContext::background().remaining().unwrap(), None);
    }

    #[test]
    fn expired_context_fails_before_io() {
        let ctx = CallContext::with_deadline(Instant::now() - Duration::from_millis(1));
        assert!(matches!(ctx.remaining(), Err(ApiError::DeadlineExceeded)));

        let transport = connect(&AgentConfig::default(), "sub1", Arc::new(Anonymous)).unwrap();
        let request = PublicIpAddressPrecheckRequest::default();
        let err = transport.precheck(&ctx, &request).unwrap_err();
        assert!(matches!(err, ApiError::DeadlineExceeded));
    }

    #[test]
    fn timeout_context_reports_remaining() {
        let ctx = CallContext::with_timeout(Duration::from_secs(60));
        let remaining = ctx.remaining().unwrap().unwrap();
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining > Duration::from_secs(50));
    }
}
