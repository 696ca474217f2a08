//! Client for the public IP address agent.
//!
//! # Design
//! `PublicIpAddressClient` owns one transport and no other state. Each verb
//! is a single synchronous round-trip (two for `delete`): build an envelope,
//! send it with the caller's `CallContext`, translate the reply. Nothing is
//! retried and errors are returned as soon as they occur.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::Authorizer;
use crate::config::AgentConfig;
use crate::error::ApiError;
use crate::request::{
    build_precheck_request, build_request, build_request_by_name, precheck_result,
    records_from_response,
};
use crate::transport::{self, AgentTransport, CallContext, HttpTransport};
use crate::types::PublicIpAddress;
use crate::wire::Operation;

/// Get, create/update, delete and precheck public IP addresses.
#[derive(Debug, Clone)]
pub struct PublicIpAddressClient<T: AgentTransport = HttpTransport> {
    transport: T,
}

impl PublicIpAddressClient<HttpTransport> {
    /// Connect over HTTP to the agent serving `subscription_id`.
    pub fn connect(
        config: &AgentConfig,
        subscription_id: &str,
        authorizer: Arc<dyn Authorizer>,
    ) -> Result<Self, ApiError> {
        Ok(Self::new(transport::connect(config, subscription_id, authorizer)?))
    }
}

impl<T: AgentTransport> PublicIpAddressClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a public IP address by name. An empty name returns every public
    /// IP address the agent knows at `location`.
    pub fn get(
        &self,
        ctx: &CallContext,
        location: &str,
        name: &str,
    ) -> Result<Vec<PublicIpAddress>, ApiError> {
        debug!(location, name, "get public IP address");
        let request = build_request_by_name(Operation::Get, location, name)?;
        let response = self.transport.invoke(ctx, &request)?;
        Ok(records_from_response(&response))
    }

    /// Create the public IP address if it does not exist, otherwise update it.
    pub fn create_or_update(
        &self,
        ctx: &CallContext,
        location: &str,
        name: &str,
        pip: Option<&PublicIpAddress>,
    ) -> Result<PublicIpAddress, ApiError> {
        let pip = pip.filter(|p| p.properties.is_some()).ok_or_else(|| {
            ApiError::InvalidConfiguration("missing public IP address properties".to_string())
        })?;

        debug!(location, name, "create or update public IP address");
        let request = build_request(Operation::Post, location, name, Some(pip))?;
        let response = self.transport.invoke(ctx, &request)?;

        let mut pips = records_from_response(&response);
        if pips.len() > 1 {
            warn!(location, name, count = pips.len(), "agent returned more than one record");
        }
        if pips.is_empty() {
            return Err(ApiError::Remote(format!(
                "agent returned no public IP address for [{name}]"
            )));
        }
        Ok(pips.swap_remove(0))
    }

    /// Delete a public IP address. The current record is fetched first and
    /// that record, not a caller-supplied one, is what the delete carries.
    pub fn delete(&self, ctx: &CallContext, location: &str, name: &str) -> Result<(), ApiError> {
        // An empty name would make the lookup list the whole location.
        if name.is_empty() {
            return Err(ApiError::InvalidInput("name not specified".to_string()));
        }
        let pips = self.get(ctx, location, name)?;
        let Some(current) = pips.first() else {
            return Err(ApiError::NotFound(format!("public IP address [{name}] not found")));
        };

        debug!(location, name, "delete public IP address");
        let request = build_request(Operation::Delete, location, name, Some(current))?;
        self.transport.invoke(ctx, &request)?;
        Ok(())
    }

    /// Ask the agent whether `pips` could be created at `location` without
    /// changing anything. `None` entries are skipped. A rejection is returned
    /// as `ApiError::Remote` carrying the agent's reason, so `Ok` is always
    /// `true`.
    pub fn precheck(
        &self,
        ctx: &CallContext,
        location: &str,
        pips: &[Option<PublicIpAddress>],
    ) -> Result<bool, ApiError> {
        debug!(location, count = pips.len(), "precheck public IP addresses");
        let request = build_precheck_request(location, pips)?;
        let response = self.transport.precheck(ctx, &request)?;
        precheck_result(&response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::types::PublicIpAddressProperties;
    use crate::wire::{
        BoolValue, PublicIpAddressMessage, PublicIpAddressPrecheckRequest,
        PublicIpAddressPrecheckResponse, PublicIpAddressRequest, PublicIpAddressResponse,
    };

    /// Records every envelope and answers from canned replies.
    #[derive(Default)]
    struct FakeTransport {
        stored: Vec<PublicIpAddressMessage>,
        invoked: Mutex<Vec<PublicIpAddressRequest>>,
        prechecked: Mutex<Vec<PublicIpAddressPrecheckRequest>>,
        precheck_reply: PublicIpAddressPrecheckResponse,
        fail_with: Option<u16>,
    }

    impl FakeTransport {
        fn with(names: &[&str]) -> Self {
            Self {
                stored: names
                    .iter()
                    .map(|name| PublicIpAddressMessage {
                        name: name.to_string(),
                        id: format!("id-{name}"),
                        location_name: "loc1".to_string(),
                        ip_address: "20.1.2.3".to_string(),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }
        }

        fn operations(&self) -> Vec<Operation> {
            self.invoked.lock().unwrap().iter().map(|r| r.operation_type).collect()
        }
    }

    impl AgentTransport for FakeTransport {
        fn invoke(
            &self,
            _ctx: &CallContext,
            request: &PublicIpAddressRequest,
        ) -> Result<PublicIpAddressResponse, ApiError> {
            self.invoked.lock().unwrap().push(request.clone());
            if let Some(status) = self.fail_with {
                return Err(ApiError::HttpError {
                    status,
                    body: "agent unavailable".to_string(),
                });
            }
            let wanted = &request.public_ip_addresses[0];
            let public_ip_addresses = match request.operation_type {
                Operation::Get => self
                    .stored
                    .iter()
                    .filter(|m| wanted.name.is_empty() || m.name == wanted.name)
                    .cloned()
                    .collect(),
                Operation::Post => vec![PublicIpAddressMessage {
                    id: "generated".to_string(),
                    ..wanted.clone()
                }],
                Operation::Delete => Vec::new(),
            };
            Ok(PublicIpAddressResponse {
                public_ip_addresses,
                ..Default::default()
            })
        }

        fn precheck(
            &self,
            _ctx: &CallContext,
            request: &PublicIpAddressPrecheckRequest,
        ) -> Result<PublicIpAddressPrecheckResponse, ApiError> {
            self.prechecked.lock().unwrap().push(request.clone());
            Ok(self.precheck_reply.clone())
        }
    }

    fn ctx() -> CallContext {
        CallContext::background()
    }

    fn record(name: &str) -> PublicIpAddress {
        PublicIpAddress {
            properties: Some(PublicIpAddressProperties {
                ip_address: Some("20.1.2.3".to_string()),
                ..Default::default()
            }),
            ..PublicIpAddress::named(name)
        }
    }

    #[test]
    fn get_all_at_location() {
        let client = PublicIpAddressClient::new(FakeTransport::with(&["pip1", "pip2"]));
        let pips = client.get(&ctx(), "loc1", "").unwrap();
        assert_eq!(pips.len(), 2);
        assert_eq!(client.transport().operations(), [Operation::Get]);
    }

    #[test]
    fn get_by_name_returns_at_most_one() {
        let client = PublicIpAddressClient::new(FakeTransport::with(&["pip1", "pip2"]));
        let pips = client.get(&ctx(), "loc1", "pip1").unwrap();
        assert_eq!(pips.len(), 1);
        assert_eq!(pips[0].name.as_deref(), Some("pip1"));
        assert_eq!(pips[0].id.as_deref(), Some("id-pip1"));
    }

    #[test]
    fn get_without_location_never_reaches_transport() {
        let client = PublicIpAddressClient::new(FakeTransport::default());
        let err = client.get(&ctx(), "", "pip1").unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(client.transport().operations().is_empty());
    }

    #[test]
    fn create_or_update_requires_record() {
        let client = PublicIpAddressClient::new(FakeTransport::default());
        let err = client.create_or_update(&ctx(), "loc1", "pip1", None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfiguration(_)));
        assert!(client.transport().operations().is_empty());
    }

    #[test]
    fn create_or_update_requires_properties() {
        let client = PublicIpAddressClient::new(FakeTransport::default());
        let bare = PublicIpAddress::named("pip1");
        let err = client.create_or_update(&ctx(), "loc1", "pip1", Some(&bare)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfiguration(_)));
    }

    #[test]
    fn create_or_update_returns_first_record() {
        let client = PublicIpAddressClient::new(FakeTransport::default());
        let created = client
            .create_or_update(&ctx(), "loc1", "pip1", Some(&record("pip1")))
            .unwrap();
        assert_eq!(created.name.as_deref(), Some("pip1"));
        assert_eq!(created.id.as_deref(), Some("generated"));
        assert_eq!(client.transport().operations(), [Operation::Post]);
    }

    #[test]
    fn delete_missing_issues_no_delete() {
        let client = PublicIpAddressClient::new(FakeTransport::with(&["pip2"]));
        let err = client.delete(&ctx(), "loc1", "pip1").unwrap_err();
        assert!(matches!(&err, ApiError::NotFound(msg) if msg.contains("pip1")));
        assert_eq!(client.transport().operations(), [Operation::Get]);
    }

    #[test]
    fn delete_without_name_never_reaches_transport() {
        let client = PublicIpAddressClient::new(FakeTransport::with(&["a", "b"]));
        let err = client.delete(&ctx(), "loc1", "").unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(client.transport().operations().is_empty());
    }

    #[test]
    fn delete_sends_fetched_record() {
        let client = PublicIpAddressClient::new(FakeTransport::with(&["pip1"]));
        client.delete(&ctx(), "loc1", "pip1").unwrap();

        let invoked = client.transport().invoked.lock().unwrap();
        assert_eq!(invoked.len(), 2);
        assert_eq!(invoked[1].operation_type, Operation::Delete);
        let sent = &invoked[1].public_ip_addresses[0];
        assert_eq!(sent.id, "id-pip1");
        assert_eq!(sent.ip_address, "20.1.2.3");
    }

    #[test]
    fn transport_errors_propagate() {
        let transport = FakeTransport {
            fail_with: Some(503),
            ..FakeTransport::default()
        };
        let client = PublicIpAddressClient::new(transport);
        let err = client.get(&ctx(), "loc1", "").unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 503, .. }));
        assert!(err.is_remote());
    }

    #[test]
    fn precheck_passes_only_present_records() {
        let transport = FakeTransport {
            precheck_reply: PublicIpAddressPrecheckResponse {
                result: Some(BoolValue { value: true }),
                error: String::new(),
            },
            ..FakeTransport::default()
        };
        let client = PublicIpAddressClient::new(transport);
        let ok = client
            .precheck(&ctx(), "loc1", &[Some(record("a")), None, Some(record("b"))])
            .unwrap();
        assert!(ok);

        let prechecked = client.transport().prechecked.lock().unwrap();
        assert_eq!(prechecked[0].public_ip_addresses.len(), 2);
    }

    #[test]
    fn precheck_rejection_is_an_error() {
        let transport = FakeTransport {
            precheck_reply: PublicIpAddressPrecheckResponse {
                result: Some(BoolValue { value: false }),
                error: "address pool exhausted".to_string(),
            },
            ..FakeTransport::default()
        };
        let client = PublicIpAddressClient::new(transport);
        let err = client.precheck(&ctx(), "loc1", &[Some(record("a"))]).unwrap_err();
        assert!(matches!(&err, ApiError::Remote(msg) if msg == "address pool exhausted"));
    }
}
