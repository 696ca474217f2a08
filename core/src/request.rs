//! Request envelope builders and reply translation.
//!
//! # Design
//! Builders are free functions with no I/O, so the client verbs reduce to
//! build, send, translate. Precheck input entries that are `None` are skipped
//! and logged; a present entry that fails conversion fails the whole
//! envelope.

use tracing::debug;

use crate::convert::{from_wire, to_wire};
use crate::error::ApiError;
use crate::types::PublicIpAddress;
use crate::wire::{
    Operation, PublicIpAddressPrecheckRequest, PublicIpAddressPrecheckResponse,
    PublicIpAddressRequest, PublicIpAddressResponse,
};

/// Build an envelope for a lookup-style record carrying only `name`.
pub fn build_request_by_name(
    op: Operation,
    location: &str,
    name: &str,
) -> Result<PublicIpAddressRequest, ApiError> {
    let pip = PublicIpAddress::named(name);
    build_request(op, location, name, Some(&pip))
}

/// Wrap one converted record with `op`.
///
/// `name` is accepted for symmetry with the client verbs; the record's own
/// name is what goes on the wire.
pub fn build_request(
    op: Operation,
    location: &str,
    name: &str,
    pip: Option<&PublicIpAddress>,
) -> Result<PublicIpAddressRequest, ApiError> {
    let pip = pip.ok_or_else(|| {
        ApiError::InvalidInput(format!("no public IP address record supplied for [{name}]"))
    })?;

    Ok(PublicIpAddressRequest {
        operation_type: op,
        public_ip_addresses: vec![to_wire(pip, location)?],
    })
}

pub fn build_precheck_request(
    location: &str,
    pips: &[Option<PublicIpAddress>],
) -> Result<PublicIpAddressPrecheckRequest, ApiError> {
    let mut messages = Vec::with_capacity(pips.len());
    for (index, pip) in pips.iter().enumerate() {
        let Some(pip) = pip else {
            debug!(index, "skipping absent precheck entry");
            continue;
        };
        let msg = to_wire(pip, location)
            .map_err(|e| e.context("unable to convert public IP address for precheck"))?;
        messages.push(msg);
    }

    Ok(PublicIpAddressPrecheckRequest {
        public_ip_addresses: messages,
    })
}

/// Translate every message in an `Invoke` reply.
pub fn records_from_response(response: &PublicIpAddressResponse) -> Vec<PublicIpAddress> {
    response.public_ip_addresses.iter().map(from_wire).collect()
}

/// A missing result counts as a rejection.
pub fn precheck_result(response: &PublicIpAddressPrecheckResponse) -> Result<bool, ApiError> {
    let result = response.result.map(|r| r.value).unwrap_or(false);
    if !result {
        return Err(ApiError::Remote(response.error.clone()));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PublicIpAddressProperties;
    use crate::wire::{BoolValue, PublicIpAddressMessage};

    fn record(name: &str) -> PublicIpAddress {
        PublicIpAddress {
            properties: Some(PublicIpAddressProperties::default()),
            ..PublicIpAddress::named(name)
        }
    }

    #[test]
    fn by_name_builds_single_lookup_message() {
        let req = build_request_by_name(Operation::Get, "loc1", "pip1").unwrap();
        assert_eq!(req.operation_type, Operation::Get);
        assert_eq!(req.public_ip_addresses.len(), 1);
        assert_eq!(req.public_ip_addresses[0].name, "pip1");
        assert_eq!(req.public_ip_addresses[0].location_name, "loc1");
    }

    #[test]
    fn by_name_with_empty_name_is_a_list_query() {
        let req = build_request_by_name(Operation::Get, "loc1", "").unwrap();
        assert!(req.public_ip_addresses[0].name.is_empty());
    }

    #[test]
    fn build_request_requires_a_record() {
        let err = build_request(Operation::Post, "loc1", "pip1", None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn build_request_propagates_conversion_errors() {
        let err = build_request(Operation::Post, "", "pip1", Some(&record("pip1"))).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn precheck_skips_absent_entries() {
        let pips = vec![Some(record("a")), None, Some(record("b")), None];
        let req = build_precheck_request("loc1", &pips).unwrap();
        assert_eq!(req.public_ip_addresses.len(), 2);
        assert_eq!(req.public_ip_addresses[0].name, "a");
        assert_eq!(req.public_ip_addresses[1].name, "b");
    }

    #[test]
    fn precheck_with_only_absent_entries_is_empty() {
        let req = build_precheck_request("loc1", &[None, None]).unwrap();
        assert!(req.public_ip_addresses.is_empty());
    }

    #[test]
    fn precheck_fails_when_any_entry_fails() {
        let nameless = PublicIpAddress::default();
        let err = build_precheck_request("loc1", &[Some(record("a")), Some(nameless)]).unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("precheck"));
    }

    #[test]
    fn records_from_response_preserves_order() {
        let response = PublicIpAddressResponse {
            public_ip_addresses: vec![
                PublicIpAddressMessage { name: "a".to_string(), ..Default::default() },
                PublicIpAddressMessage { name: "b".to_string(), ..Default::default() },
            ],
            ..Default::default()
        };
        let names: Vec<_> = records_from_response(&response)
            .into_iter()
            .map(|p| p.name.unwrap())
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn precheck_result_true() {
        let response = PublicIpAddressPrecheckResponse {
            result: Some(BoolValue { value: true }),
            error: String::new(),
        };
        assert!(precheck_result(&response).unwrap());
    }

    #[test]
    fn precheck_result_false_carries_error_text() {
        let response = PublicIpAddressPrecheckResponse {
            result: Some(BoolValue { value: false }),
            error: "address 20.1.2.3 already in use".to_string(),
        };
        let err = precheck_result(&response).unwrap_err();
        assert!(matches!(&err, ApiError::Remote(msg) if msg.contains("already in use")));
    }

    #[test]
    fn precheck_result_missing_is_false() {
        let err = precheck_result(&PublicIpAddressPrecheckResponse::default()).unwrap_err();
        assert!(err.is_remote());
    }
}
