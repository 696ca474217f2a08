//! Conversion between the local model and the agent's wire messages.
//!
//! `to_wire` validates the two preconditions the agent relies on (a location
//! and a name); everything else is a structural copy. `from_wire` never
//! fails. Empty wire strings come back as `None` so optional string fields
//! survive a round-trip; the wire enums always carry a value and come back as
//! `Some`.

use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::types::{
    AllocationMethod, DnsSettings, IpVersion, PublicIpAddress, PublicIpAddressProperties,
};
use crate::wire::{PublicIpAddressMessage, Status, Tag, Tags, WireAllocation, WireIpVersion};

pub const HEALTH_STATE: &str = "HealthState";
pub const PROVISION_STATE: &str = "ProvisionState";
pub const ERROR: &str = "Error";
pub const VERSION: &str = "Version";

/// Convert a local record into the agent's message for `location`.
pub fn to_wire(pip: &PublicIpAddress, location: &str) -> Result<PublicIpAddressMessage, ApiError> {
    if location.is_empty() {
        return Err(ApiError::InvalidInput("location not specified".to_string()));
    }
    let name = pip.name.as_deref().ok_or_else(|| {
        ApiError::InvalidConfiguration("missing name for public IP address".to_string())
    })?;

    let mut msg = PublicIpAddressMessage {
        name: name.to_string(),
        id: pip.id.clone().unwrap_or_default(),
        location_name: location.to_string(),
        ..Default::default()
    };

    if let Some(props) = &pip.properties {
        msg.ip_address = props.ip_address.clone().unwrap_or_default();
        if let Some(method) = props.allocation_method {
            msg.allocation = match method {
                AllocationMethod::Static => WireAllocation::Static,
                AllocationMethod::Dynamic => WireAllocation::Dynamic,
            };
        }
        if let Some(version) = props.ip_version {
            msg.ip_version = match version {
                IpVersion::IPv4 => WireIpVersion::IPv4,
                IpVersion::IPv6 => WireIpVersion::IPv6,
            };
        }
        if let Some(dns) = &props.dns_settings {
            msg.domain_name_label = dns.domain_name_label.clone().unwrap_or_default();
            msg.reverse_fqdn = dns.reverse_fqdn.clone().unwrap_or_default();
        }
    }

    if let Some(tags) = &pip.tags {
        msg.tags = Some(tags_to_wire(tags));
    }

    Ok(msg)
}

/// Convert an agent message back into a local record.
pub fn from_wire(msg: &PublicIpAddressMessage) -> PublicIpAddress {
    let dns_settings = if msg.domain_name_label.is_empty() && msg.reverse_fqdn.is_empty() {
        None
    } else {
        Some(DnsSettings {
            domain_name_label: non_empty(&msg.domain_name_label),
            fqdn: None,
            reverse_fqdn: non_empty(&msg.reverse_fqdn),
        })
    };

    PublicIpAddress {
        name: Some(msg.name.clone()),
        id: non_empty(&msg.id),
        location: non_empty(&msg.location_name),
        kind: None,
        tags: msg.tags.as_ref().map(tags_from_wire),
        properties: Some(PublicIpAddressProperties {
            ip_address: non_empty(&msg.ip_address),
            allocation_method: Some(match msg.allocation {
                WireAllocation::Static => AllocationMethod::Static,
                WireAllocation::Dynamic => AllocationMethod::Dynamic,
            }),
            ip_version: Some(match msg.ip_version {
                WireIpVersion::IPv4 => IpVersion::IPv4,
                WireIpVersion::IPv6 => IpVersion::IPv6,
            }),
            dns_settings,
            idle_timeout_in_minutes: None,
            statuses: msg.status.as_ref().map(statuses_from_wire).unwrap_or_default(),
        }),
    }
}

pub fn tags_to_wire(tags: &BTreeMap<String, String>) -> Tags {
    Tags {
        tags: tags
            .iter()
            .map(|(key, value)| Tag {
                key: key.clone(),
                value: value.clone(),
            })
            .collect(),
    }
}

/// Later duplicates of a key win.
pub fn tags_from_wire(tags: &Tags) -> BTreeMap<String, String> {
    tags.tags
        .iter()
        .map(|tag| (tag.key.clone(), tag.value.clone()))
        .collect()
}

/// Flatten the agent status into string pairs, one per part present.
pub fn statuses_from_wire(status: &Status) -> BTreeMap<String, String> {
    let mut statuses = BTreeMap::new();
    if let Some(health) = &status.health {
        statuses.insert(HEALTH_STATE.to_string(), health.current_state.clone());
    }
    if let Some(provisioning) = &status.provisioning_status {
        statuses.insert(PROVISION_STATE.to_string(), provisioning.current_state.clone());
    }
    if let Some(error) = &status.last_error {
        statuses.insert(ERROR.to_string(), error.message.clone());
    }
    if let Some(version) = &status.version {
        statuses.insert(VERSION.to_string(), version.number.clone());
    }
    statuses
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
