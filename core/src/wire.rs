//! Wire messages exchanged with the public IP address agent.
//!
//! # Design
//! These structs are the JSON rendering of the agent's schema. Field names
//! are a cross-process contract and must not be renamed on this side alone.
//! Scalar fields default to empty when the agent omits them, matching how the
//! agent itself treats unset fields. The mock agent defines its own copy of
//! this schema; the integration tests catch drift between the two.

use serde::{Deserialize, Serialize};

/// Operation discriminator for an `Invoke` call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Get,
    Post,
    Delete,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum WireAllocation {
    #[default]
    Dynamic,
    Static,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum WireIpVersion {
    #[default]
    IPv4,
    IPv6,
}

/// A public IP address as the agent represents it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicIpAddressMessage {
    pub name: String,
    pub id: String,
    pub location_name: String,
    pub ip_address: String,
    pub allocation: WireAllocation,
    pub ip_version: WireIpVersion,
    pub domain_name_label: String,
    pub reverse_fqdn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

/// Protocol-native tag list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Tags {
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Status {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_status: Option<ProvisionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ErrorStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Health {
    pub current_state: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvisionStatus {
    pub current_state: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ErrorStatus {
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Version {
    pub number: String,
}

/// Boolean wrapper used by precheck replies.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BoolValue {
    pub value: bool,
}

/// Request envelope for `Invoke`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpAddressRequest {
    pub operation_type: Operation,
    #[serde(rename = "publicIPAddresses", default)]
    pub public_ip_addresses: Vec<PublicIpAddressMessage>,
}

/// Reply envelope for `Invoke`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublicIpAddressResponse {
    #[serde(rename = "publicIPAddresses")]
    pub public_ip_addresses: Vec<PublicIpAddressMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<BoolValue>,
    pub error: String,
}

/// Request envelope for `Precheck`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublicIpAddressPrecheckRequest {
    #[serde(rename = "publicIPAddresses")]
    pub public_ip_addresses: Vec<PublicIpAddressMessage>,
}

/// Reply envelope for `Precheck`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublicIpAddressPrecheckResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<BoolValue>,
    pub error: String,
}
