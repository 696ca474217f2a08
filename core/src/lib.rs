//! Client SDK for the public IP address agent.
//!
//! # Overview
//! Converts between the local `PublicIpAddress` model and the agent's wire
//! messages, then invokes one of four verbs against the agent: get,
//! create-or-update, delete and precheck. Allocation, consistency and
//! reconciliation all happen in the agent; this crate builds requests and
//! translates replies.
//!
//! # Design
//! - `convert` and `request` are pure and hold all the mapping logic.
//! - `AgentTransport` is the I/O seam. `HttpTransport` is the production
//!   implementation; `transport::connect` is the factory that returns one,
//!   keyed by subscription id.
//! - `PublicIpAddressClient` owns a transport and nothing else, so it is as
//!   thread-safe as its transport.
//! - Deadlines travel in a caller-supplied `CallContext`; the client never
//!   retries.

pub mod auth;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod request;
pub mod transport;
pub mod types;
pub mod wire;

pub use auth::{authorizer_from_env, Anonymous, Authorizer, BearerToken};
pub use client::PublicIpAddressClient;
pub use config::AgentConfig;
pub use error::ApiError;
pub use transport::{connect, AgentTransport, CallContext, HttpTransport};
pub use types::{AllocationMethod, DnsSettings, IpVersion, PublicIpAddress, PublicIpAddressProperties};
pub use wire::Operation;
