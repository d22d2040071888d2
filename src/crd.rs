// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for global server load balancing.
//!
//! # Resource Types
//!
//! - [`Gslb`] - Declares the hosts of an application and how DNS traffic for them
//!   is distributed across clusters (owned by this operator)
//! - [`DNSEndpoint`] - The external-dns resource the computed records are written to
//!   (consumed by the DNS server publishing them)
//!
//! # Example: Declaring a failover Gslb
//!
//! ```rust,no_run
//! use gslb::crd::{GslbHost, GslbSpec, Strategy, StrategyType};
//! use std::collections::BTreeMap;
//!
//! let spec = GslbSpec {
//!     ingress_ref: None,
//!     hosts: vec![GslbHost {
//!         host: "app.cloud.example.com".to_string(),
//!         service: "frontend".to_string(),
//!     }],
//!     strategy: Strategy {
//!         strategy_type: StrategyType::Failover,
//!         primary_geo_tag: Some("eu".to_string()),
//!         weight: BTreeMap::new(),
//!         dns_ttl_seconds: 30,
//!     },
//! };
//! ```

use crate::constants::DEFAULT_DNS_TTL_SECS;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Condition represents an observation of a resource's current state.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition. `Ready` is the only type set by this operator.
    pub r#type: String,

    /// Status of the condition: True, False, or Unknown.
    pub status: String,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Human-readable message indicating details about the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Last time the condition transitioned from one status to another (RFC3339 format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

/// Traffic distribution strategy.
///
/// The serialized value is also published as the `strategy` label of every record.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StrategyType {
    /// Every healthy cluster answers; targets of all clusters are published.
    RoundRobin,
    /// Like round robin, with per-geo-tag weights published as record labels.
    Geo,
    /// The primary cluster answers while healthy; secondaries take over otherwise.
    Failover,
}

impl StrategyType {
    /// Value used for the `strategy` record label and in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoundRobin => "roundrobin",
            Self::Geo => "geo",
            Self::Failover => "failover",
        }
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_dns_ttl() -> u32 {
    DEFAULT_DNS_TTL_SECS
}

/// Strategy configuration of a `Gslb`.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    /// Strategy type: `roundrobin`, `geo` or `failover`.
    #[serde(rename = "type")]
    pub strategy_type: StrategyType,

    /// Geo tag of the primary cluster. Only meaningful for `failover`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_geo_tag: Option<String>,

    /// Weight per geo tag, published as `weight-<geoTag>-<index>-<weight>` labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub weight: BTreeMap<String, u32>,

    /// TTL of the generated records, in seconds.
    #[serde(default = "default_dns_ttl")]
    pub dns_ttl_seconds: u32,
}

/// A host load balanced by a `Gslb` and the Service whose health gates it.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GslbHost {
    /// Fully qualified host name; must be inside the delegated zone.
    pub host: String,

    /// Name of the Service (same namespace) backing this host.
    pub service: String,
}

/// Health of a host's workload in the local cluster.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum HealthStatus {
    /// At least one ready endpoint backs the host.
    Healthy,
    /// No ready endpoint backs the host.
    Unhealthy,
}

impl HealthStatus {
    /// String form used in logs and metric labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Unhealthy => "Unhealthy",
        }
    }

    /// True for [`HealthStatus::Healthy`].
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Gslb` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GslbStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    /// Local workload health per host
    #[serde(default)]
    pub service_health: BTreeMap<String, HealthStatus>,
    /// Published targets per host
    #[serde(default)]
    pub healthy_records: BTreeMap<String, Vec<String>>,
    /// Geo tag of the cluster that wrote this status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_tag: Option<String>,
    /// Comma separated list of hosts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<String>,
}

/// `Gslb` distributes DNS traffic for a set of hosts across clusters.
///
/// # Example
///
/// ```yaml
/// apiVersion: gslb.firestoned.io/v1alpha1
/// kind: Gslb
/// metadata:
///   name: app
///   namespace: demo
/// spec:
///   ingressRef: app-ingress
///   hosts:
///     - host: app.cloud.example.com
///       service: frontend
///   strategy:
///     type: geo
///     weight:
///       eu: 10
///       us: 5
///     dnsTtlSeconds: 30
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "gslb.firestoned.io",
    version = "v1alpha1",
    kind = "Gslb",
    namespaced,
    shortname = "gslb",
    doc = "Gslb declares application hosts and the strategy used to distribute their DNS traffic across clusters."
)]
#[kube(status = "GslbStatus")]
#[serde(rename_all = "camelCase")]
pub struct GslbSpec {
    /// Ingress (same namespace) whose load balancer addresses are this cluster's targets.
    ///
    /// Defaults to the name of the `Gslb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_ref: Option<String>,

    /// Hosts load balanced by this `Gslb`.
    pub hosts: Vec<GslbHost>,

    /// Traffic distribution strategy.
    pub strategy: Strategy,
}

/// DNS record type of a generated endpoint.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    AAAA,
}

impl RecordType {
    /// Record type name as published by external-dns.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::AAAA => "AAAA",
        }
    }
}

/// A single DNS record set in the external-dns `DNSEndpoint` format.
///
/// Created fresh on every reconciliation and never modified afterwards.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Fully qualified record name
    pub dns_name: String,

    /// IP literals published for the name
    #[serde(default)]
    pub targets: Vec<String>,

    /// `A` or `AAAA`
    pub record_type: RecordType,

    /// TTL in seconds
    #[serde(rename = "recordTTL")]
    pub record_ttl: i64,

    /// Record labels: `strategy` plus weight labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// `DNSEndpoint` status
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// external-dns `DNSEndpoint`: the batch of records published for one `Gslb`.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "externaldns.k8s.io",
    version = "v1alpha1",
    kind = "DNSEndpoint",
    namespaced,
    doc = "DNSEndpoint is the external-dns resource holding a set of DNS records."
)]
#[kube(status = "DNSEndpointStatus")]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointSpec {
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}
