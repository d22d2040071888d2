// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the GSLB operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the GSLB CRDs
pub const API_GROUP: &str = "gslb.firestoned.io";

/// API version for the GSLB CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "gslb.firestoned.io/v1alpha1";

/// Kind name for `Gslb` resource
pub const KIND_GSLB: &str = "Gslb";

/// Kind name for the external-dns `DNSEndpoint` resource
pub const KIND_DNS_ENDPOINT: &str = "DNSEndpoint";

/// Field manager used for server-side apply of generated resources
pub const FIELD_MANAGER: &str = "gslb-controller";

// ============================================================================
// DNS Constants
// ============================================================================

/// Default TTL for generated GSLB records (30 seconds)
pub const DEFAULT_DNS_TTL_SECS: u32 = 30;

/// Prefix of the always-published record carrying this cluster's own healthy targets
pub const LOCAL_TARGETS_PREFIX: &str = "localtargets-";

/// Standard DNS port used when a peer nameserver is configured without one
pub const DNS_PORT: u16 = 53;

/// Timeout for a single query against a peer cluster's nameserver
pub const PEER_DNS_QUERY_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// Controller Constants
// ============================================================================

/// Default requeue interval after a successful reconciliation
pub const DEFAULT_RECONCILE_REQUEUE_SECS: u64 = 30;

/// Requeue interval after a failed reconciliation
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 15;

/// Default bind address for the Prometheus metrics endpoint
pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";

/// Number of tokio worker threads for the controller runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Environment Variables
// ============================================================================

/// Geo tag of the cluster this operator runs in
pub const ENV_CLUSTER_GEO_TAG: &str = "CLUSTER_GEO_TAG";

/// DNS zone delegated to the GSLB clusters
pub const ENV_DNS_ZONE: &str = "DNS_ZONE";

/// Peer cluster nameservers, `tag=ip[:port],...`
pub const ENV_EXT_GSLB_CLUSTERS_NAMESERVERS: &str = "EXT_GSLB_CLUSTERS_NAMESERVERS";

/// Requeue interval for successful reconciliations, in seconds
pub const ENV_RECONCILE_REQUEUE_SECONDS: &str = "RECONCILE_REQUEUE_SECONDS";

/// Bind address of the metrics server
pub const ENV_METRICS_ADDR: &str = "METRICS_ADDR";
