// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label and annotation constants used on generated resources and DNS records.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Label set by Kubernetes on every `EndpointSlice` pointing at its owning Service
pub const K8S_SERVICE_NAME: &str = "kubernetes.io/service-name";

/// Value for `app.kubernetes.io/managed-by` on resources written by this operator
pub const MANAGED_BY_GSLB: &str = "gslb-controller";

// ============================================================================
// GSLB-Specific Labels and Annotations
// ============================================================================

/// Label and annotation marking a `DNSEndpoint` as locally generated
pub const GSLB_DNS_TYPE: &str = "gslb.firestoned.io/dnstype";

/// Value of [`GSLB_DNS_TYPE`] for endpoints produced by this cluster
pub const DNS_TYPE_LOCAL: &str = "local";

// ============================================================================
// DNS Record Labels
// ============================================================================

/// Record label holding the strategy type (`roundrobin`, `geo`, `failover`)
pub const STRATEGY_LABEL: &str = "strategy";

/// Prefix of the per-target weight labels (`weight-<geoTag>-<index>-<weight>`)
pub const WEIGHT_LABEL_PREFIX: &str = "weight";

/// Builds the weight label key for the `index`-th target of `geo_tag`.
#[must_use]
pub fn weight_label(geo_tag: &str, index: usize, weight: u32) -> String {
    format!("{WEIGHT_LABEL_PREFIX}-{geo_tag}-{index}-{weight}")
}
