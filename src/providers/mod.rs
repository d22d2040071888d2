// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Collaborators consulted while computing the records of a `Gslb`.
//!
//! The record engine never talks to Kubernetes or DNS directly. It is handed
//! implementations of the traits below:
//!
//! - [`HealthSource`] - health of the local workload behind each host
//! - [`RemoteTargetSource`] - this cluster's exposed addresses and the targets
//!   peer clusters currently publish for a host
//! - [`StatusReporter`] - receives the per-host outcome for status publication
//!
//! The Kubernetes and DNS backed implementations live in [`kube_health`] and
//! [`external_dns`]; the Prometheus reporter is [`crate::metrics::GslbMetrics`].

pub mod external_dns;
pub mod kube_health;

use crate::crd::{Gslb, HealthStatus};
use crate::gslb_errors::GslbError;
use crate::targets::TargetSet;
use async_trait::async_trait;
use std::collections::BTreeMap;

pub use external_dns::DnsProvider;
pub use kube_health::KubeHealthSource;

/// Health of the local cluster's workload, per host.
#[async_trait]
pub trait HealthSource: Send + Sync {
    /// Returns the health of every host of `gslb`.
    ///
    /// # Errors
    ///
    /// Returns [`GslbError::HealthLookup`] when the health backend can't be reached.
    async fn status_for(&self, gslb: &Gslb) -> Result<BTreeMap<String, HealthStatus>, GslbError>;
}

/// Source of local and peer cluster DNS targets.
#[async_trait]
pub trait RemoteTargetSource: Send + Sync {
    /// Addresses under which this cluster exposes the workload of `gslb`.
    ///
    /// # Errors
    ///
    /// Returns [`GslbError::RemoteLookup`] when the addresses can't be read.
    async fn exposed_local_ips(&self, gslb: &Gslb) -> Result<Vec<String>, GslbError>;

    /// Targets peer clusters currently publish for `host`, keyed by their geo tag.
    ///
    /// A peer that publishes nothing is simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`GslbError::RemoteLookup`] when the lookup itself can't be performed.
    async fn external_targets_for(&self, host: &str) -> Result<TargetSet, GslbError>;
}

/// Receiver of per-host runtime status, one operation per strategy type.
///
/// Calls are fire-and-forget. Implementations must tolerate concurrent calls from
/// reconciliations of different `Gslb` objects.
pub trait StatusReporter: Send + Sync {
    /// Outcome of a `roundrobin` host.
    fn update_round_robin(&self, gslb: &Gslb, health: HealthStatus, targets: &[String]);

    /// Outcome of a `geo` host.
    fn update_geo(&self, gslb: &Gslb, health: HealthStatus, targets: &[String]);

    /// Outcome of a `failover` host, with the local cluster's role.
    fn update_failover(
        &self,
        gslb: &Gslb,
        is_primary: bool,
        health: HealthStatus,
        targets: &[String],
    );
}
