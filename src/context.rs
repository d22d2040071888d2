// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the `Gslb` controller.
//!
//! The controller receives an `Arc<Context>` that contains:
//! - Kubernetes client
//! - Process-wide operator configuration
//! - The health and target collaborators the record engine consults
//! - The metrics handle, which doubles as the engine's status reporter

use crate::config::OperatorConfig;
use crate::metrics::GslbMetrics;
use crate::providers::{DnsProvider, HealthSource, KubeHealthSource, RemoteTargetSource};
use kube::Client;
use std::sync::Arc;

/// Shared context passed to every reconciliation.
#[derive(Clone)]
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// Immutable operator configuration
    pub config: Arc<OperatorConfig>,

    /// Local workload health
    pub health: Arc<dyn HealthSource>,

    /// Local exposed addresses and peer cluster targets
    pub targets: Arc<dyn RemoteTargetSource>,

    /// Metrics registry for observability
    pub metrics: Arc<GslbMetrics>,
}

impl Context {
    /// Builds a context backed by the Kubernetes and DNS collaborators.
    #[must_use]
    pub fn new(client: Client, config: Arc<OperatorConfig>, metrics: Arc<GslbMetrics>) -> Self {
        Self {
            health: Arc::new(KubeHealthSource::new(client.clone())),
            targets: Arc::new(DnsProvider::new(client.clone(), config.clone())),
            client,
            config,
            metrics,
        }
    }
}
