// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Workload health from the `EndpointSlice`s of the Services behind each host.
//!
//! A host is healthy when the Service it references has at least one ready
//! endpoint with an address. A missing Service simply has no slices and is
//! therefore unhealthy.

use super::HealthSource;
use crate::crd::{Gslb, HealthStatus};
use crate::gslb_errors::GslbError;
use crate::labels::K8S_SERVICE_NAME;
use async_trait::async_trait;
use k8s_openapi::api::discovery::v1::EndpointSlice;
use kube::{api::ListParams, Api, Client, ResourceExt};
use std::collections::BTreeMap;
use tracing::debug;

/// [`HealthSource`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeHealthSource {
    client: Client,
}

impl KubeHealthSource {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// True when any endpoint of any slice is ready and carries an address.
///
/// An endpoint whose readiness is unknown counts as ready, as kube-proxy does.
#[must_use]
pub fn has_ready_endpoint(slices: &[EndpointSlice]) -> bool {
    slices.iter().flat_map(|slice| &slice.endpoints).any(|endpoint| {
        let ready = endpoint
            .conditions
            .as_ref()
            .and_then(|conditions| conditions.ready)
            .unwrap_or(true);
        ready && !endpoint.addresses.is_empty()
    })
}

#[async_trait]
impl HealthSource for KubeHealthSource {
    async fn status_for(&self, gslb: &Gslb) -> Result<BTreeMap<String, HealthStatus>, GslbError> {
        let namespace = gslb.namespace().unwrap_or_default();
        let api: Api<EndpointSlice> = Api::namespaced(self.client.clone(), &namespace);

        let mut health = BTreeMap::new();
        for gslb_host in &gslb.spec.hosts {
            let params =
                ListParams::default().labels(&format!("{K8S_SERVICE_NAME}={}", gslb_host.service));
            let slices = api.list(&params).await.map_err(|e| GslbError::HealthLookup {
                gslb: gslb.name_any(),
                reason: e.to_string(),
            })?;

            let status = if has_ready_endpoint(&slices.items) {
                HealthStatus::Healthy
            } else {
                HealthStatus::Unhealthy
            };
            debug!(
                host = %gslb_host.host,
                service = %gslb_host.service,
                %status,
                "Resolved workload health"
            );
            health.insert(gslb_host.host.clone(), status);
        }

        Ok(health)
    }
}
