// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Computation of the `DNSEndpoint` published for a `Gslb`.
//!
//! [`gslb_dns_endpoint`] ties the collaborators together for one pass:
//!
//! 1. Every host is checked against the delegated zone before anything else runs
//! 2. Local workload health and this cluster's exposed addresses are fetched once
//! 3. Hosts are walked in sorted order. Each healthy host gets its
//!    `localtargets-<host>` records, then its final targets are resolved from the
//!    peer targets and turned into GSLB records
//! 4. Only when every host succeeded are the outcomes reported and the
//!    `DNSEndpoint` returned
//!
//! Any error aborts the pass without output and without reporting.

use crate::config::OperatorConfig;
use crate::crd::{DNSEndpoint, DNSEndpointSpec, Endpoint, Gslb, HealthStatus};
use crate::dns_records::{gslb_endpoints, local_target_endpoints};
use crate::gslb_errors::GslbError;
use crate::labels::{DNS_TYPE_LOCAL, GSLB_DNS_TYPE, K8S_MANAGED_BY, MANAGED_BY_GSLB};
use crate::providers::{HealthSource, RemoteTargetSource, StatusReporter};
use crate::strategy::{report, resolve, ResolveInput, Role};
use crate::targets::split_by_family;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::debug;

/// Result of one successful pass over a `Gslb`.
#[derive(Clone, Debug)]
pub struct DnsUpdate {
    /// Records to persist, one batch for the whole `Gslb`
    pub endpoint: DNSEndpoint,
    /// Local workload health per host
    pub service_health: BTreeMap<String, HealthStatus>,
    /// Final targets per host
    pub healthy_records: BTreeMap<String, Vec<String>>,
}

/// Computes the records of every host of `gslb`.
///
/// # Errors
///
/// - [`GslbError::ZoneMismatch`] if any host is outside the delegated zone
/// - [`GslbError::HealthLookup`] and [`GslbError::RemoteLookup`] from the collaborators,
///   unchanged
pub async fn gslb_dns_endpoint(
    gslb: &Gslb,
    config: &OperatorConfig,
    health: &dyn HealthSource,
    targets: &dyn RemoteTargetSource,
    reporter: &dyn StatusReporter,
) -> Result<DnsUpdate, GslbError> {
    if let Some(outside) = gslb
        .spec
        .hosts
        .iter()
        .find(|gslb_host| !config.is_in_zone(&gslb_host.host))
    {
        return Err(GslbError::ZoneMismatch {
            host: outside.host.clone(),
            zone: config.dns_zone.clone(),
        });
    }

    let reported_health = health.status_for(gslb).await?;
    let exposed = targets.exposed_local_ips(gslb).await?;
    let (local_a, local_aaaa) = split_by_family(&exposed);
    let local_targets: Vec<String> = local_a.iter().chain(&local_aaaa).cloned().collect();

    let strategy = &gslb.spec.strategy;
    let role = Role::for_cluster(strategy, &config.cluster_geo_tag);

    let mut hosts: Vec<&str> = gslb.spec.hosts.iter().map(|h| h.host.as_str()).collect();
    hosts.sort_unstable();
    hosts.dedup();

    let mut endpoints: Vec<Endpoint> = Vec::new();
    let mut service_health = BTreeMap::new();
    let mut healthy_records = BTreeMap::new();

    for host in hosts {
        let host_health = reported_health
            .get(host)
            .copied()
            .unwrap_or(HealthStatus::Unhealthy);

        if host_health.is_healthy() {
            endpoints.extend(local_target_endpoints(
                host,
                strategy.dns_ttl_seconds,
                &local_a,
                &local_aaaa,
            ));
        }

        let mut remote_targets = targets.external_targets_for(host).await?;
        remote_targets.sort();

        let final_targets = resolve(
            strategy,
            ResolveInput {
                host,
                health: host_health,
                local_geo_tag: &config.cluster_geo_tag,
                local_targets: &local_targets,
                remote_targets,
            },
        );
        endpoints.extend(gslb_endpoints(host, strategy, &final_targets));

        debug!(
            gslb = %gslb.name_any(),
            %host,
            health = %host_health,
            targets = ?final_targets.ips(),
            "Resolved host targets"
        );
        service_health.insert(host.to_string(), host_health);
        healthy_records.insert(host.to_string(), final_targets.ips());
    }

    for (host, ips) in &healthy_records {
        let host_health = service_health
            .get(host)
            .copied()
            .unwrap_or(HealthStatus::Unhealthy);
        report(reporter, gslb, strategy.strategy_type, role, host_health, ips);
    }

    Ok(DnsUpdate {
        endpoint: build_dns_endpoint(gslb, endpoints),
        service_health,
        healthy_records,
    })
}

/// Wraps `endpoints` into the `DNSEndpoint` owned by `gslb`.
///
/// The object shares the name and namespace of the `Gslb` and carries a
/// controller owner reference, so it is garbage collected with it.
#[must_use]
pub fn build_dns_endpoint(gslb: &Gslb, endpoints: Vec<Endpoint>) -> DNSEndpoint {
    let mut dns_endpoint = DNSEndpoint::new(&gslb.name_any(), DNSEndpointSpec { endpoints });

    let mut labels = BTreeMap::new();
    labels.insert(GSLB_DNS_TYPE.to_string(), DNS_TYPE_LOCAL.to_string());
    labels.insert(K8S_MANAGED_BY.to_string(), MANAGED_BY_GSLB.to_string());

    let mut annotations = BTreeMap::new();
    annotations.insert(GSLB_DNS_TYPE.to_string(), DNS_TYPE_LOCAL.to_string());

    dns_endpoint.metadata.namespace = gslb.namespace();
    dns_endpoint.metadata.labels = Some(labels);
    dns_endpoint.metadata.annotations = Some(annotations);
    dns_endpoint.metadata.owner_references = gslb.controller_owner_ref(&()).map(|owner| vec![owner]);
    dns_endpoint
}
