// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Local and peer cluster targets.
//!
//! # Local exposed addresses
//!
//! The addresses this cluster answers on are read from the load balancer status
//! of the `Gslb`'s Ingress. IP entries are used verbatim; hostname entries (as set
//! by cloud load balancers) are resolved through the system resolver.
//!
//! # Peer targets
//!
//! Every peer cluster publishes its own healthy addresses for a host as the
//! `localtargets-<host>` `A`/`AAAA` records on its nameserver. We query each
//! configured peer nameserver for both families and group the answers by the
//! peer's geo tag. A peer that does not answer is logged and left out, which is
//! exactly how an unhealthy peer looks.

use super::RemoteTargetSource;
use crate::config::OperatorConfig;
use crate::constants::PEER_DNS_QUERY_TIMEOUT_SECS;
use crate::crd::Gslb;
use crate::dns_records::local_targets_name;
use crate::gslb_errors::GslbError;
use crate::targets::{split_by_family, GeoTag, TargetSet};
use anyhow::{Context, Result};
use async_trait::async_trait;
use hickory_client::client::{Client, SyncClient};
use hickory_client::rr::{DNSClass, Name, RData, Record, RecordType};
use hickory_client::udp::UdpClientConnection;
use k8s_openapi::api::networking::v1::Ingress;
use kube::{Api, Client as KubeClient, ResourceExt};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// [`RemoteTargetSource`] backed by the Ingress status and peer nameservers.
#[derive(Clone)]
pub struct DnsProvider {
    client: KubeClient,
    config: Arc<OperatorConfig>,
}

impl DnsProvider {
    #[must_use]
    pub fn new(client: KubeClient, config: Arc<OperatorConfig>) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl RemoteTargetSource for DnsProvider {
    async fn exposed_local_ips(&self, gslb: &Gslb) -> Result<Vec<String>, GslbError> {
        let namespace = gslb.namespace().unwrap_or_default();
        let ingress_name = gslb
            .spec
            .ingress_ref
            .clone()
            .unwrap_or_else(|| gslb.name_any());
        let lookup_error = |reason: String| GslbError::RemoteLookup {
            name: gslb.name_any(),
            reason,
        };

        let api: Api<Ingress> = Api::namespaced(self.client.clone(), &namespace);
        let ingress = api
            .get(&ingress_name)
            .await
            .map_err(|e| lookup_error(format!("ingress {namespace}/{ingress_name}: {e}")))?;

        let (mut ips, hostnames) = ingress_addresses(&ingress);
        for hostname in hostnames {
            let resolved = tokio::net::lookup_host((hostname.as_str(), 0))
                .await
                .map_err(|e| lookup_error(format!("resolve {hostname}: {e}")))?;
            ips.extend(resolved.map(|addr| addr.ip().to_string()));
        }

        Ok(order_local_ips(ips))
    }

    async fn external_targets_for(&self, host: &str) -> Result<TargetSet, GslbError> {
        query_peers(
            &self.config.ext_cluster_nameservers,
            host,
            Duration::from_secs(PEER_DNS_QUERY_TIMEOUT_SECS),
        )
        .await
    }
}

/// Splits the Ingress load balancer entries into `(ips, hostnames)`.
#[must_use]
pub fn ingress_addresses(ingress: &Ingress) -> (Vec<String>, Vec<String>) {
    let entries = ingress
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref());

    let mut ips = Vec::new();
    let mut hostnames = Vec::new();
    for entry in entries.into_iter().flatten() {
        if let Some(ip) = entry.ip.as_ref().filter(|ip| !ip.is_empty()) {
            ips.push(ip.clone());
        } else if let Some(hostname) = entry.hostname.as_ref().filter(|h| !h.is_empty()) {
            hostnames.push(hostname.clone());
        }
    }
    (ips, hostnames)
}

/// Dedups `ips` keeping first occurrences, IPv4 addresses first.
#[must_use]
pub fn order_local_ips(ips: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ips.len());
    for ip in ips {
        if !unique.contains(&ip) {
            unique.push(ip);
        }
    }
    let (mut ordered, ipv6) = split_by_family(&unique);
    ordered.extend(ipv6);
    ordered
}

/// Absolute name of the `localtargets-<host>` record.
///
/// # Errors
///
/// Returns [`GslbError::RemoteLookup`] if the name is not a valid DNS name.
pub fn local_targets_fqdn(host: &str) -> Result<Name, GslbError> {
    let name = format!("{}.", local_targets_name(host.trim_end_matches('.')));
    Name::from_str(&name).map_err(|e| GslbError::RemoteLookup {
        name: host.to_string(),
        reason: format!("invalid record name {name}: {e}"),
    })
}

/// IP literals of the `A` and `AAAA` answers in `records`.
#[must_use]
pub fn addresses_from_records(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| match record.data() {
            Some(RData::A(ip)) => Some(ip.to_string()),
            Some(RData::AAAA(ip)) => Some(ip.to_string()),
            _ => None,
        })
        .collect()
}

/// Collects the `localtargets-<host>` answers of every peer nameserver.
///
/// Returned IP lists are sorted per geo tag.
///
/// # Errors
///
/// Returns [`GslbError::RemoteLookup`] if `host` can't form a valid record name.
/// Unreachable peers are not errors.
pub async fn query_peers(
    nameservers: &BTreeMap<GeoTag, SocketAddr>,
    host: &str,
    timeout: Duration,
) -> Result<TargetSet, GslbError> {
    let fqdn = local_targets_fqdn(host)?;
    let mut targets = TargetSet::new();

    for (geo_tag, server) in nameservers {
        match query_peer(&fqdn, *server, timeout).await {
            Ok(ips) => {
                debug!(
                    %host,
                    peer = %geo_tag,
                    %server,
                    targets = ?ips,
                    "Received peer targets"
                );
                targets.append(geo_tag, ips);
            }
            Err(e) => {
                warn!(
                    %host,
                    peer = %geo_tag,
                    %server,
                    error = %format!("{e:#}"),
                    "Peer nameserver did not answer, skipping"
                );
            }
        }
    }

    targets.sort();
    Ok(targets)
}

/// Queries one peer nameserver for the `A` and `AAAA` records of `fqdn`.
async fn query_peer(fqdn: &Name, server: SocketAddr, timeout: Duration) -> Result<Vec<String>> {
    let fqdn = fqdn.clone();

    tokio::task::spawn_blocking(move || {
        let conn = UdpClientConnection::with_timeout(server, timeout)
            .context("Failed to create UDP connection for query")?;
        let client = SyncClient::new(conn);

        let mut ips = Vec::new();
        for record_type in [RecordType::A, RecordType::AAAA] {
            let response = client
                .query(&fqdn, DNSClass::IN, record_type)
                .with_context(|| format!("Failed to query {record_type:?} record for {fqdn}"))?;
            let records: Vec<Record> = response
                .answers()
                .iter()
                .filter(|r| r.record_type() == record_type)
                .cloned()
                .collect();
            ips.extend(addresses_from_records(&records));
        }
        Ok(ips)
    })
    .await
    .context("DNS query task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::networking::v1::{
        IngressLoadBalancerIngress, IngressLoadBalancerStatus, IngressStatus,
    };
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn ingress(entries: Vec<(Option<&str>, Option<&str>)>) -> Ingress {
        Ingress {
            status: Some(IngressStatus {
                load_balancer: Some(IngressLoadBalancerStatus {
                    ingress: Some(
                        entries
                            .into_iter()
                            .map(|(ip, hostname)| IngressLoadBalancerIngress {
                                ip: ip.map(ToString::to_string),
                                hostname: hostname.map(ToString::to_string),
                                ..Default::default()
                            })
                            .collect(),
                    ),
                }),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_ingress_addresses_splits_ips_and_hostnames() {
        let ingress = ingress(vec![
            (Some("10.0.0.1"), None),
            (None, Some("lb.example.com")),
            (Some("2001:db8::1"), None),
            (None, None),
        ]);

        let (ips, hostnames) = ingress_addresses(&ingress);

        assert_eq!(ips, vec!["10.0.0.1", "2001:db8::1"]);
        assert_eq!(hostnames, vec!["lb.example.com"]);
    }

    #[test]
    fn test_ingress_without_status_has_no_addresses() {
        let (ips, hostnames) = ingress_addresses(&Ingress::default());
        assert!(ips.is_empty());
        assert!(hostnames.is_empty());
    }

    #[test]
    fn test_order_local_ips_dedups_and_puts_ipv4_first() {
        let ordered = order_local_ips(vec![
            "2001:db8::1".to_string(),
            "10.0.0.2".to_string(),
            "10.0.0.1".to_string(),
            "10.0.0.2".to_string(),
        ]);

        assert_eq!(ordered, vec!["10.0.0.2", "10.0.0.1", "2001:db8::1"]);
    }

    #[test]
    fn test_local_targets_fqdn() {
        let name = local_targets_fqdn("app.cloud.example.com").unwrap();
        assert_eq!(name.to_string(), "localtargets-app.cloud.example.com.");
        assert!(name.is_fqdn());
    }

    #[test]
    fn test_local_targets_fqdn_rejects_oversized_label() {
        let host = format!("{}.example.com", "a".repeat(60));
        let err = local_targets_fqdn(&host).unwrap_err();
        assert_eq!(err.status_reason(), "RemoteLookupFailed");
    }

    #[test]
    fn test_addresses_from_records() {
        let name = Name::from_str("localtargets-app.example.com.").unwrap();
        let records = vec![
            Record::from_rdata(name.clone(), 30, RData::A(Ipv4Addr::new(10, 0, 0, 1).into())),
            Record::from_rdata(
                name,
                30,
                RData::AAAA(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1).into()),
            ),
        ];

        assert_eq!(
            addresses_from_records(&records),
            vec!["10.0.0.1", "2001:db8::1"]
        );
    }

    #[tokio::test]
    async fn test_query_peers_without_nameservers_is_empty() {
        let targets = query_peers(
            &BTreeMap::new(),
            "app.cloud.example.com",
            Duration::from_millis(100),
        )
        .await
        .unwrap();

        assert!(targets.is_empty());
    }

    #[tokio::test]
    async fn test_query_peers_skips_unreachable_peer() {
        let nameservers: BTreeMap<GeoTag, SocketAddr> =
            [("us".to_string(), "127.0.0.1:9".parse().unwrap())]
                .into_iter()
                .collect();

        let targets = query_peers(
            &nameservers,
            "app.cloud.example.com",
            Duration::from_millis(200),
        )
        .await
        .unwrap();

        assert!(targets.get("us").is_none());
    }
}
