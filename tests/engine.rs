// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Record engine tests through the public API, with in-memory collaborators.
//!
//! Two clusters, `eu` and `us`, are simulated by running the engine once per
//! cluster and feeding each run the `localtargets-` records the other one
//! published.
//!
//! Run with: cargo test --test engine

mod common;

use async_trait::async_trait;
use gslb::config::OperatorConfig;
use gslb::crd::{Gslb, HealthStatus, RecordType, StrategyType};
use gslb::gslb_errors::GslbError;
use gslb::metrics::GslbMetrics;
use gslb::providers::{HealthSource, RemoteTargetSource};
use gslb::reconcilers::{gslb_dns_endpoint, DnsUpdate};
use gslb::targets::TargetSet;
use std::collections::BTreeMap;

const HOST: &str = "app.cloud.example.com";

fn config(geo_tag: &str) -> OperatorConfig {
    let env: BTreeMap<&str, &str> = [
        ("CLUSTER_GEO_TAG", geo_tag),
        ("DNS_ZONE", "cloud.example.com."),
    ]
    .into_iter()
    .collect();
    OperatorConfig::from_lookup(|key| env.get(key).map(ToString::to_string)).unwrap()
}

struct StaticHealth(HealthStatus);

#[async_trait]
impl HealthSource for StaticHealth {
    async fn status_for(&self, gslb: &Gslb) -> Result<BTreeMap<String, HealthStatus>, GslbError> {
        Ok(gslb
            .spec
            .hosts
            .iter()
            .map(|h| (h.host.clone(), self.0))
            .collect())
    }
}

struct StaticTargets {
    local: Vec<String>,
    remote: TargetSet,
}

#[async_trait]
impl RemoteTargetSource for StaticTargets {
    async fn exposed_local_ips(&self, _gslb: &Gslb) -> Result<Vec<String>, GslbError> {
        Ok(self.local.clone())
    }

    async fn external_targets_for(&self, _host: &str) -> Result<TargetSet, GslbError> {
        Ok(self.remote.clone())
    }
}

/// What a peer cluster would serve as `localtargets-<host>`.
fn published_local_targets(geo_tag: &str, update: &DnsUpdate) -> TargetSet {
    let mut set = TargetSet::new();
    for endpoint in &update.endpoint.spec.endpoints {
        if endpoint.dns_name == format!("localtargets-{HOST}") {
            set.append(geo_tag, &endpoint.targets);
        }
    }
    set
}

async fn run(
    geo_tag: &str,
    gslb: &Gslb,
    health: HealthStatus,
    local: &[&str],
    remote: TargetSet,
    metrics: &GslbMetrics,
) -> DnsUpdate {
    gslb_dns_endpoint(
        gslb,
        &config(geo_tag),
        &StaticHealth(health),
        &StaticTargets {
            local: local.iter().map(ToString::to_string).collect(),
            remote,
        },
        metrics,
    )
    .await
    .unwrap()
}

fn gslb_record_targets(update: &DnsUpdate, record_type: RecordType) -> Vec<String> {
    update
        .endpoint
        .spec
        .endpoints
        .iter()
        .find(|e| e.dns_name == HOST && e.record_type == record_type)
        .map(|e| e.targets.clone())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_round_robin_across_two_clusters() {
    let gslb = common::new_gslb("demo", "app", &[(HOST, "frontend")], StrategyType::RoundRobin, None);
    let metrics = GslbMetrics::new().unwrap();

    let us = run("us", &gslb, HealthStatus::Healthy, &["10.1.0.1"], TargetSet::new(), &metrics).await;
    let eu = run(
        "eu",
        &gslb,
        HealthStatus::Healthy,
        &["10.0.0.1", "2001:db8::1"],
        published_local_targets("us", &us),
        &metrics,
    )
    .await;

    assert_eq!(gslb_record_targets(&eu, RecordType::A), vec!["10.0.0.1", "10.1.0.1"]);
    assert_eq!(gslb_record_targets(&eu, RecordType::AAAA), vec!["2001:db8::1"]);
    assert_eq!(eu.healthy_records[HOST], vec!["10.0.0.1", "2001:db8::1", "10.1.0.1"]);
}

#[tokio::test]
async fn test_failover_moves_traffic_to_secondary_and_back() {
    let gslb = common::new_gslb("demo", "app", &[(HOST, "frontend")], StrategyType::Failover, Some("eu"));
    let metrics = GslbMetrics::new().unwrap();

    // Primary healthy: both clusters hand out the primary.
    let eu = run("eu", &gslb, HealthStatus::Healthy, &["10.0.0.1"], TargetSet::new(), &metrics).await;
    let us = run(
        "us",
        &gslb,
        HealthStatus::Healthy,
        &["10.1.0.1"],
        published_local_targets("eu", &eu),
        &metrics,
    )
    .await;
    assert_eq!(gslb_record_targets(&eu, RecordType::A), vec!["10.0.0.1"]);
    assert_eq!(gslb_record_targets(&us, RecordType::A), vec!["10.0.0.1"]);

    // Primary down: it stops publishing local targets, the secondary falls back to itself.
    let eu_down = run(
        "eu",
        &gslb,
        HealthStatus::Unhealthy,
        &["10.0.0.1"],
        published_local_targets("us", &us),
        &metrics,
    )
    .await;
    assert!(published_local_targets("eu", &eu_down).is_empty());
    assert_eq!(gslb_record_targets(&eu_down, RecordType::A), vec!["10.1.0.1"]);

    let us_alone = run(
        "us",
        &gslb,
        HealthStatus::Healthy,
        &["10.1.0.1"],
        published_local_targets("eu", &eu_down),
        &metrics,
    )
    .await;
    assert_eq!(gslb_record_targets(&us_alone, RecordType::A), vec!["10.1.0.1"]);
}

#[tokio::test]
async fn test_metrics_reflect_engine_outcome() {
    let gslb = common::new_gslb("demo", "app", &[(HOST, "frontend")], StrategyType::Geo, None);
    let metrics = GslbMetrics::new().unwrap();

    run("eu", &gslb, HealthStatus::Healthy, &["10.0.0.1", "10.0.0.2"], TargetSet::new(), &metrics).await;

    let gauge = metrics.geo_status.with_label_values(&["demo", "app", "Healthy"]);
    assert!((gauge.get() - 2.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_zone_mismatch_produces_no_output() {
    let gslb = common::new_gslb(
        "demo",
        "app",
        &[(HOST, "frontend"), ("app.other-zone.com", "frontend")],
        StrategyType::RoundRobin,
        None,
    );
    let metrics = GslbMetrics::new().unwrap();

    let err = gslb_dns_endpoint(
        &gslb,
        &config("eu"),
        &StaticHealth(HealthStatus::Healthy),
        &StaticTargets {
            local: vec!["10.0.0.1".to_string()],
            remote: TargetSet::new(),
        },
        &metrics,
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        "ingress host app.other-zone.com does not match delegated zone cloud.example.com"
    );
    assert!(!metrics.gather().unwrap().contains("roundrobin_status{"));
}
