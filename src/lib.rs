// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # GSLB - Global Server Load Balancing Operator for Kubernetes
//!
//! This operator decides, per cluster, which addresses DNS should hand out for an
//! application's hosts. Each cluster publishes its own healthy endpoints and reads
//! the ones its peers publish, then combines them according to the strategy the
//! application declares.
//!
//! ## Overview
//!
//! - A `Gslb` Custom Resource declares hosts, the Service backing each host and a
//!   strategy: `roundrobin`, `geo` (weighted) or `failover`
//! - Local health is read from the Service's `EndpointSlice`s
//! - Peer targets are read from the `localtargets-<host>` records on the peer
//!   clusters' nameservers
//! - The resulting records are written to an external-dns `DNSEndpoint`
//!
//! ## Modules
//!
//! - [`crd`] - `Gslb` and `DNSEndpoint` resource types
//! - [`targets`] - Geo-tagged target sets and address family classification
//! - [`strategy`] - Which targets are published under each strategy
//! - [`dns_records`] - Turning target sets into labelled DNS records
//! - [`providers`] - Health, target and status collaborators
//! - [`reconcilers`] - Record computation, persistence and status
//! - [`config`] - Process-wide configuration from the environment
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use gslb::strategy::{resolve, ResolveInput};
//! use gslb::crd::{HealthStatus, Strategy, StrategyType};
//! use gslb::targets::TargetSet;
//! use std::collections::BTreeMap;
//!
//! let strategy = Strategy {
//!     strategy_type: StrategyType::RoundRobin,
//!     primary_geo_tag: None,
//!     weight: BTreeMap::new(),
//!     dns_ttl_seconds: 30,
//! };
//! let local = vec!["10.0.0.1".to_string()];
//! let remote: TargetSet = vec![("us", vec!["10.1.0.1".to_string()])]
//!     .into_iter()
//!     .collect();
//!
//! let targets = resolve(
//!     &strategy,
//!     ResolveInput {
//!         host: "app.cloud.example.com",
//!         health: HealthStatus::Healthy,
//!         local_geo_tag: "eu",
//!         local_targets: &local,
//!         remote_targets: remote,
//!     },
//! );
//! assert_eq!(targets.ips(), vec!["10.0.0.1", "10.1.0.1"]);
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod dns_records;
pub mod gslb_errors;
pub mod labels;
pub mod metrics;
pub mod providers;
pub mod reconcilers;
pub mod strategy;
pub mod targets;

#[cfg(test)]
mod strategy_tests;
