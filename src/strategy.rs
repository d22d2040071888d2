// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Strategy resolution: which targets are published for a host.
//!
//! [`resolve`] is a pure function of the local health, the local targets and the
//! targets peer clusters publish. [`report`] routes the outcome to the matching
//! [`StatusReporter`] operation. Both dispatch on the closed [`StrategyType`] set
//! and share nothing else, so resolution stays free of metric side effects.
//!
//! # Rules
//!
//! | Remote targets | Strategy | Role | Local health | Published |
//! |---|---|---|---|---|
//! | none | any | any | any | local |
//! | some | `roundrobin`, `geo` | any | healthy | local + remote |
//! | some | `roundrobin`, `geo` | any | unhealthy | remote |
//! | some | `failover` | primary | healthy | local |
//! | some | `failover` | primary | unhealthy | remote |
//! | some | `failover` | secondary | any | remote |
//!
//! A peer cluster signals unhealth by no longer publishing its targets, so remote
//! targets are never pruned here.

use crate::crd::{Gslb, HealthStatus, Strategy, StrategyType};
use crate::providers::StatusReporter;
use crate::targets::TargetSet;
use std::fmt;
use tracing::info;

/// Role of the local cluster under the `failover` strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// The local cluster is the configured primary
    Primary,
    /// Any other cluster
    Secondary,
}

impl Role {
    /// Role of the cluster tagged `geo_tag` under `strategy`.
    ///
    /// Without a primary geo tag every cluster is a secondary.
    #[must_use]
    pub fn for_cluster(strategy: &Strategy, geo_tag: &str) -> Self {
        if strategy.primary_geo_tag.as_deref() == Some(geo_tag) {
            Self::Primary
        } else {
            Self::Secondary
        }
    }

    /// True for [`Role::Primary`].
    #[must_use]
    pub fn is_primary(self) -> bool {
        self == Self::Primary
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Secondary => f.write_str("secondary"),
        }
    }
}

/// Inputs of one host's resolution.
#[derive(Clone, Debug)]
pub struct ResolveInput<'a> {
    /// Host being resolved (for logging)
    pub host: &'a str,
    /// Local workload health of the host
    pub health: HealthStatus,
    /// Geo tag of the local cluster
    pub local_geo_tag: &'a str,
    /// Addresses the local cluster exposes, IPv4 first
    pub local_targets: &'a [String],
    /// Targets published by peer clusters, already sorted
    pub remote_targets: TargetSet,
}

/// Computes the final target set published for one host.
#[must_use]
pub fn resolve(strategy: &Strategy, input: ResolveInput<'_>) -> TargetSet {
    let healthy = input.health.is_healthy();
    let mut local = TargetSet::new();
    local.append(input.local_geo_tag, input.local_targets);

    if input.remote_targets.is_empty() {
        info!(host = %input.host, "No external targets have been found for host");
        return local;
    }

    match strategy.strategy_type {
        StrategyType::RoundRobin | StrategyType::Geo => {
            let mut targets = if healthy { local } else { TargetSet::new() };
            targets.append_targets(&input.remote_targets);
            targets
        }
        StrategyType::Failover => match Role::for_cluster(strategy, input.local_geo_tag) {
            Role::Primary if healthy => local,
            Role::Primary => {
                info!(
                    host = %input.host,
                    cluster = %input.local_geo_tag,
                    targets = ?input.remote_targets.ips(),
                    workload = %input.health,
                    "Executing failover strategy for primary cluster"
                );
                input.remote_targets
            }
            Role::Secondary => {
                info!(
                    host = %input.host,
                    cluster = ?strategy.primary_geo_tag,
                    targets = ?input.remote_targets.ips(),
                    workload = %input.health,
                    "Executing failover strategy for secondary cluster"
                );
                input.remote_targets
            }
        },
    }
}

/// Routes one host's outcome to the reporter operation of its strategy type.
pub fn report(
    reporter: &dyn StatusReporter,
    gslb: &Gslb,
    strategy_type: StrategyType,
    role: Role,
    health: HealthStatus,
    targets: &[String],
) {
    match strategy_type {
        StrategyType::RoundRobin => reporter.update_round_robin(gslb, health, targets),
        StrategyType::Geo => reporter.update_geo(gslb, health, targets),
        StrategyType::Failover => {
            reporter.update_failover(gslb, role.is_primary(), health, targets);
        }
    }
}
