// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `strategy.rs`

#[cfg(test)]
mod tests {
    use crate::crd::{Gslb, GslbHost, GslbSpec, HealthStatus, Strategy, StrategyType};
    use crate::providers::StatusReporter;
    use crate::strategy::{report, resolve, ResolveInput, Role};
    use crate::targets::TargetSet;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    const HOST: &str = "app.cloud.example.com";

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn strategy(strategy_type: StrategyType, primary: Option<&str>) -> Strategy {
        Strategy {
            strategy_type,
            primary_geo_tag: primary.map(ToString::to_string),
            weight: BTreeMap::new(),
            dns_ttl_seconds: 30,
        }
    }

    fn remote() -> TargetSet {
        vec![
            ("us", strings(&["10.1.0.1", "10.1.0.2"])),
            ("za", strings(&["10.2.0.1"])),
        ]
        .into_iter()
        .collect()
    }

    fn input<'a>(
        health: HealthStatus,
        local_targets: &'a [String],
        remote_targets: TargetSet,
    ) -> ResolveInput<'a> {
        ResolveInput {
            host: HOST,
            health,
            local_geo_tag: "eu",
            local_targets,
            remote_targets,
        }
    }

    #[test]
    fn test_role_for_cluster() {
        let failover = strategy(StrategyType::Failover, Some("eu"));
        assert_eq!(Role::for_cluster(&failover, "eu"), Role::Primary);
        assert_eq!(Role::for_cluster(&failover, "us"), Role::Secondary);

        let no_primary = strategy(StrategyType::Failover, None);
        assert_eq!(Role::for_cluster(&no_primary, "eu"), Role::Secondary);

        assert!(Role::Primary.is_primary());
        assert_eq!(Role::Secondary.to_string(), "secondary");
    }

    #[test]
    fn test_round_robin_healthy_unions_local_and_remote() {
        let local = strings(&["10.0.0.1", "2001:db8::1"]);

        let targets = resolve(
            &strategy(StrategyType::RoundRobin, None),
            input(HealthStatus::Healthy, &local, remote()),
        );

        assert_eq!(targets.get("eu").unwrap().ips, local);
        assert_eq!(targets.get("us").unwrap().ips, strings(&["10.1.0.1", "10.1.0.2"]));
        assert_eq!(targets.get("za").unwrap().ips, strings(&["10.2.0.1"]));
    }

    #[test]
    fn test_round_robin_unhealthy_keeps_every_remote_entry() {
        let local = strings(&["10.0.0.1"]);

        let targets = resolve(
            &strategy(StrategyType::RoundRobin, None),
            input(HealthStatus::Unhealthy, &local, remote()),
        );

        assert!(targets.get("eu").is_none());
        assert_eq!(targets, remote());
    }

    #[test]
    fn test_geo_includes_same_targets_as_round_robin() {
        let local = strings(&["10.0.0.1"]);

        for health in [HealthStatus::Healthy, HealthStatus::Unhealthy] {
            let round_robin = resolve(
                &strategy(StrategyType::RoundRobin, None),
                input(health, &local, remote()),
            );
            let geo = resolve(
                &strategy(StrategyType::Geo, None),
                input(health, &local, remote()),
            );
            assert_eq!(round_robin, geo);
        }
    }

    #[test]
    fn test_failover_primary_healthy_publishes_only_local() {
        let local = strings(&["10.0.0.1", "10.0.0.2"]);

        let targets = resolve(
            &strategy(StrategyType::Failover, Some("eu")),
            input(HealthStatus::Healthy, &local, remote()),
        );

        assert_eq!(targets.len(), 1);
        assert_eq!(targets.ips(), local);
    }

    #[test]
    fn test_failover_primary_unhealthy_publishes_only_remote() {
        let local = strings(&["10.0.0.1"]);

        let targets = resolve(
            &strategy(StrategyType::Failover, Some("eu")),
            input(HealthStatus::Unhealthy, &local, remote()),
        );

        assert_eq!(targets, remote());
    }

    #[test]
    fn test_failover_secondary_publishes_primary_targets_regardless_of_health() {
        let local = strings(&["10.1.0.9"]);
        let primary: TargetSet = vec![("eu", strings(&["10.0.0.1"]))].into_iter().collect();

        for health in [HealthStatus::Healthy, HealthStatus::Unhealthy] {
            let targets = resolve(
                &strategy(StrategyType::Failover, Some("us")),
                ResolveInput {
                    host: HOST,
                    health,
                    local_geo_tag: "za",
                    local_targets: &local,
                    remote_targets: primary.clone(),
                },
            );
            assert_eq!(targets, primary);
        }
    }

    #[test]
    fn test_no_remote_targets_falls_back_to_local_for_every_strategy() {
        let local = strings(&["10.0.0.1", "2001:db8::1"]);
        let strategies = [
            strategy(StrategyType::RoundRobin, None),
            strategy(StrategyType::Geo, None),
            strategy(StrategyType::Failover, Some("eu")),
            strategy(StrategyType::Failover, Some("us")),
        ];

        for strategy in &strategies {
            for health in [HealthStatus::Healthy, HealthStatus::Unhealthy] {
                let targets = resolve(strategy, input(health, &local, TargetSet::new()));
                assert_eq!(targets.ips(), local, "{:?} {health}", strategy.strategy_type);
                assert!(targets.get("eu").is_some());
            }
        }
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let local = strings(&["10.0.0.1"]);
        let strategy = strategy(StrategyType::RoundRobin, None);

        let first = resolve(&strategy, input(HealthStatus::Healthy, &local, remote()));
        let second = resolve(&strategy, input(HealthStatus::Healthy, &local, remote()));

        assert_eq!(first.ips(), second.ips());
    }

    #[derive(Default)]
    struct RecordingReporter {
        calls: Mutex<Vec<String>>,
    }

    impl StatusReporter for RecordingReporter {
        fn update_round_robin(&self, gslb: &Gslb, health: HealthStatus, targets: &[String]) {
            self.calls.lock().unwrap().push(format!(
                "roundrobin {} {health} {}",
                gslb.metadata.name.as_deref().unwrap_or_default(),
                targets.len()
            ));
        }

        fn update_geo(&self, _gslb: &Gslb, health: HealthStatus, targets: &[String]) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("geo {health} {}", targets.len()));
        }

        fn update_failover(
            &self,
            _gslb: &Gslb,
            is_primary: bool,
            health: HealthStatus,
            targets: &[String],
        ) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("failover {is_primary} {health} {}", targets.len()));
        }
    }

    fn gslb(strategy_type: StrategyType) -> Gslb {
        Gslb::new(
            "app",
            GslbSpec {
                ingress_ref: None,
                hosts: vec![GslbHost {
                    host: HOST.to_string(),
                    service: "frontend".to_string(),
                }],
                strategy: strategy(strategy_type, Some("eu")),
            },
        )
    }

    #[test]
    fn test_report_dispatches_by_strategy_type() {
        let reporter = RecordingReporter::default();
        let targets = strings(&["10.0.0.1", "10.0.0.2"]);

        report(
            &reporter,
            &gslb(StrategyType::RoundRobin),
            StrategyType::RoundRobin,
            Role::Secondary,
            HealthStatus::Healthy,
            &targets,
        );
        report(
            &reporter,
            &gslb(StrategyType::Geo),
            StrategyType::Geo,
            Role::Secondary,
            HealthStatus::Unhealthy,
            &targets,
        );
        report(
            &reporter,
            &gslb(StrategyType::Failover),
            StrategyType::Failover,
            Role::Primary,
            HealthStatus::Healthy,
            &targets[..1],
        );

        assert_eq!(
            *reporter.calls.lock().unwrap(),
            vec![
                "roundrobin app Healthy 2".to_string(),
                "geo Unhealthy 2".to_string(),
                "failover true Healthy 1".to_string(),
            ]
        );
    }
}
