// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the GSLB operator.
//!
//! All metrics use the namespace prefix `gslb_firestoned_io_` (prometheus-safe
//! version of "gslb.firestoned.io") and live in a [`GslbMetrics`] handle that owns
//! its own [`Registry`]. The handle is created once in `main` and passed to the
//! reconcilers through the shared context; there is no global registry.
//!
//! # Metrics Categories
//!
//! - **Strategy Status** - Number of published targets per `Gslb`, by strategy type,
//!   local health and (for failover) role
//! - **Reconciliation Metrics** - Reconciliation outcomes and durations
//!
//! # Example
//!
//! ```rust,no_run
//! use gslb::metrics::GslbMetrics;
//!
//! let metrics = GslbMetrics::new().expect("metrics register");
//! metrics.record_reconciliation_success(std::time::Duration::from_secs(1));
//! let text = metrics.gather().expect("metrics encode");
//! ```

use crate::crd::{Gslb, HealthStatus};
use crate::providers::StatusReporter;
use kube::ResourceExt;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::collections::BTreeMap;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all GSLB metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "gslb_firestoned_io";

/// Label names shared by the per-`Gslb` gauges
const GSLB_LABELS: &[&str] = &["namespace", "name", "health"];

/// Handle to every metric exported by the operator.
///
/// Prometheus collectors are internally synchronized, so one handle can be shared
/// by concurrent reconciliations.
#[derive(Clone)]
pub struct GslbMetrics {
    registry: Registry,

    /// Published targets of `roundrobin` hosts
    ///
    /// Labels: `namespace`, `name`, `health`
    pub roundrobin_status: GaugeVec,

    /// Published targets of `geo` hosts
    ///
    /// Labels: `namespace`, `name`, `health`
    pub geo_status: GaugeVec,

    /// Published targets of `failover` hosts
    ///
    /// Labels: `namespace`, `name`, `health`, `role` (`primary`, `secondary`)
    pub failover_status: GaugeVec,

    /// Number of targets published across all hosts of a `Gslb`
    ///
    /// Labels: `namespace`, `name`
    pub healthy_records: GaugeVec,

    /// Total number of reconciliations by status (`success`, `error`)
    pub reconciliations_total: CounterVec,

    /// Duration of reconciliations in seconds
    pub reconciliation_duration_seconds: HistogramVec,

    /// Total number of reconciliation errors by status reason
    ///
    /// Labels: `reason` (e.g. `ZoneMismatch`, `HealthLookupFailed`)
    pub errors_total: CounterVec,
}

impl GslbMetrics {
    /// Creates the metrics and registers them in a fresh registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric definition is invalid or registered twice.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Creates the metrics and registers them in `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric definition is invalid or registered twice.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let roundrobin_status = GaugeVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_roundrobin_status"),
                "Number of targets published for roundrobin Gslb hosts",
            ),
            GSLB_LABELS,
        )?;
        let geo_status = GaugeVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_geo_status"),
                "Number of targets published for geo Gslb hosts",
            ),
            GSLB_LABELS,
        )?;
        let failover_status = GaugeVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_failover_status"),
                "Number of targets published for failover Gslb hosts by cluster role",
            ),
            &["namespace", "name", "health", "role"],
        )?;
        let healthy_records = GaugeVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_healthy_records"),
                "Number of targets published across all hosts of a Gslb",
            ),
            &["namespace", "name"],
        )?;
        let reconciliations_total = CounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_reconciliations_total"),
                "Total number of Gslb reconciliations by status",
            ),
            &["status"],
        )?;
        let reconciliation_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                format!("{METRICS_NAMESPACE}_reconciliation_duration_seconds"),
                "Duration of Gslb reconciliations in seconds",
            )
            .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
            &["status"],
        )?;
        let errors_total = CounterVec::new(
            Opts::new(
                format!("{METRICS_NAMESPACE}_errors_total"),
                "Total number of Gslb reconciliation errors by reason",
            ),
            &["reason"],
        )?;

        registry.register(Box::new(roundrobin_status.clone()))?;
        registry.register(Box::new(geo_status.clone()))?;
        registry.register(Box::new(failover_status.clone()))?;
        registry.register(Box::new(healthy_records.clone()))?;
        registry.register(Box::new(reconciliations_total.clone()))?;
        registry.register(Box::new(reconciliation_duration_seconds.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;

        Ok(Self {
            registry,
            roundrobin_status,
            geo_status,
            failover_status,
            healthy_records,
            reconciliations_total,
            reconciliation_duration_seconds,
            errors_total,
        })
    }

    /// Record a successful reconciliation
    pub fn record_reconciliation_success(&self, duration: Duration) {
        self.record_reconciliation("success", duration);
    }

    /// Record a failed reconciliation and its status reason
    pub fn record_reconciliation_error(&self, reason: &str, duration: Duration) {
        self.record_reconciliation("error", duration);
        self.errors_total.with_label_values(&[reason]).inc();
    }

    fn record_reconciliation(&self, status: &str, duration: Duration) {
        self.reconciliations_total.with_label_values(&[status]).inc();
        self.reconciliation_duration_seconds
            .with_label_values(&[status])
            .observe(duration.as_secs_f64());
    }

    /// Record how many targets a `Gslb` publishes in total
    pub fn set_healthy_records(&self, gslb: &Gslb, healthy_records: &BTreeMap<String, Vec<String>>) {
        let namespace = gslb.namespace().unwrap_or_default();
        let name = gslb.name_any();
        let targets: Vec<String> = healthy_records.values().flatten().cloned().collect();
        self.healthy_records
            .with_label_values(&[namespace.as_str(), name.as_str()])
            .set(target_count(&targets));
    }

    /// Gather and encode all metrics in Prometheus text format
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
    }

    /// Sets the gauge of the current health and zeroes the other one, so a
    /// health flip does not leave a stale series behind.
    fn set_status(gauge: &GaugeVec, gslb: &Gslb, extra: &[&str], health: HealthStatus, count: f64) {
        let namespace = gslb.namespace().unwrap_or_default();
        let name = gslb.name_any();
        for candidate in [HealthStatus::Healthy, HealthStatus::Unhealthy] {
            let mut values = vec![namespace.as_str(), name.as_str(), candidate.as_str()];
            values.extend_from_slice(extra);
            let value = if candidate == health { count } else { 0.0 };
            gauge.with_label_values(&values).set(value);
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn target_count(targets: &[String]) -> f64 {
    targets.len() as f64
}

impl StatusReporter for GslbMetrics {
    fn update_round_robin(&self, gslb: &Gslb, health: HealthStatus, targets: &[String]) {
        Self::set_status(
            &self.roundrobin_status,
            gslb,
            &[],
            health,
            target_count(targets),
        );
    }

    fn update_geo(&self, gslb: &Gslb, health: HealthStatus, targets: &[String]) {
        Self::set_status(&self.geo_status, gslb, &[], health, target_count(targets));
    }

    fn update_failover(
        &self,
        gslb: &Gslb,
        is_primary: bool,
        health: HealthStatus,
        targets: &[String],
    ) {
        let role = if is_primary { "primary" } else { "secondary" };
        Self::set_status(
            &self.failover_status,
            gslb,
            &[role],
            health,
            target_count(targets),
        );
    }
}
