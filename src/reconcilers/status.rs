// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status condition helpers and the `Gslb` status updater.
//!
//! Kubernetes conditions follow a standard format:
//! - `type`: The aspect of the resource being reported (e.g., "Ready")
//! - `status`: "True", "False", or "Unknown"
//! - `reason`: A programmatic identifier (CamelCase)
//! - `message`: A human-readable explanation
//! - `lastTransitionTime`: RFC3339 timestamp when the condition changed
//!
//! # Example
//!
//! ```rust,no_run
//! use gslb::reconcilers::status::create_condition;
//!
//! let condition = create_condition(
//!     "Ready",
//!     "True",
//!     "RecordsPublished",
//!     "Published records for 2 host(s)"
//! );
//! ```

use crate::crd::{Condition, Gslb, GslbStatus, HealthStatus};
use anyhow::Result;
use chrono::Utc;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::debug;

/// Condition type set on every reconciliation
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Reason of a `Ready=True` condition
pub const REASON_RECORDS_PUBLISHED: &str = "RecordsPublished";

/// Create a new Kubernetes condition with the current timestamp.
///
/// # Arguments
///
/// * `condition_type` - The type of condition (e.g., "Ready")
/// * `status` - The status: "True", "False", or "Unknown"
/// * `reason` - A programmatic identifier in `CamelCase`
/// * `message` - A human-readable explanation
#[must_use]
pub fn create_condition(
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) -> Condition {
    Condition {
        r#type: condition_type.to_string(),
        status: status.to_string(),
        reason: Some(reason.to_string()),
        message: Some(message.to_string()),
        last_transition_time: Some(Utc::now().to_rfc3339()),
    }
}

/// Find a condition by type in a list of conditions.
#[must_use]
pub fn find_condition<'a>(
    conditions: &'a [Condition],
    condition_type: &str,
) -> Option<&'a Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Update or add a condition in a mutable conditions list (in-memory, no API call).
///
/// Preserves the `lastTransitionTime` if the status hasn't changed.
pub fn update_condition_in_memory(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: &str,
    reason: &str,
    message: &str,
) {
    if let Some(existing) = conditions.iter_mut().find(|c| c.r#type == condition_type) {
        let last_transition_time = if existing.status == status {
            existing
                .last_transition_time
                .clone()
                .unwrap_or_else(|| Utc::now().to_rfc3339())
        } else {
            Utc::now().to_rfc3339()
        };

        existing.status = status.to_string();
        existing.reason = Some(reason.to_string());
        existing.message = Some(message.to_string());
        existing.last_transition_time = Some(last_transition_time);
    } else {
        conditions.push(create_condition(condition_type, status, reason, message));
    }
}

/// Compare two condition lists, ignoring `lastTransitionTime`.
#[must_use]
pub fn conditions_equal(current: &[Condition], new: &[Condition]) -> bool {
    if current.len() != new.len() {
        return false;
    }

    new.iter().all(|new_cond| {
        find_condition(current, &new_cond.r#type).is_some_and(|curr_cond| {
            curr_cond.status == new_cond.status
                && curr_cond.reason == new_cond.reason
                && curr_cond.message == new_cond.message
        })
    })
}

/// Collects the status of one `Gslb` reconciliation and writes it in one call.
///
/// Writing only when something changed keeps status patches from retriggering
/// the controller in a tight loop.
///
/// # Example
///
/// ```rust,ignore
/// use gslb::reconcilers::status::GslbStatusUpdater;
///
/// let mut status = GslbStatusUpdater::new(&gslb);
/// status.set_outcome(&update.service_health, &update.healthy_records);
/// status.set_condition("Ready", "True", "RecordsPublished", "Published");
/// status.apply(&client).await?;
/// ```
pub struct GslbStatusUpdater {
    namespace: String,
    name: String,
    current_status: Option<GslbStatus>,
    new_status: GslbStatus,
}

impl GslbStatusUpdater {
    /// Starts from the current status of `gslb`.
    ///
    /// `geoTag`, `hosts` and `observedGeneration` are filled in immediately since
    /// they only depend on the object itself.
    #[must_use]
    pub fn new(gslb: &Gslb, geo_tag: &str) -> Self {
        let current_status = gslb.status.clone();
        let mut new_status = current_status.clone().unwrap_or_default();

        let hosts: Vec<&str> = gslb.spec.hosts.iter().map(|h| h.host.as_str()).collect();
        new_status.hosts = Some(hosts.join(", "));
        new_status.geo_tag = Some(geo_tag.to_string());
        new_status.observed_generation = gslb.metadata.generation;

        Self {
            namespace: gslb.namespace().unwrap_or_default(),
            name: gslb.name_any(),
            current_status,
            new_status,
        }
    }

    /// Update or add a condition (in-memory only, no API call).
    pub fn set_condition(
        &mut self,
        condition_type: &str,
        status: &str,
        reason: &str,
        message: &str,
    ) {
        update_condition_in_memory(
            &mut self.new_status.conditions,
            condition_type,
            status,
            reason,
            message,
        );
    }

    /// Record the per-host health and published targets.
    pub fn set_outcome(
        &mut self,
        service_health: &BTreeMap<String, HealthStatus>,
        healthy_records: &BTreeMap<String, Vec<String>>,
    ) {
        service_health.clone_into(&mut self.new_status.service_health);
        healthy_records.clone_into(&mut self.new_status.healthy_records);
    }

    /// The status that [`apply`](Self::apply) would write.
    #[must_use]
    pub fn status(&self) -> &GslbStatus {
        &self.new_status
    }

    /// True when the collected status differs semantically from the current one.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        match &self.current_status {
            None => true,
            Some(current) => {
                current.service_health != self.new_status.service_health
                    || current.healthy_records != self.new_status.healthy_records
                    || current.geo_tag != self.new_status.geo_tag
                    || current.hosts != self.new_status.hosts
                    || current.observed_generation != self.new_status.observed_generation
                    || !conditions_equal(&current.conditions, &self.new_status.conditions)
            }
        }
    }

    /// Apply the collected status changes to Kubernetes (single API call).
    ///
    /// # Errors
    ///
    /// Returns an error if the Kubernetes API call fails.
    pub async fn apply(&self, client: &Client) -> Result<()> {
        if !self.has_changes() {
            debug!(
                "Gslb {}/{} status unchanged, skipping update",
                self.namespace, self.name
            );
            return Ok(());
        }

        let api: Api<Gslb> = Api::namespaced(client.clone(), &self.namespace);
        let patch = json!({
            "status": self.new_status
        });

        api.patch_status(&self.name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        debug!(
            "Updated Gslb {}/{} status: {} host(s), {} condition(s)",
            self.namespace,
            self.name,
            self.new_status.healthy_records.len(),
            self.new_status.conditions.len()
        );

        Ok(())
    }
}
