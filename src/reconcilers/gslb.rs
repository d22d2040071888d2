// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `Gslb` reconciliation logic.
//!
//! Each pass recomputes the records of every host, writes them to the
//! `DNSEndpoint` named after the `Gslb` with server-side apply and reflects the
//! outcome in the `Gslb` status. The `DNSEndpoint` carries a controller owner
//! reference, so deleting the `Gslb` garbage collects it without a finalizer.

use crate::constants::FIELD_MANAGER;
use crate::context::Context;
use crate::crd::{DNSEndpoint, Gslb};
use crate::gslb_errors::GslbError;
use crate::reconcilers::dnsupdate::{gslb_dns_endpoint, DnsUpdate};
use crate::reconcilers::status::{
    GslbStatusUpdater, CONDITION_TYPE_READY, REASON_RECORDS_PUBLISHED,
};
use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use tracing::{debug, info, warn};

/// Reconciles one `Gslb`.
///
/// # Errors
///
/// Returns the [`GslbError`] of a failed pass (after recording it as `Ready=False`),
/// or the Kubernetes error of a failed status update.
pub async fn reconcile_gslb(ctx: &Context, gslb: &Gslb) -> Result<()> {
    let namespace = gslb.namespace().unwrap_or_default();
    let name = gslb.name_any();

    info!(
        gslb = %name,
        %namespace,
        strategy = %gslb.spec.strategy.strategy_type,
        hosts = gslb.spec.hosts.len(),
        "Reconciling Gslb"
    );

    let mut status = GslbStatusUpdater::new(gslb, &ctx.config.cluster_geo_tag);

    match publish(ctx, gslb).await {
        Ok(update) => {
            let record_count = update.endpoint.spec.endpoints.len();
            status.set_outcome(&update.service_health, &update.healthy_records);
            status.set_condition(
                CONDITION_TYPE_READY,
                "True",
                REASON_RECORDS_PUBLISHED,
                &format!(
                    "Published {record_count} record(s) for {} host(s)",
                    update.healthy_records.len()
                ),
            );
            status.apply(&ctx.client).await?;
            ctx.metrics.set_healthy_records(gslb, &update.healthy_records);

            debug!(gslb = %name, %namespace, record_count, "Gslb records published");
            Ok(())
        }
        Err(e) => {
            warn!(
                gslb = %name,
                %namespace,
                reason = e.status_reason(),
                transient = e.is_transient(),
                "Failed to publish Gslb records: {e}"
            );
            status.set_condition(CONDITION_TYPE_READY, "False", e.status_reason(), &e.to_string());
            if let Err(status_err) = status.apply(&ctx.client).await {
                warn!(gslb = %name, %namespace, "Failed to update Gslb status: {status_err:#}");
            }
            Err(e.into())
        }
    }
}

async fn publish(ctx: &Context, gslb: &Gslb) -> Result<DnsUpdate, GslbError> {
    let update = gslb_dns_endpoint(
        gslb,
        &ctx.config,
        ctx.health.as_ref(),
        ctx.targets.as_ref(),
        ctx.metrics.as_ref(),
    )
    .await?;
    apply_dns_endpoint(&ctx.client, &update.endpoint).await?;
    Ok(update)
}

/// Writes `endpoint` with server-side apply, taking ownership of every field.
///
/// # Errors
///
/// Returns [`GslbError::Persistence`] if the API server rejects the patch.
pub async fn apply_dns_endpoint(client: &Client, endpoint: &DNSEndpoint) -> Result<(), GslbError> {
    let namespace = endpoint.namespace().unwrap_or_default();
    let name = endpoint.name_any();
    let api: Api<DNSEndpoint> = Api::namespaced(client.clone(), &namespace);

    api.patch(
        &name,
        &PatchParams::apply(FIELD_MANAGER).force(),
        &Patch::Apply(endpoint),
    )
    .await
    .map_err(|e| GslbError::Persistence {
        name: name.clone(),
        namespace: namespace.clone(),
        reason: e.to_string(),
    })?;

    debug!(
        dnsendpoint = %name,
        %namespace,
        endpoints = endpoint.spec.endpoints.len(),
        "Applied DNSEndpoint"
    );
    Ok(())
}
