// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use axum::{extract::State, http::StatusCode, routing::get, Router};
use futures::StreamExt;
use gslb::{
    config::OperatorConfig,
    constants::{ERROR_REQUEUE_DURATION_SECS, TOKIO_WORKER_THREADS},
    context::Context,
    crd::{DNSEndpoint, Gslb},
    gslb_errors::GslbError,
    metrics::GslbMetrics,
    reconcilers::reconcile_gslb,
};
use kube::{
    runtime::{controller::Action, watcher::Config, Controller},
    Api, Client, ResourceExt,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("gslb-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or `text`).
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main() -> Result<()> {
    init_tracing();
    info!("Starting GSLB controller");

    let config = Arc::new(OperatorConfig::from_env().context("Invalid operator configuration")?);
    info!(
        geo_tag = %config.cluster_geo_tag,
        zone = %config.dns_zone,
        peers = ?config.ext_cluster_nameservers,
        requeue_secs = config.reconcile_requeue.as_secs(),
        "Loaded operator configuration"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let metrics = Arc::new(GslbMetrics::new()?);
    let ctx = Arc::new(Context::new(client, config.clone(), metrics.clone()));

    tokio::select! {
        result = run_gslb_controller(ctx) => {
            result?;
            info!("Gslb controller terminated");
            Ok(())
        }
        result = serve_metrics(config.metrics_addr, metrics) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
    }
}

/// Run the `Gslb` controller until a termination signal arrives
async fn run_gslb_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting Gslb controller");

    let api = Api::<Gslb>::all(ctx.client.clone());
    let dns_endpoints = Api::<DNSEndpoint>::all(ctx.client.clone());

    Controller::new(api, Config::default())
        .owns(dns_endpoints, Config::default())
        .shutdown_on_signal()
        .run(reconcile_gslb_wrapper, error_policy, ctx)
        .for_each(|res| async move {
            if let Err(error) = res {
                debug!(%error, "Gslb reconcile failed");
            }
        })
        .await;

    Ok(())
}

/// Reconcile wrapper for `Gslb`
async fn reconcile_gslb_wrapper(
    gslb: Arc<Gslb>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let start = Instant::now();

    match reconcile_gslb(&ctx, &gslb).await {
        Ok(()) => {
            ctx.metrics.record_reconciliation_success(start.elapsed());
            info!(
                "Successfully reconciled Gslb: {}/{}",
                gslb.namespace().unwrap_or_default(),
                gslb.name_any()
            );
            Ok(Action::requeue(ctx.config.reconcile_requeue))
        }
        Err(e) => {
            let reason = e
                .downcast_ref::<GslbError>()
                .map_or("ReconcileFailed", GslbError::status_reason);
            ctx.metrics.record_reconciliation_error(reason, start.elapsed());
            error!("Failed to reconcile Gslb {}: {:#}", gslb.name_any(), e);
            Err(e.into())
        }
    }
}

/// Error policy for the `Gslb` controller
fn error_policy(_gslb: Arc<Gslb>, _err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Serve `/metrics` in Prometheus text format
async fn serve_metrics(addr: SocketAddr, metrics: Arc<GslbMetrics>) -> Result<()> {
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind metrics server to {addr}"))?;
    info!(%addr, "Serving metrics");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler(State(metrics): State<Arc<GslbMetrics>>) -> (StatusCode, String) {
    match metrics.gather() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => {
            warn!("Failed to encode metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
