//! statesync syncer
//!
//! Periodically reconciles the workload scheduler's running-instance store
//! and the routing table against the desired-state authority. One worker
//! per store, each on its own interval; desired state is the only authority
//! and the stores are corrected, never consulted for intent.

use std::sync::Arc;

use anyhow::Result;
use statesync_syncer::{
    config::Config,
    lrp::{LrpReconciler, LrpReconcilerConfig},
    routes::{RouteReconciler, RouteReconcilerConfig},
    stores::{HttpDesiredStateSource, HttpRoutingStore, HttpSchedulerStore},
    worker::SyncWorker,
};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing (prefer RUST_LOG, fallback to SYNC_LOG_LEVEL)
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Starting statesync syncer");
    info!(
        desired_state_url = %config.desired_state_url,
        scheduler_url = %config.scheduler_url,
        routing_url = %config.routing_url,
        freshness_domain = %config.freshness_domain,
        "Configuration loaded"
    );

    let source = Arc::new(HttpDesiredStateSource::new(
        &config.desired_state_url,
        config.desired_state_token.as_deref(),
        config.store_timeout,
    )?);
    let scheduler = Arc::new(HttpSchedulerStore::new(
        &config.scheduler_url,
        config.desired_state_token.as_deref(),
        config.store_timeout,
    )?);
    let routing = Arc::new(HttpRoutingStore::new(
        &config.routing_url,
        config.desired_state_token.as_deref(),
        config.store_timeout,
    )?);

    // Create shutdown channel for graceful shutdown
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Start the Store A (scheduler) sync worker
    let lrp_reconciler = LrpReconciler::new(
        source.clone(),
        scheduler,
        LrpReconcilerConfig {
            domain: config.freshness_domain.clone(),
            max_in_flight: config.max_in_flight,
            escalation_threshold: config.escalation_threshold,
            app_filter: config.app_filter,
        },
    );
    let lrp_worker = SyncWorker::new(lrp_reconciler, config.lrp_interval, config.once);
    let lrp_handle = tokio::spawn({
        let shutdown_rx = shutdown_rx.clone();
        async move {
            lrp_worker.run(shutdown_rx).await;
        }
    });

    // Start the Store B (routing table) sync worker
    let route_reconciler = RouteReconciler::new(
        source,
        routing,
        RouteReconcilerConfig {
            max_in_flight: config.max_in_flight,
            escalation_threshold: config.escalation_threshold,
            app_filter: config.app_filter,
        },
    );
    let routes_worker = SyncWorker::new(route_reconciler, config.routes_interval, config.once);
    let routes_handle = tokio::spawn({
        let shutdown_rx = shutdown_rx.clone();
        async move {
            routes_worker.run(shutdown_rx).await;
        }
    });

    if config.once {
        let _ = lrp_handle.await;
        let _ = routes_handle.await;
        info!("Single sweep complete");
        return Ok(());
    }

    // Wait for shutdown signal (Ctrl+C)
    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal");

    let _ = shutdown_tx.send(true);
    let _ = lrp_handle.await;
    let _ = routes_handle.await;

    info!("Syncer stopped");
    Ok(())
}
