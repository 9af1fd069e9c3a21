//! The Store B sweep.
//!
//! The routing table converges to exactly the routes, mappings, and
//! associations implied by desired state. The reconciler is the sole
//! platform-side writer; anything else found in the table is unexpected and
//! purged on the next sweep.
//!
//! Mappings are keyed by the composite (route guid, process guid) pair, and
//! both halves travel in every corrective call, so a mapping is corrected
//! whole or not at all. Association guid sets are replaced wholesale, never
//! patched incrementally, to avoid partial-update races when revisions
//! rotate.

use std::collections::BTreeSet;
use std::sync::Arc;

use statesync_id::{AppGuid, ProcessGuid, RouteGuid};
use statesync_models::DesiredSnapshot;
use statesync_reconcile::{diff_maps, RetryTracker, SweepError, DEFAULT_ESCALATION_THRESHOLD};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{StoreError, StoreResult};
use crate::stores::{DesiredStateSource, RoutingStore};
use crate::sweep::{apply_bounded, SweepStats, Sweeper};

/// Tuning for the routing sweep.
#[derive(Debug, Clone)]
pub struct RouteReconcilerConfig {
    /// Bound on concurrently issued corrections.
    pub max_in_flight: usize,
    /// Consecutive failed sweeps before a per-entity warning escalates.
    pub escalation_threshold: u32,
    /// Restrict the sweep to one application's processes.
    pub app_filter: Option<AppGuid>,
}

impl Default for RouteReconcilerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 8,
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            app_filter: None,
        }
    }
}

enum Correction {
    UpsertRoute(RouteGuid, String),
    DeleteRoute(RouteGuid),
    UpsertMapping(RouteGuid, ProcessGuid, u32),
    DeleteMapping(RouteGuid, ProcessGuid),
    UpsertAssociation(AppGuid, BTreeSet<ProcessGuid>),
    DeleteAssociation(AppGuid),
}

impl Correction {
    /// Retry-tracking key; kind-prefixed so a route and an association for
    /// the same application never alias.
    fn key(&self) -> String {
        match self {
            Correction::UpsertRoute(guid, _) | Correction::DeleteRoute(guid) => {
                format!("route:{guid}")
            }
            Correction::UpsertMapping(route, process, _)
            | Correction::DeleteMapping(route, process) => {
                format!("mapping:{route}:{process}")
            }
            Correction::UpsertAssociation(app, _) | Correction::DeleteAssociation(app) => {
                format!("association:{app}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum OpKind {
    Create,
    Update,
    Delete,
}

/// Reconciles Store B against the desired-state authority.
pub struct RouteReconciler {
    source: Arc<dyn DesiredStateSource>,
    store: Arc<dyn RoutingStore>,
    retries: RetryTracker,
    config: RouteReconcilerConfig,
}

impl RouteReconciler {
    pub fn new(
        source: Arc<dyn DesiredStateSource>,
        store: Arc<dyn RoutingStore>,
        config: RouteReconcilerConfig,
    ) -> Self {
        Self {
            source,
            store,
            retries: RetryTracker::new(),
            config,
        }
    }

    /// Runs one sweep against Store B.
    #[instrument(skip_all)]
    pub async fn sweep(
        &mut self,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<SweepStats, SweepError> {
        let candidates = self
            .source
            .processes(self.config.app_filter.as_ref())
            .await
            .map_err(|e| SweepError::DesiredStateUnavailable(e.to_string()))?;
        let snapshot = DesiredSnapshot::from_candidates(candidates);

        let actual_routes = self
            .store
            .list_routes()
            .await
            .map_err(|e| SweepError::ActualStateUnavailable(e.to_string()))?;
        let actual_mappings = self
            .store
            .list_mappings()
            .await
            .map_err(|e| SweepError::ActualStateUnavailable(e.to_string()))?;
        let actual_associations = self
            .store
            .list_associations()
            .await
            .map_err(|e| SweepError::ActualStateUnavailable(e.to_string()))?;

        let desired_routes = snapshot.routes();
        let desired_mappings = snapshot.mappings();
        let desired_associations = snapshot.associations();

        let mut corrections: Vec<(Correction, OpKind)> = Vec::new();

        let route_plan = diff_maps(&desired_routes, &actual_routes, |want, have| want != have);
        for (kind, entries) in [
            (OpKind::Create, route_plan.create),
            (OpKind::Update, route_plan.update),
        ] {
            for (guid, host) in entries {
                corrections.push((Correction::UpsertRoute(guid, host), kind));
            }
        }
        for guid in route_plan.delete {
            corrections.push((Correction::DeleteRoute(guid), OpKind::Delete));
        }

        let mapping_plan = diff_maps(&desired_mappings, &actual_mappings, |want, have| {
            want != have
        });
        for (kind, entries) in [
            (OpKind::Create, mapping_plan.create),
            (OpKind::Update, mapping_plan.update),
        ] {
            for ((route, process), weight) in entries {
                corrections.push((Correction::UpsertMapping(route, process, weight), kind));
            }
        }
        for (route, process) in mapping_plan.delete {
            corrections.push((Correction::DeleteMapping(route, process), OpKind::Delete));
        }

        let association_plan = diff_maps(&desired_associations, &actual_associations, |want, have| {
            want != have
        });
        for (kind, entries) in [
            (OpKind::Create, association_plan.create),
            (OpKind::Update, association_plan.update),
        ] {
            for (app, guids) in entries {
                corrections.push((Correction::UpsertAssociation(app, guids), kind));
            }
        }
        for app in association_plan.delete {
            corrections.push((Correction::DeleteAssociation(app), OpKind::Delete));
        }

        debug!(
            desired_routes = desired_routes.len(),
            desired_mappings = desired_mappings.len(),
            desired_associations = desired_associations.len(),
            actual_routes = actual_routes.len(),
            actual_mappings = actual_mappings.len(),
            actual_associations = actual_associations.len(),
            corrections = corrections.len(),
            "Computed routing sweep plan"
        );

        let this = &*self;
        let (outcomes, interrupted) = apply_bounded(
            corrections,
            this.config.max_in_flight,
            shutdown,
            |(correction, kind)| async move {
                let key = correction.key();
                (key, kind, this.apply(correction).await)
            },
        )
        .await;

        let mut stats = SweepStats {
            interrupted,
            ..Default::default()
        };

        for (key, kind, result) in outcomes {
            match result {
                Ok(()) => {
                    match kind {
                        OpKind::Create => stats.created += 1,
                        OpKind::Update => stats.updated += 1,
                        OpKind::Delete => stats.deleted += 1,
                    }
                    self.retries.clear(&key);
                }
                Err(e) => {
                    stats.failed += 1;
                    let consecutive = self.retries.record_failure(&key);
                    if consecutive >= self.config.escalation_threshold {
                        error!(entity = %key, error = %e, consecutive, "Correction keeps failing across sweeps");
                    } else {
                        warn!(entity = %key, error = %e, "Failed to correct routing entity; will retry next sweep");
                    }
                }
            }
        }

        Ok(stats)
    }

    async fn apply(&self, correction: Correction) -> StoreResult<()> {
        match correction {
            Correction::UpsertRoute(guid, host) => {
                self.store.upsert_route(guid, &host).await?;
                info!(route_guid = %guid, host = %host, "Route upserted");
                Ok(())
            }
            Correction::DeleteRoute(guid) => {
                absorb_not_found(self.store.delete_route(guid).await)?;
                info!(route_guid = %guid, "Unexpected route deleted");
                Ok(())
            }
            Correction::UpsertMapping(route, process, weight) => {
                self.store.upsert_mapping(route, process, weight).await?;
                info!(route_guid = %route, process_guid = %process, weight, "Route mapping upserted");
                Ok(())
            }
            Correction::DeleteMapping(route, process) => {
                absorb_not_found(self.store.delete_mapping(route, process).await)?;
                info!(route_guid = %route, process_guid = %process, "Route mapping unmapped");
                Ok(())
            }
            Correction::UpsertAssociation(app, guids) => {
                self.store.upsert_association(app, &guids).await?;
                info!(
                    app_guid = %app,
                    revision_count = guids.len(),
                    "Process identity association replaced"
                );
                Ok(())
            }
            Correction::DeleteAssociation(app) => {
                absorb_not_found(self.store.delete_association(app).await)?;
                info!(app_guid = %app, "Process identity association deleted");
                Ok(())
            }
        }
    }
}

/// Deleting something already gone is convergence, not failure.
fn absorb_not_found(result: StoreResult<()>) -> StoreResult<()> {
    match result {
        Err(StoreError::NotFound(_)) => Ok(()),
        other => other,
    }
}

#[async_trait::async_trait]
impl Sweeper for RouteReconciler {
    fn name(&self) -> &'static str {
        "routes"
    }

    async fn sweep(&mut self, shutdown: &watch::Receiver<bool>) -> Result<SweepStats, SweepError> {
        RouteReconciler::sweep(self, shutdown).await
    }
}
