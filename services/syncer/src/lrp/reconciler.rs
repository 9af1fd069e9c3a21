//! The Store A sweep.
//!
//! On each sweep, for every desired process there must be exactly one
//! running-process record with matching instance count and annotation:
//!
//! - missing record → create from the desired attributes
//! - drifted record → update back to the desired attributes
//! - record with no desired counterpart → delete
//!
//! Records written during the sweep carry the freshness domain name; after
//! an uninterrupted sweep the domain token is bumped so the store can expire
//! leftovers from earlier, incomplete sweeps.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use statesync_id::{AppGuid, ProcessGuid};
use statesync_models::{DesiredProcess, DesiredSnapshot, RunningProcessRecord, RunningProcessUpdate};
use statesync_reconcile::{
    diff_maps, FreshnessDomain, RetryTracker, SweepError, DEFAULT_ESCALATION_THRESHOLD,
};
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

use crate::error::StoreResult;
use crate::stores::{DesiredStateSource, SchedulerStore};
use crate::sweep::{apply_bounded, SweepStats, Sweeper};

/// Tuning for the LRP sweep.
#[derive(Debug, Clone)]
pub struct LrpReconcilerConfig {
    /// Freshness domain this reconciler marks and bumps.
    pub domain: String,
    /// Bound on concurrently issued corrections.
    pub max_in_flight: usize,
    /// Consecutive failed sweeps before a per-entity warning escalates.
    pub escalation_threshold: u32,
    /// Restrict the sweep to one application's processes.
    pub app_filter: Option<AppGuid>,
}

impl Default for LrpReconcilerConfig {
    fn default() -> Self {
        Self {
            domain: "apps".to_string(),
            max_in_flight: 8,
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            app_filter: None,
        }
    }
}

enum Correction {
    Create(DesiredProcess),
    Update(DesiredProcess),
    Delete(ProcessGuid),
}

impl Correction {
    fn key(&self) -> ProcessGuid {
        match self {
            Correction::Create(desired) | Correction::Update(desired) => desired.process_guid,
            Correction::Delete(guid) => *guid,
        }
    }
}

enum Applied {
    Created,
    Updated,
    Deleted,
}

/// Reconciles Store A against the desired-state authority.
pub struct LrpReconciler {
    source: Arc<dyn DesiredStateSource>,
    store: Arc<dyn SchedulerStore>,
    domain: FreshnessDomain,
    retries: RetryTracker,
    config: LrpReconcilerConfig,
}

impl LrpReconciler {
    pub fn new(
        source: Arc<dyn DesiredStateSource>,
        store: Arc<dyn SchedulerStore>,
        config: LrpReconcilerConfig,
    ) -> Self {
        Self {
            source,
            store,
            domain: FreshnessDomain::new(config.domain.clone()),
            retries: RetryTracker::new(),
            config,
        }
    }

    /// Runs one sweep against Store A.
    #[instrument(skip_all, fields(domain = %self.config.domain))]
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

        let records = self
            .store
            .records(self.config.app_filter.as_ref())
            .await
            .map_err(|e| SweepError::ActualStateUnavailable(e.to_string()))?;
        let actual: BTreeMap<ProcessGuid, RunningProcessRecord> = records
            .into_iter()
            .map(|record| (record.process_guid, record))
            .collect();

        let plan = diff_maps(snapshot.processes(), &actual, |want, have| {
            want.differs_from(have)
        });
        debug!(
            desired = snapshot.len(),
            actual = actual.len(),
            corrections = plan.len(),
            "Computed LRP sweep plan"
        );

        let corrections: Vec<Correction> = plan
            .create
            .into_iter()
            .map(|(_, desired)| Correction::Create(desired))
            .chain(
                plan.update
                    .into_iter()
                    .map(|(_, desired)| Correction::Update(desired)),
            )
            .chain(plan.delete.into_iter().map(Correction::Delete))
            .collect();

        let this = &*self;
        let (outcomes, interrupted) = apply_bounded(
            corrections,
            this.config.max_in_flight,
            shutdown,
            |correction| async move {
                let key = correction.key();
                (key, this.apply(correction).await)
            },
        )
        .await;

        let mut stats = SweepStats {
            interrupted,
            ..Default::default()
        };

        for (guid, result) in outcomes {
            match result {
                Ok(Applied::Created) => stats.created += 1,
                Ok(Applied::Updated) => stats.updated += 1,
                Ok(Applied::Deleted) => stats.deleted += 1,
                Err(e) => {
                    stats.failed += 1;
                    let consecutive = self.retries.record_failure(&guid.to_string());
                    if consecutive >= self.config.escalation_threshold {
                        error!(
                            process_guid = %guid,
                            error = %e,
                            consecutive,
                            "Correction keeps failing across sweeps"
                        );
                    } else {
                        warn!(
                            process_guid = %guid,
                            error = %e,
                            "Failed to correct process; will retry next sweep"
                        );
                    }
                    continue;
                }
            }
            self.retries.clear(&guid.to_string());
        }

        let live: BTreeSet<String> = snapshot
            .processes()
            .keys()
            .chain(actual.keys())
            .map(|guid| guid.to_string())
            .collect();
        self.retries.retain(|key| live.contains(key));

        if stats.interrupted {
            info!("Sweep interrupted by shutdown; freshness domain not bumped");
            return Ok(stats);
        }

        let token = self.domain.token();
        self.store.bump_domain(&token).await.map_err(|e| {
            error!(domain = %token, error = %e, "Freshness domain bump failed");
            SweepError::DomainBump {
                domain: token.name().to_string(),
                reason: e.to_string(),
            }
        })?;
        self.domain.advance();

        Ok(stats)
    }

    /// Applies one correction, converting store errors at the boundary:
    /// conflict on create means someone beat us to it (update after a
    /// read-refresh of desired state), not-found on update means the target
    /// vanished (create it).
    async fn apply(&self, correction: Correction) -> StoreResult<Applied> {
        match correction {
            Correction::Create(desired) => self.apply_create(desired).await,
            Correction::Update(desired) => self.apply_update(desired).await,
            Correction::Delete(guid) => self.apply_delete(guid).await,
        }
    }

    async fn apply_create(&self, desired: DesiredProcess) -> StoreResult<Applied> {
        let record = desired.to_record(self.domain.name());
        match self.store.create(&record).await {
            Ok(()) => {
                info!(
                    process_guid = %desired.process_guid,
                    instances = desired.instances,
                    "Registered missing process"
                );
                Ok(Applied::Created)
            }
            Err(e) if e.is_conflict() => {
                // Raced another writer; refresh desired state before
                // correcting so a definition that changed mid-sweep wins.
                match self.source.process_by_guid(&desired.process_guid).await? {
                    Some(fresh) => {
                        let drifted = match self
                            .store
                            .record_by_guid(&fresh.process_guid)
                            .await?
                        {
                            Some(existing) => fresh.differs_from(&existing),
                            None => true,
                        };
                        if drifted {
                            self.store
                                .update(&fresh.process_guid, &self.update_for(&fresh))
                                .await?;
                        }
                        info!(
                            process_guid = %fresh.process_guid,
                            drifted,
                            "Corrected process after create conflict"
                        );
                        Ok(Applied::Updated)
                    }
                    None => {
                        self.store.delete(&desired.process_guid).await?;
                        info!(
                            process_guid = %desired.process_guid,
                            "Removed process no longer desired after create conflict"
                        );
                        Ok(Applied::Deleted)
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn apply_update(&self, desired: DesiredProcess) -> StoreResult<Applied> {
        match self
            .store
            .update(&desired.process_guid, &self.update_for(&desired))
            .await
        {
            Ok(()) => {
                info!(
                    process_guid = %desired.process_guid,
                    instances = desired.instances,
                    "Corrected drifted process"
                );
                Ok(Applied::Updated)
            }
            Err(e) if e.is_not_found() => {
                let record = desired.to_record(self.domain.name());
                self.store.create(&record).await?;
                info!(
                    process_guid = %desired.process_guid,
                    "Recreated process that vanished mid-correction"
                );
                Ok(Applied::Created)
            }
            Err(e) => Err(e),
        }
    }

    async fn apply_delete(&self, guid: ProcessGuid) -> StoreResult<Applied> {
        match self.store.delete(&guid).await {
            Ok(()) => {
                info!(process_guid = %guid, "Deleted process with no desired counterpart");
                Ok(Applied::Deleted)
            }
            // Already gone; deletion is idempotent.
            Err(e) if e.is_not_found() => Ok(Applied::Deleted),
            Err(e) => Err(e),
        }
    }

    fn update_for(&self, desired: &DesiredProcess) -> RunningProcessUpdate {
        RunningProcessUpdate {
            instances: Some(desired.instances),
            annotation: Some(desired.annotation.clone()),
            domain: Some(self.domain.name().to_string()),
        }
    }
}

#[async_trait::async_trait]
impl Sweeper for LrpReconciler {
    fn name(&self) -> &'static str {
        "lrp"
    }

    async fn sweep(&mut self, shutdown: &watch::Receiver<bool>) -> Result<SweepStats, SweepError> {
        LrpReconciler::sweep(self, shutdown).await
    }
}
