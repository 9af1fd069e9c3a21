//! External collaborators, modeled as traits.
//!
//! The reconciler only ever talks to the outside world through these three
//! traits: a read-only desired-state authority, the scheduler's
//! running-instance store (Store A), and the routing table (Store B). The
//! HTTP implementations live beside the traits; tests substitute in-memory
//! fakes.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use statesync_id::{AppGuid, ProcessGuid, RouteGuid};
use statesync_models::{DesiredProcess, RunningProcessRecord, RunningProcessUpdate};
use statesync_reconcile::DomainToken;

use crate::error::StoreResult;

mod desired;
mod http;
mod routing;
mod scheduler;

pub use desired::HttpDesiredStateSource;
pub use routing::HttpRoutingStore;
pub use scheduler::HttpSchedulerStore;

/// Read-only provider of the current set of desired workloads.
#[async_trait]
pub trait DesiredStateSource: Send + Sync {
    /// All desired processes, optionally restricted to one application.
    ///
    /// The listing may report the same process GUID through more than one
    /// read path; callers resolve duplicates via
    /// [`statesync_models::DesiredSnapshot::from_candidates`].
    async fn processes(&self, filter: Option<&AppGuid>) -> StoreResult<Vec<DesiredProcess>>;

    /// A single desired process, or `None` if the authority no longer
    /// desires it.
    async fn process_by_guid(&self, guid: &ProcessGuid) -> StoreResult<Option<DesiredProcess>>;
}

/// Store A: running-process records registered with the execution layer.
#[async_trait]
pub trait SchedulerStore: Send + Sync {
    /// All records, optionally restricted to one application.
    async fn records(&self, filter: Option<&AppGuid>) -> StoreResult<Vec<RunningProcessRecord>>;

    /// A single record, or `None` if absent.
    async fn record_by_guid(
        &self,
        guid: &ProcessGuid,
    ) -> StoreResult<Option<RunningProcessRecord>>;

    /// Registers a record. Fails with `Conflict` when the identity is
    /// already present; repeated calls with identical attributes are no-ops
    /// on the store side.
    async fn create(&self, record: &RunningProcessRecord) -> StoreResult<()>;

    /// Corrects attributes of an existing record. Fails with `NotFound`
    /// when the identity is absent.
    async fn update(&self, guid: &ProcessGuid, update: &RunningProcessUpdate) -> StoreResult<()>;

    /// Removes a record. Fails with `NotFound` when already absent.
    async fn delete(&self, guid: &ProcessGuid) -> StoreResult<()>;

    /// Commits the freshness domain for a completed sweep. The store
    /// expires records from earlier sweeps that were never touched; the
    /// reconciler never deletes them directly.
    async fn bump_domain(&self, token: &DomainToken) -> StoreResult<()>;
}

/// Store B: routes, route-to-process mappings, and process identity
/// associations.
#[async_trait]
pub trait RoutingStore: Send + Sync {
    async fn list_routes(&self) -> StoreResult<BTreeMap<RouteGuid, String>>;

    /// Idempotent: identical content is a no-op, a changed host overwrites.
    async fn upsert_route(&self, guid: RouteGuid, host: &str) -> StoreResult<()>;

    async fn delete_route(&self, guid: RouteGuid) -> StoreResult<()>;

    async fn list_mappings(&self) -> StoreResult<BTreeMap<(RouteGuid, ProcessGuid), u32>>;

    /// Both halves of the composite key travel in one call; there is no
    /// partially mapped state to repair.
    async fn upsert_mapping(
        &self,
        route_guid: RouteGuid,
        process_guid: ProcessGuid,
        weight: u32,
    ) -> StoreResult<()>;

    async fn delete_mapping(
        &self,
        route_guid: RouteGuid,
        process_guid: ProcessGuid,
    ) -> StoreResult<()>;

    async fn list_associations(&self) -> StoreResult<BTreeMap<AppGuid, BTreeSet<ProcessGuid>>>;

    /// Replaces the fine-grained GUID set wholesale; never an incremental
    /// patch.
    async fn upsert_association(
        &self,
        app_guid: AppGuid,
        process_guids: &BTreeSet<ProcessGuid>,
    ) -> StoreResult<()>;

    async fn delete_association(&self, app_guid: AppGuid) -> StoreResult<()>;
}
