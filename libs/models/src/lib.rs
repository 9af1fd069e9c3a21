//! # statesync-models
//!
//! Shared data model for the statesync reconciler: the records it projects
//! into the downstream stores and the desired-state types it reads from the
//! upstream authority.
//!
//! All four record kinds (running-process records, routes, route mappings,
//! and process identity associations) are reconciler-owned projections. They
//! are created on first detection of an unsatisfied desired entry, updated
//! in place when desired attributes drift, and deleted when no longer
//! justified by desired state.

mod desired;
mod records;
mod snapshot;

pub use desired::{DesiredProcess, RouteBinding, DEFAULT_ROUTE_WEIGHT};
pub use records::{
    ProcessIdentityAssociation, Route, RouteMapping, RunningProcessRecord, RunningProcessUpdate,
};
pub use snapshot::DesiredSnapshot;
