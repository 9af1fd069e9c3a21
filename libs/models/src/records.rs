//! Records the reconciler projects into the downstream stores.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use statesync_id::{AppGuid, ProcessGuid, RouteGuid};

/// A process registered with the execution layer (Store A).
///
/// The scheduler reads these to drive placement; only the reconciler writes
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningProcessRecord {
    pub process_guid: ProcessGuid,
    pub instances: u32,
    pub annotation: String,
    /// Freshness domain the record was last written under.
    pub domain: String,
}

/// Partial attribute update for a running-process record.
///
/// Fields left as `None` are untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningProcessUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl RunningProcessUpdate {
    /// True when the update would touch nothing.
    pub fn is_empty(&self) -> bool {
        self.instances.is_none() && self.annotation.is_none() && self.domain.is_none()
    }
}

/// A route known to the routing table (Store B).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub guid: RouteGuid,
    pub host: String,
}

/// A route-to-process mapping (Store B).
///
/// Identity is the composite `(route_guid, process_guid)` pair, never a
/// separately generated ID, so re-creation after deletion always resolves to
/// the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMapping {
    pub route_guid: RouteGuid,
    pub process_guid: ProcessGuid,
    pub weight: u32,
}

impl RouteMapping {
    /// The composite lookup/removal key.
    pub fn key(&self) -> (RouteGuid, ProcessGuid) {
        (self.route_guid, self.process_guid)
    }
}

/// The one-to-many mapping from a logical process to the execution-layer
/// process GUIDs currently active for it (Store B).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessIdentityAssociation {
    pub app_guid: AppGuid,
    pub process_guids: BTreeSet<ProcessGuid>,
}
