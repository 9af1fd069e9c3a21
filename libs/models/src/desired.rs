//! Desired-state types read from the upstream authority.
//!
//! The authority's wire payloads are loosely typed; they are mapped into
//! these structs at the boundary. Required fields that are absent fail the
//! decode instead of defaulting to zero values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statesync_id::{AppGuid, DropletGuid, ProcessGuid, RouteGuid};

use crate::records::RunningProcessRecord;

/// Relative weight assigned to a mapping when the authority does not set one.
pub const DEFAULT_ROUTE_WEIGHT: u32 = 1;

fn default_weight() -> u32 {
    DEFAULT_ROUTE_WEIGHT
}

/// A routing relationship carried by a desired process: this hostname
/// forwards to this process with this relative weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteBinding {
    pub route_guid: RouteGuid,
    pub host: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

/// One revision of a desired workload, as reported by the authority.
///
/// Immutable once read by the reconciler within one sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredProcess {
    pub process_guid: ProcessGuid,
    pub app_guid: AppGuid,
    pub instances: u32,
    pub start_command: String,
    pub droplet_guid: DropletGuid,
    /// Free-form token the authority rotates whenever the process
    /// definition changes.
    pub annotation: String,
    /// Monotonic revision ordinal within the logical process.
    pub revision: u64,
    /// When this revision was intentionally started by operator or deploy
    /// action.
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub routes: Vec<RouteBinding>,
}

impl DesiredProcess {
    /// Whether this definition wins over `other` for the same process GUID.
    ///
    /// The latest "intentionally started" marker wins over pure recency of
    /// any running snapshot; the revision ordinal breaks started-at ties.
    pub fn takes_precedence_over(&self, other: &DesiredProcess) -> bool {
        (self.started_at, self.revision) > (other.started_at, other.revision)
    }

    /// Whether an existing record has drifted from this definition.
    pub fn differs_from(&self, record: &RunningProcessRecord) -> bool {
        record.instances != self.instances || record.annotation != self.annotation
    }

    /// Projects this definition into a Store A record under `domain`.
    pub fn to_record(&self, domain: &str) -> RunningProcessRecord {
        RunningProcessRecord {
            process_guid: self.process_guid,
            instances: self.instances,
            annotation: self.annotation.clone(),
            domain: domain.to_string(),
        }
    }
}
