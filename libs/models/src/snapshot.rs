//! The per-sweep view of desired state.

use std::collections::{BTreeMap, BTreeSet};

use statesync_id::{AppGuid, ProcessGuid, RouteGuid};

use crate::desired::DesiredProcess;

/// Everything one reconciliation sweep needs to know about desired state.
///
/// Assembled once per sweep from the authority's process listing and treated
/// as a consistent-enough snapshot; later sweeps smooth over any
/// inconsistency in the read.
#[derive(Debug, Clone, Default)]
pub struct DesiredSnapshot {
    processes: BTreeMap<ProcessGuid, DesiredProcess>,
}

impl DesiredSnapshot {
    /// Builds a snapshot from the authority's candidate listing.
    ///
    /// The authority can report the same process GUID through more than one
    /// read path (the running snapshot and the latest intentionally-started
    /// revision); the definition with the newer precedence marker wins.
    pub fn from_candidates(candidates: Vec<DesiredProcess>) -> Self {
        let mut processes: BTreeMap<ProcessGuid, DesiredProcess> = BTreeMap::new();

        for candidate in candidates {
            match processes.get(&candidate.process_guid) {
                Some(existing) if !candidate.takes_precedence_over(existing) => {}
                _ => {
                    processes.insert(candidate.process_guid, candidate);
                }
            }
        }

        Self { processes }
    }

    /// The winning desired processes, keyed by process GUID.
    pub fn processes(&self) -> &BTreeMap<ProcessGuid, DesiredProcess> {
        &self.processes
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Routes implied by desired state: guid → host.
    ///
    /// The first binding seen for a guid (in process-guid order) names the
    /// host; the authority owns guid uniqueness.
    pub fn routes(&self) -> BTreeMap<RouteGuid, String> {
        let mut routes = BTreeMap::new();
        for process in self.processes.values() {
            for binding in &process.routes {
                routes
                    .entry(binding.route_guid)
                    .or_insert_with(|| binding.host.clone());
            }
        }
        routes
    }

    /// Route-to-process mappings implied by desired state, keyed by the
    /// composite pair.
    pub fn mappings(&self) -> BTreeMap<(RouteGuid, ProcessGuid), u32> {
        let mut mappings = BTreeMap::new();
        for process in self.processes.values() {
            for binding in &process.routes {
                mappings.insert((binding.route_guid, process.process_guid), binding.weight);
            }
        }
        mappings
    }

    /// Logical-process associations: application GUID → the exact set of
    /// active revision process GUIDs.
    pub fn associations(&self) -> BTreeMap<AppGuid, BTreeSet<ProcessGuid>> {
        let mut associations: BTreeMap<AppGuid, BTreeSet<ProcessGuid>> = BTreeMap::new();
        for process in self.processes.values() {
            associations
                .entry(process.app_guid)
                .or_default()
                .insert(process.process_guid);
        }
        associations
    }
}
