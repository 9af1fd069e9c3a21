//! Reconciliation loop primitives.
//!
//! This library provides the building blocks for reconciliation sweeps that
//! converge actual state to desired state. Key concepts:
//!
//! - **Desired state**: what the authority says should exist.
//! - **Actual state**: what a downstream store currently holds.
//! - **Sweep**: one full pass computing the difference and issuing
//!   corrections.
//!
//! # Invariants
//!
//! - All corrective operations are idempotent
//! - A diff plan is deterministic given the same inputs
//! - A freshness domain epoch only ever moves forward, and only after the
//!   downstream store acknowledged the bump

mod diff;
mod domain;
mod error;
mod retry;

pub use diff::{diff_maps, DiffPlan};
pub use domain::{DomainToken, FreshnessDomain};
pub use error::SweepError;
pub use retry::RetryTracker;

use std::time::Duration;

/// Default interval between reconciliation sweeps.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

/// Default bound on any single store call within a sweep.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of consecutive failed sweeps before a per-entity failure
/// is escalated from warning to error.
pub const DEFAULT_ESCALATION_THRESHOLD: u32 = 3;
