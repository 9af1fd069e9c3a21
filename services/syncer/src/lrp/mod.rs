//! Scheduler-side sync: keeps Store A's running-process records converged
//! to desired state under a freshness domain.

mod reconciler;

pub use reconciler::{LrpReconciler, LrpReconcilerConfig};
