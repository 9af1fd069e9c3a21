//! Routing-table sync: converges Store B's routes, route-to-process
//! mappings, and process identity associations to desired state.

mod reconciler;

pub use reconciler::{RouteReconciler, RouteReconcilerConfig};
