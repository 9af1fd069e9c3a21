//! The sweep contract shared by both reconcilers.

use async_trait::async_trait;
use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use statesync_reconcile::SweepError;
use tokio::sync::watch;

/// One reconciliation pass against one store.
#[async_trait]
pub trait Sweeper: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs a single sweep. Per-entity failures are absorbed into the
    /// stats; only sweep-fatal conditions surface as errors.
    async fn sweep(&mut self, shutdown: &watch::Receiver<bool>) -> Result<SweepStats, SweepError>;
}

/// What one sweep did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepStats {
    pub created: u32,
    pub updated: u32,
    pub deleted: u32,
    /// Entity corrections that failed and will be retried next sweep.
    pub failed: u32,
    /// True when shutdown stopped the sweep before every correction was
    /// dispatched. In-flight corrections still completed.
    pub interrupted: bool,
}

impl SweepStats {
    /// Total corrections applied.
    pub fn corrections(&self) -> u32 {
        self.created + self.updated + self.deleted
    }

    /// True when the store already matched desired state.
    pub fn is_quiet(&self) -> bool {
        self.corrections() == 0 && self.failed == 0 && !self.interrupted
    }
}

/// Dispatches corrections with a bounded worker pool.
///
/// Entities touch disjoint keys (the diff emits one correction per key), so
/// corrections run concurrently up to `max_in_flight`. Once shutdown is
/// signaled, in-flight corrections complete but no new ones start.
///
/// Returns the collected outcomes and whether the sweep was interrupted.
pub(crate) async fn apply_bounded<T, F, Fut>(
    items: Vec<T>,
    max_in_flight: usize,
    shutdown: &watch::Receiver<bool>,
    apply: F,
) -> (Vec<Fut::Output>, bool)
where
    F: Fn(T) -> Fut,
    Fut: std::future::Future,
{
    let total = items.len();
    let mut queue = items.into_iter();
    let mut in_flight = FuturesUnordered::new();
    let mut outcomes = Vec::with_capacity(total);
    let mut dispatched = 0usize;

    loop {
        while in_flight.len() < max_in_flight.max(1) && !*shutdown.borrow() {
            match queue.next() {
                Some(item) => {
                    in_flight.push(apply(item));
                    dispatched += 1;
                }
                None => break,
            }
        }

        match in_flight.next().await {
            Some(outcome) => outcomes.push(outcome),
            None => break,
        }
    }

    (outcomes, dispatched < total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_apply_bounded_runs_everything() {
        let (_tx, rx) = watch::channel(false);
        let (outcomes, interrupted) =
            apply_bounded(vec![1, 2, 3, 4], 2, &rx, |n| async move { n * 10 }).await;

        let mut outcomes = outcomes;
        outcomes.sort();
        assert_eq!(outcomes, vec![10, 20, 30, 40]);
        assert!(!interrupted);
    }

    #[tokio::test]
    async fn test_apply_bounded_stops_dispatching_on_shutdown() {
        let (tx, rx) = watch::channel(true);
        let (outcomes, interrupted) =
            apply_bounded(vec![1, 2, 3], 1, &rx, |n| async move { n }).await;

        assert!(outcomes.is_empty());
        assert!(interrupted);
        drop(tx);
    }

    #[tokio::test]
    async fn test_apply_bounded_empty_is_not_interrupted() {
        let (_tx, rx) = watch::channel(false);
        let (outcomes, interrupted) =
            apply_bounded(Vec::<u32>::new(), 4, &rx, |n| async move { n }).await;

        assert!(outcomes.is_empty());
        assert!(!interrupted);
    }
}
