//! Desired-vs-actual diffing.

use std::collections::BTreeMap;

/// The corrective operations one sweep must issue for one record kind.
///
/// A key appears in at most one of the three sets, so corrections for the
/// same entity are serialized by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffPlan<K, D> {
    /// Desired entries with no actual counterpart.
    pub create: Vec<(K, D)>,
    /// Entries present on both sides where the actual side drifted.
    pub update: Vec<(K, D)>,
    /// Actual entries with no desired justification.
    pub delete: Vec<K>,
}

impl<K, D> DiffPlan<K, D> {
    /// True when actual state already matches desired state.
    pub fn is_converged(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }

    /// Total number of corrections in the plan.
    pub fn len(&self) -> usize {
        self.create.len() + self.update.len() + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_converged()
    }
}

/// Computes the corrections that converge `actual` to `desired`.
///
/// `drifted` decides whether an entry present on both sides needs an update.
/// Iteration order is the key order, so plans are deterministic.
pub fn diff_maps<K, D, A, F>(
    desired: &BTreeMap<K, D>,
    actual: &BTreeMap<K, A>,
    drifted: F,
) -> DiffPlan<K, D>
where
    K: Ord + Clone,
    D: Clone,
    F: Fn(&D, &A) -> bool,
{
    let mut plan = DiffPlan {
        create: Vec::new(),
        update: Vec::new(),
        delete: Vec::new(),
    };

    for (key, want) in desired {
        match actual.get(key) {
            None => plan.create.push((key.clone(), want.clone())),
            Some(have) if drifted(want, have) => plan.update.push((key.clone(), want.clone())),
            Some(_) => {}
        }
    }

    for key in actual.keys() {
        if !desired.contains_key(key) {
            plan.delete.push(key.clone());
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_for(
        desired: &[(&str, u32)],
        actual: &[(&str, u32)],
    ) -> DiffPlan<String, u32> {
        let desired: BTreeMap<String, u32> = desired
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        let actual: BTreeMap<String, u32> = actual
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        diff_maps(&desired, &actual, |want, have| want != have)
    }

    #[test]
    fn test_missing_entries_are_created() {
        let plan = plan_for(&[("a", 1), ("b", 2)], &[("a", 1)]);
        assert_eq!(plan.create, vec![("b".to_string(), 2)]);
        assert!(plan.update.is_empty());
        assert!(plan.delete.is_empty());
    }

    #[test]
    fn test_drifted_entries_are_updated() {
        let plan = plan_for(&[("a", 1)], &[("a", 9)]);
        assert_eq!(plan.update, vec![("a".to_string(), 1)]);
    }

    #[test]
    fn test_unjustified_entries_are_deleted() {
        let plan = plan_for(&[], &[("zombie", 1)]);
        assert_eq!(plan.delete, vec!["zombie".to_string()]);
    }

    #[test]
    fn test_matching_state_is_converged() {
        let plan = plan_for(&[("a", 1), ("b", 2)], &[("a", 1), ("b", 2)]);
        assert!(plan.is_converged());
        assert_eq!(plan.len(), 0);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let first = plan_for(&[("b", 2), ("a", 1)], &[("c", 3)]);
        let second = plan_for(&[("a", 1), ("b", 2)], &[("c", 3)]);
        assert_eq!(first, second);
    }
}
