//! Reconciliation planning
//!
//! Given the records that were live before a capture and the records the
//! capture just inserted, decide which old records end and which new
//! records are redundant continuations. The store applies the plan.
//!
//! - An old record whose rule is absent from the capture is **removed**.
//! - A new record whose rule is already live is a **duplicate** and is
//!   deleted, so the old record keeps its original `added_by`.
//! - Every other new record is **added**.
//!
//! The live set after applying the plan equals the capture's rule set, and
//! no rule has more than one live record, whatever happened before.

use std::collections::HashSet;

/// Minimal view of a rule record needed for planning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveRecord {
    pub id: i64,
    pub rule: String,
}

impl LiveRecord {
    pub fn new(id: i64, rule: impl Into<String>) -> Self {
        Self {
            id,
            rule: rule.into(),
        }
    }
}

/// Record ids to update or delete for one capture
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Previously live records to mark `removed_by` the new snapshot
    pub removed: Vec<i64>,
    /// New records to delete because the rule is already live
    pub duplicates: Vec<i64>,
    /// New records that stay live
    pub added: Vec<i64>,
}

impl ReconcilePlan {
    /// Number of rules that continued unchanged from earlier captures
    pub fn unchanged(&self) -> usize {
        self.duplicates.len()
    }

    /// Whether the capture changed nothing
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Plan the reconciliation of a capture against the previously live set
///
/// `previously_live` must exclude the records of the capture itself.
/// Output id lists keep the order of their input.
pub fn plan_reconciliation(previously_live: &[LiveRecord], new_records: &[LiveRecord]) -> ReconcilePlan {
    let new_rules: HashSet<&str> = new_records.iter().map(|r| r.rule.as_str()).collect();
    let live_rules: HashSet<&str> = previously_live.iter().map(|r| r.rule.as_str()).collect();

    let removed = previously_live
        .iter()
        .filter(|r| !new_rules.contains(r.rule.as_str()))
        .map(|r| r.id)
        .collect();

    let (duplicates, added): (Vec<&LiveRecord>, Vec<&LiveRecord>) = new_records
        .iter()
        .partition(|r| live_rules.contains(r.rule.as_str()));

    ReconcilePlan {
        removed,
        duplicates: duplicates.into_iter().map(|r| r.id).collect(),
        added: added.into_iter().map(|r| r.id).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn records(start_id: i64, rules: &[&str]) -> Vec<LiveRecord> {
        rules
            .iter()
            .enumerate()
            .map(|(i, r)| LiveRecord::new(start_id + i as i64, *r))
            .collect()
    }

    #[test]
    fn test_first_capture_adds_everything() {
        let new = records(1, &["a", "b"]);
        let plan = plan_reconciliation(&[], &new);
        assert_eq!(plan.added, vec![1, 2]);
        assert!(plan.removed.is_empty());
        assert!(plan.duplicates.is_empty());
    }

    #[test]
    fn test_mixed_capture() {
        // live {a, b}; capture {a, c}
        let live = records(1, &["a", "b"]);
        let new = records(10, &["a", "c"]);
        let plan = plan_reconciliation(&live, &new);

        assert_eq!(plan.removed, vec![2]);
        assert_eq!(plan.duplicates, vec![10]);
        assert_eq!(plan.added, vec![11]);
        assert_eq!(plan.unchanged(), 1);
    }

    #[test]
    fn test_identical_capture_is_noop() {
        let live = records(1, &["a", "b"]);
        let new = records(10, &["b", "a"]);
        let plan = plan_reconciliation(&live, &new);

        assert!(plan.is_noop());
        assert_eq!(plan.duplicates, vec![10, 11]);
    }

    #[test]
    fn test_empty_capture_removes_everything() {
        let live = records(1, &["a", "b"]);
        let plan = plan_reconciliation(&live, &[]);
        assert_eq!(plan.removed, vec![1, 2]);
        assert!(plan.added.is_empty());
    }

    fn rule_set() -> impl Strategy<Value = BTreeSet<String>> {
        prop::collection::btree_set("[a-e]{1,2}", 0..12)
    }

    /// Apply a plan to an in-memory record table
    fn apply(
        table: &mut BTreeMap<i64, (String, bool)>,
        plan: &ReconcilePlan,
    ) {
        for id in &plan.removed {
            if let Some(entry) = table.get_mut(id) {
                entry.1 = false;
            }
        }
        for id in &plan.duplicates {
            table.remove(id);
        }
    }

    proptest! {
        #[test]
        fn prop_live_set_tracks_latest_capture(captures in prop::collection::vec(rule_set(), 1..6)) {
            // id -> (rule, live)
            let mut table: BTreeMap<i64, (String, bool)> = BTreeMap::new();
            let mut next_id = 1i64;

            for capture in &captures {
                let previously_live: Vec<LiveRecord> = table
                    .iter()
                    .filter(|(_, (_, live))| *live)
                    .map(|(id, (rule, _))| LiveRecord::new(*id, rule.clone()))
                    .collect();

                let mut new_records = Vec::new();
                for rule in capture {
                    table.insert(next_id, (rule.clone(), true));
                    new_records.push(LiveRecord::new(next_id, rule.clone()));
                    next_id += 1;
                }

                let plan = plan_reconciliation(&previously_live, &new_records);
                apply(&mut table, &plan);

                let live: Vec<&String> = table
                    .values()
                    .filter(|(_, live)| *live)
                    .map(|(rule, _)| rule)
                    .collect();
                let live_set: BTreeSet<String> = live.iter().map(|r| (*r).clone()).collect();

                // At most one live record per rule
                prop_assert_eq!(live.len(), live_set.len());
                // Live set equals the latest capture
                prop_assert_eq!(&live_set, capture);
            }
        }
    }
}
