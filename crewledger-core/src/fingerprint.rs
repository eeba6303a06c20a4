//! Trip fingerprinting — content hashes for snapshots and settlement plans.
//!
//! - `SnapshotHash`: identity of the input records, independent of row order.
//! - `PlanHash`: identity of a computed settlement (balances + payments).
//!
//! Both hash a canonical JSON rendering with BLAKE3.

use crate::domain::{PlanHash, SnapshotHash, TripSnapshot};
use crate::engine::TripSettlement;

impl TripSnapshot {
    /// Canonical copy: every collection sorted, so row order does not matter.
    pub fn canonical(&self) -> TripSnapshot {
        let mut canonical = self.clone();
        canonical.participants.sort_by(|a, b| a.id.cmp(&b.id).then(a.name.cmp(&b.name)));
        canonical.expenses.sort_by(|a, b| {
            a.id.cmp(&b.id)
                .then(a.paid_by.cmp(&b.paid_by))
                .then(a.amount_minor.cmp(&b.amount_minor))
                .then(a.currency.cmp(&b.currency))
        });
        canonical.splits.sort_by(|a, b| {
            a.expense_id
                .cmp(&b.expense_id)
                .then(a.participant_id.cmp(&b.participant_id))
                .then(a.share_type.as_str().cmp(b.share_type.as_str()))
                .then(a.share_value.total_cmp(&b.share_value))
        });
        canonical
    }

    /// Row-order independent content hash.
    pub fn fingerprint(&self) -> SnapshotHash {
        // Plain structs and string-keyed maps only; serialization cannot fail.
        let json = serde_json::to_vec(&self.canonical()).expect("TripSnapshot must serialize");
        SnapshotHash::from_bytes(&json)
    }
}

impl TripSettlement {
    /// Hash of the computed plan. Balances and settlements are already in a
    /// deterministic order, so no canonicalization is needed.
    pub fn fingerprint(&self) -> PlanHash {
        let json = serde_json::to_vec(self).expect("TripSettlement must serialize");
        PlanHash::from_bytes(&json)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{Expense, ExpenseSplit, Participant, ShareType, TripSnapshot};
    use crate::engine::settle_trip;

    fn sample_snapshot() -> TripSnapshot {
        TripSnapshot::new(
            vec![Participant::new("alice", "Alice"), Participant::new("bob", "Bob")],
            vec![
                Expense::new("e1", "alice", 1_000, "USD"),
                Expense::new("e2", "bob", 500, "USD"),
            ],
            vec![
                ExpenseSplit::equal("e1", "alice"),
                ExpenseSplit::equal("e1", "bob"),
                ExpenseSplit::new("e2", "alice", ShareType::Weight, 2.0),
                ExpenseSplit::new("e2", "bob", ShareType::Weight, 1.0),
            ],
        )
    }

    #[test]
    fn snapshot_hash_ignores_row_order() {
        let original = sample_snapshot();
        let mut shuffled = original.clone();
        shuffled.participants.reverse();
        shuffled.expenses.reverse();
        shuffled.splits.rotate_left(3);

        assert_eq!(original.fingerprint(), shuffled.fingerprint());
    }

    #[test]
    fn snapshot_hash_tracks_content() {
        let original = sample_snapshot();
        let mut edited = original.clone();
        edited.expenses[0].amount_minor += 1;

        assert_ne!(original.fingerprint(), edited.fingerprint());
    }

    #[test]
    fn plan_hash_is_deterministic() {
        let snapshot = sample_snapshot();
        let a = settle_trip(&snapshot).unwrap();
        let b = settle_trip(&snapshot.canonical()).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().0.len(), 64);
    }
}
