//! Settlement optimization — greedy largest-to-largest matching.
//!
//! Creditors and debtors each live in a max-heap keyed by remaining
//! magnitude, ties broken by ascending participant id. Every step pairs the
//! two current largest parties and zeroes out at least one of them, so the
//! loop terminates after at most `N - 1` payments. An exhausted party never
//! re-enters a heap, which rules out anyone both paying and receiving.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use crate::domain::{MinorAmount, ParticipantBalance, ParticipantId, Settlement};
use crate::error::SettlementError;

/// A participant's outstanding magnitude.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Open {
    remaining: i128,
    id: ParticipantId,
}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.remaining, Reverse(&self.id)).cmp(&(other.remaining, Reverse(&other.id)))
    }
}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Produce the payments that zero out every net position.
///
/// Fails fast with `BalanceConservation` when the net positions do not sum
/// to zero: that is an upstream bug, never a user-facing condition.
pub fn optimize(balances: &[ParticipantBalance]) -> Result<Vec<Settlement>, SettlementError> {
    let mut seen = HashSet::with_capacity(balances.len());
    for balance in balances {
        if !seen.insert(&balance.participant_id) {
            return Err(SettlementError::DuplicateParticipant(
                balance.participant_id.clone(),
            ));
        }
    }

    let net_sum: i128 = balances.iter().map(|b| i128::from(b.net_position)).sum();
    if net_sum != 0 {
        return Err(SettlementError::BalanceConservation { net_sum });
    }

    let mut creditors = BinaryHeap::new();
    let mut debtors = BinaryHeap::new();
    for balance in balances {
        let open = Open {
            remaining: i128::from(balance.net_position).abs(),
            id: balance.participant_id.clone(),
        };
        match balance.net_position.cmp(&0) {
            Ordering::Greater => creditors.push(open),
            Ordering::Less => debtors.push(open),
            Ordering::Equal => {}
        }
    }

    let mut settlements = Vec::new();
    while let (Some(mut creditor), Some(mut debtor)) = (creditors.pop(), debtors.pop()) {
        // Bounded by the creditor's remainder, which started as an i64.
        let amount = creditor.remaining.min(debtor.remaining);
        settlements.push(Settlement {
            from: debtor.id.clone(),
            to: creditor.id.clone(),
            amount_minor: amount as MinorAmount,
        });

        creditor.remaining -= amount;
        debtor.remaining -= amount;
        if creditor.remaining > 0 {
            creditors.push(creditor);
        }
        if debtor.remaining > 0 {
            debtors.push(debtor);
        }
    }

    debug_assert!(creditors.is_empty() && debtors.is_empty());
    Ok(settlements)
}
