//! TripSnapshot — one consistent read of a trip's records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Expense, ExpenseId, ExpenseSplit, Participant};

/// Participants, expenses and splits gathered at one point in time.
///
/// The engine never checks for concurrent mutation; whoever assembles the
/// snapshot owns that guarantee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripSnapshot {
    pub participants: Vec<Participant>,
    pub expenses: Vec<Expense>,
    pub splits: Vec<ExpenseSplit>,
}

impl TripSnapshot {
    pub fn new(
        participants: Vec<Participant>,
        expenses: Vec<Expense>,
        splits: Vec<ExpenseSplit>,
    ) -> Self {
        Self {
            participants,
            expenses,
            splits,
        }
    }

    /// Group split rows by expense id, preserving row order within a group.
    pub fn splits_by_expense(&self) -> BTreeMap<&ExpenseId, Vec<&ExpenseSplit>> {
        let mut grouped: BTreeMap<&ExpenseId, Vec<&ExpenseSplit>> = BTreeMap::new();
        for split in &self.splits {
            grouped.entry(&split.expense_id).or_default().push(split);
        }
        grouped
    }
}
