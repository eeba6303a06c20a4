//! Trip settlement: the three stages composed over one snapshot.
//!
//! `settle_trip` is strict: the first invalid expense aborts the run.
//! `settle_valid` is lenient: invalid expenses are set aside as rejections
//! and the rest of the trip is still settled.
//!
//! Expenses without split rows are "unsplit". They are reported separately
//! and kept out of the balance calculation, so the balances handed to the
//! optimizer always conserve money.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::balances::calculate_balances;
use crate::domain::{
    Expense, ExpenseId, ExpenseSplit, MinorAmount, NormalizedShare, ParticipantBalance,
    Settlement, TripSnapshot,
};
use crate::error::{EngineError, NormalizeError};
use crate::normalize::normalize;
use crate::settlement::optimize;

/// Outcome of settling a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSettlement {
    /// Normalized shares per split expense.
    pub shares: BTreeMap<ExpenseId, Vec<NormalizedShare>>,
    /// One row per participant, ordered by id.
    pub balances: Vec<ParticipantBalance>,
    /// Suggested payments.
    pub settlements: Vec<Settlement>,
    /// Expenses with no split rows, ordered by id.
    pub unsplit: Vec<ExpenseId>,
    /// Sum of every settled expense, split or not.
    pub total_spend: i128,
    /// Part of `total_spend` that nobody has been attributed yet.
    pub unsplit_total: i128,
}

/// A lenient run: the settlement over valid expenses plus what was set aside.
#[derive(Debug, Clone, PartialEq)]
pub struct LenientSettlement {
    pub settlement: TripSettlement,
    /// Invalid expenses in ascending id order.
    pub rejected: Vec<(ExpenseId, NormalizeError)>,
}

/// Settle a trip, failing on the first invalid expense (ascending id order).
pub fn settle_trip(snapshot: &TripSnapshot) -> Result<TripSettlement, EngineError> {
    let grouped = group_splits(snapshot)?;

    let mut shares = BTreeMap::new();
    for expense in sorted_expenses(&snapshot.expenses) {
        // Unsplit expenses still go through normalize for the amount check.
        let splits = splits_for(&grouped, expense);
        let normalized = normalize(expense, splits)?;
        if !splits.is_empty() {
            shares.insert(expense.id.clone(), normalized);
        }
    }

    assemble(snapshot, shares, snapshot.expenses.iter().collect())
}

/// Settle every valid expense; collect the invalid ones instead of failing.
///
/// Structural problems (duplicate expenses, orphan splits, unknown
/// participants) still fail the whole run.
pub fn settle_valid(snapshot: &TripSnapshot) -> Result<LenientSettlement, EngineError> {
    let grouped = group_splits(snapshot)?;

    let mut shares = BTreeMap::new();
    let mut rejected = Vec::new();
    let mut rejected_ids = HashSet::new();
    for expense in sorted_expenses(&snapshot.expenses) {
        let splits = splits_for(&grouped, expense);
        match normalize(expense, splits) {
            Ok(normalized) => {
                if !splits.is_empty() {
                    shares.insert(expense.id.clone(), normalized);
                }
            }
            Err(err) => {
                rejected_ids.insert(&expense.id);
                rejected.push((expense.id.clone(), err));
            }
        }
    }

    let accepted = snapshot
        .expenses
        .iter()
        .filter(|e| !rejected_ids.contains(&e.id))
        .collect();
    let settlement = assemble(snapshot, shares, accepted)?;
    Ok(LenientSettlement {
        settlement,
        rejected,
    })
}

/// Group splits by expense, rejecting duplicate expenses and orphan splits.
fn group_splits(
    snapshot: &TripSnapshot,
) -> Result<BTreeMap<ExpenseId, Vec<&ExpenseSplit>>, EngineError> {
    let mut known = HashSet::with_capacity(snapshot.expenses.len());
    for expense in &snapshot.expenses {
        if !known.insert(&expense.id) {
            return Err(EngineError::DuplicateExpense(expense.id.clone()));
        }
    }

    if let Some(orphan) = snapshot
        .splits
        .iter()
        .find(|s| !known.contains(&s.expense_id))
    {
        return Err(EngineError::OrphanSplit {
            expense_id: orphan.expense_id.clone(),
            participant_id: orphan.participant_id.clone(),
        });
    }

    Ok(snapshot
        .splits_by_expense()
        .into_iter()
        .map(|(id, splits)| (id.clone(), splits))
        .collect())
}

fn splits_for<'a>(
    grouped: &'a BTreeMap<ExpenseId, Vec<&'a ExpenseSplit>>,
    expense: &Expense,
) -> &'a [&'a ExpenseSplit] {
    grouped.get(&expense.id).map(Vec::as_slice).unwrap_or(&[])
}

fn sorted_expenses(expenses: &[Expense]) -> Vec<&Expense> {
    let mut sorted: Vec<&Expense> = expenses.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));
    sorted
}

/// Balance the split expenses, optimize, and account for the unsplit ones.
fn assemble(
    snapshot: &TripSnapshot,
    shares: BTreeMap<ExpenseId, Vec<NormalizedShare>>,
    expenses: Vec<&Expense>,
) -> Result<TripSettlement, EngineError> {
    let mut split_expenses = Vec::new();
    let mut unsplit = Vec::new();
    let mut total_spend: i128 = 0;
    let mut unsplit_total: i128 = 0;
    for expense in expenses {
        total_spend += i128::from(expense.amount_minor);
        if shares.contains_key(&expense.id) {
            split_expenses.push(expense.clone());
        } else {
            unsplit_total += i128::from(expense.amount_minor);
            unsplit.push(expense.id.clone());
        }
    }
    unsplit.sort();

    let balances = calculate_balances(&split_expenses, &shares, &snapshot.participants)?;
    let settlements = optimize(&balances)?;

    Ok(TripSettlement {
        shares,
        balances,
        settlements,
        unsplit,
        total_spend,
        unsplit_total,
    })
}

impl TripSettlement {
    /// Net settlement flow per participant: received minus paid.
    pub fn settlement_flow(&self, participant: &str) -> MinorAmount {
        self.settlements
            .iter()
            .map(|s| {
                if s.to.as_str() == participant {
                    s.amount_minor
                } else if s.from.as_str() == participant {
                    -s.amount_minor
                } else {
                    0
                }
            })
            .sum()
    }

    pub fn is_settled(&self) -> bool {
        self.settlements.is_empty()
    }
}
