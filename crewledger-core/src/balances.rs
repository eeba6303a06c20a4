//! Balance calculation — per-participant paid/owed/net totals.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{Expense, ExpenseId, NormalizedShare, Participant, ParticipantBalance};
use crate::error::BalanceError;

/// Aggregate paid and consumed amounts per participant.
///
/// Every participant in the roster appears in the output, zero activity
/// included, ordered by ascending participant id. An expense with no entry
/// in `shares_by_expense` (or an empty one) only counts toward its payer's
/// `total_paid`.
pub fn calculate_balances(
    expenses: &[Expense],
    shares_by_expense: &BTreeMap<ExpenseId, Vec<NormalizedShare>>,
    participants: &[Participant],
) -> Result<Vec<ParticipantBalance>, BalanceError> {
    let mut ledger: BTreeMap<&str, ParticipantBalance> = BTreeMap::new();
    for participant in participants {
        let previous = ledger.insert(
            participant.id.as_str(),
            ParticipantBalance::zero(participant.id.clone()),
        );
        if previous.is_some() {
            return Err(BalanceError::DuplicateParticipant(participant.id.clone()));
        }
    }

    let known_expenses: HashMap<&ExpenseId, &Expense> =
        expenses.iter().map(|e| (&e.id, e)).collect();
    if let Some(unknown) = shares_by_expense
        .keys()
        .find(|id| !known_expenses.contains_key(id))
    {
        return Err(BalanceError::UnknownExpense(unknown.clone()));
    }

    for expense in expenses {
        let payer = ledger
            .get_mut(expense.paid_by.as_str())
            .ok_or_else(|| BalanceError::UnknownPayer {
                expense_id: expense.id.clone(),
                participant_id: expense.paid_by.clone(),
            })?;
        payer.total_paid = payer
            .total_paid
            .checked_add(expense.amount_minor)
            .ok_or_else(|| BalanceError::Overflow(expense.paid_by.clone()))?;

        let Some(shares) = shares_by_expense.get(&expense.id) else {
            continue;
        };
        for share in shares {
            let entry = ledger
                .get_mut(share.participant_id.as_str())
                .ok_or_else(|| BalanceError::UnknownShareParticipant {
                    expense_id: expense.id.clone(),
                    participant_id: share.participant_id.clone(),
                })?;
            entry.total_owed = entry
                .total_owed
                .checked_add(share.amount_minor)
                .ok_or_else(|| BalanceError::Overflow(share.participant_id.clone()))?;
        }
    }

    ledger
        .into_values()
        .map(|mut balance| {
            balance.net_position = balance
                .total_paid
                .checked_sub(balance.total_owed)
                .ok_or_else(|| BalanceError::Overflow(balance.participant_id.clone()))?;
            Ok(balance)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParticipantId;

    fn roster() -> Vec<Participant> {
        vec![
            Participant::new("charlie", "Charlie"),
            Participant::new("alice", "Alice"),
            Participant::new("bob", "Bob"),
        ]
    }

    fn share(participant: &str, amount_minor: i64) -> NormalizedShare {
        NormalizedShare {
            participant_id: ParticipantId::from(participant),
            amount_minor,
        }
    }

    #[test]
    fn single_expense_three_way() {
        let expenses = vec![Expense::new("e1", "alice", 15_000, "USD")];
        let mut shares = BTreeMap::new();
        shares.insert(
            ExpenseId::from("e1"),
            vec![share("alice", 5_000), share("bob", 5_000), share("charlie", 5_000)],
        );

        let balances = calculate_balances(&expenses, &shares, &roster()).unwrap();
        let rows: Vec<(&str, i64, i64, i64)> = balances
            .iter()
            .map(|b| (b.participant_id.as_str(), b.total_paid, b.total_owed, b.net_position))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("alice", 15_000, 5_000, 10_000),
                ("bob", 0, 5_000, -5_000),
                ("charlie", 0, 5_000, -5_000),
            ]
        );
    }

    #[test]
    fn idle_participants_appear_with_zeroes() {
        let balances = calculate_balances(&[], &BTreeMap::new(), &roster()).unwrap();
        assert_eq!(balances.len(), 3);
        assert!(balances.iter().all(|b| *b == ParticipantBalance::zero(b.participant_id.clone())));
    }

    #[test]
    fn unsplit_expense_only_counts_as_paid() {
        let expenses = vec![Expense::new("e1", "bob", 900, "USD")];
        let balances = calculate_balances(&expenses, &BTreeMap::new(), &roster()).unwrap();
        let bob = balances.iter().find(|b| b.participant_id.as_str() == "bob").unwrap();
        assert_eq!((bob.total_paid, bob.total_owed, bob.net_position), (900, 0, 900));
        let owed: i64 = balances.iter().map(|b| b.total_owed).sum();
        assert_eq!(owed, 0);
    }

    #[test]
    fn unknown_payer_is_rejected() {
        let expenses = vec![Expense::new("e1", "mallory", 100, "USD")];
        let err = calculate_balances(&expenses, &BTreeMap::new(), &roster()).unwrap_err();
        assert!(matches!(err, BalanceError::UnknownPayer { .. }));
    }

    #[test]
    fn unknown_share_participant_is_rejected() {
        let expenses = vec![Expense::new("e1", "alice", 100, "USD")];
        let mut shares = BTreeMap::new();
        shares.insert(ExpenseId::from("e1"), vec![share("mallory", 100)]);
        let err = calculate_balances(&expenses, &shares, &roster()).unwrap_err();
        assert!(matches!(err, BalanceError::UnknownShareParticipant { .. }));
    }

    #[test]
    fn shares_for_unknown_expense_are_rejected() {
        let mut shares = BTreeMap::new();
        shares.insert(ExpenseId::from("ghost"), vec![share("alice", 100)]);
        let err = calculate_balances(&[], &shares, &roster()).unwrap_err();
        assert_eq!(err, BalanceError::UnknownExpense(ExpenseId::from("ghost")));
    }

    #[test]
    fn duplicate_participant_is_rejected() {
        let mut participants = roster();
        participants.push(Participant::new("alice", "Alice again"));
        let err = calculate_balances(&[], &BTreeMap::new(), &participants).unwrap_err();
        assert_eq!(err, BalanceError::DuplicateParticipant(ParticipantId::from("alice")));
    }

    #[test]
    fn overflow_is_reported() {
        let expenses = vec![
            Expense::new("e1", "alice", i64::MAX, "USD"),
            Expense::new("e2", "alice", 1, "USD"),
        ];
        let err = calculate_balances(&expenses, &BTreeMap::new(), &roster()).unwrap_err();
        assert_eq!(err, BalanceError::Overflow(ParticipantId::from("alice")));
    }
}
