//! Engine error taxonomy.
//!
//! Validation errors (`NormalizeError`, `BalanceError`) point at the record
//! that must be fixed. `SettlementError::BalanceConservation` is an invariant
//! violation: it means the balances were assembled incorrectly upstream.
//! Every failure is deterministic, so nothing here is retryable.

use thiserror::Error;

use crate::domain::{ExpenseId, MinorAmount, ParticipantId, ShareType};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("expense {expense_id}: amount must be non-negative, got {amount_minor}")]
    NegativeExpenseAmount {
        expense_id: ExpenseId,
        amount_minor: MinorAmount,
    },

    #[error("expense {expense_id}: split belongs to expense {split_expense_id}")]
    ForeignSplit {
        expense_id: ExpenseId,
        split_expense_id: ExpenseId,
    },

    #[error("expense {expense_id}: all splits must share one share type, found {first} and {other}")]
    MixedShareTypes {
        expense_id: ExpenseId,
        first: ShareType,
        other: ShareType,
    },

    #[error("expense {expense_id}: participant {participant_id} appears in more than one split")]
    DuplicateParticipant {
        expense_id: ExpenseId,
        participant_id: ParticipantId,
    },

    #[error("expense {expense_id}: percentage for {participant_id} must be within [0, 100], got {value}")]
    InvalidPercentage {
        expense_id: ExpenseId,
        participant_id: ParticipantId,
        value: f64,
    },

    #[error("expense {expense_id}: percentages must sum to 100, got {sum}")]
    InvalidPercentageSum { expense_id: ExpenseId, sum: f64 },

    #[error("expense {expense_id}: weight for {participant_id} must be finite and positive, got {value}")]
    InvalidWeight {
        expense_id: ExpenseId,
        participant_id: ParticipantId,
        value: f64,
    },

    #[error("expense {expense_id}: exact amount for {participant_id} must be a non-negative whole number of minor units, got {value}")]
    InvalidExactAmount {
        expense_id: ExpenseId,
        participant_id: ParticipantId,
        value: f64,
    },

    #[error("expense {expense_id}: amount {amount_minor} is too large to apportion")]
    ApportionOverflow {
        expense_id: ExpenseId,
        amount_minor: MinorAmount,
    },

    #[error("expense {expense_id}: split amounts must sum to the expense total, expected {expected}, got {actual}")]
    SplitAmountMismatch {
        expense_id: ExpenseId,
        expected: MinorAmount,
        actual: i128,
    },
}

impl NormalizeError {
    /// The expense the caller should ask the user to fix.
    pub fn expense_id(&self) -> &ExpenseId {
        match self {
            NormalizeError::NegativeExpenseAmount { expense_id, .. }
            | NormalizeError::ForeignSplit { expense_id, .. }
            | NormalizeError::MixedShareTypes { expense_id, .. }
            | NormalizeError::DuplicateParticipant { expense_id, .. }
            | NormalizeError::InvalidPercentage { expense_id, .. }
            | NormalizeError::InvalidPercentageSum { expense_id, .. }
            | NormalizeError::InvalidWeight { expense_id, .. }
            | NormalizeError::InvalidExactAmount { expense_id, .. }
            | NormalizeError::ApportionOverflow { expense_id, .. }
            | NormalizeError::SplitAmountMismatch { expense_id, .. } => expense_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BalanceError {
    #[error("participant {0} is listed more than once")]
    DuplicateParticipant(ParticipantId),

    #[error("expense {expense_id} is paid by unknown participant {participant_id}")]
    UnknownPayer {
        expense_id: ExpenseId,
        participant_id: ParticipantId,
    },

    #[error("expense {expense_id} attributes a share to unknown participant {participant_id}")]
    UnknownShareParticipant {
        expense_id: ExpenseId,
        participant_id: ParticipantId,
    },

    #[error("shares were supplied for unknown expense {0}")]
    UnknownExpense(ExpenseId),

    #[error("balance of participant {0} overflows")]
    Overflow(ParticipantId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("net positions must sum to zero, got {net_sum}")]
    BalanceConservation { net_sum: i128 },

    #[error("participant {0} has more than one balance")]
    DuplicateParticipant(ParticipantId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("expense {0} is listed more than once")]
    DuplicateExpense(ExpenseId),

    #[error("split for participant {participant_id} references unknown expense {expense_id}")]
    OrphanSplit {
        expense_id: ExpenseId,
        participant_id: ParticipantId,
    },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),
}
