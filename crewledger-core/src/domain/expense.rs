//! Expenses and their split declarations.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ExpenseId, MinorAmount, ParticipantId};

/// A single paid expense, already converted to the trip currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub paid_by: ParticipantId,
    pub amount_minor: MinorAmount,
    pub currency: String,
}

impl Expense {
    pub fn new(
        id: impl Into<String>,
        paid_by: impl Into<String>,
        amount_minor: MinorAmount,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: ExpenseId::new(id),
            paid_by: ParticipantId::new(paid_by),
            amount_minor,
            currency: currency.into(),
        }
    }
}

/// How a split row's `share_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareType {
    /// Everyone on the expense pays the same; `share_value` is ignored.
    Equal,
    /// `share_value` is a percentage in `[0, 100]`.
    Percentage,
    /// `share_value` is a positive relative weight.
    Weight,
    /// `share_value` is an integer number of minor units.
    #[serde(alias = "amount")]
    ExactAmount,
}

impl ShareType {
    pub fn as_str(self) -> &'static str {
        match self {
            ShareType::Equal => "equal",
            ShareType::Percentage => "percentage",
            ShareType::Weight => "weight",
            ShareType::ExactAmount => "exact_amount",
        }
    }
}

impl fmt::Display for ShareType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row per (expense, participant) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    pub expense_id: ExpenseId,
    pub participant_id: ParticipantId,
    pub share_type: ShareType,
    pub share_value: f64,
}

impl ExpenseSplit {
    pub fn new(
        expense_id: impl Into<String>,
        participant_id: impl Into<String>,
        share_type: ShareType,
        share_value: f64,
    ) -> Self {
        Self {
            expense_id: ExpenseId::new(expense_id),
            participant_id: ParticipantId::new(participant_id),
            share_type,
            share_value,
        }
    }

    pub fn equal(expense_id: impl Into<String>, participant_id: impl Into<String>) -> Self {
        Self::new(expense_id, participant_id, ShareType::Equal, 1.0)
    }
}
