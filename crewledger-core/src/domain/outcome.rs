//! Engine outputs: normalized shares, balances, settlements.

use serde::{Deserialize, Serialize};

use super::{MinorAmount, ParticipantId};

/// Concrete amount a participant consumed from one expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedShare {
    pub participant_id: ParticipantId,
    pub amount_minor: MinorAmount,
}

/// Per-participant totals across a trip.
///
/// `net_position > 0` means the group owes the participant money.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantBalance {
    pub participant_id: ParticipantId,
    pub total_paid: MinorAmount,
    pub total_owed: MinorAmount,
    pub net_position: MinorAmount,
}

impl ParticipantBalance {
    pub fn zero(participant_id: ParticipantId) -> Self {
        Self {
            participant_id,
            total_paid: 0,
            total_owed: 0,
            net_position: 0,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.net_position == 0
    }
}

/// `from` pays `to` the given amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount_minor: MinorAmount,
}
