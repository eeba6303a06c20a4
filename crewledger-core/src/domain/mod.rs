//! Domain types for CrewLedger

pub mod expense;
pub mod ids;
pub mod outcome;
pub mod participant;
pub mod snapshot;

pub use expense::{Expense, ExpenseSplit, ShareType};
pub use ids::{ExpenseId, ParticipantId, PlanHash, SnapshotHash};
pub use outcome::{NormalizedShare, ParticipantBalance, Settlement};
pub use participant::Participant;
pub use snapshot::TripSnapshot;

/// Amount in the currency's smallest unit (cents).
pub type MinorAmount = i64;
