//! Trip verification — per-expense checks plus the lenient settlement plan.
//!
//! Every expense gets a row: `Ok` when its splits normalize exactly,
//! `Unsplit` when nobody has been attributed a share yet, `Invalid` with the
//! reason otherwise. Balances and payments are computed from the valid
//! expenses only, so one broken expense does not block the rest of the trip.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

use crewledger_core::domain::{ExpenseId, MinorAmount, Participant, ShareType, SnapshotHash};
use crewledger_core::{settle_valid, EngineError, NormalizeError, TripSettlement};

use crate::trip_file::LoadedTrip;

#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseStatus {
    Ok,
    Unsplit,
    Invalid(String),
}

impl ExpenseStatus {
    pub fn label(&self) -> &str {
        match self {
            ExpenseStatus::Ok => "OK",
            ExpenseStatus::Unsplit => "UNSPLIT",
            ExpenseStatus::Invalid(_) => "ERROR",
        }
    }
}

/// One line of the expense verification table.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRow {
    pub expense_id: ExpenseId,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub share_type: Option<ShareType>,
    pub amount_minor: MinorAmount,
    pub status: ExpenseStatus,
}

#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub trip_name: String,
    pub path: PathBuf,
    pub currency: String,
    pub snapshot_hash: SnapshotHash,
    pub participants: Vec<Participant>,
    /// Rows in file order.
    pub rows: Vec<ExpenseRow>,
    /// Every expense in the file, valid or not.
    pub total_trip_cost: i128,
    pub settlement: TripSettlement,
    pub rejected: Vec<(ExpenseId, NormalizeError)>,
}

impl VerificationReport {
    pub fn invalid_count(&self) -> usize {
        self.rejected.len()
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Verify a loaded trip and compute its settlement from the valid expenses.
///
/// Fails only on structural problems the engine cannot work around
/// (duplicate expenses, splits for unknown expenses, unknown participants).
pub fn verify_trip(trip: &LoadedTrip) -> Result<VerificationReport, EngineError> {
    let snapshot = &trip.snapshot;
    let lenient = settle_valid(snapshot)?;

    let reasons: HashMap<&ExpenseId, String> = lenient
        .rejected
        .iter()
        .map(|(id, err)| (id, err.to_string()))
        .collect();
    let grouped = snapshot.splits_by_expense();

    let mut rows = Vec::with_capacity(snapshot.expenses.len());
    let mut total_trip_cost: i128 = 0;
    for expense in &snapshot.expenses {
        total_trip_cost += i128::from(expense.amount_minor);
        let detail = trip.detail(&expense.id).cloned().unwrap_or_default();

        let status = if let Some(reason) = reasons.get(&expense.id) {
            warn!(trip = %trip.name, expense = %expense.id, %reason, "invalid expense skipped");
            ExpenseStatus::Invalid(reason.clone())
        } else if grouped.contains_key(&expense.id) {
            ExpenseStatus::Ok
        } else {
            ExpenseStatus::Unsplit
        };

        rows.push(ExpenseRow {
            expense_id: expense.id.clone(),
            date: detail.date,
            description: detail.description.unwrap_or_else(|| "Unknown".to_string()),
            share_type: grouped
                .get(&expense.id)
                .and_then(|splits| splits.first())
                .map(|s| s.share_type),
            amount_minor: expense.amount_minor,
            status,
        });
    }

    debug!(
        trip = %trip.name,
        settlements = lenient.settlement.settlements.len(),
        rejected = lenient.rejected.len(),
        "verified trip"
    );

    Ok(VerificationReport {
        trip_name: trip.name.clone(),
        path: trip.path.clone(),
        currency: trip.currency.clone(),
        snapshot_hash: snapshot.fingerprint(),
        participants: snapshot.participants.clone(),
        rows,
        total_trip_cost,
        settlement: lenient.settlement,
        rejected: lenient.rejected,
    })
}
