//! Trip export loading — the app's JSON export into a `TripSnapshot`.
//!
//! The export carries more than the engine needs (avatar colors, timestamps,
//! sync metadata); unknown fields are ignored. Descriptions and dates are
//! kept aside as `ExpenseDetail` for reports.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crewledger_core::domain::{
    Expense, ExpenseId, ExpenseSplit, MinorAmount, Participant, ShareType, TripSnapshot,
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read trip file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse trip file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expense {expense_id}: exact-amount split for {participant_id} has no amount")]
    MissingSplitAmount {
        expense_id: String,
        participant_id: String,
    },

    #[error("expense {expense_id}: {share_type} split for {participant_id} has no share")]
    MissingShare {
        expense_id: String,
        participant_id: String,
        share_type: ShareType,
    },

    #[error("expense {expense_id} is in {found}, trip currency is {expected}")]
    CurrencyMismatch {
        expense_id: String,
        expected: String,
        found: String,
    },
}

// ── Export format ────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TripExport {
    #[serde(default)]
    trip: Option<TripHeader>,
    #[serde(default)]
    participants: Vec<ParticipantRecord>,
    #[serde(default)]
    expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    expense_splits: Vec<SplitRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct TripHeader {
    name: Option<String>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ParticipantRecord {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseRecord {
    id: String,
    amount: MinorAmount,
    paid_by: String,
    description: Option<String>,
    date: Option<String>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SplitRecord {
    expense_id: String,
    participant_id: String,
    share_type: ShareType,
    share: Option<f64>,
    amount: Option<f64>,
}

// ── Loaded trip ──────────────────────────────────────────────────────

/// Reporting-only fields of an expense.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseDetail {
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
}

/// A trip export turned into engine input.
#[derive(Debug, Clone)]
pub struct LoadedTrip {
    pub name: String,
    pub path: PathBuf,
    pub currency: String,
    pub snapshot: TripSnapshot,
    pub details: BTreeMap<ExpenseId, ExpenseDetail>,
}

impl LoadedTrip {
    pub fn detail(&self, expense_id: &ExpenseId) -> Option<&ExpenseDetail> {
        self.details.get(expense_id)
    }
}

/// Read and convert a trip export. `default_currency` applies when the
/// export has no trip header currency.
pub fn load_trip(path: &Path, default_currency: &str) -> Result<LoadedTrip, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let trip = parse_trip(&content, path, default_currency)?;
    info!(
        path = %path.display(),
        participants = trip.snapshot.participants.len(),
        expenses = trip.snapshot.expenses.len(),
        splits = trip.snapshot.splits.len(),
        "loaded trip"
    );
    Ok(trip)
}

/// Convert export JSON that has already been read. `path` is only used for
/// naming and error messages.
pub fn parse_trip(
    content: &str,
    path: &Path,
    default_currency: &str,
) -> Result<LoadedTrip, LoadError> {
    let export: TripExport = serde_json::from_str(content).map_err(|source| LoadError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    let header = export.trip.unwrap_or_default();
    let currency = header
        .currency
        .unwrap_or_else(|| default_currency.to_string());
    let name = header.name.unwrap_or_else(|| file_stem(path));

    let participants = export
        .participants
        .into_iter()
        .map(|p| Participant::new(p.id, p.name))
        .collect();

    let mut expenses = Vec::with_capacity(export.expenses.len());
    let mut details = BTreeMap::new();
    for record in export.expenses {
        if let Some(found) = record.currency.as_deref() {
            if !found.eq_ignore_ascii_case(&currency) {
                return Err(LoadError::CurrencyMismatch {
                    expense_id: record.id,
                    expected: currency,
                    found: found.to_string(),
                });
            }
        }
        let expense = Expense::new(record.id, record.paid_by, record.amount, currency.clone());
        details.insert(
            expense.id.clone(),
            ExpenseDetail {
                description: record.description,
                date: record.date.as_deref().and_then(parse_date),
            },
        );
        expenses.push(expense);
    }

    let splits = export
        .expense_splits
        .into_iter()
        .map(convert_split)
        .collect::<Result<Vec<_>, _>>()?;

    debug!(trip = %name, currency = %currency, "parsed trip export");
    Ok(LoadedTrip {
        name,
        path: path.to_path_buf(),
        currency,
        snapshot: TripSnapshot::new(participants, expenses, splits),
        details,
    })
}

fn convert_split(record: SplitRecord) -> Result<ExpenseSplit, LoadError> {
    let value = match record.share_type {
        ShareType::Equal => record.share.unwrap_or(1.0),
        ShareType::ExactAmount => record.amount.ok_or_else(|| LoadError::MissingSplitAmount {
            expense_id: record.expense_id.clone(),
            participant_id: record.participant_id.clone(),
        })?,
        ShareType::Percentage | ShareType::Weight => {
            record.share.ok_or_else(|| LoadError::MissingShare {
                expense_id: record.expense_id.clone(),
                participant_id: record.participant_id.clone(),
                share_type: record.share_type,
            })?
        }
    };
    Ok(ExpenseSplit::new(
        record.expense_id,
        record.participant_id,
        record.share_type,
        value,
    ))
}

/// `YYYY-MM-DD` from the first ten characters (ISO timestamps included).
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trip".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = r##"{
        "trip": { "name": "Lisbon", "currency": "EUR" },
        "participants": [
            { "id": "p1", "name": "Alice", "color": "#ff0000" },
            { "id": "p2", "name": "Bob" }
        ],
        "expenses": [
            {
                "id": "x1", "amount": 4200, "paidBy": "p1",
                "description": "Dinner", "date": "2024-05-01T19:30:00.000Z",
                "createdAt": 1714590000
            },
            { "id": "x2", "amount": 1000, "paidBy": "p2", "date": "not a date" }
        ],
        "expenseSplits": [
            { "expenseId": "x1", "participantId": "p1", "shareType": "equal", "share": 1 },
            { "expenseId": "x1", "participantId": "p2", "shareType": "equal" },
            { "expenseId": "x2", "participantId": "p1", "shareType": "amount", "amount": 600 },
            { "expenseId": "x2", "participantId": "p2", "shareType": "exact_amount", "amount": 400 }
        ]
    }"##;

    #[test]
    fn parses_export_and_ignores_unknown_fields() {
        let trip = parse_trip(EXPORT, Path::new("crewledger-lisbon.json"), "USD").unwrap();
        assert_eq!(trip.name, "Lisbon");
        assert_eq!(trip.currency, "EUR");
        assert_eq!(trip.snapshot.participants.len(), 2);
        assert_eq!(trip.snapshot.expenses[0].amount_minor, 4_200);
        assert_eq!(trip.snapshot.expenses[0].currency, "EUR");
        assert_eq!(trip.snapshot.splits[2].share_type, ShareType::ExactAmount);
        assert_eq!(trip.snapshot.splits[2].share_value, 600.0);
    }

    #[test]
    fn dates_use_first_ten_characters() {
        let trip = parse_trip(EXPORT, Path::new("t.json"), "USD").unwrap();
        let dinner = trip.detail(&ExpenseId::from("x1")).unwrap();
        assert_eq!(dinner.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(dinner.description.as_deref(), Some("Dinner"));
        assert_eq!(trip.detail(&ExpenseId::from("x2")).unwrap().date, None);
    }

    #[test]
    fn name_falls_back_to_file_stem() {
        let trip = parse_trip("{}", Path::new("/tmp/crewledger-oslo.json"), "NOK").unwrap();
        assert_eq!(trip.name, "crewledger-oslo");
        assert_eq!(trip.currency, "NOK");
        assert!(trip.snapshot.expenses.is_empty());
    }

    #[test]
    fn exact_split_without_amount_is_rejected() {
        let json = r#"{
            "expenses": [{ "id": "x1", "amount": 100, "paidBy": "p1" }],
            "expenseSplits": [
                { "expenseId": "x1", "participantId": "p1", "shareType": "amount", "share": 100 }
            ]
        }"#;
        let err = parse_trip(json, Path::new("t.json"), "USD").unwrap_err();
        assert!(matches!(err, LoadError::MissingSplitAmount { .. }));
    }

    #[test]
    fn weight_split_without_share_is_rejected() {
        let json = r#"{
            "expenseSplits": [
                { "expenseId": "x1", "participantId": "p1", "shareType": "weight" }
            ]
        }"#;
        let err = parse_trip(json, Path::new("t.json"), "USD").unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingShare {
                share_type: ShareType::Weight,
                ..
            }
        ));
    }

    #[test]
    fn foreign_currency_expense_is_rejected() {
        let json = r#"{
            "trip": { "currency": "USD" },
            "expenses": [{ "id": "x1", "amount": 100, "paidBy": "p1", "currency": "JPY" }]
        }"#;
        let err = parse_trip(json, Path::new("t.json"), "USD").unwrap_err();
        assert!(matches!(err, LoadError::CurrencyMismatch { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_trip("{ not json", Path::new("t.json"), "USD").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }
}
