//! Plain-text reports for the terminal.

use crewledger_core::domain::Participant;
use crewledger_core::TripSettlement;

use super::format::{display_name, format_minor};
use crate::config::CurrencyFormat;
use crate::verify::{ExpenseStatus, VerificationReport};

const RULE_WIDTH: usize = 60;

/// Expense verification table, total trip cost and settlement plan.
pub fn render_verification(report: &VerificationReport, currency: &CurrencyFormat) -> String {
    let file = report
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let rule = "-".repeat(RULE_WIDTH);

    let mut out = format!("{:*^RULE_WIDTH$}\n", " PROCESSING FILE ");
    out.push_str(&format!("Trip: {} ({file})\n", report.trip_name));
    out.push_str(&format!("{:=^RULE_WIDTH$}\n", "EXPENSE VERIFICATION"));
    out.push_str(&format!(
        "{:<12} | {:<25} | {:<12} | Status\n",
        "Date", "Description", "Type"
    ));
    out.push_str(&format!("{rule}\n"));

    for row in &report.rows {
        let date = row
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let share_type = row.share_type.map(|t| t.as_str()).unwrap_or("-");
        let status = match &row.status {
            ExpenseStatus::Ok => "OK".to_string(),
            ExpenseStatus::Unsplit => "UNSPLIT (not settled)".to_string(),
            ExpenseStatus::Invalid(reason) => format!("ERROR: {reason}"),
        };
        out.push_str(&format!(
            "{date:<12} | {:<25} | {share_type:<12} | {status}\n",
            truncate(&row.description, 25)
        ));
    }

    out.push_str(&format!("{rule}\n"));
    out.push_str(&format!(
        "Total Trip Cost: {}\n\n",
        format_minor(report.total_trip_cost, currency)
    ));
    out.push_str(&render_plan(&report.settlement, &report.participants, currency));
    out
}

/// Suggested payments, or a note that nothing is owed.
pub fn render_plan(
    settlement: &TripSettlement,
    participants: &[Participant],
    currency: &CurrencyFormat,
) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("SETTLEMENT PLAN (Who pays Whom)\n{rule}\n");
    if settlement.is_settled() {
        out.push_str("All balances are settled! No payments needed.\n");
    } else {
        for s in &settlement.settlements {
            out.push_str(&format!(
                "{:<15} pays {:<15} {}\n",
                display_name(participants, s.from.as_str()),
                display_name(participants, s.to.as_str()),
                format_minor(i128::from(s.amount_minor), currency)
            ));
        }
    }
    out.push_str(&format!("{rule}\n"));
    out
}

/// Per-participant paid/owed/net table.
pub fn render_balances(
    settlement: &TripSettlement,
    participants: &[Participant],
    currency: &CurrencyFormat,
) -> String {
    let mut out = format!("{:=^RULE_WIDTH$}\n", "BALANCES");
    out.push_str(&format!(
        "{:<18} {:>13} {:>13} {:>13}\n",
        "Participant", "Paid", "Owed", "Net"
    ));
    for b in &settlement.balances {
        out.push_str(&format!(
            "{:<18} {:>13} {:>13} {:>13}\n",
            truncate(display_name(participants, b.participant_id.as_str()), 18),
            format_minor(i128::from(b.total_paid), currency),
            format_minor(i128::from(b.total_owed), currency),
            format_minor(i128::from(b.net_position), currency),
        ));
    }
    if !settlement.unsplit.is_empty() {
        out.push_str(&format!(
            "Unsplit: {} expense(s), {} not attributed to anyone\n",
            settlement.unsplit.len(),
            format_minor(settlement.unsplit_total, currency)
        ));
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
