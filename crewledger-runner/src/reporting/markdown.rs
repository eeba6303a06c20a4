//! Markdown report generator.

use crewledger_core::domain::PlanHash;

use super::format::{display_name, format_minor};
use crate::config::CurrencyFormat;
use crate::verify::{ExpenseStatus, VerificationReport};

pub struct MarkdownReportGenerator {
    currency: CurrencyFormat,
}

impl MarkdownReportGenerator {
    pub fn new(currency: CurrencyFormat) -> Self {
        Self { currency }
    }

    pub fn generate(&self, report: &VerificationReport, plan_hash: &PlanHash) -> String {
        let settlement = &report.settlement;
        let money = |amount: i128| format_minor(amount, &self.currency);
        let name = |id: &str| display_name(&report.participants, id).to_string();

        let mut md = format!(
            "# Trip Settlement: {}\n\n\
Snapshot: `{}`  \n\
Plan: `{}`\n\n\
## Summary\n\
- Currency: {}\n\
- Participants: {}\n\
- Expenses: {}\n\
- Total trip cost: {}\n\
- Payments needed: {}\n",
            report.trip_name,
            report.snapshot_hash.short(),
            plan_hash.short(),
            report.currency,
            report.participants.len(),
            report.rows.len(),
            money(report.total_trip_cost),
            settlement.settlements.len(),
        );

        md.push_str("\n## Balances\n\n");
        md.push_str("| Participant | Paid | Owed | Net |\n");
        md.push_str("|-------------|------|------|-----|\n");
        for b in &settlement.balances {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                name(b.participant_id.as_str()),
                money(i128::from(b.total_paid)),
                money(i128::from(b.total_owed)),
                money(i128::from(b.net_position)),
            ));
        }

        md.push_str("\n## Settlements\n\n");
        if settlement.is_settled() {
            md.push_str("All balances are settled. No payments needed.\n");
        } else {
            md.push_str("| From | To | Amount |\n");
            md.push_str("|------|----|--------|\n");
            for s in &settlement.settlements {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    name(s.from.as_str()),
                    name(s.to.as_str()),
                    money(i128::from(s.amount_minor)),
                ));
            }
        }

        let unsplit: Vec<_> = report
            .rows
            .iter()
            .filter(|r| r.status == ExpenseStatus::Unsplit)
            .collect();
        if !unsplit.is_empty() {
            md.push_str("\n## Unsplit Expenses\n\n");
            md.push_str("| Expense | Description | Amount |\n");
            md.push_str("|---------|-------------|--------|\n");
            for row in unsplit {
                md.push_str(&format!(
                    "| {} | {} | {} |\n",
                    row.expense_id,
                    row.description,
                    money(i128::from(row.amount_minor)),
                ));
            }
        }

        if !report.rejected.is_empty() {
            md.push_str("\n## Rejected Expenses\n\n");
            md.push_str("| Expense | Reason |\n");
            md.push_str("|---------|--------|\n");
            for (expense_id, err) in &report.rejected {
                md.push_str(&format!("| {expense_id} | {err} |\n"));
            }
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip_file::parse_trip;
    use crate::verify::verify_trip;
    use std::path::Path;

    const TRIP: &str = r#"{
        "trip": { "name": "Porto" },
        "participants": [
            { "id": "a", "name": "Alice" },
            { "id": "b", "name": "Bob" }
        ],
        "expenses": [
            { "id": "x1", "amount": 3000, "paidBy": "a", "description": "Wine tour" },
            { "id": "x2", "amount": 800, "paidBy": "b", "description": "Tram" },
            { "id": "x3", "amount": 100, "paidBy": "b", "description": "Tip" }
        ],
        "expenseSplits": [
            { "expenseId": "x1", "participantId": "a", "shareType": "weight", "share": 1 },
            { "expenseId": "x1", "participantId": "b", "shareType": "weight", "share": 2 },
            { "expenseId": "x2", "participantId": "a", "shareType": "weight", "share": -1 }
        ]
    }"#;

    #[test]
    fn report_has_all_sections() {
        let trip = parse_trip(TRIP, Path::new("porto.json"), "USD").unwrap();
        let report = verify_trip(&trip).unwrap();
        let plan_hash = report.settlement.fingerprint();

        let md = MarkdownReportGenerator::new(CurrencyFormat::default()).generate(&report, &plan_hash);

        assert!(md.starts_with("# Trip Settlement: Porto"));
        assert!(md.contains("- Total trip cost: $39.00"));
        assert!(md.contains("| Bob | Alice | $20.00 |"));
        assert!(md.contains("## Unsplit Expenses"));
        assert!(md.contains("| x3 | Tip | $1.00 |"));
        assert!(md.contains("## Rejected Expenses"));
        assert!(md.contains(plan_hash.short()));
    }
}
