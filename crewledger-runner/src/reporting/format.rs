//! Money formatting for reports.

use crewledger_core::domain::Participant;

use crate::config::CurrencyFormat;

/// Display name for a participant id, falling back to the raw id.
pub fn display_name<'a>(participants: &'a [Participant], id: &'a str) -> &'a str {
    participants
        .iter()
        .find(|p| p.id.as_str() == id)
        .map(|p| p.name.as_str())
        .unwrap_or(id)
}

/// Render a minor-unit amount, e.g. `123456` → `$1,234.56`.
///
/// Negative amounts get a leading minus: `-$5.00`.
pub fn format_minor(amount: i128, currency: &CurrencyFormat) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let magnitude = amount.unsigned_abs();
    let divisor = 10_u128.pow(currency.minor_digits);
    let whole = group_thousands(magnitude / divisor);

    if currency.minor_digits == 0 {
        format!("{sign}{}{whole}", currency.symbol)
    } else {
        let fraction = magnitude % divisor;
        let width = currency.minor_digits as usize;
        format!("{sign}{}{whole}.{fraction:0width$}", currency.symbol)
    }
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
