//! Share normalization — split declarations to exact integer amounts.
//!
//! Every expense's split rows are turned into concrete minor-unit amounts
//! that sum exactly to the expense total. Percentages and weights use the
//! largest-remainder method:
//!
//! 1. Floor every raw share.
//! 2. Hand the leftover units, one at a time, to the largest fractional
//!    remainders, ties by ascending participant id.
//!
//! Rounding never depends on the caller's row order: splits are processed
//! in participant-id order and returned in input order.

use rust_decimal::prelude::*;
use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::domain::{Expense, ExpenseSplit, MinorAmount, NormalizedShare, ShareType};
use crate::error::NormalizeError;

/// Allowed distance of a percentage sum from 100 (absorbs float input noise).
pub const PERCENTAGE_TOLERANCE: f64 = 0.01 + f64::EPSILON * 100.0;

/// Normalize one expense's splits into concrete amounts.
///
/// An empty split set is valid ("unsplit") and yields an empty result.
pub fn normalize<S: Borrow<ExpenseSplit>>(
    expense: &Expense,
    splits: &[S],
) -> Result<Vec<NormalizedShare>, NormalizeError> {
    if expense.amount_minor < 0 {
        return Err(NormalizeError::NegativeExpenseAmount {
            expense_id: expense.id.clone(),
            amount_minor: expense.amount_minor,
        });
    }

    let Some(first) = splits.first().map(<S as Borrow<ExpenseSplit>>::borrow) else {
        return Ok(Vec::new());
    };
    let share_type = first.share_type;

    for split in splits.iter().map(<S as Borrow<ExpenseSplit>>::borrow) {
        if split.expense_id != expense.id {
            return Err(NormalizeError::ForeignSplit {
                expense_id: expense.id.clone(),
                split_expense_id: split.expense_id.clone(),
            });
        }
        if split.share_type != share_type {
            return Err(NormalizeError::MixedShareTypes {
                expense_id: expense.id.clone(),
                first: share_type,
                other: split.share_type,
            });
        }
    }

    let stable = stable_order(splits);
    for pair in stable.windows(2) {
        if pair[0].1.participant_id == pair[1].1.participant_id {
            return Err(NormalizeError::DuplicateParticipant {
                expense_id: expense.id.clone(),
                participant_id: pair[0].1.participant_id.clone(),
            });
        }
    }

    let total = expense.amount_minor;
    let stable_amounts = match share_type {
        ShareType::Equal => split_evenly(total, stable.len()),
        ShareType::Percentage => {
            let units = percentage_units(expense, &stable)?;
            apportion(total, &units).ok_or_else(|| overflow(expense))?
        }
        ShareType::Weight => {
            let units = weight_units(expense, &stable)?;
            apportion(total, &units).ok_or_else(|| overflow(expense))?
        }
        ShareType::ExactAmount => exact_amounts(expense, &stable)?,
    };

    let mut shares: Vec<Option<NormalizedShare>> = vec![None; splits.len()];
    for ((original_index, split), amount_minor) in stable.iter().zip(stable_amounts) {
        shares[*original_index] = Some(NormalizedShare {
            participant_id: split.participant_id.clone(),
            amount_minor,
        });
    }
    Ok(shares.into_iter().flatten().collect())
}

fn overflow(expense: &Expense) -> NormalizeError {
    NormalizeError::ApportionOverflow {
        expense_id: expense.id.clone(),
        amount_minor: expense.amount_minor,
    }
}

/// Splits sorted by participant id, ties by input position.
fn stable_order<S: Borrow<ExpenseSplit>>(splits: &[S]) -> Vec<(usize, &ExpenseSplit)> {
    let mut stable: Vec<(usize, &ExpenseSplit)> = splits
        .iter()
        .map(<S as Borrow<ExpenseSplit>>::borrow)
        .enumerate()
        .collect();
    stable.sort_by(|a, b| {
        a.1.participant_id
            .cmp(&b.1.participant_id)
            .then(a.0.cmp(&b.0))
    });
    stable
}

/// Equal split: the first `total % n` participants (in id order) get one extra unit.
fn split_evenly(total: MinorAmount, n: usize) -> Vec<MinorAmount> {
    let count = n as MinorAmount;
    let base = total / count;
    let remainder = (total % count) as usize;
    (0..n)
        .map(|idx| if idx < remainder { base + 1 } else { base })
        .collect()
}

/// Decimal places kept from each percentage before apportioning.
const PERCENTAGE_DP: u32 = 10;

/// Percentages as integer units of `10^-PERCENTAGE_DP` percent.
fn percentage_units(
    expense: &Expense,
    stable: &[(usize, &ExpenseSplit)],
) -> Result<Vec<i128>, NormalizeError> {
    let mut sum = 0.0_f64;
    let mut units = Vec::with_capacity(stable.len());
    for (_, split) in stable {
        let value = split.share_value;
        let invalid = || NormalizeError::InvalidPercentage {
            expense_id: expense.id.clone(),
            participant_id: split.participant_id.clone(),
            value,
        };
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(invalid());
        }
        sum += value;
        let mut pct = Decimal::try_from(value)
            .map_err(|_| invalid())?
            .round_dp(PERCENTAGE_DP);
        pct.rescale(PERCENTAGE_DP);
        units.push(pct.mantissa());
    }

    if (sum - 100.0).abs() > PERCENTAGE_TOLERANCE {
        return Err(NormalizeError::InvalidPercentageSum {
            expense_id: expense.id.clone(),
            sum,
        });
    }
    // Apportioning against the declared sum keeps the tolerance window
    // from minting or losing units.
    Ok(units)
}

/// Weights as integers on one shared binary scale.
///
/// Each weight is taken at its exact binary value. When the spread between
/// the largest and smallest weight is too wide for 64 bits, the scale is
/// anchored at the largest weight and bits below it are dropped, so tiny
/// weights round down (possibly to nothing) instead of failing.
fn weight_units(
    expense: &Expense,
    stable: &[(usize, &ExpenseSplit)],
) -> Result<Vec<i128>, NormalizeError> {
    let mut parts = Vec::with_capacity(stable.len());
    for (_, split) in stable {
        let value = split.share_value;
        if !value.is_finite() || value <= 0.0 {
            return Err(NormalizeError::InvalidWeight {
                expense_id: expense.id.clone(),
                participant_id: split.participant_id.clone(),
                value,
            });
        }
        parts.push(binary_parts(value));
    }

    // Units below 2^budget each, so their sum stays below 2^64 and
    // `total * sum` below 2^127.
    let count_bits = usize::BITS - stable.len().leading_zeros();
    let budget = 64 - count_bits as i32;
    let lowest = parts.iter().map(|&(_, exp)| exp).min().unwrap_or(0);
    let top = parts
        .iter()
        .map(|&(mantissa, exp)| bit_len(mantissa) + exp)
        .max()
        .unwrap_or(0);
    let base = lowest.max(top - budget);

    Ok(parts
        .into_iter()
        .map(|(mantissa, exp)| {
            let shift = exp - base;
            let mantissa = i128::from(mantissa);
            if shift >= 0 {
                mantissa << shift
            } else if shift > -64 {
                mantissa >> -shift
            } else {
                0
            }
        })
        .collect())
}

/// `value == mantissa * 2^exp` for a finite, positive `value`.
fn binary_parts(value: f64) -> (u64, i32) {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1_u64 << 52) - 1);
    if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1_u64 << 52), biased - 1075)
    }
}

fn bit_len(value: u64) -> i32 {
    (u64::BITS - value.leading_zeros()) as i32
}

fn exact_amounts(
    expense: &Expense,
    stable: &[(usize, &ExpenseSplit)],
) -> Result<Vec<MinorAmount>, NormalizeError> {
    let mut amounts = Vec::with_capacity(stable.len());
    let mut sum: i128 = 0;
    for (_, split) in stable {
        let value = split.share_value;
        // 2^63 itself is not an i64; `as` would saturate it.
        let whole = value.is_finite()
            && value >= 0.0
            && value.fract() == 0.0
            && value < MinorAmount::MAX as f64;
        if !whole {
            return Err(NormalizeError::InvalidExactAmount {
                expense_id: expense.id.clone(),
                participant_id: split.participant_id.clone(),
                value,
            });
        }
        let amount = value as MinorAmount;
        sum += i128::from(amount);
        amounts.push(amount);
    }

    if sum != i128::from(expense.amount_minor) {
        return Err(NormalizeError::SplitAmountMismatch {
            expense_id: expense.id.clone(),
            expected: expense.amount_minor,
            actual: sum,
        });
    }
    Ok(amounts)
}

/// Largest-remainder apportionment of `total` in proportion to `units`.
///
/// Floors and remainders are exact integer quotients, so equal fractions
/// compare equal. `units` must be in participant-id order; position breaks
/// ties. `None` when the units are all zero or the products overflow.
fn apportion(total: MinorAmount, units: &[i128]) -> Option<Vec<MinorAmount>> {
    let denominator = units.iter().try_fold(0_i128, |acc, u| acc.checked_add(*u))?;
    if denominator <= 0 {
        return None;
    }
    let total_wide = i128::from(total);

    let mut amounts = Vec::with_capacity(units.len());
    let mut remainders = Vec::with_capacity(units.len());
    for unit in units {
        let scaled = total_wide.checked_mul(*unit)?;
        amounts.push(MinorAmount::try_from(scaled / denominator).ok()?);
        remainders.push(scaled % denominator);
    }

    let mut order: Vec<usize> = (0..units.len()).collect();
    order.sort_by(|&a, &b| match remainders[b].cmp(&remainders[a]) {
        Ordering::Equal => a.cmp(&b),
        other => other,
    });

    // Fewer leftover units than participants, since each floor loses < 1.
    let assigned: i128 = amounts.iter().map(|&a| i128::from(a)).sum();
    let leftover = usize::try_from(total_wide - assigned).ok()?;
    for &idx in order.iter().take(leftover) {
        amounts[idx] += 1;
    }
    Some(amounts)
}
