//! Turning a recurring amount into money per month, and counting occurrences.
//!
//! Two different counts live here on purpose:
//!
//! - [`monthly_contribution`] feeds the balance projection and approximates
//!   daily and weekly items (days in the month, a fixed weeks-per-month factor).
//! - [`occurrence_count`] walks the calendar and counts every occurrence
//!   exactly. It is used for remaining-payment counts and total previews.
//!
//! Over a full year the two can disagree by a few occurrences for weekly items.

use crate::schema::Frequency;
use crate::utils::{add_months, add_years, days_in_month, parse_optional_date};
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money an item moves during the month containing `target_month`.
///
/// Assumes the item is already known to be in effect for that month; window
/// checks live in [`crate::filter`].
///
/// An amount too large to scale counts as zero; see
/// [`checked_monthly_contribution`] to tell the two apart.
pub fn monthly_contribution(
    amount: Decimal,
    frequency: Frequency,
    target_month: NaiveDate,
    anchor_date: Option<NaiveDate>,
    weekly_factor: Decimal,
) -> Decimal {
    checked_monthly_contribution(amount, frequency, target_month, anchor_date, weekly_factor)
        .unwrap_or(Decimal::ZERO)
}

/// Like [`monthly_contribution`], but `None` when scaling the amount overflows.
pub fn checked_monthly_contribution(
    amount: Decimal,
    frequency: Frequency,
    target_month: NaiveDate,
    anchor_date: Option<NaiveDate>,
    weekly_factor: Decimal,
) -> Option<Decimal> {
    match frequency {
        // One-time items never reach the projection.
        Frequency::Once => Some(Decimal::ZERO),
        Frequency::Daily => amount.checked_mul(Decimal::from(days_in_month(
            target_month.year(),
            target_month.month(),
        ))),
        Frequency::Weekly => amount.checked_mul(weekly_factor),
        Frequency::Monthly => Some(amount),
        Frequency::Yearly => match anchor_date {
            Some(anchor) if is_yearly_occurrence(target_month, anchor) => Some(amount),
            _ => Some(Decimal::ZERO),
        },
    }
}

/// True when a yearly item anchored on `anchor` fires in the month of `target_month`.
pub fn is_yearly_occurrence(target_month: NaiveDate, anchor: NaiveDate) -> bool {
    target_month.month() == anchor.month() && target_month.year() >= anchor.year()
}

/// Number of occurrences from `start` to `end`, both inclusive.
pub fn occurrence_count(start: NaiveDate, end: NaiveDate, frequency: Frequency) -> u32 {
    if start > end {
        return 0;
    }

    if frequency == Frequency::Once {
        return 1;
    }

    let mut count: u32 = 0;
    while let Some(date) = nth_occurrence(start, frequency, count) {
        if date > end {
            break;
        }
        count += 1;
    }
    count
}

/// Date of the `n`-th occurrence (0-based) counted from `start`.
///
/// Each occurrence is computed from `start` rather than from the previous one,
/// so a series starting on the 31st keeps returning to the 31st after short months.
pub fn nth_occurrence(start: NaiveDate, frequency: Frequency, n: u32) -> Option<NaiveDate> {
    match frequency {
        Frequency::Once => (n == 0).then_some(start),
        Frequency::Daily => start.checked_add_signed(Duration::days(i64::from(n))),
        Frequency::Weekly => start.checked_add_signed(Duration::weeks(i64::from(n))),
        Frequency::Monthly => add_months(start, n),
        Frequency::Yearly => add_years(start, n),
    }
}

/// What the entry form shows under the amount field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AmountPreview {
    /// Amount missing, zero or negative.
    Zero,
    /// One-time item: the amount itself is the total.
    Single { amount: Decimal },
    /// Recurring item without a usable window.
    PerOccurrence { amount: Decimal },
    /// Recurring item with both bounds known.
    Period {
        total: Decimal,
        occurrences: u32,
        amount: Decimal,
    },
}

impl AmountPreview {
    pub fn compute(
        amount: Decimal,
        frequency: Frequency,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Self {
        if amount <= Decimal::ZERO {
            return AmountPreview::Zero;
        }

        if frequency == Frequency::Once {
            return AmountPreview::Single { amount };
        }

        let window = parse_optional_date(start_date)
            .and_then(|start| parse_optional_date(end_date).map(|end| (start, end)));

        match window {
            Ok((Some(start), Some(end))) => {
                let occurrences = occurrence_count(start, end, frequency);
                match amount.checked_mul(Decimal::from(occurrences)) {
                    Some(total) => AmountPreview::Period {
                        total,
                        occurrences,
                        amount,
                    },
                    None => AmountPreview::PerOccurrence { amount },
                }
            }
            _ => AmountPreview::PerOccurrence { amount },
        }
    }

    pub fn total(&self) -> Option<Decimal> {
        match self {
            AmountPreview::Zero => Some(Decimal::ZERO),
            AmountPreview::Single { amount } => Some(*amount),
            AmountPreview::PerOccurrence { .. } => None,
            AmountPreview::Period { total, .. } => Some(*total),
        }
    }
}

impl fmt::Display for AmountPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountPreview::Zero => write!(f, "Total amount: 0.00"),
            AmountPreview::Single { amount } => write!(f, "Total amount: {:.2}", amount),
            AmountPreview::PerOccurrence { amount } => {
                write!(f, "Amount per occurrence: {:.2}", amount)
            }
            AmountPreview::Period {
                total,
                occurrences,
                amount,
            } => write!(
                f,
                "Total over period: {:.2} ({} x {:.2})",
                total, occurrences, amount
            ),
        }
    }
}
