//! Month-over-month explanations of what changed in the recurring incomes or
//! expenses.

use crate::ingestion::RecurringItem;
use crate::occurrence::occurrence_count;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Monthly amount per item name.
pub type ItemAmounts = BTreeMap<String, Decimal>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum NarrativeEntry {
    New {
        name: String,
        amount: Decimal,
    },
    Modified {
        name: String,
        amount: Decimal,
        previous: Decimal,
        delta: Decimal,
    },
    /// Same amount as last month, but the item has a planned end.
    TemporaryUnchanged {
        name: String,
        amount: Decimal,
        end_date: NaiveDate,
        remaining_occurrences: u32,
    },
    Terminated {
        name: String,
    },
}

impl NarrativeEntry {
    pub fn name(&self) -> &str {
        match self {
            NarrativeEntry::New { name, .. }
            | NarrativeEntry::Modified { name, .. }
            | NarrativeEntry::TemporaryUnchanged { name, .. }
            | NarrativeEntry::Terminated { name } => name,
        }
    }
}

impl fmt::Display for NarrativeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarrativeEntry::New { name, amount } => write!(f, "{}: {:.2} (new)", name, amount),
            NarrativeEntry::Modified {
                name, amount, delta, ..
            } => {
                let sign = if delta.is_sign_positive() { "+" } else { "" };
                write!(f, "{}: {:.2} ({}{:.2})", name, amount, sign, delta)
            }
            NarrativeEntry::TemporaryUnchanged {
                name,
                amount,
                end_date,
                remaining_occurrences,
            } => write!(
                f,
                "{}: {:.2} (ends {}, {} remaining)",
                name,
                amount,
                end_date.format("%Y-%m-%d"),
                remaining_occurrences
            ),
            NarrativeEntry::Terminated { name } => write!(f, "{}: ended", name),
        }
    }
}

/// Compares this month's amounts with last month's.
///
/// `items_this_month` are the items in effect for `month`. For an unchanged
/// name, the first of them carrying that name decides: if it has an end date,
/// a temporary-unchanged entry is emitted. Entries for current names come
/// first, in name order, followed by terminated names.
pub fn narrate(
    current: &ItemAmounts,
    previous: &ItemAmounts,
    items_this_month: &[&RecurringItem],
    month: NaiveDate,
    tolerance: Decimal,
) -> Vec<NarrativeEntry> {
    let mut entries = Vec::new();

    for (name, &amount) in current {
        let Some(&before) = previous.get(name) else {
            entries.push(NarrativeEntry::New {
                name: name.clone(),
                amount,
            });
            continue;
        };

        let delta = amount.saturating_sub(before);
        if delta.abs() > tolerance {
            entries.push(NarrativeEntry::Modified {
                name: name.clone(),
                amount,
                previous: before,
                delta,
            });
            continue;
        }

        let first = items_this_month.iter().find(|item| &item.name == name);
        if let Some(item) = first {
            if let Some(end_date) = item.end_date {
                entries.push(NarrativeEntry::TemporaryUnchanged {
                    name: name.clone(),
                    amount,
                    end_date,
                    remaining_occurrences: occurrence_count(month, end_date, item.frequency),
                });
            }
        }
    }

    for name in previous.keys() {
        if !current.contains_key(name) {
            entries.push(NarrativeEntry::Terminated { name: name.clone() });
        }
    }

    entries
}

/// Carries the previous month's amounts through a single pass over the horizon.
#[derive(Debug, Clone, Default)]
pub struct NarrativeFold {
    previous: ItemAmounts,
    tolerance: Decimal,
}

impl NarrativeFold {
    pub fn new(tolerance: Decimal) -> Self {
        Self {
            previous: ItemAmounts::new(),
            tolerance,
        }
    }

    /// Narrates `current` against the last month seen, then remembers it.
    pub fn advance(
        &mut self,
        current: ItemAmounts,
        items_this_month: &[&RecurringItem],
        month: NaiveDate,
    ) -> Vec<NarrativeEntry> {
        let entries = narrate(
            &current,
            &self.previous,
            items_this_month,
            month,
            self.tolerance,
        );
        self.previous = current;
        entries
    }
}
