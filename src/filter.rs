use crate::ingestion::RecurringItem;
use crate::schema::Frequency;
use crate::utils::{first_day_of_month, last_day_of_month};
use chrono::{Datelike, NaiveDate};

/// Whether `item` is in effect during the month containing `target_month`.
///
/// Yearly items only start in the calendar month of their start date, so a
/// yearly item is not active in the other eleven months of its window.
pub fn is_active_for_month(item: &RecurringItem, target_month: NaiveDate) -> bool {
    if !item.is_active || !item.is_well_formed() || !item.frequency.is_recurring() {
        return false;
    }

    window_contains_month(
        item.frequency,
        item.start_date,
        item.end_date,
        target_month,
    )
}

pub fn window_contains_month(
    frequency: Frequency,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    target_month: NaiveDate,
) -> bool {
    let start_check = match (frequency, start_date) {
        (_, None) => true,
        (Frequency::Yearly, Some(start)) => {
            start.month() == target_month.month() && start.year() <= target_month.year()
        }
        (_, Some(start)) => start <= last_day_of_month(target_month),
    };

    let end_check = match end_date {
        None => true,
        Some(end) => end >= first_day_of_month(target_month),
    };

    start_check && end_check
}
