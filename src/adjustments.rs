use crate::ingestion::BalanceAdjustment;
use crate::schema::AccountId;
use crate::utils::month_key;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Manual balance corrections of one account, one per calendar month.
#[derive(Debug, Clone, Default)]
pub struct AdjustmentIndex {
    by_month: BTreeMap<(i32, u32), Decimal>,
}

impl AdjustmentIndex {
    /// Indexes the active adjustments of `account_id`.
    ///
    /// When several adjustments land in the same month, the one with the latest
    /// date wins; on equal dates the one listed last wins.
    pub fn for_account(adjustments: &[BalanceAdjustment], account_id: AccountId) -> Self {
        let mut relevant: Vec<&BalanceAdjustment> = adjustments
            .iter()
            .filter(|a| a.account_id == account_id && a.is_active)
            .collect();
        // Stable sort keeps input order among equal dates.
        relevant.sort_by_key(|a| a.adjustment_date);

        let mut by_month = BTreeMap::new();
        for adjustment in relevant {
            let key = month_key(adjustment.adjustment_date);
            if let Some(previous) = by_month.insert(key, adjustment.actual_balance) {
                debug!(
                    "Account {}: adjustment {} replaces balance {} for {}-{:02}",
                    account_id, adjustment.id, previous, key.0, key.1
                );
            }
        }

        Self { by_month }
    }

    pub fn balance_for(&self, month: NaiveDate) -> Option<Decimal> {
        self.by_month.get(&month_key(month)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_month.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_month.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjustment(id: u64, account_id: AccountId, date: NaiveDate, balance: i64) -> BalanceAdjustment {
        BalanceAdjustment {
            id,
            account_id,
            adjustment_date: date,
            actual_balance: Decimal::from(balance),
            description: None,
            is_active: true,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_lookup_is_month_granular() {
        let adjustments = vec![adjustment(1, 1, date(2024, 5, 17), 4000)];
        let index = AdjustmentIndex::for_account(&adjustments, 1);

        assert_eq!(index.balance_for(date(2024, 5, 1)), Some(Decimal::from(4000)));
        assert_eq!(index.balance_for(date(2024, 5, 31)), Some(Decimal::from(4000)));
        assert_eq!(index.balance_for(date(2024, 6, 1)), None);
        assert_eq!(index.balance_for(date(2023, 5, 1)), None);
    }

    #[test]
    fn test_filters_other_accounts_and_inactive() {
        let mut disabled = adjustment(2, 1, date(2024, 7, 1), 10);
        disabled.is_active = false;
        let adjustments = vec![
            adjustment(1, 2, date(2024, 5, 1), 4000),
            disabled,
        ];

        let index = AdjustmentIndex::for_account(&adjustments, 1);
        assert!(index.is_empty());
        assert_eq!(AdjustmentIndex::for_account(&adjustments, 2).len(), 1);
    }

    #[test]
    fn test_latest_adjustment_in_month_wins() {
        let adjustments = vec![
            adjustment(1, 1, date(2024, 5, 20), 2000),
            adjustment(2, 1, date(2024, 5, 3), 1000),
            adjustment(3, 1, date(2024, 5, 20), 3000),
        ];

        let index = AdjustmentIndex::for_account(&adjustments, 1);
        assert_eq!(index.len(), 1);
        assert_eq!(index.balance_for(date(2024, 5, 1)), Some(Decimal::from(3000)));
    }
}
