use crate::adjustments::AdjustmentIndex;
use crate::config::ProjectionOptions;
use crate::filter::is_active_for_month;
use crate::ingestion::{Account, ItemKind, ProjectionInput, RecurringItem};
use crate::narrator::{ItemAmounts, NarrativeEntry, NarrativeFold};
use crate::occurrence::checked_monthly_contribution;
use crate::schema::AccountId;
use crate::utils::{month_label, month_starts};
use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceOrigin {
    /// The account's balance today, used as is for the first month.
    Current,
    /// Taken from a manual balance adjustment for that month.
    Adjusted,
    /// Previous month's balance plus this month's recurring flows.
    Projected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedMonth {
    pub index: usize,
    pub month_start: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountTrajectory {
    pub account_id: AccountId,
    pub name: String,
    /// One balance per projected month, rounded to cents.
    pub balances: Vec<Decimal>,
    pub origins: Vec<BalanceOrigin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProjection {
    pub as_of: NaiveDate,
    pub months: Vec<ProjectedMonth>,
    pub accounts: Vec<AccountTrajectory>,
    /// Sum of all account balances per month.
    pub total_balances: Vec<Decimal>,
    pub income: Vec<Decimal>,
    pub expenses: Vec<Decimal>,
    /// Only months with at least one change are present.
    pub income_changes: BTreeMap<usize, Vec<NarrativeEntry>>,
    pub expense_changes: BTreeMap<usize, Vec<NarrativeEntry>>,
}

impl MonthlyProjection {
    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.months.iter().map(|m| m.label.as_str()).collect()
    }

    pub fn account(&self, account_id: AccountId) -> Option<&AccountTrajectory> {
        self.accounts.iter().find(|a| a.account_id == account_id)
    }

    /// Income minus expenses for each month.
    pub fn net_flow(&self) -> Vec<Decimal> {
        self.income
            .iter()
            .zip(&self.expenses)
            .map(|(income, expense)| income - expense)
            .collect()
    }
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Adds up `values`, leaving out any term that would overflow the running sum.
pub fn sum_money(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, |sum, value| {
        sum.checked_add(value).unwrap_or_else(|| {
            debug!("Leaving {} out of a sum of {}: the total would overflow", value, sum);
            sum
        })
    })
}

/// Projects recurring flows forward from the month containing `as_of`.
pub struct Projector {
    as_of: NaiveDate,
    options: ProjectionOptions,
}

impl Projector {
    pub fn new(as_of: NaiveDate, options: ProjectionOptions) -> Self {
        Self { as_of, options }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn options(&self) -> &ProjectionOptions {
        &self.options
    }

    pub fn project(&self, input: &ProjectionInput) -> MonthlyProjection {
        self.project_with_horizon(input, self.options.horizon_months)
    }

    pub fn project_with_horizon(
        &self,
        input: &ProjectionInput,
        horizon_months: i64,
    ) -> MonthlyProjection {
        let months = month_starts(self.as_of, horizon_months);

        info!(
            "Projecting {} months from {} for {} accounts and {} recurring items",
            months.len(),
            self.as_of,
            input.accounts.len(),
            input.items.len()
        );

        let accounts: Vec<AccountTrajectory> = input
            .accounts
            .iter()
            .filter(|account| account.is_active)
            .map(|account| {
                let items: Vec<&RecurringItem> = input
                    .items_for_account(account.id)
                    .filter(|item| item.is_active && item.frequency.is_recurring())
                    .collect();
                let adjustments = AdjustmentIndex::for_account(&input.adjustments, account.id);
                self.project_account(account, &items, &adjustments, &months)
            })
            .collect();

        let total_balances = (0..months.len())
            .map(|i| round_money(sum_money(accounts.iter().map(|a| a.balances[i]))))
            .collect();

        let (income, income_changes) = self.flow_series(&input.items, ItemKind::Income, &months);
        let (expenses, expense_changes) =
            self.flow_series(&input.items, ItemKind::Expense, &months);

        MonthlyProjection {
            as_of: self.as_of,
            months: months
                .iter()
                .enumerate()
                .map(|(index, &month_start)| ProjectedMonth {
                    index,
                    month_start,
                    label: month_label(month_start),
                })
                .collect(),
            accounts,
            total_balances,
            income,
            expenses,
            income_changes,
            expense_changes,
        }
    }

    /// Balance trajectory of one account. Only touches its own arguments, so
    /// accounts can be projected independently.
    pub fn project_account(
        &self,
        account: &Account,
        items: &[&RecurringItem],
        adjustments: &AdjustmentIndex,
        months: &[NaiveDate],
    ) -> AccountTrajectory {
        debug!(
            "Account '{}' ({}): starting balance {}, {} recurring items, {} adjustments",
            account.name,
            account.id,
            account.current_balance,
            items.len(),
            adjustments.len()
        );

        let mut balance = account.current_balance;
        let mut balances = Vec::with_capacity(months.len());
        let mut origins = Vec::with_capacity(months.len());

        for (i, &month) in months.iter().enumerate() {
            let origin = if let Some(actual) = adjustments.balance_for(month) {
                balance = actual;
                BalanceOrigin::Adjusted
            } else if i == 0 {
                BalanceOrigin::Current
            } else {
                for item in items {
                    let flow = item.kind.sign() * self.contribution(item, month);
                    match balance.checked_add(flow) {
                        Some(next) => balance = next,
                        None => debug!(
                            "Account '{}' ({}): leaving '{}' out of {}, the balance would overflow",
                            account.name, account.id, item.name, month
                        ),
                    }
                }
                BalanceOrigin::Projected
            };

            balances.push(round_money(balance));
            origins.push(origin);
        }

        AccountTrajectory {
            account_id: account.id,
            name: account.name.clone(),
            balances,
            origins,
        }
    }

    /// What `item` moves during `month`. Zero when it is not in effect, or
    /// when its amount is too large to scale to a month.
    pub fn contribution(&self, item: &RecurringItem, month: NaiveDate) -> Decimal {
        if !is_active_for_month(item, month) {
            return Decimal::ZERO;
        }

        checked_monthly_contribution(
            item.amount,
            item.frequency,
            month,
            item.anchor_date,
            self.options.weekly_factor,
        )
        .unwrap_or_else(|| {
            debug!(
                "{:?} '{}' ({}): amount {} overflows as a {} item in {}, counted as zero",
                item.kind, item.name, item.id, item.amount, item.frequency, month
            );
            Decimal::ZERO
        })
    }

    /// Account-agnostic monthly totals of one kind, plus the change narratives
    /// between consecutive months.
    fn flow_series(
        &self,
        items: &[RecurringItem],
        kind: ItemKind,
        months: &[NaiveDate],
    ) -> (Vec<Decimal>, BTreeMap<usize, Vec<NarrativeEntry>>) {
        let candidates: Vec<&RecurringItem> = items.iter().filter(|i| i.kind == kind).collect();

        let mut totals = Vec::with_capacity(months.len());
        let mut changes = BTreeMap::new();
        let mut fold = NarrativeFold::new(self.options.change_tolerance);

        for (i, &month) in months.iter().enumerate() {
            let in_effect: Vec<&RecurringItem> = candidates
                .iter()
                .copied()
                .filter(|item| is_active_for_month(item, month))
                .collect();

            let mut current = ItemAmounts::new();
            let mut total = Decimal::ZERO;
            for item in &in_effect {
                let amount = self.contribution(item, month);
                if amount.is_zero() {
                    continue;
                }
                let per_name = current.get(&item.name).copied().unwrap_or(Decimal::ZERO);
                match (total.checked_add(amount), per_name.checked_add(amount)) {
                    (Some(new_total), Some(new_per_name)) => {
                        total = new_total;
                        current.insert(item.name.clone(), new_per_name);
                    }
                    _ => debug!(
                        "{:?} '{}' ({}): leaving {} out of {}, the monthly total would overflow",
                        kind, item.name, item.id, amount, month
                    ),
                }
            }

            totals.push(round_money(total));

            let entries = fold.advance(current, &in_effect, month);
            if !entries.is_empty() {
                changes.insert(i, entries);
            }
        }

        (totals, changes)
    }
}
