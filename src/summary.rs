use crate::ingestion::{Account, ItemKind, ProjectionInput};
use crate::projector::{round_money, sum_money};
use crate::schema::{AccountId, AccountKind, Frequency};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Headline numbers for the dashboard.
///
/// Monthly income and expenses only count active items with a monthly
/// frequency, without any window check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStats {
    pub total_balance: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub net_monthly: Decimal,
}

impl FinancialStats {
    pub fn from_input(input: &ProjectionInput) -> Self {
        let total_balance = sum_money(
            input
                .accounts
                .iter()
                .filter(|a| a.is_active)
                .map(|a| a.current_balance),
        );

        let monthly_sum = |kind: ItemKind| -> Decimal {
            sum_money(
                input
                    .items
                    .iter()
                    .filter(|i| i.kind == kind && i.is_active && i.frequency == Frequency::Monthly)
                    .map(|i| i.amount),
            )
        };

        let monthly_income = monthly_sum(ItemKind::Income);
        let monthly_expenses = monthly_sum(ItemKind::Expense);

        Self {
            total_balance: round_money(total_balance),
            monthly_income: round_money(monthly_income),
            monthly_expenses: round_money(monthly_expenses),
            net_monthly: round_money(monthly_income.saturating_sub(monthly_expenses)),
        }
    }

    pub fn is_surplus(&self) -> bool {
        self.net_monthly >= Decimal::ZERO
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRow {
    pub account_id: AccountId,
    pub name: String,
    pub kind: AccountKind,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankGroup {
    /// `None` for accounts without a bank.
    pub bank: Option<String>,
    pub accounts: Vec<AccountRow>,
    pub total: Decimal,
}

/// Active accounts grouped by bank. Banks keep the order in which they first
/// appear in the input; accounts are sorted by name inside each bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountOverview {
    pub groups: Vec<BankGroup>,
}

impl AccountOverview {
    pub fn from_accounts(accounts: &[Account]) -> Self {
        let mut groups: Vec<BankGroup> = Vec::new();

        for account in accounts.iter().filter(|a| a.is_active) {
            let row = AccountRow {
                account_id: account.id,
                name: account.name.clone(),
                kind: account.kind,
                balance: account.current_balance,
            };

            match groups.iter_mut().find(|g| g.bank == account.bank) {
                Some(group) => group.accounts.push(row),
                None => groups.push(BankGroup {
                    bank: account.bank.clone(),
                    accounts: vec![row],
                    total: Decimal::ZERO,
                }),
            }
        }

        for group in &mut groups {
            group.accounts.sort_by(|a, b| a.name.cmp(&b.name));
            group.total = round_money(sum_money(group.accounts.iter().map(|a| a.balance)));
        }

        Self { groups }
    }
}
