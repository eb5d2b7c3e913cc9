use crate::schema::{
    AccountId, AccountKind, AccountRecord, BalanceAdjustmentRecord, FinanceSnapshot, Frequency,
    ItemRecord, TransferRecord,
};
use crate::utils::{parse_date, parse_optional_date};
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub bank: Option<String>,
    pub kind: AccountKind,
    pub current_balance: Decimal,
    pub is_active: bool,
    pub blocked_at: Option<NaiveDate>,
}

impl Account {
    pub fn is_blocked(&self, as_of: NaiveDate) -> bool {
        self.blocked_at.is_some_and(|blocked| blocked > as_of)
    }

    pub fn is_available_for_transactions(&self, as_of: NaiveDate) -> bool {
        self.is_active && !self.is_blocked(as_of)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Income,
    Expense,
    TransferIn,
    TransferOut,
}

impl ItemKind {
    /// +1 for money arriving on the account, -1 for money leaving it.
    pub fn sign(&self) -> Decimal {
        match self {
            ItemKind::Income | ItemKind::TransferIn => Decimal::ONE,
            ItemKind::Expense | ItemKind::TransferOut => Decimal::NEGATIVE_ONE,
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, ItemKind::TransferIn | ItemKind::TransferOut)
    }
}

/// One income, one expense, or one leg of a transfer, seen from a single account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringItem {
    pub id: u64,
    pub name: String,
    pub kind: ItemKind,
    pub account_id: AccountId,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub anchor_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    /// Why the stored record could not be read; such items never contribute.
    pub defect: Option<String>,
}

impl RecurringItem {
    pub fn is_well_formed(&self) -> bool {
        self.defect.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceAdjustment {
    pub id: u64,
    pub account_id: AccountId,
    pub adjustment_date: NaiveDate,
    pub actual_balance: Decimal,
    pub description: Option<String>,
    pub is_active: bool,
}

/// Normalised, read-only view of a [`FinanceSnapshot`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionInput {
    pub accounts: Vec<Account>,
    pub items: Vec<RecurringItem>,
    pub adjustments: Vec<BalanceAdjustment>,
}

impl ProjectionInput {
    pub fn from_snapshot(snapshot: &FinanceSnapshot) -> Self {
        convert_snapshot(snapshot)
    }

    pub fn items_for_account(&self, account_id: AccountId) -> impl Iterator<Item = &RecurringItem> {
        self.items
            .iter()
            .filter(move |item| item.account_id == account_id)
    }
}

pub fn convert_snapshot(snapshot: &FinanceSnapshot) -> ProjectionInput {
    let accounts = snapshot.accounts.iter().map(convert_account).collect();

    let mut items = Vec::with_capacity(
        snapshot.incomes.len() + snapshot.expenses.len() + snapshot.transfers.len() * 2,
    );
    items.extend(
        snapshot
            .incomes
            .iter()
            .map(|record| convert_item(record, ItemKind::Income)),
    );
    items.extend(
        snapshot
            .expenses
            .iter()
            .map(|record| convert_item(record, ItemKind::Expense)),
    );
    for transfer in &snapshot.transfers {
        let (outgoing, incoming) = split_transfer(transfer);
        items.push(outgoing);
        items.push(incoming);
    }

    let adjustments = snapshot
        .balance_adjustments
        .iter()
        .filter_map(convert_adjustment)
        .collect();

    ProjectionInput {
        accounts,
        items,
        adjustments,
    }
}

fn convert_account(record: &AccountRecord) -> Account {
    let blocked_at = match parse_optional_date(record.blocked_at.as_deref()) {
        Ok(date) => date,
        Err(e) => {
            debug!(
                "Ignoring blocked_at of account '{}' ({}): {}",
                record.name, record.id, e
            );
            None
        }
    };

    Account {
        id: record.id,
        name: record.name.clone(),
        bank: record.bank.clone(),
        kind: record.kind,
        current_balance: record.current_balance,
        is_active: record.is_active,
        blocked_at,
    }
}

/// Fields shared by incomes, expenses and transfers, before the account is known.
struct ScheduleFields {
    frequency: Frequency,
    anchor_date: Option<NaiveDate>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    defect: Option<String>,
}

fn parse_schedule(
    frequency: &str,
    date: Option<&str>,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> ScheduleFields {
    let mut defects = Vec::new();

    let frequency = frequency.parse::<Frequency>().unwrap_or_else(|e| {
        defects.push(e.to_string());
        Frequency::Once
    });

    let mut read = |raw: Option<&str>, field: &str| match parse_optional_date(raw) {
        Ok(date) => date,
        Err(e) => {
            defects.push(format!("{}: {}", field, e));
            None
        }
    };

    let anchor_date = read(date, "date");
    let start_date = read(start_date, "start_date");
    let end_date = read(end_date, "end_date");

    ScheduleFields {
        frequency,
        anchor_date,
        start_date,
        end_date,
        defect: (!defects.is_empty()).then(|| defects.join("; ")),
    }
}

fn convert_item(record: &ItemRecord, kind: ItemKind) -> RecurringItem {
    let schedule = parse_schedule(
        &record.frequency,
        record.date.as_deref(),
        record.start_date.as_deref(),
        record.end_date.as_deref(),
    );

    if let Some(defect) = &schedule.defect {
        debug!(
            "{:?} '{}' ({}) will not contribute to projections: {}",
            kind, record.name, record.id, defect
        );
    }

    RecurringItem {
        id: record.id,
        name: record.name.clone(),
        kind,
        account_id: record.account_id,
        amount: record.amount,
        frequency: schedule.frequency,
        anchor_date: schedule.anchor_date,
        start_date: schedule.start_date,
        end_date: schedule.end_date,
        is_active: record.is_active,
        defect: schedule.defect,
    }
}

/// Splits a transfer into its outgoing leg (source account) and incoming leg
/// (destination account).
fn split_transfer(record: &TransferRecord) -> (RecurringItem, RecurringItem) {
    let schedule = parse_schedule(
        &record.frequency,
        record.date.as_deref(),
        record.start_date.as_deref(),
        record.end_date.as_deref(),
    );

    if let Some(defect) = &schedule.defect {
        debug!(
            "Transfer '{}' ({}) will not contribute to projections: {}",
            record.name, record.id, defect
        );
    }

    let outgoing = RecurringItem {
        id: record.id,
        name: record.name.clone(),
        kind: ItemKind::TransferOut,
        account_id: record.from_account_id,
        amount: record.amount,
        frequency: schedule.frequency,
        anchor_date: schedule.anchor_date,
        start_date: schedule.start_date,
        end_date: schedule.end_date,
        is_active: record.is_active,
        defect: schedule.defect,
    };

    let incoming = RecurringItem {
        kind: ItemKind::TransferIn,
        account_id: record.to_account_id,
        ..outgoing.clone()
    };

    (outgoing, incoming)
}

fn convert_adjustment(record: &BalanceAdjustmentRecord) -> Option<BalanceAdjustment> {
    match parse_date(&record.adjustment_date) {
        Ok(adjustment_date) => Some(BalanceAdjustment {
            id: record.id,
            account_id: record.account_id,
            adjustment_date,
            actual_balance: record.actual_balance,
            description: record.description.clone(),
            is_active: record.is_active,
        }),
        Err(e) => {
            debug!(
                "Skipping balance adjustment {} on account {}: {}",
                record.id, record.account_id, e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_record(frequency: &str, start: Option<&str>, end: Option<&str>) -> ItemRecord {
        ItemRecord {
            id: 1,
            account_id: 10,
            name: "Salary".to_string(),
            description: None,
            amount: Decimal::from(2500),
            date: Some("2024-01-25".to_string()),
            frequency: frequency.to_string(),
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
            category: None,
            is_active: true,
        }
    }

    #[test]
    fn test_item_conversion() {
        let record = item_record("monthly", Some("2024-02-01"), None);
        let item = convert_item(&record, ItemKind::Income);

        assert!(item.is_well_formed());
        assert_eq!(item.frequency, Frequency::Monthly);
        assert_eq!(item.anchor_date, NaiveDate::from_ymd_opt(2024, 1, 25));
        assert_eq!(item.start_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(item.end_date, None);
        assert_eq!(item.kind.sign(), Decimal::ONE);
    }

    #[test]
    fn test_malformed_dates_are_flagged_not_fatal() {
        let record = item_record("monthly", Some("first of may"), Some("2024-13-01"));
        let item = convert_item(&record, ItemKind::Expense);

        assert!(!item.is_well_formed());
        let defect = item.defect.unwrap();
        assert!(defect.contains("start_date"));
        assert!(defect.contains("end_date"));
    }

    #[test]
    fn test_unknown_frequency_is_flagged() {
        let record = item_record("fortnightly", None, None);
        let item = convert_item(&record, ItemKind::Income);
        assert!(!item.is_well_formed());
        assert!(item.defect.unwrap().contains("fortnightly"));
    }

    #[test]
    fn test_transfer_split_into_two_legs() {
        let record = TransferRecord {
            id: 3,
            from_account_id: 1,
            to_account_id: 2,
            name: "Savings".to_string(),
            description: None,
            amount: Decimal::from(150),
            date: Some("2024-01-01".to_string()),
            frequency: "monthly".to_string(),
            start_date: None,
            end_date: None,
            is_active: true,
        };

        let (outgoing, incoming) = split_transfer(&record);
        assert_eq!(outgoing.kind, ItemKind::TransferOut);
        assert_eq!(outgoing.account_id, 1);
        assert_eq!(outgoing.kind.sign(), Decimal::NEGATIVE_ONE);
        assert_eq!(incoming.kind, ItemKind::TransferIn);
        assert_eq!(incoming.account_id, 2);
        assert_eq!(incoming.amount, outgoing.amount);
        assert!(incoming.kind.is_transfer());
    }

    #[test]
    fn test_snapshot_conversion_skips_bad_adjustments() {
        let snapshot = FinanceSnapshot {
            accounts: vec![AccountRecord {
                id: 10,
                name: "Checking".to_string(),
                bank: Some("First Bank".to_string()),
                kind: AccountKind::Current,
                current_balance: Decimal::from(1000),
                is_active: true,
                blocked_at: Some("garbage".to_string()),
            }],
            incomes: vec![item_record("monthly", None, None)],
            expenses: vec![],
            transfers: vec![],
            balance_adjustments: vec![
                BalanceAdjustmentRecord {
                    id: 1,
                    account_id: 10,
                    adjustment_date: "2024-05-01".to_string(),
                    actual_balance: Decimal::from(4000),
                    description: None,
                    is_active: true,
                },
                BalanceAdjustmentRecord {
                    id: 2,
                    account_id: 10,
                    adjustment_date: "May 2024".to_string(),
                    actual_balance: Decimal::from(9000),
                    description: None,
                    is_active: true,
                },
            ],
        };

        let input = ProjectionInput::from_snapshot(&snapshot);
        assert_eq!(input.accounts.len(), 1);
        assert_eq!(input.accounts[0].blocked_at, None);
        assert_eq!(input.items.len(), 1);
        assert_eq!(input.adjustments.len(), 1);
        assert_eq!(input.adjustments[0].actual_balance, Decimal::from(4000));
        assert_eq!(input.items_for_account(10).count(), 1);
        assert_eq!(input.items_for_account(11).count(), 0);
    }

    #[test]
    fn test_blocked_account() {
        let account = Account {
            id: 1,
            name: "Locked savings".to_string(),
            bank: None,
            kind: AccountKind::Savings,
            current_balance: Decimal::ZERO,
            is_active: true,
            blocked_at: NaiveDate::from_ymd_opt(2025, 6, 1),
        };

        let before = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(account.is_blocked(before));
        assert!(!account.is_available_for_transactions(before));
        assert!(!account.is_blocked(after));
        assert!(account.is_available_for_transactions(after));
    }
}
