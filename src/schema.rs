use crate::error::{ForecastError, Result};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub type AccountId = u64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[schemars(description = "A single, non-recurring occurrence on the item's date")]
    Once,
    #[schemars(description = "Every day between the start and end dates")]
    Daily,
    #[schemars(description = "Every week between the start and end dates")]
    Weekly,
    #[schemars(description = "Once per month between the start and end dates")]
    Monthly,
    #[schemars(description = "Once per year, in the calendar month of the item's date")]
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Once => "once",
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frequency::Once => "One-time",
            Frequency::Daily => "Daily",
            Frequency::Weekly => "Weekly",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Frequency::Once)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(Frequency::Once),
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(ForecastError::UnknownFrequency(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    #[default]
    Current,
    Savings,
    Investment,
}

impl AccountKind {
    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Current => "Current",
            AccountKind::Savings => "Savings",
            AccountKind::Investment => "Investment",
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AccountRecord {
    pub id: AccountId,

    #[schemars(description = "Display name of the account (e.g., 'Main checking')")]
    pub name: String,

    #[serde(default)]
    #[schemars(description = "Name of the bank holding the account, used to group the overview")]
    pub bank: Option<String>,

    #[serde(default)]
    pub kind: AccountKind,

    #[schemars(description = "Balance of the account today. Can be negative.")]
    pub current_balance: Decimal,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    #[schemars(
        description = "YYYY-MM-DD. While this date is in the future, the account is blocked for new transactions."
    )]
    pub blocked_at: Option<String>,
}

/// A stored income or expense. Dates stay as raw strings so a single bad
/// value only disables its own item during projection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ItemRecord {
    pub id: u64,

    pub account_id: AccountId,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[schemars(description = "Amount of a single occurrence, as entered by the user")]
    pub amount: Decimal,

    #[serde(default)]
    #[schemars(
        description = "YYYY-MM-DD date the item was entered on. Yearly items recur in this calendar month."
    )]
    pub date: Option<String>,

    #[schemars(description = "One of: once, daily, weekly, monthly, yearly")]
    pub frequency: String,

    #[serde(default)]
    #[schemars(description = "YYYY-MM-DD first day the item is in effect. Null means no lower bound.")]
    pub start_date: Option<String>,

    #[serde(default)]
    #[schemars(description = "YYYY-MM-DD last day the item is in effect. Null means open-ended.")]
    pub end_date: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransferRecord {
    pub id: u64,

    #[schemars(description = "Account the money leaves")]
    pub from_account_id: AccountId,

    #[schemars(description = "Account the money arrives on")]
    pub to_account_id: AccountId,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    pub amount: Decimal,

    #[serde(default)]
    pub date: Option<String>,

    pub frequency: String,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BalanceAdjustmentRecord {
    pub id: u64,

    pub account_id: AccountId,

    #[schemars(
        description = "YYYY-MM-DD. Only the year and month matter: the adjustment replaces the projected balance for that month."
    )]
    pub adjustment_date: String,

    #[schemars(description = "The balance observed on the account for that month")]
    pub actual_balance: Decimal,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Point-in-time read of everything the projection needs, as handed over by
/// the storage layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FinanceSnapshot {
    #[serde(default)]
    pub accounts: Vec<AccountRecord>,

    #[serde(default)]
    pub incomes: Vec<ItemRecord>,

    #[serde(default)]
    pub expenses: Vec<ItemRecord>,

    #[serde(default)]
    pub transfers: Vec<TransferRecord>,

    #[serde(default)]
    pub balance_adjustments: Vec<BalanceAdjustmentRecord>,
}

impl FinanceSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FinanceSnapshot)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
