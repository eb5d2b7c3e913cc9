//! # Finance Forecaster
//!
//! A library for projecting personal finances forward month by month from a
//! snapshot of bank accounts, recurring incomes, expenses, transfers and manual
//! balance adjustments.
//!
//! ## Core Concepts
//!
//! - **Recurring item**: an income, an expense, or one leg of a transfer, with a
//!   frequency (once, daily, weekly, monthly, yearly) and an optional active window
//! - **Contribution**: the money an item moves in a given month
//! - **Adjustment**: a balance observed for an account in a given month. It replaces
//!   the projected balance and becomes the base for the following months
//! - **Change narrative**: what was added, changed, is about to end, or ended
//!   compared with the previous month
//!
//! Projections are anchored on an explicit `as_of` date, never on the system
//! clock, so the same snapshot and date always give the same result.
//!
//! ## Example
//!
//! ```rust,ignore
//! use chrono::NaiveDate;
//! use finance_forecaster::*;
//!
//! let snapshot = FinanceSnapshot::from_json(&std::fs::read_to_string("snapshot.json")?)?;
//! let as_of = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
//!
//! let projection = project_finances(&snapshot, as_of, &ProjectionOptions::with_horizon(12))?;
//! for (label, total) in projection.labels().iter().zip(&projection.total_balances) {
//!     println!("{label}: {total}");
//! }
//! ```

pub mod adjustments;
pub mod config;
pub mod error;
pub mod filter;
pub mod ingestion;
pub mod narrator;
pub mod occurrence;
pub mod projector;
pub mod schema;
pub mod summary;
pub mod utils;

pub use adjustments::AdjustmentIndex;
pub use config::{HorizonPreset, ProjectionOptions};
pub use error::{ForecastError, Result};
pub use filter::is_active_for_month;
pub use ingestion::{
    convert_snapshot, Account, BalanceAdjustment, ItemKind, ProjectionInput, RecurringItem,
};
pub use narrator::{narrate, NarrativeEntry, NarrativeFold};
pub use occurrence::{monthly_contribution, occurrence_count, AmountPreview};
pub use projector::{
    AccountTrajectory, BalanceOrigin, MonthlyProjection, ProjectedMonth, Projector,
};
pub use schema::*;
pub use summary::{AccountOverview, FinancialStats};

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Everything the dashboard shows, computed from one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub stats: FinancialStats,
    pub overview: AccountOverview,
    pub projection: MonthlyProjection,
}

pub struct ForecastEngine;

impl ForecastEngine {
    pub fn project(
        snapshot: &FinanceSnapshot,
        as_of: NaiveDate,
        options: &ProjectionOptions,
    ) -> Result<MonthlyProjection> {
        options.validate()?;

        let input = ProjectionInput::from_snapshot(snapshot);
        log_defects(&input);

        Ok(Projector::new(as_of, options.clone()).project(&input))
    }

    pub fn report(
        snapshot: &FinanceSnapshot,
        as_of: NaiveDate,
        options: &ProjectionOptions,
    ) -> Result<ForecastReport> {
        options.validate()?;

        let input = ProjectionInput::from_snapshot(snapshot);
        log_defects(&input);

        info!(
            "Building forecast report as of {} over {} months",
            as_of, options.horizon_months
        );

        Ok(ForecastReport {
            stats: FinancialStats::from_input(&input),
            overview: AccountOverview::from_accounts(&input.accounts),
            projection: Projector::new(as_of, options.clone()).project(&input),
        })
    }
}

pub fn project_finances(
    snapshot: &FinanceSnapshot,
    as_of: NaiveDate,
    options: &ProjectionOptions,
) -> Result<MonthlyProjection> {
    ForecastEngine::project(snapshot, as_of, options)
}

pub fn forecast_report(
    snapshot: &FinanceSnapshot,
    as_of: NaiveDate,
    options: &ProjectionOptions,
) -> Result<ForecastReport> {
    ForecastEngine::report(snapshot, as_of, options)
}

fn log_defects(input: &ProjectionInput) {
    let defective = input.items.iter().filter(|i| !i.is_well_formed()).count();
    if defective > 0 {
        debug!(
            "{} of {} recurring items have unreadable schedules and will count as zero",
            defective,
            input.items.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn snapshot() -> FinanceSnapshot {
        FinanceSnapshot::from_json(
            r#"{
                "accounts": [
                    { "id": 1, "name": "Checking", "bank": "First Bank", "current_balance": 1000 }
                ],
                "expenses": [
                    {
                        "id": 1,
                        "account_id": 1,
                        "name": "Rent",
                        "amount": 200,
                        "date": "2024-01-01",
                        "frequency": "monthly",
                        "start_date": "2024-01-01"
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_projection() {
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let projection =
            project_finances(&snapshot(), as_of, &ProjectionOptions::with_horizon(3)).unwrap();

        let balances = &projection.account(1).unwrap().balances;
        assert_eq!(
            balances,
            &vec![Decimal::from(1000), Decimal::from(800), Decimal::from(600)]
        );
        assert_eq!(projection.expenses, vec![Decimal::from(200); 3]);
    }

    #[test]
    fn test_report() {
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let report =
            forecast_report(&snapshot(), as_of, &ProjectionOptions::with_horizon(12)).unwrap();

        assert_eq!(report.stats.monthly_expenses, Decimal::from(200));
        assert_eq!(report.overview.groups.len(), 1);
        assert_eq!(report.projection.len(), 12);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = ProjectionOptions {
            weekly_factor: Decimal::from(-1),
            ..ProjectionOptions::default()
        };
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        assert!(matches!(
            project_finances(&snapshot(), as_of, &options),
            Err(ForecastError::InvalidWeeklyFactor(_))
        ));
    }
}
