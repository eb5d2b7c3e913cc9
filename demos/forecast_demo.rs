use chrono::NaiveDate;
use finance_forecaster::*;
use rust_decimal::Decimal;

fn item(id: u64, account_id: AccountId, name: &str, amount: Decimal, frequency: &str) -> ItemRecord {
    ItemRecord {
        id,
        account_id,
        name: name.to_string(),
        description: None,
        amount,
        date: Some("2024-01-01".to_string()),
        frequency: frequency.to_string(),
        start_date: None,
        end_date: None,
        category: None,
        is_active: true,
    }
}

fn main() {
    println!("📊 Household Forecast Demo\n");
    println!("Projects a checking and a savings account over the next year,");
    println!("with a loan that ends in spring and a yearly insurance premium.\n");

    let snapshot = FinanceSnapshot {
        accounts: vec![
            AccountRecord {
                id: 1,
                name: "Checking".to_string(),
                bank: Some("Harbor Bank".to_string()),
                kind: AccountKind::Current,
                current_balance: Decimal::from(1800),
                is_active: true,
                blocked_at: None,
            },
            AccountRecord {
                id: 2,
                name: "Savings".to_string(),
                bank: Some("Harbor Bank".to_string()),
                kind: AccountKind::Savings,
                current_balance: Decimal::from(6000),
                is_active: true,
                blocked_at: None,
            },
        ],
        incomes: vec![item(1, 1, "Salary", Decimal::from(2900), "monthly")],
        expenses: vec![
            item(1, 1, "Rent", Decimal::from(1050), "monthly"),
            item(2, 1, "Groceries", Decimal::new(9500, 2), "weekly"),
            ItemRecord {
                end_date: Some("2025-04-30".to_string()),
                ..item(3, 1, "Phone loan", Decimal::from(60), "monthly")
            },
            ItemRecord {
                start_date: Some("2024-06-01".to_string()),
                ..item(4, 1, "Home insurance", Decimal::from(420), "yearly")
            },
        ],
        transfers: vec![TransferRecord {
            id: 1,
            from_account_id: 1,
            to_account_id: 2,
            name: "Rainy day fund".to_string(),
            description: None,
            amount: Decimal::from(300),
            date: Some("2024-01-01".to_string()),
            frequency: "monthly".to_string(),
            start_date: None,
            end_date: None,
            is_active: true,
        }],
        balance_adjustments: vec![BalanceAdjustmentRecord {
            id: 1,
            account_id: 2,
            adjustment_date: "2025-07-15".to_string(),
            actual_balance: Decimal::from(7500),
            description: Some("Bank statement".to_string()),
            is_active: true,
        }],
    };

    let as_of = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
    let options = ProjectionOptions::with_horizon(HorizonPreset::NextYear.months());

    let preview = AmountPreview::compute(
        Decimal::from(60),
        Frequency::Monthly,
        Some("2024-05-01"),
        Some("2025-04-30"),
    );
    println!("📋 Phone loan: {}\n", preview);

    match forecast_report(&snapshot, as_of, &options) {
        Ok(report) => {
            println!("💰 Today:");
            println!("  Total balance:    {:>10.2}", report.stats.total_balance);
            println!("  Monthly income:   {:>10.2}", report.stats.monthly_income);
            println!("  Monthly expenses: {:>10.2}", report.stats.monthly_expenses);

            for group in &report.overview.groups {
                println!(
                    "  {} ({:.2})",
                    group.bank.as_deref().unwrap_or("No bank"),
                    group.total
                );
                for account in &group.accounts {
                    println!("    {:<10} {:>10.2}", account.name, account.balance);
                }
            }

            let projection = &report.projection;
            println!("\n✅ Projection ({}):\n", HorizonPreset::NextYear.label());
            println!(
                "  {:<9} {:>10} {:>10} {:>10} {:>9} {:>9}",
                "Month", "Checking", "Savings", "Total", "Income", "Expenses"
            );

            for month in &projection.months {
                let i = month.index;
                let balance = |id| {
                    projection
                        .account(id)
                        .map(|a| a.balances[i])
                        .unwrap_or_default()
                };
                println!(
                    "  {:<9} {:>10.2} {:>10.2} {:>10.2} {:>9.2} {:>9.2}",
                    month.label,
                    balance(1),
                    balance(2),
                    projection.total_balances[i],
                    projection.income[i],
                    projection.expenses[i]
                );
            }

            println!("\n🔄 Expense changes:");
            for (i, entries) in &projection.expense_changes {
                println!("  {}:", projection.months[*i].label);
                for entry in entries {
                    println!("    - {}", entry);
                }
            }
        }
        Err(e) => {
            eprintln!("❌ Error: {}", e);
        }
    }
}
