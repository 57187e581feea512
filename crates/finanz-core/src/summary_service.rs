//! Read-only aggregates behind the balance tab and the yearly charts.

use finanz_domain::{BudgetMonth, FinanceDocument};
use serde::Serialize;

/// Estimated versus recorded figures for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBalance {
    pub income_est: f64,
    pub expense_est: f64,
    pub estimated_balance: f64,
    pub real_income_usd: f64,
    pub real_expense_usd: f64,
    pub real_income_local: f64,
    pub real_expense_local: f64,
    pub balance_usd: f64,
}

/// USD flow of one month, or the running total up to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthlyFlow {
    pub month: u32,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearTrend {
    pub year: i32,
    /// Always twelve entries, January first. Months without data are zero.
    pub monthly: Vec<MonthlyFlow>,
    pub accumulated: Vec<MonthlyFlow>,
}

/// Shares of the balance ring, each in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSplit {
    pub income_share: f64,
    pub expense_share: f64,
    /// Nothing to draw; the ring is shown empty.
    pub empty: bool,
}

pub struct SummaryService;

impl SummaryService {
    pub fn month_balance(month: &BudgetMonth) -> MonthBalance {
        let real_income_usd = month.total_income_usd();
        let real_expense_usd = month.total_expense_usd();
        MonthBalance {
            income_est: month.income_est,
            expense_est: month.expense_est(),
            estimated_balance: month.income_est - month.expense_est(),
            real_income_usd,
            real_expense_usd,
            real_income_local: month.total_income_local(),
            real_expense_local: month.total_expense_local(),
            balance_usd: real_income_usd - real_expense_usd,
        }
    }

    pub fn year_trend(document: &FinanceDocument, year: i32) -> YearTrend {
        let mut monthly: Vec<MonthlyFlow> = (1..=12)
            .map(|month| MonthlyFlow {
                month,
                ..MonthlyFlow::default()
            })
            .collect();
        for (month, data) in document.year_months(year) {
            let Some(slot) = usize::try_from(month)
                .ok()
                .and_then(|m| m.checked_sub(1))
                .and_then(|index| monthly.get_mut(index))
            else {
                continue;
            };
            let income = data.total_income_usd();
            let expense = data.total_expense_usd();
            *slot = MonthlyFlow {
                month,
                income,
                expense,
                balance: income - expense,
            };
        }

        let mut running = MonthlyFlow::default();
        let accumulated = monthly
            .iter()
            .map(|flow| {
                running.month = flow.month;
                running.income += flow.income;
                running.expense += flow.expense;
                running.balance = running.income - running.expense;
                running
            })
            .collect();

        YearTrend {
            year,
            monthly,
            accumulated,
        }
    }

    pub fn chart_split(income: f64, expense: f64) -> ChartSplit {
        let total = income + expense;
        if total == 0.0 || !total.is_finite() {
            return ChartSplit {
                income_share: 0.0,
                expense_share: 0.0,
                empty: true,
            };
        }
        ChartSplit {
            income_share: income / total,
            expense_share: expense / total,
            empty: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finanz_domain::{Currency, ExchangeRate, Flow, MonthKey, TransactionCategory};

    fn month_with(income_local: f64, expense_local: f64) -> BudgetMonth {
        let rate = ExchangeRate::new(100.0).unwrap();
        let mut month = BudgetMonth::new(Currency::new("Peso", "ARS"), rate, 50.0, 30.0, Vec::new());
        month.upsert_category(
            Flow::Income,
            TransactionCategory::simple("In", income_local, rate, None),
        );
        month.upsert_category(
            Flow::Expense,
            TransactionCategory::simple("Out", expense_local, rate, None),
        );
        month
    }

    #[test]
    fn month_balance_reports_estimates_and_real_flows() {
        let balance = SummaryService::month_balance(&month_with(10_000.0, 4_000.0));
        assert_eq!(balance.estimated_balance, 20.0);
        assert_eq!(balance.real_income_usd, 100.0);
        assert_eq!(balance.real_expense_local, 4_000.0);
        assert_eq!(balance.balance_usd, 60.0);
    }

    #[test]
    fn year_trend_fills_gaps_and_accumulates() {
        let mut document = FinanceDocument::new();
        document.insert(MonthKey::new(2024, 2).unwrap(), month_with(10_000.0, 2_000.0));
        document.insert(MonthKey::new(2024, 5).unwrap(), month_with(5_000.0, 8_000.0));
        document.insert(MonthKey::new(2023, 5).unwrap(), month_with(99_000.0, 0.0));

        let trend = SummaryService::year_trend(&document, 2024);
        assert_eq!(trend.monthly.len(), 12);
        assert_eq!(trend.monthly[0].income, 0.0);
        assert_eq!(trend.monthly[1].balance, 80.0);
        assert_eq!(trend.monthly[4].balance, -30.0);
        assert_eq!(trend.accumulated[3].balance, 80.0);
        assert_eq!(trend.accumulated[11].income, 150.0);
        assert_eq!(trend.accumulated[11].balance, 50.0);
        assert_eq!(trend.accumulated[11].month, 12);
    }

    #[test]
    fn chart_split_handles_empty_totals() {
        assert!(SummaryService::chart_split(0.0, 0.0).empty);
        let split = SummaryService::chart_split(75.0, 25.0);
        assert_eq!(split.income_share, 0.75);
        assert_eq!(split.expense_share, 0.25);
    }
}
