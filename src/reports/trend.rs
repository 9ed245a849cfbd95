//! Monthly spending trend
//!
//! Total spend per calendar month for the `n` months ending with the month
//! of a reference date, oldest first. Months without spend are included.
//! The span is capped at [`MAX_TREND_MONTHS`].

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::{Money, PeriodWindow, Transaction};

use super::spending::aggregate;

/// Longest trend that will be generated (one hundred years)
pub const MAX_TREND_MONTHS: u32 = 1200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSpend {
    pub year: i32,
    pub month: u32,
    pub total: Money,
}

impl MonthSpend {
    /// `YYYY-MM`
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpendingTrend {
    pub months: Vec<MonthSpend>,
}

impl SpendingTrend {
    pub fn generate(transactions: &[Transaction], today: NaiveDate, months: u32) -> Self {
        let months = months.min(MAX_TREND_MONTHS);
        let mut windows = Vec::with_capacity(months as usize);
        let mut window = PeriodWindow::month_of(today);
        for _ in 0..months {
            windows.push(window);
            window = window.previous_month();
        }
        windows.reverse();

        let months = windows
            .into_iter()
            .map(|w| MonthSpend {
                year: w.start.year(),
                month: w.start.month(),
                total: aggregate(transactions, &w).total(),
            })
            .collect();

        Self { months }
    }

    pub fn total(&self) -> Money {
        self.months.iter().map(|m| m.total).sum()
    }

    /// Month with the highest spend; the earliest wins a tie
    pub fn peak(&self) -> Option<&MonthSpend> {
        self.months
            .iter()
            .rev()
            .max_by_key(|m| m.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, NewTransaction, PaymentMethod, TransactionId};

    fn txn(y: i32, m: u32, d: u32, cents: i64) -> Transaction {
        NewTransaction {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            amount: Money::from_cents(cents),
            category: "Dining".into(),
            description: String::new(),
            account_type: AccountType::Credit,
            payment_method: PaymentMethod::CreditCard,
        }
        .with_id(TransactionId::new())
    }

    #[test]
    fn test_trend_crosses_year_and_fills_gaps() {
        let data = vec![
            txn(2024, 11, 30, 500),
            txn(2025, 1, 1, 250),
            txn(2025, 1, 31, 250),
            txn(2025, 2, 10, 900),
            txn(2025, 3, 1, 10_000),
        ];
        let today = NaiveDate::from_ymd_opt(2025, 2, 15).unwrap();
        let trend = SpendingTrend::generate(&data, today, 4);

        let labels: Vec<_> = trend.months.iter().map(MonthSpend::label).collect();
        assert_eq!(labels, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);

        let totals: Vec<_> = trend.months.iter().map(|m| m.total.cents()).collect();
        assert_eq!(totals, vec![500, 0, 500, 900]);
        assert_eq!(trend.total(), Money::from_cents(1900));
        assert_eq!(trend.peak().unwrap().label(), "2025-02");
    }

    #[test]
    fn test_peak_tie_prefers_earliest() {
        let data = vec![txn(2025, 1, 5, 100), txn(2025, 2, 5, 100)];
        let trend = SpendingTrend::generate(&data, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), 2);
        assert_eq!(trend.peak().unwrap().label(), "2025-01");
    }

    #[test]
    fn test_month_count_is_capped() {
        let today = NaiveDate::from_ymd_opt(2025, 2, 15).unwrap();
        let trend = SpendingTrend::generate(&[txn(2025, 2, 1, 700)], today, u32::MAX);

        assert_eq!(trend.months.len(), MAX_TREND_MONTHS as usize);
        assert_eq!(trend.months.first().unwrap().label(), "1925-03");
        assert_eq!(trend.months.last().unwrap().label(), "2025-02");
        assert_eq!(trend.total(), Money::from_cents(700));
    }

    #[test]
    fn test_zero_months() {
        let trend = SpendingTrend::generate(&[], NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(), 0);
        assert!(trend.months.is_empty());
        assert!(trend.peak().is_none());
    }
}
