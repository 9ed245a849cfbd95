//! Spending aggregation
//!
//! Sums transaction amounts by category inside a [`PeriodWindow`]. All sums
//! are integer cents, so the total of the per-category figures always equals
//! the total of the amounts that went in.

use std::collections::BTreeMap;

use crate::models::{CategoryRegistry, Money, PeriodWindow, Transaction};

/// Spend per category name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpendingTotals {
    totals: BTreeMap<String, Money>,
}

impl SpendingTotals {
    pub fn get(&self, category: &str) -> Money {
        self.totals.get(category).copied().unwrap_or_default()
    }

    /// Sum over every category
    pub fn total(&self) -> Money {
        self.totals.values().sum()
    }

    /// Add a zero entry for every registry category that has none
    pub fn with_categories(mut self, registry: &CategoryRegistry) -> Self {
        for name in registry.names() {
            self.totals.entry(name.to_string()).or_default();
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Money)> {
        self.totals.iter().map(|(name, amount)| (name.as_str(), *amount))
    }

    /// Categories with spend, largest first (ties by name)
    pub fn non_zero(&self) -> Vec<(&str, Money)> {
        let mut rows: Vec<_> = self.iter().filter(|(_, amount)| !amount.is_zero()).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Total spend per category for transactions dated inside `window`
///
/// Only categories that occur in the window appear; use
/// [`SpendingTotals::with_categories`] to zero-fill.
pub fn aggregate<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    window: &PeriodWindow,
) -> SpendingTotals {
    let mut totals: BTreeMap<String, Money> = BTreeMap::new();
    for txn in transactions {
        if window.contains(txn.date) {
            *totals.entry(txn.category.clone()).or_default() += txn.amount;
        }
    }
    SpendingTotals { totals }
}

/// Per-category share of spend in a window, for the spending breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingShare {
    pub category: String,
    pub amount: Money,
    /// Share of the window total, 0-100; display only
    pub percentage: f64,
}

/// Spending breakdown of one window
#[derive(Debug, Clone)]
pub struct SpendingReport {
    pub window: PeriodWindow,
    pub shares: Vec<SpendingShare>,
    pub total: Money,
}

impl SpendingReport {
    pub fn generate<'a>(
        transactions: impl IntoIterator<Item = &'a Transaction>,
        window: PeriodWindow,
    ) -> Self {
        let totals = aggregate(transactions, &window);
        let total = totals.total();
        let shares = totals
            .non_zero()
            .into_iter()
            .map(|(category, amount)| SpendingShare {
                category: category.to_string(),
                amount,
                percentage: if total.is_zero() {
                    0.0
                } else {
                    amount.cents() as f64 / total.cents() as f64 * 100.0
                },
            })
            .collect();

        Self {
            window,
            shares,
            total,
        }
    }
}
