//! Budget usage analysis
//!
//! Compares spend against each category's budget and classifies it:
//!
//! - `Under` when spent is below 80% of the budget
//! - `Near` from 80% up to and including 100%
//! - `Over` above 100%
//! - `NoBudget` when the budget is zero
//!
//! Classification compares integers by cross-multiplication; the
//! percentage is only ever computed for display.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::models::{
    period::months_between, CategoryRegistry, Money, PeriodWindow, Transaction, UNKNOWN_CATEGORY,
};

use super::spending::{aggregate, SpendingTotals};

/// Usage classification of one category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageStatus {
    Under,
    Near,
    Over,
    NoBudget,
}

impl UsageStatus {
    pub fn classify(spent: Money, budget: Money) -> Self {
        if !budget.is_positive() {
            return Self::NoBudget;
        }
        let spent = i128::from(spent.cents());
        let budget = i128::from(budget.cents());
        if spent * 100 < budget * 80 {
            Self::Under
        } else if spent <= budget {
            Self::Near
        } else {
            Self::Over
        }
    }
}

impl fmt::Display for UsageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Under => write!(f, "Under"),
            Self::Near => write!(f, "Near"),
            Self::Over => write!(f, "Over"),
            Self::NoBudget => write!(f, "No budget"),
        }
    }
}

/// Spend against budget for one registry category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryUsage {
    pub category: String,
    pub budget: Money,
    pub spent: Money,
    pub status: UsageStatus,
}

impl CategoryUsage {
    pub fn new(category: impl Into<String>, budget: Money, spent: Money) -> Self {
        Self {
            category: category.into(),
            budget,
            spent,
            status: UsageStatus::classify(spent, budget),
        }
    }

    /// Spent as a percentage of budget; `None` without a budget
    pub fn percentage(&self) -> Option<f64> {
        if !self.budget.is_positive() {
            return None;
        }
        Some(self.spent.cents() as f64 / self.budget.cents() as f64 * 100.0)
    }

    pub fn remaining(&self) -> Money {
        self.budget - self.spent
    }

    /// Compare usage ratios exactly; categories without a budget sort lowest
    fn cmp_ratio(&self, other: &Self) -> Ordering {
        match (self.budget.is_positive(), other.budget.is_positive()) {
            (false, false) => Ordering::Equal,
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => {
                let lhs = i128::from(self.spent.cents()) * i128::from(other.budget.cents());
                let rhs = i128::from(other.spent.cents()) * i128::from(self.budget.cents());
                lhs.cmp(&rhs)
            }
        }
    }
}

/// Usage of every registry category, plus spend under unregistered names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetAnalysis {
    /// One entry per registry category, in registry order
    pub usages: Vec<CategoryUsage>,

    /// Spend whose category is not in the registry
    pub unknown: Money,

    /// The unregistered category names that contributed to `unknown`
    pub unknown_categories: Vec<String>,

    /// Monthly budgets were multiplied by this
    pub budget_months: u32,
}

impl BudgetAnalysis {
    pub fn total_spent(&self) -> Money {
        self.usages.iter().map(|u| u.spent).sum::<Money>() + self.unknown
    }

    pub fn total_budget(&self) -> Money {
        self.usages.iter().map(|u| u.budget).sum()
    }

    /// Categories over budget, in registry order
    pub fn over_budget(&self) -> Vec<&CategoryUsage> {
        self.usages
            .iter()
            .filter(|u| u.status == UsageStatus::Over)
            .collect()
    }

    /// Categories by usage ratio, highest first; ties keep registry order
    pub fn ranked(&self) -> Vec<&CategoryUsage> {
        let mut ranked: Vec<_> = self.usages.iter().collect();
        ranked.sort_by(|a, b| b.cmp_ratio(a));
        ranked
    }

    /// The `UNKNOWN` bucket as a usage row, when it holds any spend
    pub fn unknown_usage(&self) -> Option<CategoryUsage> {
        (!self.unknown.is_zero()).then(|| CategoryUsage::new(UNKNOWN_CATEGORY, Money::zero(), self.unknown))
    }
}

/// Compare spend with monthly budgets
pub fn analyze(totals: &SpendingTotals, registry: &CategoryRegistry) -> BudgetAnalysis {
    analyze_scaled(totals, registry, 1)
}

/// Compare spend with monthly budgets multiplied by `months`
pub fn analyze_scaled(
    totals: &SpendingTotals,
    registry: &CategoryRegistry,
    months: u32,
) -> BudgetAnalysis {
    let usages = registry
        .list()
        .iter()
        .map(|c| CategoryUsage::new(&c.name, c.monthly_budget.times(months), totals.get(&c.name)))
        .collect();

    let mut unknown = Money::zero();
    let mut unknown_categories = Vec::new();
    for (name, amount) in totals.iter() {
        if !registry.contains(name) {
            unknown += amount;
            unknown_categories.push(name.to_string());
        }
    }

    BudgetAnalysis {
        usages,
        unknown,
        unknown_categories,
        budget_months: months,
    }
}

/// How many monthly budgets a window is worth
///
/// A bounded window counts the calendar months it touches (1 for a month, 12
/// for a year). The all-time window counts the months between the earliest
/// and latest transaction, or 1 when there are none.
pub fn budget_months(window: &PeriodWindow, transactions: &[Transaction]) -> u32 {
    if !window.is_all_time() {
        return window.months_spanned();
    }
    let first = transactions.iter().map(|t| t.date).min();
    let last = transactions.iter().map(|t| t.date).max();
    match (first, last) {
        (Some(first), Some(last)) => months_between(first, last),
        _ => 1,
    }
}

/// Aggregate a snapshot over `window` and analyze it with scaled budgets
pub fn analyze_window(
    transactions: &[Transaction],
    registry: &CategoryRegistry,
    window: &PeriodWindow,
) -> BudgetAnalysis {
    let totals = aggregate(transactions, window);
    analyze_scaled(&totals, registry, budget_months(window, transactions))
}
