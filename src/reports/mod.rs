//! Reports for pocketledger
//!
//! Spending aggregation, budget usage and monthly trend. Every function here
//! works on a snapshot of transactions passed in by the caller.

pub mod budget_usage;
pub mod spending;
pub mod trend;

pub use budget_usage::{
    analyze, analyze_scaled, analyze_window, budget_months, BudgetAnalysis, CategoryUsage,
    UsageStatus,
};
pub use spending::{aggregate, SpendingReport, SpendingShare, SpendingTotals};
pub use trend::{MonthSpend, SpendingTrend};
