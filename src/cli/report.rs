//! CLI commands for reports
//!
//! Every report reads one snapshot of transactions and categories.

use clap::Subcommand;

use super::{resolve_period, today};
use crate::display::{
    format_budget_usage, format_over_budget, format_spending_report, format_spending_trend,
};
use crate::error::PocketResult;
use crate::reports::{analyze_window, SpendingReport, SpendingTrend};
use crate::storage::{Storage, TransactionFilter, TransactionStore};

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Spend against budget for every category
    Usage {
        /// Period (month, prev-month, year, all, 2025-01, 2025-01-01..2025-01-15)
        #[arg(short, long, default_value = "month")]
        period: String,
    },

    /// Categories that exceeded their budget
    Over {
        #[arg(short, long, default_value = "month")]
        period: String,
    },

    /// Spending by category, largest first
    Spending {
        #[arg(short, long, default_value = "month")]
        period: String,
    },

    /// Total spend per month
    Trend {
        /// Number of months, ending with the current one
        #[arg(short, long, default_value = "6")]
        months: u32,
    },
}

/// Handle a report command
pub fn handle_report_command(storage: &Storage, symbol: &str, cmd: ReportCommands) -> PocketResult<()> {
    let today = today();
    let registry = storage.categories.snapshot()?;
    let transactions = storage.transactions.list(&TransactionFilter::all())?;

    match cmd {
        ReportCommands::Usage { period } => {
            let window = resolve_period(&period, today)?;
            let analysis = analyze_window(&transactions, &registry, &window);
            print!("{}", format_budget_usage(&analysis, &window, symbol));
        }

        ReportCommands::Over { period } => {
            let window = resolve_period(&period, today)?;
            let analysis = analyze_window(&transactions, &registry, &window);
            print!("{}", format_over_budget(&analysis, &window, symbol));
        }

        ReportCommands::Spending { period } => {
            let window = resolve_period(&period, today)?;
            let report = SpendingReport::generate(&transactions, window);
            print!("{}", format_spending_report(&report, symbol));
        }

        ReportCommands::Trend { months } => {
            let trend = SpendingTrend::generate(&transactions, today, months.max(1));
            print!("{}", format_spending_trend(&trend, symbol));
        }
    }

    Ok(())
}
