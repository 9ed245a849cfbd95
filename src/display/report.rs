//! Report formatting
//!
//! Budget usage, over-budget list, spending breakdown and monthly trend.

use tabled::Tabled;

use super::render_table;
use crate::models::{Money, PeriodWindow};
use crate::reports::{BudgetAnalysis, CategoryUsage, SpendingReport, SpendingTrend};

/// Width of the longest trend bar
const BAR_WIDTH: i64 = 30;

#[derive(Tabled)]
struct UsageRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Budget")]
    budget: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl UsageRow {
    fn new(usage: &CategoryUsage, symbol: &str) -> Self {
        Self {
            category: usage.category.clone(),
            budget: usage.budget.format_with_symbol(symbol),
            spent: usage.spent.format_with_symbol(symbol),
            remaining: usage.remaining().format_with_symbol(symbol),
            used: usage
                .percentage()
                .map(|p| format!("{:.1}%", p))
                .unwrap_or_else(|| "-".to_string()),
            status: usage.status.to_string(),
        }
    }
}

fn usage_table<'a>(usages: impl IntoIterator<Item = &'a CategoryUsage>, symbol: &str) -> String {
    let rows = usages
        .into_iter()
        .map(|u| UsageRow::new(u, symbol))
        .collect();
    render_table(rows, &[1, 2, 3, 4])
}

/// Budget usage of every category, highest ratio first, with the
/// `UNKNOWN` bucket last
pub fn format_budget_usage(analysis: &BudgetAnalysis, window: &PeriodWindow, symbol: &str) -> String {
    let mut output = format!("Budget usage for {}", window);
    if analysis.budget_months > 1 {
        output.push_str(&format!(" (budgets x{} months)", analysis.budget_months));
    }
    output.push('\n');

    if analysis.usages.is_empty() && analysis.unknown.is_zero() {
        output.push_str("No categories found.\n");
        return output;
    }

    let unknown = analysis.unknown_usage();
    let rows = analysis.ranked().into_iter().chain(unknown.as_ref());
    output.push_str(&usage_table(rows, symbol));
    output.push('\n');

    output.push_str(&format!(
        "Total spent {} of {} budgeted\n",
        analysis.total_spent().format_with_symbol(symbol),
        analysis.total_budget().format_with_symbol(symbol)
    ));
    if !analysis.unknown_categories.is_empty() {
        output.push_str(&format!(
            "Uncategorized spend from: {}\n",
            analysis.unknown_categories.join(", ")
        ));
    }
    output
}

/// Only the categories whose spend exceeds their budget
pub fn format_over_budget(analysis: &BudgetAnalysis, window: &PeriodWindow, symbol: &str) -> String {
    let over = analysis.over_budget();
    if over.is_empty() {
        return format!("No categories over budget for {}.\n", window);
    }

    let overspend: Money = over.iter().map(|u| u.spent - u.budget).sum();
    let mut output = format!("Over budget for {}\n", window);
    output.push_str(&usage_table(over, symbol));
    output.push('\n');
    output.push_str(&format!(
        "Overspent by {} in total\n",
        overspend.format_with_symbol(symbol)
    ));
    output
}

#[derive(Tabled)]
struct ShareRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Share")]
    share: String,
}

/// Spending by category, largest first
pub fn format_spending_report(report: &SpendingReport, symbol: &str) -> String {
    if report.shares.is_empty() {
        return format!("No spending for {}.\n", report.window);
    }

    let rows = report
        .shares
        .iter()
        .map(|s| ShareRow {
            category: s.category.clone(),
            amount: s.amount.format_with_symbol(symbol),
            share: format!("{:.1}%", s.percentage),
        })
        .collect();

    let mut output = format!("Spending for {}\n", report.window);
    output.push_str(&render_table(rows, &[1, 2]));
    output.push('\n');
    output.push_str(&format!("Total: {}\n", report.total.format_with_symbol(symbol)));
    output
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "")]
    bar: String,
}

/// Monthly totals with a bar scaled to the peak month
pub fn format_spending_trend(trend: &SpendingTrend, symbol: &str) -> String {
    if trend.months.is_empty() {
        return "No months to show.\n".to_string();
    }

    let peak = trend.peak().map(|m| m.total.cents()).unwrap_or(0);
    let rows = trend
        .months
        .iter()
        .map(|m| TrendRow {
            month: m.label(),
            spent: m.total.format_with_symbol(symbol),
            bar: "#".repeat(bar_length(m.total.cents(), peak)),
        })
        .collect();

    let mut output = render_table(rows, &[1]);
    output.push('\n');
    output.push_str(&format!("Total: {}", trend.total().format_with_symbol(symbol)));
    if let Some(peak) = trend.peak().filter(|m| m.total.is_positive()) {
        output.push_str(&format!(
            ", peak {} ({})",
            peak.label(),
            peak.total.format_with_symbol(symbol)
        ));
    }
    output.push('\n');
    output
}

fn bar_length(cents: i64, peak: i64) -> usize {
    if peak <= 0 || cents <= 0 {
        return 0;
    }
    let length = i128::from(cents) * i128::from(BAR_WIDTH) / i128::from(peak);
    // Any spend gets at least one mark
    length.max(1) as usize
}
