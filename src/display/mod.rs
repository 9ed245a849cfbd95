//! Display formatting for terminal output
//!
//! Every formatter returns a `String` so the CLI decides where it goes and
//! tests can assert on it. Tables are rendered with `tabled`.

pub mod category;
pub mod import;
pub mod report;
pub mod transaction;

pub use category::{format_category_deletion, format_category_import, format_category_list};
pub use import::{format_commit_result, format_import_report};
pub use report::{
    format_budget_usage, format_over_budget, format_spending_report, format_spending_trend,
};
pub use transaction::{format_transaction_details, format_transaction_list};

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

/// Render rows as a rounded table, right-aligning the given columns
fn render_table<T: Tabled>(rows: Vec<T>, numeric_columns: &[usize]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    for &column in numeric_columns {
        table.modify(Columns::single(column), Alignment::right());
    }
    table.to_string()
}

/// Truncate a string to at most `max_len` characters
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer description", 10), "a much ...");
        assert_eq!(truncate("café au lait", 6), "caf...");
    }
}
