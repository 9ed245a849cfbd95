//! Import report formatting

use tabled::Tabled;

use super::{render_table, truncate};
use crate::services::import::{CommitResult, CsvLayout, ImportReport, ImportRow, RowOutcome};

#[derive(Tabled)]
struct ImportRowView {
    #[tabled(rename = "Row")]
    row: usize,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl ImportRowView {
    fn new(row: &ImportRow, report: &ImportReport, symbol: &str) -> Self {
        let committed = report.committed().get(&row.row_number);
        let status = match (&row.outcome, committed) {
            (_, Some(_)) => "committed",
            (RowOutcome::Valid(_), None) => "ok",
            (RowOutcome::Invalid(_), None) => "invalid",
            (RowOutcome::DuplicateOf { .. }, None) => "duplicate",
        };

        let (date, amount, category, description) = match row.outcome.candidate() {
            Some(txn) => (
                txn.date.format("%Y-%m-%d").to_string(),
                txn.amount.format_with_symbol(symbol),
                txn.category.clone(),
                txn.description.clone(),
            ),
            None => {
                let offset = usize::from(report.layout() == CsvLayout::WithId);
                let field = |i: usize| row.fields.get(offset + i).cloned().unwrap_or_default();
                (field(0), field(1), field(2), field(3))
            }
        };

        let detail = match (&row.outcome, committed) {
            (_, Some(id)) => id.short(),
            (RowOutcome::Valid(_), None) => String::new(),
            (RowOutcome::Invalid(error), None) => error.to_string(),
            (
                RowOutcome::DuplicateOf {
                    existing,
                    batch_rows,
                    ..
                },
                None,
            ) => {
                let mut refs: Vec<String> = existing.iter().map(|id| id.short()).collect();
                refs.extend(batch_rows.iter().map(|r| format!("row {}", r)));
                format!("matches {}", refs.join(", "))
            }
        };

        Self {
            row: row.row_number,
            status,
            date,
            amount,
            category,
            description: truncate(&description, 30),
            detail,
        }
    }
}

/// Format a staged import: one line per data row plus the counts
pub fn format_import_report(report: &ImportReport, symbol: &str) -> String {
    if report.is_empty() {
        return "No data rows found.\n".to_string();
    }

    let rows = report
        .rows()
        .iter()
        .map(|row| ImportRowView::new(row, report, symbol))
        .collect();

    let mut output = render_table(rows, &[0, 3]);
    output.push('\n');
    if report.header_skipped() {
        output.push_str("Header row skipped.\n");
    }
    output.push_str(&format!(
        "{} row(s): {} valid, {} duplicate, {} invalid\n",
        report.len(),
        report.valid_count(),
        report.duplicate_count(),
        report.invalid_count()
    ));
    output
}

/// Summarize what a commit wrote and what it left behind
pub fn format_commit_result(result: &CommitResult) -> String {
    let mut output = format!("Committed {} transaction(s)\n", result.committed.len());

    for rejected in &result.rejected {
        output.push_str(&format!(
            "  row {} skipped: {}\n",
            rejected.row_number, rejected.reason
        ));
    }

    if let Some(failed) = &result.failed {
        output.push_str(&format!(
            "Row {} failed: {}\n",
            failed.row_number, failed.error
        ));
    }

    if !result.not_attempted.is_empty() {
        let rows: Vec<String> = result.not_attempted.iter().map(usize::to_string).collect();
        output.push_str(&format!("Not attempted: rows {}\n", rows.join(", ")));
    }

    if let Some(error) = &result.audit_error {
        output.push_str(&format!("Warning: audit log not updated: {}\n", error));
    }

    output
}
