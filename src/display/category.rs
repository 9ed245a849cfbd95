//! Category display formatting

use tabled::Tabled;

use super::render_table;
use crate::models::{Category, Money};
use crate::services::{CategoryDeletion, CategoryImport};

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    name: String,
    #[tabled(rename = "Monthly Budget")]
    budget: String,
}

/// Format categories in registry order with the summed budget
pub fn format_category_list(categories: &[Category], symbol: &str) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'pocket init' to create default categories.\n"
            .to_string();
    }

    let rows = categories
        .iter()
        .map(|c| CategoryRow {
            name: c.name.clone(),
            budget: c.monthly_budget.format_with_symbol(symbol),
        })
        .collect();

    let total: Money = categories.iter().map(|c| c.monthly_budget).sum();
    let mut output = render_table(rows, &[1]);
    output.push('\n');
    output.push_str(&format!(
        "{} categories, {} budgeted per month\n",
        categories.len(),
        total.format_with_symbol(symbol)
    ));
    output
}

pub fn format_category_deletion(deletion: &CategoryDeletion, reassigned_to: Option<&str>) -> String {
    match reassigned_to {
        Some(target) if deletion.reassigned > 0 => format!(
            "Deleted category '{}'; moved {} transaction(s) to '{}'\n",
            deletion.category.name, deletion.reassigned, target
        ),
        _ => format!("Deleted category '{}'\n", deletion.category.name),
    }
}

/// Summarize a category CSV import, listing every skipped line
pub fn format_category_import(import: &CategoryImport) -> String {
    let mut output = format!(
        "Added {} categor{}, updated {}\n",
        import.added.len(),
        if import.added.len() == 1 { "y" } else { "ies" },
        import.updated.len()
    );

    if !import.errors.is_empty() {
        output.push_str(&format!("Skipped {} line(s):\n", import.errors.len()));
        for (line, reason) in &import.errors {
            output.push_str(&format!("  line {}: {}\n", line, reason));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_with_total() {
        let categories = vec![
            Category::new("Groceries", Money::from_cents(50000)),
            Category::new("Dining", Money::from_cents(30000)),
        ];
        let output = format_category_list(&categories, "$");
        assert!(output.contains("Groceries"));
        assert!(output.contains("$500.00"));
        assert!(output.contains("2 categories, $800.00 budgeted per month"));
    }

    #[test]
    fn test_empty_list_suggests_init() {
        assert!(format_category_list(&[], "$").contains("pocket init"));
    }

    #[test]
    fn test_import_summary_lists_errors() {
        let import = CategoryImport {
            added: vec!["Pets".into()],
            updated: vec![],
            errors: vec![(3, "invalid budget 'abc'".into())],
        };
        let output = format_category_import(&import);
        assert!(output.starts_with("Added 1 category, updated 0"));
        assert!(output.contains("line 3: invalid budget 'abc'"));
    }
}
