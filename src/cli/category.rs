//! Category CLI commands
//!
//! List, add, re-budget, delete and bulk-import categories.

use std::fs::File;
use std::path::PathBuf;

use clap::Subcommand;

use crate::display::{format_category_deletion, format_category_import, format_category_list};
use crate::error::{PocketError, PocketResult};
use crate::models::Money;
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories with their monthly budgets
    List,

    /// Add a new category
    Add {
        /// Category name (case-sensitive)
        name: String,
        /// Monthly budget (e.g., "500" or "$1,250.00")
        #[arg(default_value = "0")]
        budget: String,
    },

    /// Change a category's monthly budget
    #[command(name = "set-budget")]
    SetBudget {
        /// Category name
        name: String,
        /// New monthly budget
        budget: String,
    },

    /// Delete a category
    Delete {
        /// Category name
        name: String,
        /// Move the category's transactions to this category first
        #[arg(short, long)]
        reassign: Option<String>,
    },

    /// Add or update categories from a CSV file (name,monthly_budget)
    Import {
        /// Path to CSV file
        file: PathBuf,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    symbol: &str,
    cmd: CategoryCommands,
) -> PocketResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List => {
            let registry = service.registry()?;
            print!("{}", format_category_list(registry.list(), symbol));
        }

        CategoryCommands::Add { name, budget } => {
            let budget = Money::parse(&budget)?;
            let category = service.add(&name, budget)?;
            println!(
                "Added category '{}' with a monthly budget of {}",
                category.name,
                category.monthly_budget.format_with_symbol(symbol)
            );
        }

        CategoryCommands::SetBudget { name, budget } => {
            let budget = Money::parse(&budget)?;
            let category = service.set_budget(&name, budget)?;
            println!(
                "Set monthly budget of '{}' to {}",
                category.name,
                category.monthly_budget.format_with_symbol(symbol)
            );
        }

        CategoryCommands::Delete { name, reassign } => {
            let deletion = service.delete(&name, reassign.as_deref())?;
            print!("{}", format_category_deletion(&deletion, reassign.as_deref()));
        }

        CategoryCommands::Import { file } => {
            let source = File::open(&file).map_err(|e| {
                PocketError::Import(format!("Failed to open {}: {}", file.display(), e))
            })?;
            let import = service.import_csv(source)?;
            print!("{}", format_category_import(&import));
        }
    }

    Ok(())
}
