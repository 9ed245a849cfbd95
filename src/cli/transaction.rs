//! Transaction CLI commands

use clap::{ArgGroup, Subcommand};

use super::{resolve_period, today};
use crate::config::Settings;
use crate::display::{format_transaction_details, format_transaction_list};
use crate::error::PocketResult;
use crate::models::RawTransaction;
use crate::services::TransactionService;
use crate::storage::{Storage, TransactionFilter};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Add a new transaction
    Add {
        /// Amount (e.g., "12.50" or "$1,200")
        amount: String,
        /// Category name (case-sensitive)
        category: String,
        /// Transaction date (YYYY-MM-DD, MM/DD/YYYY, DD.MM.YYYY or YYYY/MM/DD); defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Description
        #[arg(short = 'm', long, default_value = "")]
        description: String,
        /// Account type: checking, savings or credit
        #[arg(short, long, default_value = "checking")]
        account: String,
        /// Payment method: cash, debit card, credit card, bank transfer or mobile payment
        #[arg(short, long, default_value = "cash")]
        payment: String,
    },

    /// List transactions, most recent first
    List {
        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
        /// Period (month, prev-month, year, all, 2025-01, 2025-01-01..2025-01-15)
        #[arg(short, long, default_value = "all")]
        period: String,
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show one transaction
    Show {
        /// Transaction ID or prefix (e.g., txn-1a2b3c4d)
        id: String,
    },

    /// Edit a transaction; omitted fields keep their value
    Edit {
        /// Transaction ID or prefix
        id: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short = 'm', long)]
        description: Option<String>,
        #[arg(short, long)]
        account: Option<String>,
        #[arg(short, long)]
        payment: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID or prefix
        id: String,
    },

    /// Delete every transaction in a period, or all of them
    #[command(group(ArgGroup::new("range").required(true).args(["period", "all"])))]
    Clear {
        /// Period to clear
        #[arg(short, long)]
        period: Option<String>,
        /// Clear every transaction
        #[arg(long)]
        all: bool,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> PocketResult<()> {
    let service = TransactionService::new(storage, settings);
    let symbol = settings.currency_symbol.as_str();
    let today = today();

    match cmd {
        TransactionCommands::Add {
            amount,
            category,
            date,
            description,
            account,
            payment,
        } => {
            let raw = RawTransaction {
                date: date.unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
                amount,
                category,
                description,
                account_type: account,
                payment_method: payment,
            };
            let txn = service.add(&raw, today)?;
            println!("Added transaction {}", txn.id.short());
            print!("{}", format_transaction_details(&txn, symbol));
        }

        TransactionCommands::List {
            category,
            period,
            limit,
        } => {
            let mut filter =
                TransactionFilter::in_window(resolve_period(&period, today)?).with_limit(limit);
            if let Some(category) = category {
                filter = filter.with_category(category);
            }
            let transactions = service.list(&filter)?;
            print!("{}", format_transaction_list(&transactions, symbol));
        }

        TransactionCommands::Show { id } => {
            let txn = service.find(&id)?;
            print!("{}", format_transaction_details(&txn, symbol));
        }

        TransactionCommands::Edit {
            id,
            amount,
            category,
            date,
            description,
            account,
            payment,
        } => {
            let current = service.find(&id)?;
            let mut raw = RawTransaction::from(&current.to_new());
            if let Some(amount) = amount {
                raw.amount = amount;
            }
            if let Some(category) = category {
                raw.category = category;
            }
            if let Some(date) = date {
                raw.date = date;
            }
            if let Some(description) = description {
                raw.description = description;
            }
            if let Some(account) = account {
                raw.account_type = account;
            }
            if let Some(payment) = payment {
                raw.payment_method = payment;
            }

            let txn = service.edit(current.id, &raw, today)?;
            println!("Updated transaction {}", txn.id.short());
            print!("{}", format_transaction_details(&txn, symbol));
        }

        TransactionCommands::Delete { id } => {
            let txn = service.find(&id)?;
            service.delete(txn.id)?;
            println!("Deleted transaction {} ({})", txn.id.short(), txn);
        }

        TransactionCommands::Clear { period, .. } => match period {
            Some(period) => {
                let window = resolve_period(&period, today)?;
                let removed = service.clear_range(window)?;
                println!("Deleted {} transaction(s) from {}", removed, window);
            }
            None => {
                let removed = service.clear_all()?;
                println!("Deleted {} transaction(s)", removed);
            }
        },
    }

    Ok(())
}
