//! Transaction display formatting

use tabled::Tabled;

use super::{render_table, truncate};
use crate::models::Transaction;

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Payment")]
    payment: String,
}

/// Format transactions as a table, in the order given
pub fn format_transaction_list(transactions: &[Transaction], symbol: &str) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions
        .iter()
        .map(|txn| TransactionRow {
            id: txn.id.short(),
            date: txn.date.format("%Y-%m-%d").to_string(),
            amount: txn.amount.format_with_symbol(symbol),
            category: txn.category.clone(),
            description: truncate(&txn.description, 40),
            account: txn.account_type.to_string(),
            payment: txn.payment_method.to_string(),
        })
        .collect();

    let mut output = render_table(rows, &[2]);
    output.push('\n');
    output.push_str(&format!("{} transaction(s)\n", transactions.len()));
    output
}

/// Format a single transaction with every field
pub fn format_transaction_details(txn: &Transaction, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("ID:          {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date.format("%Y-%m-%d")));
    output.push_str(&format!("Amount:      {}\n", txn.amount.format_with_symbol(symbol)));
    output.push_str(&format!("Category:    {}\n", txn.category));
    output.push_str(&format!("Account:     {}\n", txn.account_type));
    output.push_str(&format!("Payment:     {}\n", txn.payment_method));

    if !txn.description.is_empty() {
        output.push_str(&format!("Description: {}\n", txn.description));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, Money, NewTransaction, PaymentMethod, TransactionId};
    use chrono::NaiveDate;

    fn sample() -> Transaction {
        NewTransaction {
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            amount: Money::from_cents(4250),
            category: "Groceries".into(),
            description: "Weekly shop".into(),
            account_type: AccountType::Checking,
            payment_method: PaymentMethod::DebitCard,
        }
        .with_id(TransactionId::new())
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_transaction_list(&[], "$"), "No transactions found.\n");
    }

    #[test]
    fn test_list_shows_fields() {
        let txn = sample();
        let output = format_transaction_list(&[txn.clone()], "€");
        assert!(output.contains(&txn.id.short()));
        assert!(output.contains("2025-03-14"));
        assert!(output.contains("€42.50"));
        assert!(output.contains("Weekly shop"));
        assert!(output.contains("1 transaction(s)"));
    }

    #[test]
    fn test_details_omit_empty_description() {
        let mut txn = sample();
        txn.description.clear();
        let output = format_transaction_details(&txn, "$");
        assert!(output.contains("Category:    Groceries"));
        assert!(!output.contains("Description"));
    }
}
