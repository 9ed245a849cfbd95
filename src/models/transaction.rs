//! Transaction model
//!
//! A transaction moves through three shapes:
//!
//! - [`RawTransaction`]: text fields as typed into a form or read from CSV
//! - [`NewTransaction`]: validated and normalized, not yet stored
//! - [`Transaction`]: a stored record carrying its store-assigned id

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TransactionId;
use super::money::Money;

/// Account a transaction was paid from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    Savings,
    Credit,
}

impl AccountType {
    pub const ALL: [AccountType; 3] = [Self::Checking, Self::Savings, Self::Credit];

    /// Parse account type from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "checking" | "chequing" => Some(Self::Checking),
            "savings" | "saving" => Some(Self::Savings),
            "credit" | "credit card" | "credit_card" => Some(Self::Credit),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checking => write!(f, "Checking"),
            Self::Savings => write!(f, "Savings"),
            Self::Credit => write!(f, "Credit"),
        }
    }
}

/// How a transaction was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    DebitCard,
    CreditCard,
    BankTransfer,
    MobilePayment,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 5] = [
        Self::Cash,
        Self::DebitCard,
        Self::CreditCard,
        Self::BankTransfer,
        Self::MobilePayment,
    ];

    /// Parse payment method from string
    ///
    /// A bare "card" is read as a debit card.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "cash" => Some(Self::Cash),
            "card" | "debit" | "debit card" => Some(Self::DebitCard),
            "credit card" | "creditcard" => Some(Self::CreditCard),
            "transfer" | "bank transfer" | "bank" => Some(Self::BankTransfer),
            "mobile" | "mobile payment" => Some(Self::MobilePayment),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "Cash"),
            Self::DebitCard => write!(f, "Debit Card"),
            Self::CreditCard => write!(f, "Credit Card"),
            Self::BankTransfer => write!(f, "Bank Transfer"),
            Self::MobilePayment => write!(f, "Mobile Payment"),
        }
    }
}

/// An unparsed candidate transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTransaction {
    pub date: String,
    pub amount: String,
    pub category: String,
    pub description: String,
    pub account_type: String,
    pub payment_method: String,
}

impl RawTransaction {
    /// Number of fields in a CSV transaction row
    pub const FIELD_COUNT: usize = 6;

    /// Build a candidate from CSV fields in
    /// `date,amount,category,description,account_type,payment_method` order
    ///
    /// Returns `None` when the field count is wrong.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Option<Self> {
        match fields {
            [date, amount, category, description, account_type, payment_method] => Some(Self {
                date: date.as_ref().to_string(),
                amount: amount.as_ref().to_string(),
                category: category.as_ref().to_string(),
                description: description.as_ref().to_string(),
                account_type: account_type.as_ref().to_string(),
                payment_method: payment_method.as_ref().to_string(),
            }),
            _ => None,
        }
    }
}

impl From<&NewTransaction> for RawTransaction {
    fn from(txn: &NewTransaction) -> Self {
        Self {
            date: txn.date.format("%Y-%m-%d").to_string(),
            amount: txn.amount.to_decimal_string(),
            category: txn.category.clone(),
            description: txn.description.clone(),
            account_type: txn.account_type.to_string(),
            payment_method: txn.payment_method.to_string(),
        }
    }
}

/// A validated transaction that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,

    /// Always positive
    pub amount: Money,

    /// Name of a registered category at validation time
    pub category: String,

    /// Trimmed free text
    #[serde(default)]
    pub description: String,

    pub account_type: AccountType,

    pub payment_method: PaymentMethod,
}

impl NewTransaction {
    /// Attach a store-assigned id
    pub fn with_id(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            date: self.date,
            amount: self.amount,
            category: self.category,
            description: self.description,
            account_type: self.account_type,
            payment_method: self.payment_method,
        }
    }
}

/// A stored transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque id assigned by the store on create
    pub id: TransactionId,

    pub date: NaiveDate,

    pub amount: Money,

    pub category: String,

    #[serde(default)]
    pub description: String,

    pub account_type: AccountType,

    pub payment_method: PaymentMethod,
}

impl Transaction {
    /// The record without its id, e.g. for comparing stored data with input
    pub fn to_new(&self) -> NewTransaction {
        NewTransaction {
            date: self.date,
            amount: self.amount,
            category: self.category.clone(),
            description: self.description.clone(),
            account_type: self.account_type,
            payment_method: self.payment_method,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.date.format("%Y-%m-%d"),
            self.category,
            self.amount,
            self.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewTransaction {
        NewTransaction {
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            amount: Money::from_cents(4250),
            category: "Groceries".into(),
            description: "Weekly shop".into(),
            account_type: AccountType::Checking,
            payment_method: PaymentMethod::DebitCard,
        }
    }

    #[test]
    fn test_account_type_parse() {
        assert_eq!(AccountType::parse("Checking"), Some(AccountType::Checking));
        assert_eq!(AccountType::parse(" savings "), Some(AccountType::Savings));
        assert_eq!(AccountType::parse("CREDIT"), Some(AccountType::Credit));
        assert_eq!(AccountType::parse("brokerage"), None);
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!(PaymentMethod::parse("cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::parse("card"), Some(PaymentMethod::DebitCard));
        assert_eq!(
            PaymentMethod::parse("Credit Card"),
            Some(PaymentMethod::CreditCard)
        );
        assert_eq!(
            PaymentMethod::parse("bank_transfer"),
            Some(PaymentMethod::BankTransfer)
        );
        assert_eq!(
            PaymentMethod::parse("Mobile Payment"),
            Some(PaymentMethod::MobilePayment)
        );
        assert_eq!(PaymentMethod::parse("cheque"), None);
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for kind in AccountType::ALL {
            assert_eq!(AccountType::parse(&kind.to_string()), Some(kind));
        }
        for method in PaymentMethod::ALL {
            assert_eq!(PaymentMethod::parse(&method.to_string()), Some(method));
        }
    }

    #[test]
    fn test_raw_from_fields() {
        let raw =
            RawTransaction::from_fields(&["2025-01-02", "5", "Dining", "", "checking", "cash"])
                .unwrap();
        assert_eq!(raw.category, "Dining");
        assert_eq!(raw.payment_method, "cash");

        assert!(RawTransaction::from_fields(&["2025-01-02", "5"]).is_none());
    }

    #[test]
    fn test_with_id_and_back() {
        let new = sample();
        let id = TransactionId::new();
        let stored = new.clone().with_id(id);
        assert_eq!(stored.id, id);
        assert_eq!(stored.to_new(), new);
    }

    #[test]
    fn test_raw_from_new_uses_canonical_forms() {
        let raw = RawTransaction::from(&sample());
        assert_eq!(raw.date, "2025-03-14");
        assert_eq!(raw.amount, "42.50");
        assert_eq!(raw.payment_method, "Debit Card");
    }

    #[test]
    fn test_serialization() {
        let stored = sample().with_id(TransactionId::new());
        let json = serde_json::to_string(&stored).unwrap();
        assert!(json.contains("\"payment_method\":\"debit_card\""));
        assert!(json.contains("\"amount\":4250"));

        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stored);
    }
}
