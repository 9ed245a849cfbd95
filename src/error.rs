//! Custom error types for pocketledger
//!
//! This module defines the error hierarchy for the application using thiserror.
//! Data-shape problems (a bad amount, an unknown category) are carried as
//! [`ValidationError`] values so a batch can keep going; only store failures
//! are meant to bubble up to the caller as hard errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{MoneyParseError, PeriodParseError};

/// The transaction field a validation failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// The CSV row as a whole (wrong field count, unreadable record)
    Row,
    Date,
    Amount,
    Category,
    Description,
    AccountType,
    PaymentMethod,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Row => "row",
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Category => "category",
            Self::Description => "description",
            Self::AccountType => "account_type",
            Self::PaymentMethod => "payment_method",
        };
        f.write_str(name)
    }
}

/// A recoverable, per-record validation failure
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// Category lookups that fail are reported with a fixed reason so callers
    /// can tell them apart from other category problems
    pub fn category_not_found(name: &str) -> Self {
        Self::new(Field::Category, format!("category not found: '{}'", name))
    }

    /// Check if this failure is a missing category
    pub fn is_category_not_found(&self) -> bool {
        self.field == Field::Category && self.reason.starts_with("category not found")
    }
}

/// A failure reported by a transaction or category store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("store {operation} failed: {cause}")]
pub struct StoreError {
    /// The store operation that failed (create, list, update, ...)
    pub operation: &'static str,
    pub cause: String,
}

impl StoreError {
    pub fn new(operation: &'static str, cause: impl Into<String>) -> Self {
        Self {
            operation,
            cause: cause.into(),
        }
    }
}

/// The main error type for pocketledger operations
#[derive(Error, Debug)]
pub enum PocketError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for a single record
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A category still referenced by transactions cannot be removed silently
    #[error("Category '{category}' is used by {count} transaction(s); reassign them first")]
    CategoryInUse { category: String, count: usize },

    /// Import pipeline misuse (wrong stage, unreadable input)
    #[error("Import error: {0}")]
    Import(String),

    /// Persistence failures; the only fatal kind
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl PocketError {
    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a store failure
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

impl From<std::io::Error> for PocketError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PocketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<MoneyParseError> for PocketError {
    fn from(err: MoneyParseError) -> Self {
        ValidationError::new(Field::Amount, err.to_string()).into()
    }
}

impl From<PeriodParseError> for PocketError {
    fn from(err: PeriodParseError) -> Self {
        ValidationError::new(Field::Date, err.to_string()).into()
    }
}

impl From<csv::Error> for PocketError {
    fn from(err: csv::Error) -> Self {
        Self::Import(err.to_string())
    }
}

/// Result type alias for pocketledger operations
pub type PocketResult<T> = Result<T, PocketError>;
