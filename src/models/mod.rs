//! Core data models for pocketledger
//!
//! Money, categories, transactions and reporting periods. Everything here is
//! plain data plus validation; persistence lives in `storage` and the engine
//! logic in `services`.

pub mod category;
pub mod ids;
pub mod money;
pub mod period;
pub mod transaction;

pub use category::{Category, CategoryRegistry, CategoryValidationError, UNKNOWN_CATEGORY};
pub use ids::TransactionId;
pub use money::{Money, MoneyParseError};
pub use period::{PeriodParseError, PeriodSelector, PeriodWindow};
pub use transaction::{AccountType, NewTransaction, PaymentMethod, RawTransaction, Transaction};
